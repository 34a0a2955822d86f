use bnf_forge_codegen::naming::{function_name, to_pascal_case, to_snake_case, type_name};
use bnf_forge_codegen::NamingConfig;
use bnf_forge_model::NodeKind;
use proptest::prelude::*;

proptest! {
    #[test]
    fn snake_case_is_lowercase_and_idempotent(name in "[A-Za-z][A-Za-z0-9]{0,12}") {
        let snake = to_snake_case(&name);
        prop_assert!(snake.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        prop_assert!(!snake.starts_with('_'));
        prop_assert!(!snake.contains("__"));
        prop_assert_eq!(to_snake_case(&snake), snake);
    }

    #[test]
    fn pascal_case_has_no_separators(name in "[a-z][a-z0-9_]{0,12}") {
        let pascal = to_pascal_case(&name);
        prop_assert!(!pascal.contains('_'));
        prop_assert!(pascal.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn token_suffix_only_changes_the_suffix(name in "[A-Z][A-Za-z0-9]{0,12}", suffix in "[A-Z][a-z]{0,5}") {
        let custom = NamingConfig { token_suffix: suffix.clone(), ..NamingConfig::default() };
        let default = NamingConfig::default();
        let base = to_pascal_case(&name);
        prop_assert_eq!(type_name(&name, NodeKind::Token, &custom), format!("{}{}", base, suffix));
        prop_assert_eq!(
            type_name(&name, NodeKind::Deduction, &custom),
            type_name(&name, NodeKind::Deduction, &default)
        );
        prop_assert_eq!(
            type_name(&name, NodeKind::Union, &custom),
            type_name(&name, NodeKind::Union, &default)
        );
        prop_assert_eq!(function_name(&name, &custom), function_name(&name, &default));
    }
}
