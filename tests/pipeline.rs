use bnf_forge::model::{Element, Model};
use bnf_forge::{compile_model, compile_source, load_model, CompilerConfig};
use pretty_assertions::assert_eq;

const SIMPLE_MATH: &str = r#"
/// Arithmetic over identifiers and numbers.
grammar SimpleMath version "1.0.0" start Expression;

token Identifier = /[a-zA-Z_]+/;
token Number = /\d+/;
token Plus = "+";
token Minus = "-";
token LeftParen = "(";
token RightParen = ")";

union Term = Identifier | Number | ParenExpression;
union Operator = Plus | Minus;
union Expression = Term | BinaryExpression;

deduction BinaryExpression = left:Expression operator:Operator right:Expression;
deduction ParenExpression = LeftParen expression:Expression RightParen;
"#;

#[test]
fn test_simple_math_generates_all_artifacts() {
    let output = compile_source(SIMPLE_MATH, &CompilerConfig::default());
    assert!(output.success(), "{:?}", output.errors());
    assert!(output.errors().is_empty());
    assert_eq!(
        output.warnings(),
        ["left-recursive rules will not parse with a PEG engine: Expression, BinaryExpression"]
    );

    let schema = output.schema.output.as_ref().unwrap();
    assert!(schema.contains_key("mod.rs"));
    assert!(schema.contains_key("nodes/binary_expression.rs"));

    let stringifier = output.stringifier.output.as_ref().unwrap();
    assert!(stringifier.files().contains_key("types.rs"));
    assert!(stringifier.files().contains_key("nodes/binary_expression.rs"));
    assert!(stringifier.code().contains("pub fn stringify_binary_expression"));

    let grammar = output.grammar.output.as_ref().unwrap();
    assert_eq!(grammar.start_rule, "start");
    assert_eq!(grammar.start_node, "Expression");
    assert_eq!(grammar.stats.total_rules, 11);
    assert_eq!(grammar.stats.left_recursive_rules, ["Expression", "BinaryExpression"]);
}

#[test]
fn test_compile_is_deterministic() {
    let model = load_model(SIMPLE_MATH).unwrap();
    let config = CompilerConfig::default();
    assert_eq!(compile_model(&model, &config), compile_model(&model, &config));
}

#[test]
fn test_invalid_model_fails_every_generator() {
    let model = Model::builder("Broken", "Missing")
        .literal("Dot", ".")
        .deduction("Pair", vec![Element::named("Dot", "first"), Element::named("Nowhere", "second")])
        .build();
    let output = compile_model(&model, &CompilerConfig::default());

    assert!(!output.success());
    for result in [&output.schema.errors, &output.stringifier.errors, &output.grammar.errors] {
        assert!(result.contains(&"start node must exist in nodes (got 'Missing')".to_string()));
        assert!(result.contains(&"unknown node reference 'Nowhere' in 'Pair'".to_string()));
    }
    assert!(output.schema.output.is_none());
    assert!(output.stringifier.output.is_none());
    assert!(output.grammar.output.is_none());
}

#[test]
fn test_config_document_drives_generators() {
    let config = CompilerConfig::from_json(
        r#"{
            "naming": { "tokenSuffix": "Tok", "functionPrefix": "print_" },
            "schema": { "separateFiles": false },
            "stringifier": { "separateFiles": false },
            "grammar": { "startRule": "program", "includeComments": false }
        }"#,
    )
    .unwrap();
    let output = compile_source(SIMPLE_MATH, &config);
    assert!(output.success(), "{:?}", output.errors());

    let schema = output.schema.output.unwrap();
    let keys: Vec<_> = schema.keys().map(String::as_str).collect();
    assert_eq!(keys, ["schema.rs"]);
    assert!(schema["schema.rs"].contains("pub struct NumberTok"));

    let stringifier = output.stringifier.output.unwrap();
    let keys: Vec<_> = stringifier.files().keys().map(String::as_str).collect();
    assert_eq!(keys, ["stringifier.rs"]);
    assert!(stringifier.code().contains("pub fn print_binary_expression"));
    assert!(stringifier
        .code()
        .contains("pub fn print_number (node : & NumberTok , _options : & StringifyOptions)"));

    let grammar = output.grammar.output.unwrap();
    assert!(grammar.text.contains("program = { SOI ~ Expression ~ EOI }"));
    assert!(!grammar.text.contains("// fields:"));
}

#[test]
fn test_every_generated_file_is_valid_rust() {
    for separate_files in [true, false] {
        let mut config = CompilerConfig::default();
        config.schema.separate_files = separate_files;
        config.stringifier.separate_files = separate_files;
        let output = compile_source(SIMPLE_MATH, &config);

        let schema = output.schema.output.unwrap();
        let stringifier = output.stringifier.output.unwrap();
        let files = schema.iter().chain(stringifier.files().iter());
        for (name, text) in files {
            if let Err(e) = syn::parse_file(text) {
                panic!("{} does not parse: {}\n{}", name, e, text);
            }
        }
        syn::parse_file(stringifier.code()).unwrap();
        syn::parse_file(stringifier.types()).unwrap();
    }
}

#[test]
fn test_keyword_node_names_generate_valid_modules() {
    let source = r#"
grammar Keywords start Program;

token Word = /[a-z]+/;
token IfKw = "if";
token ReturnKw = "return";

union Program = If | Return;

deduction If = IfKw condition:Word;
deduction Return = ReturnKw value:Word;
deduction Match = match:Word;
"#;
    let output = compile_source(source, &CompilerConfig::default());
    assert!(output.success(), "{:?}", output.errors());

    let schema = output.schema.output.unwrap();
    assert!(schema.contains_key("nodes/if.rs"));
    assert!(schema.contains_key("nodes/return.rs"));
    assert!(schema["mod.rs"].contains("pub mod r#if ;"));
    assert!(schema["nodes/match.rs"].contains("pub r#match : Box < WordToken >"));

    let stringifier = output.stringifier.output.unwrap();
    assert!(stringifier.files().contains_key("nodes/return.rs"));
    for (name, text) in schema.iter().chain(stringifier.files().iter()) {
        if let Err(e) = syn::parse_file(text) {
            panic!("{} does not parse: {}\n{}", name, e, text);
        }
    }
}

#[test]
fn test_type_mapping_reaches_both_generators() {
    let mut config = CompilerConfig::default();
    config.schema.separate_files = false;
    config.naming.type_mapping.insert("Number".into(), "crate::num::Num".into());
    let output = compile_source(SIMPLE_MATH, &config);
    assert!(output.success(), "{:?}", output.errors());

    let schema = &output.schema.output.unwrap()["schema.rs"];
    assert!(!schema.contains("pub struct NumberToken"));
    assert!(schema.contains("Number (crate :: num :: Num)"));

    let code = output.stringifier.output.unwrap().code().to_string();
    assert!(code.contains("pub fn stringify_number (node : & crate :: num :: Num ,"));
    assert!(code.contains("pub type StringifyFn = fn (& Root , & StringifyOptions) -> String ;"));
}
