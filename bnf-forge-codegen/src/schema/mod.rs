//! Schema generator: Rust AST types for a model.
//!
//! Tokens become `{ value }` structs, deductions become structs with one boxed
//! field per named element, unions become enums. `AnyNode` covers every
//! concrete value type and `Root` aliases the start node's type. Nodes listed
//! in `type_mapping` are referenced through their mapped path and get no
//! declaration of their own.

mod plan;

pub use plan::*;

use crate::config::SchemaConfig;
use crate::naming::{ident, module_file, resolve_names, type_path, unknown_mappings};
use crate::render::{file_key, rust_file};
use crate::{check_model, naming_errors, GeneratedFiles, GenerationResult};
use bnf_forge_model::Model;
use proc_macro2::TokenStream;
use quote::quote;

/// Generates the schema files for `model`.
///
/// Separate mode emits `token_types.rs`, `union_types.rs`, `constants.rs`,
/// one `nodes/<name>.rs` per deduction and `mod.rs`; single mode emits
/// `schema.rs`.
#[tracing::instrument(level = "debug", skip_all, fields(model = %model.name))]
pub fn generate_schema(model: &Model, config: &SchemaConfig) -> GenerationResult<GeneratedFiles> {
    let plan = match plan_schema(model, config) {
        Ok(plan) => plan,
        Err(errors) => return GenerationResult::failed(errors, Vec::new()),
    };

    let mut warnings = unknown_mappings(model, &config.naming);
    if plan.tokens.is_empty() {
        warnings.push("no token nodes found".to_string());
    }
    if plan.unions.is_empty() {
        warnings.push("no union nodes found".to_string());
    }
    if plan.deductions.is_empty() {
        warnings.push("no deduction nodes found".to_string());
    }

    let emitter = SchemaEmitter { model, plan: &plan };
    let files = if config.separate_files {
        emitter.separate_files(&config.output_dir)
    } else {
        emitter.single_file(&config.output_dir)
    };

    tracing::debug!(files = files.len(), warnings = warnings.len(), "schema generated");
    GenerationResult::ok(files, warnings)
}

/// Validates `model`, resolves names and builds the declaration plan.
pub fn plan_schema(model: &Model, config: &SchemaConfig) -> Result<SchemaPlan, Vec<String>> {
    check_model(model)?;
    let names = resolve_names(model, &config.naming).map_err(naming_errors)?;
    Ok(SchemaPlan::build(model, &names, config.include_documentation))
}

struct SchemaEmitter<'a> {
    model: &'a Model,
    plan: &'a SchemaPlan,
}

impl<'a> SchemaEmitter<'a> {
    fn separate_files(&self, dir: &str) -> GeneratedFiles {
        let mut files = GeneratedFiles::new();
        files.insert(file_key(dir, "constants.rs"), rust_file(self.model, &[self.constants()]));
        files.insert(file_key(dir, "token_types.rs"), rust_file(self.model, &self.token_items()));

        let mut union_items = Vec::new();
        let unions: Vec<_> = self.plan.unions.iter().filter(|u| !u.mapped).collect();
        if !unions.is_empty() {
            union_items.push(quote! { use super::*; });
            union_items.extend(unions.into_iter().map(union_item));
        }
        files.insert(file_key(dir, "union_types.rs"), rust_file(self.model, &union_items));

        for decl in self.plan.deductions.iter().filter(|d| !d.mapped) {
            let key = file_key(dir, &format!("nodes/{}.rs", module_file(&decl.module)));
            let items = [
                quote! {
                    #[allow(unused_imports)]
                    use super::super::*;
                },
                deduction_item(decl),
            ];
            files.insert(key, rust_file(self.model, &items));
        }

        files.insert(file_key(dir, "mod.rs"), rust_file(self.model, &self.index_items()));
        files
    }

    fn single_file(&self, dir: &str) -> GeneratedFiles {
        let mut items = vec![self.constants()];
        items.extend(self.token_items());
        items.extend(self.plan.unions.iter().filter(|u| !u.mapped).map(union_item));
        items.extend(self.plan.deductions.iter().filter(|d| !d.mapped).map(deduction_item));
        items.push(self.root_alias());
        items.push(self.any_node());

        let mut files = GeneratedFiles::new();
        files.insert(file_key(dir, "schema.rs"), rust_file(self.model, &items));
        files
    }

    fn index_items(&self) -> Vec<TokenStream> {
        let modules: Vec<_> = self
            .plan
            .deductions
            .iter()
            .filter(|d| !d.mapped)
            .map(|d| ident(&d.module))
            .collect();
        let nodes = if modules.is_empty() {
            quote! {}
        } else {
            quote! {
                pub mod nodes {
                    #(
                        pub mod #modules;
                        pub use #modules::*;
                    )*
                }
                pub use nodes::*;
            }
        };

        vec![
            quote! {
                pub mod constants;
                pub mod token_types;
                pub mod union_types;

                pub use constants::*;
                pub use token_types::*;
                pub use union_types::*;
            },
            nodes,
            self.root_alias(),
            self.any_node(),
        ]
    }

    fn constants(&self) -> TokenStream {
        let plan = self.plan;
        let grammar = &plan.grammar;
        let version = &plan.version;
        let start = &plan.start;
        let tokens: Vec<_> = plan.tokens.iter().map(|t| &t.node).collect();
        let unions: Vec<_> = plan.unions.iter().map(|u| &u.node).collect();
        let deductions: Vec<_> = plan.deductions.iter().map(|d| &d.node).collect();
        let all = plan.node_types();

        quote! {
            pub const GRAMMAR_NAME: &str = #grammar;
            pub const GRAMMAR_VERSION: &str = #version;
            pub const START_NODE: &str = #start;
            pub const TOKEN_TYPES: &[&str] = &[#(#tokens),*];
            pub const UNION_TYPES: &[&str] = &[#(#unions),*];
            pub const DEDUCTION_TYPES: &[&str] = &[#(#deductions),*];
            pub const NODE_TYPES: &[&str] = &[#(#all),*];
        }
    }

    fn token_items(&self) -> Vec<TokenStream> {
        let tokens = &self.plan.tokens;
        let mut items: Vec<TokenStream> = tokens.iter().filter(|t| !t.mapped).map(token_item).collect();
        if !tokens.is_empty() {
            let nodes: Vec<_> = tokens.iter().map(|t| t.node.as_str()).collect();
            let variants: Vec<_> = tokens.iter().map(|t| ident(&t.variant)).collect();
            let types: Vec<_> = tokens.iter().map(|t| type_path(&t.type_name)).collect();
            items.push(sum_type(quote! { AnyToken }, &nodes, &variants, &types));
        }
        items
    }

    fn root_alias(&self) -> TokenStream {
        let root = type_path(&self.plan.root_type);
        quote! {
            pub type Root = #root;
        }
    }

    fn any_node(&self) -> TokenStream {
        let plan = self.plan;
        let nodes: Vec<_> = plan
            .tokens
            .iter()
            .map(|t| t.node.as_str())
            .chain(plan.deductions.iter().map(|d| d.node.as_str()))
            .collect();
        let variants: Vec<_> = plan
            .tokens
            .iter()
            .map(|t| ident(&t.variant))
            .chain(plan.deductions.iter().map(|d| ident(&d.variant)))
            .collect();
        let types: Vec<_> = plan
            .tokens
            .iter()
            .map(|t| type_path(&t.type_name))
            .chain(plan.deductions.iter().map(|d| type_path(&d.type_name)))
            .collect();
        sum_type(quote! { AnyNode }, &nodes, &variants, &types)
    }
}

fn doc_attr(doc: &Option<String>) -> TokenStream {
    match doc {
        Some(text) => {
            let lines = text.lines().map(|line| format!(" {}", line));
            quote! { #(#[doc = #lines])* }
        }
        None => quote! {},
    }
}

fn token_item(decl: &TokenDecl) -> TokenStream {
    let doc = doc_attr(&decl.doc);
    let ty = ident(&decl.type_name);
    let node = &decl.node;
    quote! {
        #doc
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct #ty {
            pub value: String,
        }

        impl #ty {
            pub const TYPE: &'static str = #node;

            pub fn new(value: impl Into<String>) -> Self {
                Self { value: value.into() }
            }

            pub fn node_type(&self) -> &'static str {
                Self::TYPE
            }
        }
    }
}

fn deduction_item(decl: &DeductionDecl) -> TokenStream {
    let doc = doc_attr(&decl.doc);
    let ty = ident(&decl.type_name);
    let node = &decl.node;
    let fields: Vec<_> = decl.fields.iter().map(|f| ident(&f.field)).collect();
    let field_types: Vec<_> = decl.fields.iter().map(|f| type_path(&f.type_name)).collect();
    quote! {
        #doc
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct #ty {
            #(pub #fields: Box<#field_types>,)*
        }

        impl #ty {
            pub const TYPE: &'static str = #node;

            pub fn node_type(&self) -> &'static str {
                Self::TYPE
            }
        }
    }
}

fn union_item(decl: &UnionDecl) -> TokenStream {
    let doc = doc_attr(&decl.doc);
    let ty = ident(&decl.type_name);
    let variants: Vec<_> = decl.variants.iter().map(|v| ident(&v.variant)).collect();
    let payloads: Vec<_> = decl
        .variants
        .iter()
        .map(|v| {
            let member = type_path(&v.type_name);
            if v.boxed {
                quote! { Box<#member> }
            } else {
                quote! { #member }
            }
        })
        .collect();
    let node_types = decl.variants.iter().map(|v| {
        let variant = ident(&v.variant);
        if v.nested {
            quote! { Self::#variant(ref inner) => inner.node_type() }
        } else {
            let node = &v.node;
            quote! { Self::#variant(_) => #node }
        }
    });
    let conversions = decl.variants.iter().map(|v| {
        let variant = ident(&v.variant);
        let member = type_path(&v.type_name);
        let wrap = if v.boxed {
            quote! { Box::new(node) }
        } else {
            quote! { node }
        };
        quote! {
            impl From<#member> for #ty {
                fn from(node: #member) -> Self {
                    Self::#variant(#wrap)
                }
            }
        }
    });

    quote! {
        #doc
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum #ty {
            #(#variants(#payloads),)*
        }

        impl #ty {
            pub fn node_type(&self) -> &'static str {
                match *self {
                    #(#node_types,)*
                }
            }
        }

        #(#conversions)*
    }
}

/// An enum over concrete types with `node_type()` and a `From` per variant.
fn sum_type(name: TokenStream, nodes: &[&str], variants: &[proc_macro2::Ident], types: &[TokenStream]) -> TokenStream {
    quote! {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum #name {
            #(#variants(#types),)*
        }

        impl #name {
            pub fn node_type(&self) -> &'static str {
                match *self {
                    #(Self::#variants(_) => #nodes,)*
                }
            }
        }

        #(
            impl From<#types> for #name {
                fn from(node: #types) -> Self {
                    Self::#variants(node)
                }
            }
        )*
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bnf_forge_model::Element;

    fn tiny() -> Model {
        Model::builder("Tiny", "Pair")
            .regex("Number", r"\d+")
            .literal("Comma", ",")
            .union("Value", ["Number", "Pair"])
            .deduction(
                "Pair",
                vec![
                    Element::named("Value", "first"),
                    Element::new("Comma"),
                    Element::named("Value", "second"),
                ],
            )
            .build()
    }

    #[test]
    fn test_plan_fields_skip_unnamed_elements() {
        let plan = plan_schema(&tiny(), &SchemaConfig::default()).unwrap();
        assert_eq!(plan.root_type, "PairNode");
        let pair = &plan.deductions[0];
        let fields: Vec<_> = pair.fields.iter().map(|f| (f.field.as_str(), f.type_name.as_str())).collect();
        assert_eq!(fields, [("first", "Value"), ("second", "Value")]);
        assert_eq!(plan.node_types(), ["Number", "Comma", "Value", "Pair"]);
    }

    #[test]
    fn test_separate_file_keys() {
        let config = SchemaConfig {
            output_dir: "ast".into(),
            ..SchemaConfig::default()
        };
        let result = generate_schema(&tiny(), &config);
        assert!(result.success);
        let keys: Vec<_> = result.output.unwrap().into_keys().collect();
        assert_eq!(
            keys,
            [
                "ast/constants.rs",
                "ast/token_types.rs",
                "ast/union_types.rs",
                "ast/nodes/pair.rs",
                "ast/mod.rs"
            ]
        );
    }

    #[test]
    fn test_union_members_boxed_only_for_unions() {
        let model = Model::builder("T", "Outer")
            .literal("A", "a")
            .union("Inner", ["A"])
            .union("Outer", ["Inner", "A"])
            .build();
        let plan = plan_schema(&model, &SchemaConfig::default()).unwrap();
        let outer = &plan.unions[1];
        let boxed: Vec<_> = outer.variants.iter().map(|v| v.boxed).collect();
        assert_eq!(boxed, [true, false]);
    }

    #[test]
    fn test_invalid_model_fails_without_output() {
        let model = Model::builder("T", "Missing").literal("A", "a").build();
        let result = generate_schema(&model, &SchemaConfig::default());
        assert!(!result.success);
        assert!(result.output.is_none());
        assert_eq!(result.errors, ["start node must exist in nodes (got 'Missing')"]);
    }

    #[test]
    fn test_documentation_toggle() {
        let config = SchemaConfig {
            separate_files: false,
            include_documentation: false,
            ..SchemaConfig::default()
        };
        let files = generate_schema(&tiny(), &config).output.unwrap();
        assert!(!files["schema.rs"].contains("doc"));

        let files = generate_schema(&tiny(), &SchemaConfig { separate_files: false, ..SchemaConfig::default() })
            .output
            .unwrap();
        assert!(files["schema.rs"].contains("# [doc = \" `Comma` token matching `\\\",\\\"`.\"]"));
    }

    #[test]
    fn test_mapped_nodes_use_their_path() {
        let mut config = SchemaConfig {
            separate_files: false,
            ..SchemaConfig::default()
        };
        config.naming.type_mapping.insert("Number".into(), "crate::num::Num".into());
        config.naming.type_mapping.insert("Missing".into(), "u8".into());

        let result = generate_schema(&tiny(), &config);
        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.warnings, ["type mapping for unknown node 'Missing' is ignored"]);
        let code = &result.output.unwrap()["schema.rs"];
        assert!(!code.contains("pub struct NumberToken"));
        assert!(code.contains("Number (crate :: num :: Num)"));
        assert!(code.contains("Self :: Number (_) => \"Number\""));
        syn::parse_file(code).unwrap();
    }

    #[test]
    fn test_keyword_deduction_gets_raw_module() {
        let model = Model::builder("K", "If")
            .literal("A", "a")
            .deduction("If", vec![Element::named("A", "then")])
            .build();
        let files = generate_schema(&model, &SchemaConfig::default()).output.unwrap();
        assert!(files.contains_key("nodes/if.rs"));
        assert!(files["mod.rs"].contains("pub mod r#if ;"));
        for text in files.values() {
            syn::parse_file(text).unwrap();
        }
    }
}
