//! Stringifier generator: one Rust function per node turning AST values back
//! into text.
//!
//! Tokens return their stored value, deductions join the text of their
//! elements with the configured separator, unions match on their own enum.
//! `stringify_node` dispatches over `AnyNode` and is exhaustive by
//! construction. Nodes with a mapped type are printed through `Display`.

use crate::config::StringifierConfig;
use crate::naming::{ident, module_file, resolve_names, unknown_mappings, ResolvedNames};
use crate::render::rust_file;
use crate::{check_model, naming_errors, GeneratedFiles, GenerationResult};
use bnf_forge_model::{Model, Node, NodeKind};
use indexmap::IndexMap;
use proc_macro2::TokenStream;
use quote::quote;

/// Generated stringifier source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStringifier {
    files: GeneratedFiles,
    code: String,
    types: String,
}

impl GeneratedStringifier {
    /// Files as configured (`separate_files`).
    pub fn files(&self) -> &GeneratedFiles {
        &self.files
    }

    /// The whole stringifier as one self-contained module.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Only the option types and the `StringifyFn` alias.
    pub fn types(&self) -> &str {
        &self.types
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(model = %model.name))]
pub fn generate_stringifier(
    model: &Model,
    config: &StringifierConfig,
) -> GenerationResult<GeneratedStringifier> {
    if let Err(errors) = check_model(model) {
        return GenerationResult::failed(errors, Vec::new());
    }
    let names = match resolve_names(model, &config.naming) {
        Ok(names) => names,
        Err(errors) => return GenerationResult::failed(naming_errors(errors), Vec::new()),
    };

    let mut warnings = unknown_mappings(model, &config.naming);

    let schema_path = if config.schema_path.is_empty() {
        None
    } else {
        match syn::parse_str::<syn::Path>(&config.schema_path) {
            Ok(path) => Some(path),
            Err(_) => {
                let errors = vec![format!("invalid schema path '{}'", config.schema_path)];
                return GenerationResult::failed(errors, warnings);
            }
        }
    };

    let emitter = StringifierEmitter {
        model,
        names: &names,
        config,
        schema_path,
    };
    let functions: IndexMap<&str, TokenStream> = model
        .nodes
        .iter()
        .map(|(name, node)| (name.as_str(), emitter.node_function(name, node, &mut warnings)))
        .collect();

    let types = rust_file(model, &emitter.type_items());
    let code = rust_file(model, &emitter.single_file_items(&functions));
    let files = if config.separate_files {
        emitter.separate_files(&functions, types.clone())
    } else {
        let mut files = GeneratedFiles::new();
        files.insert("stringifier.rs".to_string(), code.clone());
        files
    };

    tracing::debug!(functions = functions.len(), files = files.len(), "stringifier generated");
    GenerationResult::ok(GeneratedStringifier { files, code, types }, warnings)
}

struct StringifierEmitter<'a> {
    model: &'a Model,
    names: &'a ResolvedNames,
    config: &'a StringifierConfig,
    schema_path: Option<syn::Path>,
}

impl<'a> StringifierEmitter<'a> {
    fn schema_import(&self) -> TokenStream {
        match &self.schema_path {
            Some(path) => quote! { use #path::*; },
            None => quote! {},
        }
    }

    fn type_items(&self) -> Vec<TokenStream> {
        let indent_string = self.config.indent_style.unit();
        let include_whitespace = self.config.include_whitespace;
        let format = self.config.include_formatting;

        vec![
            quote! {
                #[derive(Debug, Clone, PartialEq, Eq)]
                pub struct FormattingOptions {
                    pub newline_after: bool,
                    pub space_around: bool,
                    pub compact: bool,
                }

                impl Default for FormattingOptions {
                    fn default() -> Self {
                        Self {
                            newline_after: false,
                            space_around: true,
                            compact: false,
                        }
                    }
                }
            },
            quote! {
                #[derive(Debug, Clone, PartialEq, Eq)]
                pub struct StringifyOptions {
                    pub indent: usize,
                    pub indent_string: String,
                    pub include_whitespace: bool,
                    pub format: bool,
                    pub formatting: FormattingOptions,
                }

                impl Default for StringifyOptions {
                    fn default() -> Self {
                        Self {
                            indent: 0,
                            indent_string: String::from(#indent_string),
                            include_whitespace: #include_whitespace,
                            format: #format,
                            formatting: FormattingOptions::default(),
                        }
                    }
                }
            },
            quote! {
                pub type StringifyFn = fn(&Root, &StringifyOptions) -> String;
            },
        ]
    }

    fn helper_items(&self) -> Vec<TokenStream> {
        let start = self.names.function_ident(&self.model.start);
        vec![
            quote! {
                pub fn get_indentation(options: &StringifyOptions) -> String {
                    options.indent_string.repeat(options.indent)
                }

                pub fn separator(options: &StringifyOptions) -> &'static str {
                    if options.format && options.include_whitespace && !options.formatting.compact {
                        " "
                    } else {
                        ""
                    }
                }
            },
            quote! {
                pub fn stringify(root: &Root) -> String {
                    stringify_with(root, &StringifyOptions::default())
                }

                pub fn stringify_with(root: &Root, options: &StringifyOptions) -> String {
                    #start(root, options)
                }
            },
            self.dispatcher(),
        ]
    }

    fn dispatcher(&self) -> TokenStream {
        let concrete: Vec<&String> = self
            .model
            .nodes
            .iter()
            .filter(|(_, node)| node.kind() == NodeKind::Token)
            .chain(self.model.nodes.iter().filter(|(_, node)| node.kind() == NodeKind::Deduction))
            .map(|(name, _)| name)
            .collect();
        let variants = concrete.iter().map(|name| self.names.variant_ident(name));
        let functions = concrete.iter().map(|name| self.names.function_ident(name));
        quote! {
            pub fn stringify_node(node: &AnyNode, options: &StringifyOptions) -> String {
                match *node {
                    #(AnyNode::#variants(ref inner) => #functions(inner, options),)*
                }
            }
        }
    }

    fn node_function(&self, name: &str, node: &Node, warnings: &mut Vec<String>) -> TokenStream {
        let func = self.names.function_ident(name);
        let ty = self.names.type_tokens(name);
        tracing::trace!(node = name, function = %func, "emitting stringify function");

        if self.names.is_mapped(name) {
            return quote! {
                pub fn #func(node: &#ty, _options: &StringifyOptions) -> String {
                    node.to_string()
                }
            };
        }

        match node {
            Node::Token(_) => quote! {
                pub fn #func(node: &#ty, _options: &StringifyOptions) -> String {
                    node.value.clone()
                }
            },
            Node::Deduction(d) => {
                let mut parts = Vec::new();
                for element in &d.elements {
                    match &element.property {
                        Some(property) => {
                            let field = self.names.field_ident(property);
                            let callee = self.names.function_ident(&element.node_ref);
                            parts.push(quote! { #callee(&node.#field, options) });
                        }
                        None => match self.model.literal_of(&element.node_ref) {
                            Some("") => {}
                            Some(text) => parts.push(quote! { String::from(#text) }),
                            None => warnings.push(format!(
                                "element '{}' in '{}' has no property and no fixed text; it is not stringified",
                                element.node_ref, name
                            )),
                        },
                    }
                }
                let param = if d.elements.iter().any(|e| e.property.is_some()) {
                    ident("node")
                } else {
                    ident("_node")
                };
                quote! {
                    pub fn #func(#param: &#ty, options: &StringifyOptions) -> String {
                        let parts: Vec<String> = vec![#(#parts),*];
                        parts.join(separator(options))
                    }
                }
            }
            Node::Union(u) => {
                let variants = u.members.iter().map(|m| self.names.variant_ident(m));
                let callees = u.members.iter().map(|m| self.names.function_ident(m));
                quote! {
                    pub fn #func(node: &#ty, options: &StringifyOptions) -> String {
                        match *node {
                            #(#ty::#variants(ref inner) => #callees(inner, options),)*
                        }
                    }
                }
            }
        }
    }

    fn single_file_items(&self, functions: &IndexMap<&str, TokenStream>) -> Vec<TokenStream> {
        let mut items = vec![self.schema_import()];
        items.extend(self.type_items());
        items.extend(self.helper_items());
        items.extend(functions.values().cloned());
        items
    }

    fn separate_files(
        &self,
        functions: &IndexMap<&str, TokenStream>,
        types: String,
    ) -> GeneratedFiles {
        let mut files = GeneratedFiles::new();
        let types_import = quote! {
            #[allow(unused_imports)]
            use super::*;
        };
        let types = match self.schema_path {
            // `types.rs` refers to `Root`, so it needs the parent's import.
            Some(_) => {
                let mut items = vec![types_import];
                items.extend(self.type_items());
                rust_file(self.model, &items)
            }
            None => types,
        };
        files.insert("types.rs".to_string(), types);

        let modules: Vec<_> = functions.keys().map(|name| self.names.module_ident(name)).collect();
        for (name, function) in functions {
            let items = [
                quote! {
                    #[allow(unused_imports)]
                    use super::super::*;
                },
                function.clone(),
            ];
            files.insert(
                format!("nodes/{}.rs", module_file(self.names.module_name(name))),
                rust_file(self.model, &items),
            );
        }

        let mut index = vec![
            self.schema_import(),
            quote! {
                pub mod types;
                pub use types::*;

                pub mod nodes {
                    #(
                        pub mod #modules;
                        pub use #modules::*;
                    )*
                }
                pub use nodes::*;
            },
        ];
        index.extend(self.helper_items());
        files.insert("mod.rs".to_string(), rust_file(self.model, &index));
        files
    }
}
