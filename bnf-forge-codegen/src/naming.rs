//! Identifier derivation shared by every generator.
//!
//! All names are pure functions of `(node name, kind, config)`, so the schema
//! and the stringifier agree on type names without seeing each other's output.

use crate::config::NamingConfig;
use bnf_forge_model::{Model, Node, NodeKind};
use indexmap::{IndexMap, IndexSet};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, ToTokens};
use thiserror::Error;

/// Type names emitted by the generators themselves, or used unqualified by
/// the generated code.
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "Root",
    "AnyNode",
    "AnyToken",
    "StringifyOptions",
    "FormattingOptions",
    "StringifyFn",
    "String",
    "Box",
    "Vec",
    "Option",
    "Result",
    "Self",
    "From",
    "Into",
    "Default",
];

/// Function names emitted by the stringifier generator.
pub const RESERVED_FUNCTION_NAMES: &[&str] = &[
    "stringify",
    "stringify_with",
    "stringify_node",
    "get_indentation",
    "separator",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("naming collision: '{first}' and '{second}' both map to '{identifier}'")]
    Collision {
        identifier: String,
        first: String,
        second: String,
    },
    #[error("generated name '{identifier}' for '{node}' collides with a reserved name")]
    Reserved { identifier: String, node: String },
    #[error("generated name '{identifier}' for '{node}' is not a valid Rust identifier")]
    InvalidIdentifier { identifier: String, node: String },
    #[error("fields '{first}' and '{second}' of '{owner}' both map to '{identifier}'")]
    FieldCollision {
        identifier: String,
        first: String,
        second: String,
        owner: String,
    },
    #[error("union '{owner}' has two members mapping to variant '{variant}'")]
    DuplicateVariant { variant: String, owner: String },
    #[error("invalid type mapping for '{node}': '{path}'")]
    InvalidTypeMapping { node: String, path: String },
}

/// `binary_expression` / `binaryExpression` / `BinaryExpression` → `BinaryExpression`.
pub fn to_pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;
    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `BinaryExpression` → `binary_expression`, `HTTPRequest` → `http_request`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Generated type name for a node of the given kind.
pub fn type_name(name: &str, kind: NodeKind, config: &NamingConfig) -> String {
    let base = to_pascal_case(name);
    match kind {
        NodeKind::Token => format!("{}{}", base, config.token_suffix),
        NodeKind::Deduction => format!("{}{}", base, config.node_suffix),
        NodeKind::Union => base,
    }
}

/// Generated stringify function name for a node.
pub fn function_name(name: &str, config: &NamingConfig) -> String {
    format!("{}{}", config.function_prefix, to_snake_case(name))
}

/// Enum variant used for `name` inside `AnyNode`, `AnyToken` and union enums.
pub fn variant_name(name: &str) -> String {
    to_pascal_case(name)
}

/// Module for a node's own file; keywords become raw identifiers.
pub fn module_name(name: &str) -> Result<String, NamingError> {
    snake_ident(name)
}

/// Rust field name for a deduction property; keywords become raw identifiers.
pub fn field_name(property: &str) -> Result<String, NamingError> {
    snake_ident(property)
}

fn snake_ident(source: &str) -> Result<String, NamingError> {
    let snake = to_snake_case(source);
    if is_rust_ident(&snake) {
        return Ok(snake);
    }
    // `self`, `Self`, `super`, `crate` and `_` cannot be raw identifiers.
    let raw = format!("r#{}", snake);
    if matches!(snake.as_str(), "self" | "Self" | "super" | "crate" | "_") || !is_rust_ident(&raw) {
        return Err(NamingError::InvalidIdentifier {
            identifier: snake,
            node: source.to_string(),
        });
    }
    Ok(raw)
}

/// File stem for a module name: `r#if` lives in `if.rs`.
pub fn module_file(module: &str) -> &str {
    module.strip_prefix("r#").unwrap_or(module)
}

/// Whether `s` parses as a (possibly raw) Rust identifier that is not a keyword.
pub fn is_rust_ident(s: &str) -> bool {
    syn::parse_str::<syn::Ident>(s).is_ok()
}

/// Builds an identifier from a validated name, honouring the `r#` prefix.
pub fn ident(name: &str) -> Ident {
    format_ident!("{}", name)
}

/// Tokens for a resolved type name, which is an identifier or, for mapped
/// nodes, a path.
pub fn type_path(name: &str) -> TokenStream {
    match syn::parse_str::<syn::Path>(name) {
        Ok(path) => path.into_token_stream(),
        Err(_) => ident(name).into_token_stream(),
    }
}

/// Warnings for `type_mapping` entries naming no node of `model`.
pub fn unknown_mappings(model: &Model, config: &NamingConfig) -> Vec<String> {
    config
        .type_mapping
        .keys()
        .filter(|node| !model.nodes.contains_key(*node))
        .map(|node| format!("type mapping for unknown node '{}' is ignored", node))
        .collect()
}

/// Every identifier the generators need for one model, resolved up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedNames {
    types: IndexMap<String, String>,
    functions: IndexMap<String, String>,
    variants: IndexMap<String, String>,
    modules: IndexMap<String, String>,
    fields: IndexMap<String, String>,
    mapped: IndexSet<String>,
}

impl ResolvedNames {
    /// The generated type name, or the mapped type path.
    pub fn type_name<'a>(&'a self, node: &'a str) -> &'a str {
        self.types.get(node).map(String::as_str).unwrap_or(node)
    }

    pub fn function_name<'a>(&'a self, node: &'a str) -> &'a str {
        self.functions.get(node).map(String::as_str).unwrap_or(node)
    }

    pub fn variant_name<'a>(&'a self, node: &'a str) -> &'a str {
        self.variants.get(node).map(String::as_str).unwrap_or(node)
    }

    pub fn module_name<'a>(&'a self, node: &'a str) -> &'a str {
        self.modules.get(node).map(String::as_str).unwrap_or(node)
    }

    /// Whether `node` uses a type from `type_mapping` instead of a generated one.
    pub fn is_mapped(&self, node: &str) -> bool {
        self.mapped.contains(node)
    }

    /// Rust field for a property, keyed by the property name itself.
    pub fn field_name<'a>(&'a self, property: &'a str) -> &'a str {
        self.fields.get(property).map(String::as_str).unwrap_or(property)
    }

    pub fn type_tokens(&self, node: &str) -> TokenStream {
        type_path(self.type_name(node))
    }

    pub fn function_ident(&self, node: &str) -> Ident {
        ident(self.function_name(node))
    }

    pub fn variant_ident(&self, node: &str) -> Ident {
        ident(self.variant_name(node))
    }

    pub fn module_ident(&self, node: &str) -> Ident {
        ident(self.module_name(node))
    }

    pub fn field_ident(&self, property: &str) -> Ident {
        ident(self.field_name(property))
    }

    /// Node name → generated type name, in model order.
    pub fn types(&self) -> &IndexMap<String, String> {
        &self.types
    }

    pub fn functions(&self) -> &IndexMap<String, String> {
        &self.functions
    }
}

/// Resolves every generated identifier for `model`, reporting all collisions,
/// reserved-name clashes and invalid identifiers at once.
#[tracing::instrument(level = "debug", skip_all, fields(model = %model.name))]
pub fn resolve_names(model: &Model, config: &NamingConfig) -> Result<ResolvedNames, Vec<NamingError>> {
    let mut errors = Vec::new();
    let mut names = ResolvedNames::default();

    let mut type_owners: IndexMap<String, String> = IndexMap::new();
    let mut function_owners: IndexMap<String, String> = IndexMap::new();
    let mut variant_owners: IndexMap<String, String> = IndexMap::new();
    let mut module_owners: IndexMap<String, String> = IndexMap::new();

    for (name, node) in &model.nodes {
        let kind = node.kind();
        let func = function_name(name, config);
        let variant = variant_name(name);

        let ty = match config.type_mapping.get(name) {
            Some(path) => {
                let path = path.trim().to_string();
                if syn::parse_str::<syn::Path>(&path).is_err() {
                    errors.push(NamingError::InvalidTypeMapping {
                        node: name.clone(),
                        path: path.clone(),
                    });
                }
                // Two nodes sharing one type would give `AnyNode` two `From` impls.
                if let Some(first) = type_owners.get(&path) {
                    errors.push(NamingError::Collision {
                        identifier: path.clone(),
                        first: first.clone(),
                        second: name.clone(),
                    });
                } else {
                    type_owners.insert(path.clone(), name.clone());
                }
                names.mapped.insert(name.clone());
                path
            }
            None => {
                let ty = type_name(name, kind, config);
                check_identifier(&ty, name, RESERVED_TYPE_NAMES, &mut type_owners, &mut errors);
                ty
            }
        };
        check_identifier(&func, name, RESERVED_FUNCTION_NAMES, &mut function_owners, &mut errors);
        // A union's variant equals its generated type name, checked above.
        if kind != NodeKind::Union || names.is_mapped(name) {
            check_identifier(&variant, name, &[], &mut variant_owners, &mut errors);
        }
        match module_name(name) {
            Ok(module) => {
                check_identifier(&module, name, &[], &mut module_owners, &mut errors);
                names.modules.insert(name.clone(), module);
            }
            Err(e) => errors.push(e),
        }

        tracing::trace!(node = %name, %kind, ty = %ty, function = %func, "names resolved");
        names.types.insert(name.clone(), ty);
        names.functions.insert(name.clone(), func);
        names.variants.insert(name.clone(), variant);

        if let Node::Union(u) = node {
            let mut seen = IndexSet::new();
            for member in &u.members {
                let variant = variant_name(member);
                if !seen.insert(variant.clone()) {
                    errors.push(NamingError::DuplicateVariant {
                        variant,
                        owner: name.clone(),
                    });
                }
            }
        }

        if let Node::Deduction(d) = node {
            let mut field_owners: IndexMap<String, String> = IndexMap::new();
            for property in d.elements.iter().filter_map(|e| e.property.as_deref()) {
                match field_name(property) {
                    Ok(field) => {
                        if let Some(first) = field_owners.get(&field) {
                            if first != property {
                                errors.push(NamingError::FieldCollision {
                                    identifier: field.clone(),
                                    first: first.clone(),
                                    second: property.to_string(),
                                    owner: name.clone(),
                                });
                            }
                        } else {
                            field_owners.insert(field.clone(), property.to_string());
                        }
                        names.fields.insert(property.to_string(), field);
                    }
                    Err(e) => errors.push(e),
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(names)
    } else {
        tracing::debug!(errors = errors.len(), "naming failed");
        Err(errors)
    }
}

fn check_identifier(
    identifier: &str,
    node: &str,
    reserved: &[&str],
    owners: &mut IndexMap<String, String>,
    errors: &mut Vec<NamingError>,
) {
    if !is_rust_ident(identifier) {
        errors.push(NamingError::InvalidIdentifier {
            identifier: identifier.to_string(),
            node: node.to_string(),
        });
    } else if reserved.contains(&identifier) {
        errors.push(NamingError::Reserved {
            identifier: identifier.to_string(),
            node: node.to_string(),
        });
    }

    if let Some(first) = owners.get(identifier) {
        errors.push(NamingError::Collision {
            identifier: identifier.to_string(),
            first: first.clone(),
            second: node.to_string(),
        });
    } else {
        owners.insert(identifier.to_string(), node.to_string());
    }
}
