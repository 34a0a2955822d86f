//! Generator configuration. Every struct deserialises from camelCase keys
//! and fills missing fields from `Default`.
//!
//! Identifiers come from one [`NamingConfig`]. The schema and stringifier
//! configs each carry a copy for direct generator calls; it is not part of
//! their serialised form, and the pipeline hands both the same value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NamingConfig {
    pub token_suffix: String,
    pub node_suffix: String,
    pub function_prefix: String,
    /// Node name to a Rust type path used instead of a generated type. The
    /// type must implement `Debug`, `Clone`, `Eq`, `Hash` and `Display`.
    pub type_mapping: IndexMap<String, String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            token_suffix: "Token".to_string(),
            node_suffix: "Node".to_string(),
            function_prefix: "stringify_".to_string(),
            type_mapping: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaConfig {
    /// Prefix for every generated file key; empty means none.
    pub output_dir: String,
    pub separate_files: bool,
    pub include_documentation: bool,
    #[serde(skip)]
    pub naming: NamingConfig,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            output_dir: String::new(),
            separate_files: true,
            include_documentation: true,
            naming: NamingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Spaces(2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StringifierConfig {
    /// Must equal the schema's naming, or the two artifacts disagree.
    #[serde(skip)]
    pub naming: NamingConfig,
    pub indent_style: IndentStyle,
    pub include_whitespace: bool,
    pub include_formatting: bool,
    /// Path the generated code imports schema types from; empty for none.
    pub schema_path: String,
    pub separate_files: bool,
}

impl Default for StringifierConfig {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            indent_style: IndentStyle::default(),
            include_whitespace: true,
            include_formatting: true,
            schema_path: "super::schema".to_string(),
            separate_files: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrammarConfig {
    /// Name of the generated entry rule wrapping the model's start node.
    pub start_rule: String,
    pub include_comments: bool,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            start_rule: "start".to_string(),
            include_comments: true,
        }
    }
}
