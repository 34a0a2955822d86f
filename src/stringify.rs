//! Runtime stringifier: turns AST values (as produced by the parser manager)
//! back into text by interpreting the model, with the same rules the
//! generated stringifier compiles in.

use bnf_forge_codegen::StringifierConfig;
use bnf_forge_model::{analysis, Model, Node};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StringifyError {
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),
    #[error("value has no 'type' discriminant")]
    MissingType,
    #[error("node '{node}' is missing field '{property}'")]
    MissingField { node: String, property: String },
    #[error("field '{property}' of '{node}' holds a '{found}', expected {expected}")]
    TypeMismatch {
        node: String,
        property: String,
        found: String,
        expected: String,
    },
    #[error("token '{0}' has no string 'value'")]
    MissingValue(String),
}

pub type Result<T> = std::result::Result<T, StringifyError>;

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
        Self::from_config(&StringifierConfig::default())
    }
}

impl StringifyOptions {
    /// The defaults a stringifier generated with `config` would use.
    pub fn from_config(config: &StringifierConfig) -> Self {
        Self {
            indent: 0,
            indent_string: config.indent_style.unit(),
            include_whitespace: config.include_whitespace,
            format: config.include_formatting,
            formatting: FormattingOptions::default(),
        }
    }

    /// Text placed between the elements of a deduction.
    pub fn separator(&self) -> &'static str {
        if self.format && self.include_whitespace && !self.formatting.compact {
            " "
        } else {
            ""
        }
    }

    pub fn indentation(&self) -> String {
        self.indent_string.repeat(self.indent)
    }
}

pub struct Stringifier<'m> {
    model: &'m Model,
    options: StringifyOptions,
    concrete: IndexMap<&'m str, IndexSet<String>>,
}

impl<'m> Stringifier<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self::with_options(model, StringifyOptions::default())
    }

    pub fn with_options(model: &'m Model, options: StringifyOptions) -> Self {
        let concrete = model
            .nodes
            .keys()
            .map(|name| (name.as_str(), analysis::concrete_types(model, name)))
            .collect();
        Self {
            model,
            options,
            concrete,
        }
    }

    pub fn options(&self) -> &StringifyOptions {
        &self.options
    }

    /// Stringifies a value of any token or deduction type.
    pub fn stringify(&self, value: &Value) -> Result<String> {
        let node_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(StringifyError::MissingType)?;

        match self.model.node(node_type) {
            Some(Node::Token(_)) => value
                .get("value")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| StringifyError::MissingValue(node_type.to_string())),
            Some(Node::Deduction(d)) => {
                let mut parts = Vec::with_capacity(d.elements.len());
                for element in &d.elements {
                    match &element.property {
                        Some(property) => {
                            let field = value.get(property).ok_or_else(|| StringifyError::MissingField {
                                node: node_type.to_string(),
                                property: property.clone(),
                            })?;
                            self.check_type(node_type, property, &element.node_ref, field)?;
                            parts.push(self.stringify(field)?);
                        }
                        None => match self.model.literal_of(&element.node_ref) {
                            Some("") | None => {}
                            Some(text) => parts.push(text.to_string()),
                        },
                    }
                }
                Ok(parts.join(self.options.separator()))
            }
            // A value never carries a union type; unions only type positions.
            Some(Node::Union(_)) | None => Err(StringifyError::UnknownNodeType(node_type.to_string())),
        }
    }

    fn check_type(&self, node: &str, property: &str, expected: &str, field: &Value) -> Result<()> {
        let found = field
            .get("type")
            .and_then(Value::as_str)
            .ok_or(StringifyError::MissingType)?;
        let allowed = self.concrete.get(expected);
        if allowed.is_some_and(|set| set.contains(found)) {
            return Ok(());
        }
        if self.model.node(found).is_none() {
            return Err(StringifyError::UnknownNodeType(found.to_string()));
        }
        Err(StringifyError::TypeMismatch {
            node: node.to_string(),
            property: property.to_string(),
            found: found.to_string(),
            expected: expected.to_string(),
        })
    }
}
