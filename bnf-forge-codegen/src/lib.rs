//! # bnf-forge-codegen
//!
//! Generators turning a validated [`Model`] into three aligned artifacts:
//!
//! - **[schema]**: Rust AST types (`generate_schema`).
//! - **[stringifier]**: Rust AST-to-text functions (`generate_stringifier`).
//! - **[grammar]**: a pest grammar plus rule statistics, including the
//!   left-recursive rules (`generate_grammar`).
//!
//! The generators are independent of each other; they share only the model and
//! the [naming] rules. None of them returns `Err`: every outcome, including
//! validation failures, is folded into a [`GenerationResult`].

pub mod config;
pub mod grammar;
pub mod naming;
pub mod schema;
pub mod stringifier;

mod render;

pub use config::{GrammarConfig, IndentStyle, NamingConfig, SchemaConfig, StringifierConfig};
pub use grammar::{generate_grammar, GeneratedGrammar, GrammarRule, GrammarStats, RuleShape};
pub use naming::{resolve_names, NamingError, ResolvedNames};
pub use schema::{generate_schema, SchemaPlan};
pub use stringifier::{generate_stringifier, GeneratedStringifier};

use bnf_forge_model::{validator, Model};
use indexmap::IndexMap;

/// Logical file name → generated source text, in emission order.
pub type GeneratedFiles = IndexMap<String, String>;

/// Outcome of one generator run. `output` is present exactly when `success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult<T> {
    pub success: bool,
    pub output: Option<T>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl<T> GenerationResult<T> {
    pub fn ok(output: T, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            output: Some(output),
            errors: Vec::new(),
            warnings,
        }
    }

    pub fn failed(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            output: None,
            errors,
            warnings,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GenerationResult<U> {
        GenerationResult {
            success: self.success,
            output: self.output.map(f),
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    pub fn output(&self) -> Option<&T> {
        self.output.as_ref()
    }
}

/// Validation every generator runs first; generation proceeds only on `Ok`.
fn check_model(model: &Model) -> Result<(), Vec<String>> {
    let errors = validator::validate(model);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.iter().map(ToString::to_string).collect())
    }
}

fn naming_errors(errors: Vec<NamingError>) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}
