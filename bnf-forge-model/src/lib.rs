//! # bnf-forge-model
//!
//! The shared grammar model used by every bnf-forge generator, together with
//! loading, validation and analysis.
//!
//! ## Pipeline
//!
//! 1. **[parser]** / **[model::document]**: Load a model from the text notation
//!    or from an already-structured document.
//! 2. **[validator]**: Reject models with structural errors.
//! 3. **[analysis]**: Reachability, nullability and left recursion for the
//!    generators.

pub mod analysis;
pub mod error;
pub mod model;
pub mod parser;
pub mod validator;

pub use error::{ModelError, Result, ValidationError};
pub use model::*;
pub use parser::parse_model;

/// Loads a model from its text notation and validates it.
///
/// Structural errors are returned as a list; a model that passes may still
/// carry warnings, see [`validator::validation_warnings`].
pub fn load_model(source: &str) -> std::result::Result<Model, Vec<String>> {
    let model = parse_model(source).map_err(|e| vec![e.to_string()])?;
    let errors = validator::validate(&model);
    if errors.is_empty() {
        Ok(model)
    } else {
        Err(errors.iter().map(ToString::to_string).collect())
    }
}
