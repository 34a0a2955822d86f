//! Pipeline configuration. Deserialises from a camelCase document; every
//! missing key takes its default.
//!
//! ```json
//! {
//!   "naming": { "tokenSuffix": "Tok", "functionPrefix": "print_" },
//!   "schema": { "separateFiles": false },
//!   "stringifier": { "indentStyle": "tabs" },
//!   "grammar": { "startRule": "program" }
//! }
//! ```
//!
//! `naming` is shared: the schema and the stringifier always see the same
//! type names and type mappings.

pub use bnf_forge_codegen::config::*;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    pub naming: NamingConfig,
    pub schema: SchemaConfig,
    pub stringifier: StringifierConfig,
    pub grammar: GrammarConfig,
}

impl CompilerConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// The schema section with the shared naming applied.
    pub fn schema_config(&self) -> SchemaConfig {
        SchemaConfig {
            naming: self.naming.clone(),
            ..self.schema.clone()
        }
    }

    /// The stringifier section with the shared naming applied.
    pub fn stringifier_config(&self) -> StringifierConfig {
        StringifierConfig {
            naming: self.naming.clone(),
            ..self.stringifier.clone()
        }
    }
}
