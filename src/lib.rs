#![doc = include_str!("../README.md")]

pub mod config;
pub mod parser;
pub mod pipeline;
pub mod stringify;

// Re-export the member crates so callers need a single dependency
pub use bnf_forge_codegen as codegen;
pub use bnf_forge_model as model;

pub use bnf_forge_codegen::{
    generate_grammar, generate_schema, generate_stringifier, GeneratedFiles, GeneratedGrammar,
    GeneratedStringifier, GenerationResult,
};
pub use bnf_forge_model::{load_model, parse_model, Model, ModelDocument};
pub use config::CompilerConfig;
pub use parser::{CompileError, CompiledParser, ParseError, ParserError, ParserManager};
pub use pipeline::{compile_model, compile_source, CompilerOutput};
pub use stringify::{Stringifier, StringifyError, StringifyOptions};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber filtered by `RUST_LOG`, once per process.
/// Does nothing when `RUST_LOG` is unset or a subscriber is already installed.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
