//! Parser manager: compiles generated pest grammars and parses text into AST
//! values.
//!
//! Compilation (grammar parsing, validation and optimisation by `pest_meta`)
//! is cached by the SHA-256 of the grammar text; execution runs on `pest_vm`.
//! The cache is a `DashMap`, so lookups, inserts and parses may happen from
//! any number of threads.

mod error;

pub use error::{CompileError, ParseError, ParserError};

use bnf_forge_codegen::{GeneratedGrammar, RuleShape};
use dashmap::DashMap;
use pest::iterators::Pair;
use pest_vm::Vm;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type GrammarKey = [u8; 32];

/// A grammar that passed `pest_meta`, ready to parse input. The VM is built
/// once and shared by every parse.
pub struct CompiledParser {
    key: GrammarKey,
    start_rule: String,
    vm: Vm,
    shapes: HashMap<String, RuleShape>,
}

impl fmt::Debug for CompiledParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledParser")
            .field("start_rule", &self.start_rule)
            .field("rules", &self.shapes.len())
            .finish_non_exhaustive()
    }
}

impl CompiledParser {
    pub fn key(&self) -> &GrammarKey {
        &self.key
    }

    pub fn start_rule(&self) -> &str {
        &self.start_rule
    }

    /// Parses `input` from the start rule into `{ "type": Name, ...fields }`.
    #[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        let mut pairs = self
            .vm
            .parse(&self.start_rule, input)
            .map_err(|e| ParseError::from_pest(&e))?;

        let start = pairs.next().ok_or_else(|| ParseError {
            offset: 0,
            line: 1,
            column: 1,
            message: "empty parse tree".to_string(),
        })?;
        let root = start
            .into_inner()
            .find(|pair| pair.as_rule() != "EOI")
            .ok_or_else(|| ParseError {
                offset: 0,
                line: 1,
                column: 1,
                message: "start rule produced no node".to_string(),
            })?;
        self.build(root)
    }

    fn build(&self, pair: Pair<'_, &str>) -> Result<Value, ParseError> {
        let name = pair.as_rule();
        let mut node = Map::new();
        node.insert("type".to_string(), Value::String(name.to_string()));

        match self.shapes.get(name) {
            Some(RuleShape::Token) => {
                node.insert("value".to_string(), Value::String(pair.as_str().to_string()));
            }
            Some(RuleShape::Sequence { fields }) => {
                let children: Vec<_> = pair.clone().into_inner().collect();
                if children.len() != fields.len() {
                    return Err(tree_error(
                        &pair,
                        format!(
                            "rule '{}' produced {} children, expected {}",
                            name,
                            children.len(),
                            fields.len()
                        ),
                    ));
                }
                for (field, child) in fields.iter().zip(children) {
                    if let Some(property) = field {
                        node.insert(property.clone(), self.build(child)?);
                    }
                }
            }
            Some(RuleShape::Choice { .. }) => {
                // Unions are silent; a visible one still wraps a single node.
                let child = pair
                    .clone()
                    .into_inner()
                    .next()
                    .ok_or_else(|| tree_error(&pair, format!("rule '{}' matched nothing", name)))?;
                return self.build(child);
            }
            None => return Err(tree_error(&pair, format!("unknown rule '{}'", name))),
        }

        Ok(Value::Object(node))
    }
}

fn tree_error(pair: &Pair<'_, &str>, message: String) -> ParseError {
    let (line, column) = pair.line_col();
    ParseError {
        offset: pair.as_span().start(),
        line,
        column,
        message,
    }
}

/// Shared cache of compiled grammars.
#[derive(Debug, Default)]
pub struct ParserManager {
    cache: DashMap<GrammarKey, Arc<CompiledParser>>,
}

impl ParserManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `grammar`, or returns the cached parser for identical text.
    #[tracing::instrument(level = "debug", skip_all, fields(start = %grammar.start_rule))]
    pub fn compile(&self, grammar: &GeneratedGrammar) -> Result<Arc<CompiledParser>, CompileError> {
        let key = grammar_key(&grammar.text);
        if let Some(parser) = self.cache.get(&key) {
            tracing::trace!("grammar cache hit");
            return Ok(Arc::clone(parser.value()));
        }

        let (_, rules) = pest_meta::parse_and_optimize(&grammar.text).map_err(|errors| CompileError {
            messages: errors.iter().map(ToString::to_string).collect(),
        })?;
        let shapes = grammar
            .rules
            .iter()
            .map(|rule| (rule.name.clone(), rule.shape.clone()))
            .collect();
        let parser = Arc::new(CompiledParser {
            key,
            start_rule: grammar.start_rule.clone(),
            vm: Vm::new(rules),
            shapes,
        });

        tracing::debug!(rules = grammar.rules.len(), "grammar compiled");
        // A concurrent compile of the same text may have won; keep the first.
        Ok(Arc::clone(self.cache.entry(key).or_insert(parser).value()))
    }

    pub fn parse(&self, parser: &CompiledParser, input: &str) -> Result<Value, ParseError> {
        parser.parse(input)
    }

    /// Compiles through the cache, then parses.
    pub fn parse_with(&self, grammar: &GeneratedGrammar, input: &str) -> Result<Value, ParserError> {
        let parser = self.compile(grammar)?;
        Ok(parser.parse(input)?)
    }

    pub fn is_cached(&self, grammar_text: &str) -> bool {
        self.cache.contains_key(&grammar_key(grammar_text))
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

pub fn grammar_key(text: &str) -> GrammarKey {
    Sha256::digest(text.as_bytes()).into()
}
