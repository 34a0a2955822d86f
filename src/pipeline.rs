//! The compile pipeline: validate once, then run the three generators in
//! parallel over the same model.

use crate::config::CompilerConfig;
use bnf_forge_codegen::{
    generate_grammar, generate_schema, generate_stringifier, GeneratedFiles, GeneratedGrammar,
    GeneratedStringifier, GenerationResult,
};
use bnf_forge_model::{parse_model, validator, Model};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOutput {
    pub schema: GenerationResult<GeneratedFiles>,
    pub stringifier: GenerationResult<GeneratedStringifier>,
    pub grammar: GenerationResult<GeneratedGrammar>,
}

impl CompilerOutput {
    fn failed(errors: Vec<String>) -> Self {
        Self {
            schema: GenerationResult::failed(errors.clone(), Vec::new()),
            stringifier: GenerationResult::failed(errors.clone(), Vec::new()),
            grammar: GenerationResult::failed(errors, Vec::new()),
        }
    }

    pub fn success(&self) -> bool {
        self.schema.success && self.stringifier.success && self.grammar.success
    }

    /// Every distinct error across the generators, in generator order.
    pub fn errors(&self) -> Vec<&str> {
        distinct([&self.schema.errors, &self.stringifier.errors, &self.grammar.errors])
    }

    /// Every distinct warning across the generators, in generator order.
    pub fn warnings(&self) -> Vec<&str> {
        distinct([
            &self.schema.warnings,
            &self.stringifier.warnings,
            &self.grammar.warnings,
        ])
    }
}

fn distinct<'a>(lists: [&'a Vec<String>; 3]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for message in lists.into_iter().flatten() {
        if !out.contains(&message.as_str()) {
            out.push(message);
        }
    }
    out
}

/// Validates `model` and, when it is valid, generates schema, stringifier and
/// grammar concurrently. Validation warnings are attached to every result.
#[tracing::instrument(level = "debug", skip_all, fields(model = %model.name))]
pub fn compile_model(model: &Model, config: &CompilerConfig) -> CompilerOutput {
    let errors = validator::validate(model);
    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "model rejected");
        return CompilerOutput::failed(errors.iter().map(ToString::to_string).collect());
    }
    let warnings = validator::validation_warnings(model);

    let schema_config = config.schema_config();
    let stringifier_config = config.stringifier_config();
    let (schema, (stringifier, grammar)) = rayon::join(
        || generate_schema(model, &schema_config),
        || {
            rayon::join(
                || generate_stringifier(model, &stringifier_config),
                || generate_grammar(model, &config.grammar),
            )
        },
    );

    let mut output = CompilerOutput {
        schema,
        stringifier,
        grammar,
    };
    prepend(&mut output.schema.warnings, &warnings);
    prepend(&mut output.stringifier.warnings, &warnings);
    prepend(&mut output.grammar.warnings, &warnings);

    tracing::debug!(success = output.success(), "pipeline finished");
    output
}

/// Parses the text notation, then runs [`compile_model`]. A syntax error
/// fails every generator.
pub fn compile_source(source: &str, config: &CompilerConfig) -> CompilerOutput {
    match parse_model(source) {
        Ok(model) => compile_model(&model, config),
        Err(e) => CompilerOutput::failed(vec![e.to_string()]),
    }
}

fn prepend(target: &mut Vec<String>, warnings: &[String]) {
    let mut merged = warnings.to_vec();
    merged.append(target);
    *target = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_fails_everything() {
        let output = compile_source("grammar Broken", &CompilerConfig::default());
        assert!(!output.success());
        assert!(!output.schema.success && !output.stringifier.success && !output.grammar.success);
        assert_eq!(output.errors().len(), 1);
        assert!(output.errors()[0].starts_with("syntax error at 1:"));
    }

    #[test]
    fn test_validation_warnings_reach_every_result() {
        let source = r#"
            grammar Words start Word;
            token Word = /[a-z]+/;
            token Orphan = "?";
        "#;
        let output = compile_source(source, &CompilerConfig::default());
        assert!(output.success());
        let warning = "node 'Orphan' is unreachable from start node 'Word'";
        assert_eq!(output.schema.warnings[0], warning);
        assert_eq!(output.stringifier.warnings[0], warning);
        assert_eq!(output.grammar.warnings, [warning]);
        assert_eq!(output.warnings()[0], warning);
    }
}
