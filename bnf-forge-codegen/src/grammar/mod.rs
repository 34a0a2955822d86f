//! Grammar generator: a pest grammar for a model.
//!
//! ```text
//! WHITESPACE = _{ " " | "\t" | "\r" | "\n" }
//! start = { SOI ~ Expression ~ EOI }
//! Number = @{ '0'..'9'+ }
//! // fields: left:Expression operator:Operator right:Expression
//! BinaryExpression = { Expression ~ Operator ~ Expression }
//! Expression = _{ BinaryExpression | Term }
//! ```
//!
//! Tokens are atomic, deductions are plain sequences (the implicit
//! `WHITESPACE` rule skips blanks between elements) and unions are silent
//! ordered choices, so a parse tree holds only token and deduction pairs.

pub mod regex;

pub use self::regex::{pest_string, regex_to_pest, RegexError};

use crate::config::GrammarConfig;
use crate::naming::is_rust_ident;
use crate::render::header;
use crate::{check_model, GenerationResult};
use bnf_forge_model::{analysis, Model, Node, TokenPattern};

/// Rule names pest defines itself or treats specially.
pub const PEST_RESERVED: &[&str] = &[
    "WHITESPACE",
    "COMMENT",
    "SOI",
    "EOI",
    "ANY",
    "PUSH",
    "POP",
    "POP_ALL",
    "PEEK",
    "PEEK_ALL",
    "DROP",
    "ASCII",
    "ASCII_DIGIT",
    "ASCII_NONZERO_DIGIT",
    "ASCII_BIN_DIGIT",
    "ASCII_OCT_DIGIT",
    "ASCII_HEX_DIGIT",
    "ASCII_ALPHA_LOWER",
    "ASCII_ALPHA_UPPER",
    "ASCII_ALPHA",
    "ASCII_ALPHANUMERIC",
    "NEWLINE",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleShape {
    /// Atomic rule; its pair's text is the token value.
    Token,
    /// One entry per element: the property it fills, if any.
    Sequence { fields: Vec<Option<String>> },
    /// Silent rule; never appears in a parse tree.
    Choice { alternatives: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarRule {
    pub name: String,
    pub shape: RuleShape,
    /// The pest expression inside the braces.
    pub expression: String,
    pub comment: Option<String>,
}

impl GrammarRule {
    pub fn to_pest(&self) -> String {
        let modifier = match self.shape {
            RuleShape::Token => "@",
            RuleShape::Sequence { .. } => "",
            RuleShape::Choice { .. } => "_",
        };
        format!("{} = {}{{ {} }}", self.name, modifier, self.expression)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarStats {
    pub total_rules: usize,
    pub token_rules: usize,
    pub deduction_rules: usize,
    pub union_rules: usize,
    pub left_recursive_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedGrammar {
    pub text: String,
    /// The generated entry rule (`start` by default).
    pub start_rule: String,
    /// The model node the entry rule wraps.
    pub start_node: String,
    pub rules: Vec<GrammarRule>,
    pub stats: GrammarStats,
}

impl GeneratedGrammar {
    pub fn rule(&self, name: &str) -> Option<&GrammarRule> {
        self.rules.iter().find(|r| r.name == name)
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(model = %model.name))]
pub fn generate_grammar(model: &Model, config: &GrammarConfig) -> GenerationResult<GeneratedGrammar> {
    if let Err(errors) = check_model(model) {
        return GenerationResult::failed(errors, Vec::new());
    }

    let mut errors = Vec::new();
    if !is_rust_ident(&config.start_rule) || PEST_RESERVED.contains(&config.start_rule.as_str()) {
        errors.push(format!("invalid start rule name '{}'", config.start_rule));
    }
    for name in model.nodes.keys() {
        if PEST_RESERVED.contains(&name.as_str()) || *name == config.start_rule {
            errors.push(format!("node name '{}' collides with a reserved pest rule", name));
        } else if !is_rust_ident(name) {
            errors.push(format!("node name '{}' is a Rust keyword and cannot name a pest rule", name));
        }
    }

    let mut rules = Vec::with_capacity(model.nodes.len());
    for (name, node) in &model.nodes {
        match lower_node(name, node) {
            Ok(rule) => rules.push(rule),
            Err(e) => errors.push(format!("token '{}': {}", name, e)),
        }
    }

    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "grammar generation failed");
        return GenerationResult::failed(errors, Vec::new());
    }

    let left_recursive_rules = analysis::left_recursive_rules(model);
    let mut warnings = Vec::new();
    if !left_recursive_rules.is_empty() {
        warnings.push(format!(
            "left-recursive rules will not parse with a PEG engine: {}",
            left_recursive_rules.join(", ")
        ));
    }

    let count = |f: fn(&Node) -> bool| model.nodes.values().filter(|n| f(n)).count();
    let stats = GrammarStats {
        total_rules: model.nodes.len(),
        token_rules: count(|n| matches!(n, Node::Token(_))),
        deduction_rules: count(|n| matches!(n, Node::Deduction(_))),
        union_rules: count(|n| matches!(n, Node::Union(_))),
        left_recursive_rules,
    };

    let text = render(model, config, &rules);
    tracing::debug!(rules = stats.total_rules, left_recursive = stats.left_recursive_rules.len(), "grammar generated");
    GenerationResult::ok(
        GeneratedGrammar {
            text,
            start_rule: config.start_rule.clone(),
            start_node: model.start.clone(),
            rules,
            stats,
        },
        warnings,
    )
}

fn lower_node(name: &str, node: &Node) -> Result<GrammarRule, RegexError> {
    let rule = match node {
        Node::Token(t) => GrammarRule {
            name: name.to_string(),
            shape: RuleShape::Token,
            expression: match &t.pattern {
                TokenPattern::Literal(text) => pest_string(text),
                TokenPattern::Regex(pattern) => regex_to_pest(pattern)?,
            },
            comment: t.description.clone(),
        },
        Node::Deduction(d) => {
            let expression = if d.elements.is_empty() {
                "\"\"".to_string()
            } else {
                d.elements
                    .iter()
                    .map(|e| e.node_ref.as_str())
                    .collect::<Vec<_>>()
                    .join(" ~ ")
            };
            let captures = d
                .elements
                .iter()
                .map(|e| match &e.property {
                    Some(p) => format!("{}:{}", p, e.node_ref),
                    None => e.node_ref.clone(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            GrammarRule {
                name: name.to_string(),
                shape: RuleShape::Sequence {
                    fields: d.elements.iter().map(|e| e.property.clone()).collect(),
                },
                expression,
                comment: Some(format!("fields: {}", captures).trim_end().to_string()),
            }
        }
        Node::Union(u) => GrammarRule {
            name: name.to_string(),
            shape: RuleShape::Choice {
                alternatives: u.members.clone(),
            },
            expression: u.members.join(" | "),
            comment: u.description.clone(),
        },
    };
    Ok(rule)
}

fn render(model: &Model, config: &GrammarConfig, rules: &[GrammarRule]) -> String {
    let mut out = header(model);
    out.push('\n');
    out.push_str("WHITESPACE = _{ \" \" | \"\\t\" | \"\\r\" | \"\\n\" }\n\n");
    out.push_str(&format!(
        "{} = {{ SOI ~ {} ~ EOI }}\n",
        config.start_rule, model.start
    ));
    for rule in rules {
        out.push('\n');
        if config.include_comments {
            if let Some(comment) = &rule.comment {
                for line in comment.lines() {
                    out.push_str(&format!("// {}\n", line).replace("// \n", "//\n"));
                }
            }
        }
        out.push_str(&rule.to_pest());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bnf_forge_model::Element;

    fn pair_model() -> Model {
        Model::builder("Pairs", "Pair")
            .regex("Number", r"\d+")
            .literal("Comma", ",")
            .union("Value", ["Number"])
            .deduction(
                "Pair",
                vec![
                    Element::named("Value", "first"),
                    Element::new("Comma"),
                    Element::named("Value", "second"),
                ],
            )
            .build()
    }

    #[test]
    fn test_rule_shapes() {
        let grammar = generate_grammar(&pair_model(), &GrammarConfig::default())
            .output
            .unwrap();
        assert_eq!(grammar.rule("Number").unwrap().to_pest(), "Number = @{ '0'..'9'+ }");
        assert_eq!(grammar.rule("Comma").unwrap().to_pest(), "Comma = @{ \",\" }");
        assert_eq!(grammar.rule("Value").unwrap().to_pest(), "Value = _{ Number }");
        assert_eq!(
            grammar.rule("Pair").unwrap().to_pest(),
            "Pair = { Value ~ Comma ~ Value }"
        );
        assert_eq!(
            grammar.rule("Pair").unwrap().shape,
            RuleShape::Sequence {
                fields: vec![Some("first".into()), None, Some("second".into())]
            }
        );
    }

    #[test]
    fn test_text_layout() {
        let grammar = generate_grammar(&pair_model(), &GrammarConfig::default())
            .output
            .unwrap();
        assert!(grammar.text.starts_with("// @generated by bnf-forge from Pairs 1.0.0. Do not edit.\n"));
        assert!(grammar.text.contains("\nstart = { SOI ~ Pair ~ EOI }\n"));
        assert!(grammar
            .text
            .contains("// fields: first:Value Comma second:Value\nPair = { Value ~ Comma ~ Value }\n"));

        let bare = generate_grammar(
            &pair_model(),
            &GrammarConfig {
                include_comments: false,
                ..GrammarConfig::default()
            },
        );
        assert!(!bare.output.unwrap().text.contains("// fields"));
    }

    #[test]
    fn test_reserved_names() {
        let model = Model::builder("T", "EOI").literal("EOI", "x").build();
        let result = generate_grammar(&model, &GrammarConfig::default());
        assert!(!result.success);
        assert_eq!(result.errors, ["node name 'EOI' collides with a reserved pest rule"]);

        let model = Model::builder("T", "start").literal("start", "x").build();
        let result = generate_grammar(&model, &GrammarConfig::default());
        assert_eq!(result.errors, ["node name 'start' collides with a reserved pest rule"]);

        let model = Model::builder("T", "match").literal("match", "x").build();
        let result = generate_grammar(&model, &GrammarConfig::default());
        assert_eq!(
            result.errors,
            ["node name 'match' is a Rust keyword and cannot name a pest rule"]
        );
    }

    #[test]
    fn test_regex_errors_are_generation_errors() {
        let model = Model::builder("T", "Word").regex("Word", "^\\w+").build();
        let result = generate_grammar(&model, &GrammarConfig::default());
        assert!(!result.success);
        assert_eq!(
            result.errors,
            ["token 'Word': unsupported construct in regex /^\\w+/: anchor or word boundary"]
        );
    }

    #[test]
    fn test_empty_deduction_matches_empty_string() {
        let model = Model::builder("T", "Nothing").deduction("Nothing", Vec::new()).build();
        let grammar = generate_grammar(&model, &GrammarConfig::default()).output.unwrap();
        assert_eq!(grammar.rules[0].to_pest(), "Nothing = { \"\" }");
        assert!(grammar.text.contains("// fields:\n"));
    }
}
