use bnf_forge::{
    compile_source, load_model, CompilerConfig, GeneratedGrammar, Model, ParserManager, Stringifier,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// Right-recursive arithmetic: every recursive position follows a token, so the
// grammar is PEG-friendly. `BinaryExpression` is tried before `Term`.
const ARITH: &str = r#"
grammar Arith start Expression;

token Identifier = /[a-zA-Z_]+/;
token Number = /\d+/;
token Plus = "+";
token Minus = "-";
token LeftParen = "(";
token RightParen = ")";

union Term = Identifier | Number | ParenExpression;
union Operator = Plus | Minus;
union Expression = BinaryExpression | Term;

deduction BinaryExpression = left:Term operator:Operator right:Expression;
deduction ParenExpression = LeftParen expression:Expression RightParen;
"#;

fn setup() -> (Model, GeneratedGrammar) {
    let model = load_model(ARITH).unwrap();
    let output = compile_source(ARITH, &CompilerConfig::default());
    assert!(output.success(), "{:?}", output.errors());
    assert!(output.warnings().is_empty(), "{:?}", output.warnings());
    (model, output.grammar.output.unwrap())
}

fn number(value: &str) -> Value {
    json!({ "type": "Number", "value": value })
}

#[test]
fn test_parse_then_stringify() {
    let (model, grammar) = setup();
    let manager = ParserManager::new();

    let ast = manager.parse_with(&grammar, "1 + (x - 2)").unwrap();
    assert_eq!(
        ast,
        json!({
            "type": "BinaryExpression",
            "left": number("1"),
            "operator": { "type": "Plus", "value": "+" },
            "right": {
                "type": "ParenExpression",
                "expression": {
                    "type": "BinaryExpression",
                    "left": { "type": "Identifier", "value": "x" },
                    "operator": { "type": "Minus", "value": "-" },
                    "right": number("2"),
                },
            },
        })
    );

    let text = Stringifier::new(&model).stringify(&ast).unwrap();
    assert_eq!(text, "1 + ( x - 2 )");

    // Formatting changes whitespace only.
    assert_eq!(manager.parse_with(&grammar, &text).unwrap(), ast);
}

#[test]
fn test_stringify_then_parse() {
    let (model, grammar) = setup();
    let manager = ParserManager::new();
    let stringifier = Stringifier::new(&model);

    let values = [
        number("7"),
        json!({ "type": "Identifier", "value": "total" }),
        json!({
            "type": "BinaryExpression",
            "left": number("1"),
            "operator": { "type": "Minus", "value": "-" },
            "right": {
                "type": "BinaryExpression",
                "left": number("2"),
                "operator": { "type": "Plus", "value": "+" },
                "right": number("3"),
            },
        }),
        json!({
            "type": "ParenExpression",
            "expression": {
                "type": "ParenExpression",
                "expression": { "type": "Identifier", "value": "y" },
            },
        }),
    ];

    for value in values {
        let text = stringifier.stringify(&value).unwrap();
        let reparsed = manager.parse_with(&grammar, &text).unwrap();
        assert_eq!(reparsed, value, "round trip through {:?}", text);
    }
    assert_eq!(manager.cached_len(), 1);
}

#[test]
fn test_compact_output_still_parses() {
    let (model, grammar) = setup();
    let options = bnf_forge::StringifyOptions {
        format: false,
        ..bnf_forge::StringifyOptions::default()
    };
    let manager = ParserManager::new();
    let ast = manager.parse_with(&grammar, "a + ( b - 3 )").unwrap();
    let text = Stringifier::with_options(&model, options).stringify(&ast).unwrap();
    assert_eq!(text, "a+(b-3)");
    assert_eq!(manager.parse_with(&grammar, &text).unwrap(), ast);
}
