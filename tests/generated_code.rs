use bnf_forge::{compile_source, CompilerConfig};
use std::path::PathBuf;

const SIMPLE_MATH: &str = r#"
grammar SimpleMath version "1.0.0" start Expression;

token Identifier = /[a-zA-Z_]+/;
token Number = /\d+/;
token Plus = "+";
token Minus = "-";
token LeftParen = "(";
token RightParen = ")";

union Term = Identifier | Number | ParenExpression;
union Operator = Plus | Minus;
union Expression = Term | BinaryExpression;

deduction BinaryExpression = left:Expression operator:Operator right:Expression;
deduction ParenExpression = LeftParen expression:Expression RightParen;
"#;

const MAIN: &str = r#"
fn main() {
    use schema::*;

    let number = |text: &str| Expression::from(Term::from(NumberToken::new(text)));
    let sum = BinaryExpressionNode {
        left: Box::new(number("1")),
        operator: Box::new(Operator::from(PlusToken::new("+"))),
        right: Box::new(number("2")),
    };
    let root: Root = Expression::from(sum);

    assert_eq!(stringifier::stringify(&root), "1 + 2");
    assert_eq!(root.node_type(), "BinaryExpression");
    assert_eq!(START_NODE, "Expression");
    assert_eq!(GRAMMAR_VERSION, "1.0.0");

    let mut options = stringifier::StringifyOptions::default();
    options.formatting.compact = true;
    assert_eq!(stringifier::stringify_with(&root, &options), "1+2");

    let paren = ParenExpressionNode {
        expression: Box::new(number("3")),
    };
    let any = AnyNode::from(paren);
    assert_eq!(
        stringifier::stringify_node(&any, &stringifier::StringifyOptions::default()),
        "( 3 )"
    );
}
"#;

/// Writes the generated schema and stringifier into one program that builds
/// a tree by hand and checks its text.
fn write_program() -> PathBuf {
    let mut config = CompilerConfig::default();
    config.schema.separate_files = false;
    let output = compile_source(SIMPLE_MATH, &config);
    assert!(output.success(), "{:?}", output.errors());

    let schema = output.schema.output.unwrap();
    let stringifier = output.stringifier.output.unwrap();

    let program = format!(
        "#![allow(dead_code)]\n\nmod schema {{\n{}}}\n\nmod stringifier {{\n{}}}\n{}",
        schema["schema.rs"],
        stringifier.code(),
        MAIN
    );
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("simple_math_generated.rs");
    std::fs::write(&path, program).unwrap();
    path
}

const SEPARATE_MAIN: &str = r#"#![allow(dead_code)]

mod num {
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct Num(pub u64);

    impl std::fmt::Display for Num {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }
}

mod schema;
mod stringifier;

fn main() {
    use schema::*;

    let number = |n: u64| Expression::from(Term::from(num::Num(n)));
    let sum = BinaryExpressionNode {
        left: Box::new(number(1)),
        operator: Box::new(Operator::from(MinusToken::new("-"))),
        right: Box::new(number(20)),
    };
    let root: Root = Expression::from(sum);

    assert_eq!(stringifier::stringify(&root), "1 - 20");
    assert_eq!(number(3).node_type(), "Number");
    assert_eq!(AnyToken::from(num::Num(4)).node_type(), "Number");
    assert_eq!(
        stringifier::stringify_node(&AnyNode::from(num::Num(5)), &stringifier::StringifyOptions::default()),
        "5"
    );

    let f: stringifier::StringifyFn = stringifier::stringify_expression;
    let mut options = stringifier::StringifyOptions::default();
    options.formatting.compact = true;
    assert_eq!(f(&root, &options), "1-20");
}
"#;

/// Writes the separate-file layout of both generators as a module tree, with
/// `Number` mapped to a hand-written type.
fn write_separate_program() -> PathBuf {
    let mut config = CompilerConfig::default();
    config.naming.type_mapping.insert("Number".into(), "crate::num::Num".into());
    let output = compile_source(SIMPLE_MATH, &config);
    assert!(output.success(), "{:?}", output.errors());

    let root = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("simple_math_separate");
    let schema = output.schema.output.unwrap();
    let stringifier = output.stringifier.output.unwrap();
    let trees = [("schema", &schema), ("stringifier", stringifier.files())];
    for (dir, files) in trees {
        for (name, text) in files {
            let path = root.join(dir).join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, text).unwrap();
        }
    }

    let main = root.join("main.rs");
    std::fs::write(&main, SEPARATE_MAIN).unwrap();
    main
}

#[test]
fn generated_code_compiles_and_runs() {
    let single = write_program();
    let separate = write_separate_program();
    let t = trybuild::TestCases::new();
    t.pass(single);
    t.pass(separate);
}
