//! Parser for the model text notation.
//!
//! ```text
//! /// Arithmetic over identifiers and numbers.
//! grammar SimpleMath version "1.0.0" start Expression;
//!
//! token Number = /\d+/;
//! token Plus = "+";
//! union Operator = Plus | Minus;
//! deduction BinaryExpression = left:Expression operator:Operator right:Expression;
//! ```
//!
//! `///` lines document the item that follows, `//` lines are comments.

use crate::error::{ModelError, Result};
use crate::model::*;
use indexmap::IndexMap;
use winnow::ascii::{multispace0, multispace1, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, separated, terminated};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, literal, one_of, take_while};

struct Header<'s> {
    name: &'s str,
    version: Option<String>,
    start: &'s str,
}

struct Item<'s> {
    name: &'s str,
    node: Node,
}

/// Parses a complete model from its text notation.
///
/// The result is not validated; run [`crate::validator::validate`] next.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_model(source: &str) -> Result<Model> {
    let (header, items) = model_file.parse(source).map_err(|e| {
        let offset = e.offset();
        let (line, column) = line_column(source, offset);
        let message = e.inner().to_string().replace('\n', "; ");
        ModelError::Syntax {
            offset,
            line,
            column,
            message: if message.is_empty() {
                "unexpected input".to_string()
            } else {
                message
            },
        }
    })?;

    let mut nodes = IndexMap::new();
    for item in items {
        if nodes.insert(item.name.to_string(), item.node).is_some() {
            return Err(ModelError::DuplicateNode(item.name.to_string()));
        }
    }

    tracing::debug!(model = header.name, nodes = nodes.len(), "model parsed");
    Ok(Model {
        name: header.name.to_string(),
        version: header.version.unwrap_or_else(|| "1.0.0".to_string()),
        start: header.start.to_string(),
        nodes,
    })
}

fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
        + 1;
    (line, column)
}

fn model_file<'s>(input: &mut &'s str) -> ModalResult<(Header<'s>, Vec<Item<'s>>)> {
    let header = preceded((trivia, doc_comments, trivia), header).parse_next(input)?;
    let items = repeat(0.., preceded(trivia, item)).parse_next(input)?;
    trivia.parse_next(input)?;
    Ok((header, items))
}

fn header<'s>(input: &mut &'s str) -> ModalResult<Header<'s>> {
    keyword("grammar")
        .context(StrContext::Expected(StrContextValue::StringLiteral("grammar")))
        .parse_next(input)?;
    let name = cut_err(lexeme(identifier))
        .context(StrContext::Label("grammar name"))
        .parse_next(input)?;
    let version = opt(preceded(
        lexeme(keyword("version")),
        cut_err(lexeme(string_literal)).context(StrContext::Label("version")),
    ))
    .parse_next(input)?;
    let start = cut_err(preceded(lexeme(keyword("start")), lexeme(identifier)))
        .context(StrContext::Expected(StrContextValue::StringLiteral("start")))
        .parse_next(input)?;
    semicolon.parse_next(input)?;
    Ok(Header {
        name,
        version,
        start,
    })
}

fn item<'s>(input: &mut &'s str) -> ModalResult<Item<'s>> {
    let description = doc_comments.parse_next(input)?;
    trivia.parse_next(input)?;
    let (name, node) = alt((token_item, union_item, deduction_item))
        .context(StrContext::Label("node definition"))
        .context(StrContext::Expected(StrContextValue::StringLiteral("token")))
        .context(StrContext::Expected(StrContextValue::StringLiteral("union")))
        .context(StrContext::Expected(StrContextValue::StringLiteral("deduction")))
        .parse_next(input)?;
    Ok(Item {
        name,
        node: with_description(node, description),
    })
}

fn with_description(node: Node, description: Option<String>) -> Node {
    match node {
        Node::Token(t) => Node::Token(TokenNode { description, ..t }),
        Node::Deduction(d) => Node::Deduction(DeductionNode { description, ..d }),
        Node::Union(u) => Node::Union(UnionNode { description, ..u }),
    }
}

fn token_item<'s>(input: &mut &'s str) -> ModalResult<(&'s str, Node)> {
    keyword("token").parse_next(input)?;
    let name = cut_err(definition_name).parse_next(input)?;
    let pattern = cut_err(lexeme(alt((
        string_literal.map(TokenPattern::Literal),
        regex_literal.map(TokenPattern::Regex),
    ))))
    .context(StrContext::Label("token pattern"))
    .context(StrContext::Expected(StrContextValue::Description(
        "a \"literal\" or a /regex/",
    )))
    .parse_next(input)?;
    semicolon.parse_next(input)?;
    Ok((
        name,
        Node::Token(TokenNode {
            description: None,
            pattern,
        }),
    ))
}

fn union_item<'s>(input: &mut &'s str) -> ModalResult<(&'s str, Node)> {
    keyword("union").parse_next(input)?;
    let name = cut_err(definition_name).parse_next(input)?;
    let members: Vec<&str> = cut_err(separated(1.., lexeme(identifier), lexeme('|')))
        .context(StrContext::Label("union members"))
        .parse_next(input)?;
    semicolon.parse_next(input)?;
    Ok((
        name,
        Node::Union(UnionNode {
            description: None,
            members: members.into_iter().map(str::to_string).collect(),
        }),
    ))
}

fn deduction_item<'s>(input: &mut &'s str) -> ModalResult<(&'s str, Node)> {
    keyword("deduction").parse_next(input)?;
    let name = cut_err(definition_name).parse_next(input)?;
    let elements = repeat(0.., element).parse_next(input)?;
    semicolon.parse_next(input)?;
    Ok((
        name,
        Node::Deduction(DeductionNode {
            description: None,
            elements,
        }),
    ))
}

/// `Ref` or `property:Ref`.
fn element(input: &mut &str) -> ModalResult<Element> {
    let first = lexeme(identifier).parse_next(input)?;
    let target = opt(preceded(
        lexeme(':'),
        cut_err(lexeme(identifier)).context(StrContext::Label("element node")),
    ))
    .parse_next(input)?;
    Ok(match target {
        Some(node_ref) => Element::named(node_ref, first),
        None => Element::new(first),
    })
}

/// `Name =`
fn definition_name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let name = lexeme(identifier)
        .context(StrContext::Label("node name"))
        .parse_next(input)?;
    lexeme('=')
        .context(StrContext::Expected(StrContextValue::CharLiteral('=')))
        .parse_next(input)?;
    Ok(name)
}

fn semicolon(input: &mut &str) -> ModalResult<()> {
    cut_err(lexeme(';'))
        .context(StrContext::Expected(StrContextValue::CharLiteral(';')))
        .void()
        .parse_next(input)
}

fn identifier<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A keyword not immediately followed by more identifier characters.
fn keyword<'s>(kw: &'static str) -> impl Parser<&'s str, &'s str, ErrMode<ContextError>> {
    terminated(literal(kw), not(one_of(is_ident_char)))
}

fn lexeme<'s, O, P>(parser: P) -> impl Parser<&'s str, O, ErrMode<ContextError>>
where
    P: Parser<&'s str, O, ErrMode<ContextError>>,
{
    preceded(trivia, parser)
}

/// Whitespace and `//` comments. Doc comments (`///`) are left in place.
fn trivia(input: &mut &str) -> ModalResult<()> {
    repeat(
        0..,
        alt((
            multispace1.void(),
            (literal("//"), not('/'), till_line_ending).void(),
        )),
    )
    .parse_next(input)
}

fn doc_comments(input: &mut &str) -> ModalResult<Option<String>> {
    let lines: Vec<&str> = repeat(
        0..,
        delimited(
            (multispace0, literal("///")),
            till_line_ending,
            multispace0,
        ),
    )
    .parse_next(input)?;

    if lines.is_empty() {
        return Ok(None);
    }
    let text = lines
        .iter()
        .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Some(text))
}

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut out = String::new();
    loop {
        let c = cut_err(any)
            .context(StrContext::Expected(StrContextValue::CharLiteral('"')))
            .parse_next(input)?;
        match c {
            '"' => return Ok(out),
            '\\' => out.push(cut_err(escape).parse_next(input)?),
            c => out.push(c),
        }
    }
}

fn escape(input: &mut &str) -> ModalResult<char> {
    alt((
        'n'.value('\n'),
        't'.value('\t'),
        'r'.value('\r'),
        '0'.value('\0'),
        '"'.value('"'),
        '\\'.value('\\'),
        '/'.value('/'),
        preceded(
            'u',
            delimited('{', take_while(1..=6, |c: char| c.is_ascii_hexdigit()), '}'),
        )
        .verify_map(|hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)),
    ))
    .context(StrContext::Label("escape sequence"))
    .parse_next(input)
}

/// `/.../` where `\/` stands for a slash; every other escape is kept for the
/// regex engine.
fn regex_literal(input: &mut &str) -> ModalResult<String> {
    '/'.parse_next(input)?;
    let mut out = String::new();
    loop {
        let c = cut_err(any.verify(|c: &char| *c != '\n'))
            .context(StrContext::Expected(StrContextValue::CharLiteral('/')))
            .parse_next(input)?;
        match c {
            '/' => return Ok(out),
            '\\' => {
                let next = cut_err(any).parse_next(input)?;
                if next != '/' {
                    out.push('\\');
                }
                out.push(next);
            }
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        let src = "ab\ncd\nef";
        assert_eq!(line_column(src, 0), (1, 1));
        assert_eq!(line_column(src, 4), (2, 2));
        assert_eq!(line_column(src, 6), (3, 1));
    }

    #[test]
    fn test_string_escapes() {
        let mut input = r#""a\"b\\c\u{41}" rest"#;
        let s = string_literal(&mut input).unwrap();
        assert_eq!(s, "a\"b\\cA");
        assert_eq!(input, " rest");
    }

    #[test]
    fn test_regex_slash_escape() {
        let mut input = r"/a\/b\d+/;";
        let s = regex_literal(&mut input).unwrap();
        assert_eq!(s, r"a/b\d+");
        assert_eq!(input, ";");
    }

    #[test]
    fn test_element_forms() {
        let mut input = " left : Expression";
        assert_eq!(
            element(&mut input).unwrap(),
            Element::named("Expression", "left")
        );
        let mut input = " RightParen;";
        assert_eq!(element(&mut input).unwrap(), Element::new("RightParen"));
    }

    #[test]
    fn test_keyword_requires_boundary() {
        let mut input = "tokens";
        assert!(keyword("token").parse_next(&mut input).is_err());
    }

    #[test]
    fn test_doc_comments_attach_to_node() {
        let src = "grammar G start A;\n/// first line\n///  second\ntoken A = \"a\";";
        let model = parse_model(src).unwrap();
        assert_eq!(
            model.node("A").and_then(Node::description),
            Some("first line\n second")
        );
    }
}
