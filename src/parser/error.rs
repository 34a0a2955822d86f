use thiserror::Error;

/// The grammar text was rejected by the PEG engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("grammar failed to compile: {}", .messages.join("; "))]
pub struct CompileError {
    pub messages: Vec<String>,
}

/// Input text rejected by a compiled grammar. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {line}:{column}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ParseError {
    pub(crate) fn from_pest<R: pest::RuleType>(error: &pest::error::Error<R>) -> Self {
        let offset = match error.location {
            pest::error::InputLocation::Pos(pos) => pos,
            pest::error::InputLocation::Span((start, _)) => start,
        };
        let (line, column) = match error.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        };
        Self {
            offset,
            line,
            column,
            message: error.variant.message().into_owned(),
        }
    }
}
