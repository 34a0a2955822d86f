//! Token regexes to pest expressions.
//!
//! Patterns are parsed with `regex-syntax` in ASCII mode and lowered node by
//! node: literals become strings, classes become `'a'..'z'` ranges, repetition
//! maps onto pest's postfix operators. Byte ranges above ASCII are matched as
//! any non-ASCII character.
//!
//! Pest repetition never gives input back, so a variable repetition whose
//! first byte can also start what follows it is rejected instead of lowered
//! to a rule that silently matches less.

use regex_syntax::hir::{Class, Hir, HirKind, Repetition};
use regex_syntax::ParserBuilder;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegexError {
    #[error("invalid regex /{pattern}/: {message}")]
    Invalid { pattern: String, message: String },
    #[error("unsupported construct in regex /{pattern}/: {construct}")]
    Unsupported {
        pattern: String,
        construct: &'static str,
    },
}

/// Binding strength of a lowered expression, to place parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Choice,
    Sequence,
    Atom,
}

struct Lowered {
    text: String,
    prec: Prec,
}

impl Lowered {
    fn atom(text: String) -> Self {
        Self { text, prec: Prec::Atom }
    }

    /// The text, parenthesised when it binds looser than `min`.
    fn at_least(self, min: Prec) -> String {
        if self.prec < min {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

/// Translates `pattern` into a pest expression matching the same ASCII text.
pub fn regex_to_pest(pattern: &str) -> Result<String, RegexError> {
    let hir = ParserBuilder::new()
        .unicode(false)
        .utf8(false)
        .build()
        .parse(pattern)
        .map_err(|e| RegexError::Invalid {
            pattern: pattern.to_string(),
            message: e.to_string().lines().last().unwrap_or_default().trim().to_string(),
        })?;
    Ok(Translator { pattern }.lower(&hir, ByteSet::default())?.text)
}

/// Bytes that can start a match; all non-ASCII input shares one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ByteSet([u64; 4]);

impl ByteSet {
    fn insert(&mut self, start: u32, end: u32) {
        let bucket = |c: u32| if c > 0x7F { 0xFF } else { c };
        let start = if start > 0x7F { 0x80 } else { start };
        for byte in start..=bucket(end) {
            self.0[(byte / 64) as usize] |= 1 << (byte % 64);
        }
    }

    fn union(self, other: Self) -> Self {
        let mut out = self;
        for (word, o) in out.0.iter_mut().zip(other.0) {
            *word |= o;
        }
        out
    }

    fn intersects(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0).any(|(a, b)| a & b != 0)
    }
}

fn nullable(hir: &Hir) -> bool {
    hir.properties().minimum_len() == Some(0)
}

fn first_bytes(hir: &Hir) -> ByteSet {
    let mut set = ByteSet::default();
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(lit) => {
            if let Some(&byte) = lit.0.first() {
                set.insert(u32::from(byte), u32::from(byte));
            }
        }
        HirKind::Class(Class::Bytes(bytes)) => {
            for r in bytes.ranges() {
                set.insert(u32::from(r.start()), u32::from(r.end()));
            }
        }
        HirKind::Class(Class::Unicode(chars)) => {
            for r in chars.ranges() {
                set.insert(u32::from(r.start()), u32::from(r.end()));
            }
        }
        HirKind::Repetition(rep) => set = first_bytes(&rep.sub),
        HirKind::Capture(cap) => set = first_bytes(&cap.sub),
        HirKind::Concat(subs) => {
            for sub in subs {
                set = set.union(first_bytes(sub));
                if !nullable(sub) {
                    break;
                }
            }
        }
        HirKind::Alternation(subs) => {
            for sub in subs {
                set = set.union(first_bytes(sub));
            }
        }
    }
    set
}

struct Translator<'p> {
    pattern: &'p str,
}

impl<'p> Translator<'p> {
    fn unsupported(&self, construct: &'static str) -> RegexError {
        RegexError::Unsupported {
            pattern: self.pattern.to_string(),
            construct,
        }
    }

    /// Lowers `hir`; `follow` holds the bytes that may come right after it.
    fn lower(&self, hir: &Hir, follow: ByteSet) -> Result<Lowered, RegexError> {
        match hir.kind() {
            HirKind::Empty => Ok(Lowered::atom("\"\"".to_string())),
            HirKind::Literal(lit) => {
                let text = std::str::from_utf8(&lit.0).map_err(|_| self.unsupported("non-UTF-8 literal"))?;
                Ok(Lowered::atom(pest_string(text)))
            }
            HirKind::Class(class) => self.class(class),
            HirKind::Look(_) => Err(self.unsupported("anchor or word boundary")),
            HirKind::Repetition(rep) => self.repetition(rep, follow),
            HirKind::Capture(cap) => self.lower(&cap.sub, follow),
            HirKind::Concat(subs) => {
                let mut follows = Vec::with_capacity(subs.len());
                let mut next = follow;
                for sub in subs.iter().rev() {
                    follows.push(next);
                    next = if nullable(sub) {
                        first_bytes(sub).union(next)
                    } else {
                        first_bytes(sub)
                    };
                }
                let parts = subs
                    .iter()
                    .zip(follows.into_iter().rev())
                    .map(|(sub, follow)| Ok(self.lower(sub, follow)?.at_least(Prec::Sequence)))
                    .collect::<Result<Vec<_>, RegexError>>()?;
                Ok(Lowered {
                    text: parts.join(" ~ "),
                    prec: Prec::Sequence,
                })
            }
            HirKind::Alternation(subs) => {
                let parts = subs
                    .iter()
                    .map(|sub| Ok(self.lower(sub, follow)?.text))
                    .collect::<Result<Vec<_>, RegexError>>()?;
                Ok(Lowered {
                    text: parts.join(" | "),
                    prec: Prec::Choice,
                })
            }
        }
    }

    fn repetition(&self, rep: &Repetition, follow: ByteSet) -> Result<Lowered, RegexError> {
        if !rep.greedy {
            return Err(self.unsupported("lazy repetition"));
        }
        let first = first_bytes(&rep.sub);
        if rep.max != Some(rep.min) && first.intersects(&follow) {
            return Err(self.unsupported("backtracking repetition"));
        }
        let inner = self.lower(&rep.sub, first.union(follow))?.at_least(Prec::Atom);
        let suffix = match (rep.min, rep.max) {
            (0, None) => "*".to_string(),
            (1, None) => "+".to_string(),
            (0, Some(1)) => "?".to_string(),
            (n, Some(m)) if n == m => format!("{{{}}}", n),
            (n, None) => format!("{{{},}}", n),
            (0, Some(m)) => format!("{{, {}}}", m),
            (n, Some(m)) => format!("{{{}, {}}}", n, m),
        };
        Ok(Lowered::atom(format!("{}{}", inner, suffix)))
    }

    fn class(&self, class: &Class) -> Result<Lowered, RegexError> {
        let mut ranges: Vec<(u32, u32)> = Vec::new();
        match class {
            Class::Bytes(bytes) => {
                ranges.extend(bytes.ranges().iter().map(|r| (u32::from(r.start()), u32::from(r.end()))));
            }
            Class::Unicode(chars) => {
                ranges.extend(chars.ranges().iter().map(|r| (u32::from(r.start()), u32::from(r.end()))));
            }
        }

        let mut alternatives = Vec::new();
        let mut non_ascii = false;
        for (start, end) in ranges {
            if start > 0x7F {
                non_ascii = true;
                continue;
            }
            if end > 0x7F {
                non_ascii = true;
            }
            let end = end.min(0x7F);
            let (Some(lo), Some(hi)) = (char::from_u32(start), char::from_u32(end)) else {
                continue;
            };
            if lo == hi {
                alternatives.push(pest_string(&lo.to_string()));
            } else {
                alternatives.push(format!("{}..{}", pest_char(lo), pest_char(hi)));
            }
        }
        if non_ascii {
            alternatives.push("!ASCII ~ ANY".to_string());
        }

        match alternatives.len() {
            0 => Err(self.unsupported("empty character class")),
            1 if !non_ascii => Ok(Lowered::atom(alternatives.remove(0))),
            1 => Ok(Lowered {
                text: alternatives.remove(0),
                prec: Prec::Sequence,
            }),
            _ => Ok(Lowered {
                text: alternatives.join(" | "),
                prec: Prec::Choice,
            }),
        }
    }
}

/// A pest string literal for `text`.
pub fn pest_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            ' '..='~' => out.push(c),
            c => out.push_str(&format!("\\u{{{:04X}}}", u32::from(c))),
        }
    }
    out.push('"');
    out
}

/// A pest character literal for range bounds.
fn pest_char(c: char) -> String {
    match c {
        '\'' => "'\\''".to_string(),
        '\\' => "'\\\\'".to_string(),
        ' '..='~' => format!("'{}'", c),
        c => format!("'\\u{{{:04X}}}'", u32::from(c)),
    }
}
