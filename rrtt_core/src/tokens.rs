use std::fmt::Display;
use std::ops::Range;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

/// The syntactic role of a slice of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
	/// Literal text, e.g. `checkout new `
	String,
	/// `<name>`
	OpeningTag,
	/// `</name>`
	ClosingTag,
	/// `<name/>`
	SelfClosingTag,
	/// `{name}`
	TextPlaceholder,
}

impl Display for TokenKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::String => write!(f, "string"),
			Self::OpeningTag => write!(f, "opening_tag"),
			Self::ClosingTag => write!(f, "closing_tag"),
			Self::SelfClosingTag => write!(f, "self_closing_tag"),
			Self::TextPlaceholder => write!(f, "text_placeholder"),
		}
	}
}

/// A contiguous slice of the template classified by [`TokenKind`].
///
/// Tokens produced for one template cover it exactly: ordered by `position`
/// and joined by `raw` they reproduce the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
	pub kind: TokenKind,
	/// The exact source text of the token, delimiters included.
	pub raw: String,
	/// Byte offset of the token in the template.
	pub position: usize,
}

impl Token {
	pub fn new(kind: TokenKind, raw: impl Into<String>, position: usize) -> Self {
		Self {
			kind,
			raw: raw.into(),
			position,
		}
	}

	/// Byte offset just past the token.
	pub fn end(&self) -> usize {
		self.position + self.raw.len()
	}

	pub fn span(&self) -> Range<usize> {
		self.position..self.end()
	}
}

/// One row of the lexical category table. Earlier categories claim text
/// before later ones see it.
#[derive(Debug, Clone)]
pub struct Category {
	pub kind: TokenKind,
	pub pattern: Regex,
}

impl Category {
	pub fn new(kind: TokenKind, pattern: Regex) -> Self {
		Self { kind, pattern }
	}
}
