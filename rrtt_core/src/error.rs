use std::fmt::Display;

use miette::Diagnostic;
use miette::SourceSpan;
use thiserror::Error;

use crate::TokenKind;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum RrttError {
	#[error(transparent)]
	#[diagnostic(transparent)]
	Syntax(#[from] TemplateSyntaxError),

	#[error(transparent)]
	#[diagnostic(code(rrtt::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(rrtt::config_parse),
		help("check that rrtt.toml is valid TOML with an optional [syntax] section")
	)]
	ConfigParse(String),

	#[error("invalid pattern for `{kind}`: {reason}")]
	#[diagnostic(
		code(rrtt::invalid_pattern),
		help("patterns use the `regex` crate syntax, see https://docs.rs/regex")
	)]
	InvalidPattern { kind: TokenKind, reason: String },

	#[error("invalid context: {0}")]
	#[diagnostic(
		code(rrtt::invalid_context),
		help("the context must be a JSON object mapping names to values")
	)]
	Context(String),
}

/// The structural problem found while building a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
	/// A closing tag appeared while no tag was open.
	UnmatchedClosingTag,
	/// A closing tag did not pair with the currently open tag.
	MismatchedClosingTag,
	/// The template ended with at least one tag still open.
	UnclosedTag,
}

impl Display for SyntaxErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UnmatchedClosingTag => write!(f, "nothing to close by closing tag"),
			Self::MismatchedClosingTag => write!(f, "closing tag doesn't match opening tag"),
			Self::UnclosedTag => write!(f, "expected closing tag"),
		}
	}
}

/// A structural error raised while building the tree of a template.
///
/// The rendered message points at the offending token with a caret line:
///
/// ```text
/// closing tag doesn't match opening tag
/// This <a>token</b> </a> is invalid
/// -------------^
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
#[error("{kind}\n{template}\n{}", caret_line(.template, *.position))]
#[diagnostic(code(rrtt::template_syntax))]
pub struct TemplateSyntaxError {
	/// What went wrong.
	pub kind: SyntaxErrorKind,
	/// The full template being compiled.
	#[source_code]
	pub template: String,
	/// Byte offset of the offending token, or the template length for
	/// [`SyntaxErrorKind::UnclosedTag`].
	pub position: usize,
	#[label("here")]
	span: SourceSpan,
}

impl TemplateSyntaxError {
	pub fn new(
		kind: SyntaxErrorKind,
		template: impl Into<String>,
		position: usize,
		length: usize,
	) -> Self {
		Self {
			kind,
			template: template.into(),
			position,
			span: (position, length).into(),
		}
	}

	/// The 1-indexed line and column of the error position.
	pub fn line_column(&self) -> (usize, usize) {
		let before = self.template.get(..self.position).unwrap_or(&self.template);
		let line = before.matches('\n').count() + 1;
		let column = before
			.rsplit_once('\n')
			.map_or(before, |(_, last)| last)
			.chars()
			.count() + 1;

		(line, column)
	}
}

/// Dashes up to the error position followed by a caret.
fn caret_line(template: &str, position: usize) -> String {
	let width = template
		.get(..position)
		.map_or(position, |before| before.chars().count());

	format!("{}^", "-".repeat(width))
}

pub type RrttResult<T> = Result<T, RrttError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
