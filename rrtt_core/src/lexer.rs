use std::ops::Range;

use crate::tokens::Category;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// Split a template into positioned tokens.
///
/// The first category claims every non-overlapping match of its pattern; the
/// spans between those matches are handed to the remaining categories in
/// turn. Whatever no category claims becomes [`TokenKind::String`]. This never
/// fails: text that looks like broken markup is simply literal text.
pub fn tokenize(categories: &[Category], template: &str) -> Vec<Token> {
	let mut tokens = Vec::new();
	claim(categories, template, 0..template.len(), &mut tokens);
	tracing::trace!(count = tokens.len(), "tokenized template");

	tokens
}

fn claim(categories: &[Category], source: &str, span: Range<usize>, tokens: &mut Vec<Token>) {
	let Some((category, rest)) = categories.split_first() else {
		if !span.is_empty() {
			tokens.push(Token::new(TokenKind::String, &source[span.clone()], span.start));
		}
		return;
	};

	let mut cursor = span.start;

	for found in category.pattern.find_iter(&source[span.clone()]) {
		// An empty match would produce a zero-width token.
		if found.is_empty() {
			continue;
		}

		let start = span.start + found.start();
		let end = span.start + found.end();

		claim(rest, source, cursor..start, tokens);
		tokens.push(Token::new(category.kind, found.as_str(), start));
		cursor = end;
	}

	claim(rest, source, cursor..span.end, tokens);
}
