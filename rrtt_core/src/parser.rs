use derive_more::Deref;

use crate::Config;
use crate::SyntaxErrorKind;
use crate::TemplateSyntaxError;
use crate::lexer::tokenize;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// A node of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	/// Literal text.
	Text(String),
	/// `{name}`, substituted from the context.
	Placeholder { name: String },
	/// `<name/>`, a leaf rendered by the context.
	SelfClosingTag { name: String },
	/// `<name>…</name>` with its children.
	Element(Element),
}

/// A matched and closed `<name>…</name>` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub name: String,
	/// The raw opening token, e.g. `<link>`, as seen by the tag pair matcher.
	pub raw_opening: String,
	pub children: Vec<Node>,
}

impl Element {
	/// Nesting depth of this element, counting itself.
	pub fn depth(&self) -> usize {
		1 + max_depth(&self.children)
	}
}

/// The root of a compiled template: its top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Tree {
	pub children: Vec<Node>,
}

impl Tree {
	/// The deepest element nesting in the tree. Zero when there are no tags.
	pub fn depth(&self) -> usize {
		max_depth(&self.children)
	}
}

fn max_depth(nodes: &[Node]) -> usize {
	nodes
		.iter()
		.map(|node| {
			match node {
				Node::Element(element) => element.depth(),
				Node::Text(_) | Node::Placeholder { .. } | Node::SelfClosingTag { .. } => 0,
			}
		})
		.max()
		.unwrap_or(0)
}

/// Tokenize and build the tree of `template` in one go.
pub fn parse<T: 'static>(template: &str, config: &Config<T>) -> Result<Tree, TemplateSyntaxError> {
	let tokens = tokenize(&config.categories(), template);
	build_tree(&tokens, config, template)
}

/// Build a tree from tokens, checking that every tag is closed by a matching
/// closing tag.
///
/// `template` is only used for error reporting; positions come from the
/// tokens.
pub fn build_tree<T>(
	tokens: &[Token],
	config: &Config<T>,
	template: &str,
) -> Result<Tree, TemplateSyntaxError> {
	let mut root: Vec<Node> = vec![];
	let mut open: Vec<Element> = vec![];

	for token in tokens {
		match token.kind {
			TokenKind::String => {
				current(&mut root, &mut open).push(Node::Text(token.raw.clone()));
			}
			TokenKind::TextPlaceholder => {
				let name = config.extractors.extract(token.kind, &token.raw);
				current(&mut root, &mut open).push(Node::Placeholder { name });
			}
			TokenKind::SelfClosingTag => {
				let name = config.extractors.extract(token.kind, &token.raw);
				current(&mut root, &mut open).push(Node::SelfClosingTag { name });
			}
			TokenKind::OpeningTag => {
				open.push(Element {
					name: config.extractors.extract(token.kind, &token.raw),
					raw_opening: token.raw.clone(),
					children: vec![],
				});
			}
			TokenKind::ClosingTag => {
				let Some(element) = open.pop() else {
					return Err(syntax_error(
						SyntaxErrorKind::UnmatchedClosingTag,
						template,
						token,
					));
				};

				if !(config.tag_pair_matcher)(&element.raw_opening, &token.raw, config) {
					return Err(syntax_error(
						SyntaxErrorKind::MismatchedClosingTag,
						template,
						token,
					));
				}

				current(&mut root, &mut open).push(Node::Element(element));
			}
		}
	}

	if let Some(element) = open.last() {
		tracing::trace!(tag = %element.name, "template ended with an open tag");
		return Err(TemplateSyntaxError::new(
			SyntaxErrorKind::UnclosedTag,
			template,
			template.len(),
			0,
		));
	}

	Ok(Tree { children: root })
}

/// The children of the innermost open element, or the root.
fn current<'a>(root: &'a mut Vec<Node>, open: &'a mut [Element]) -> &'a mut Vec<Node> {
	match open.last_mut() {
		Some(element) => &mut element.children,
		None => root,
	}
}

fn syntax_error(kind: SyntaxErrorKind, template: &str, token: &Token) -> TemplateSyntaxError {
	TemplateSyntaxError::new(kind, template, token.position, token.raw.len())
}
