use serde_json::Value as Json;
use serde_json::json;

use crate::Config;
use crate::Context;
use crate::Element;
use crate::Node;
use crate::Token;
use crate::TokenKind;
use crate::Tree;

pub const GREETING: &str = "Hey, {username},<br/> <p>checkout new <link>features</link>!</p>";
pub const INDEXED: &str = "test <foo>indexed</foo>output<br/>t";

pub fn json_config() -> Config<Json> {
	Config::default()
}

/// Wraps text as `{tag: "span", text, key}` so indices are visible.
pub fn keyed_config() -> Config<Json> {
	Config::default().with_text_wrapper(|text, index| {
		json!({
			"tag": "span",
			"text": text,
			"key": index,
		})
	})
}

pub fn missing_param_config() -> Config<Json> {
	keyed_config().with_missing_reference_handler(|name, _children, index| {
		json!({
			"tag": "missingParam",
			"paramName": name,
			"key": index,
		})
	})
}

pub fn greeting_tokens() -> Vec<Token> {
	vec![
		Token::new(TokenKind::String, "Hey, ", 0),
		Token::new(TokenKind::TextPlaceholder, "{username}", 5),
		Token::new(TokenKind::String, ",", 15),
		Token::new(TokenKind::SelfClosingTag, "<br/>", 16),
		Token::new(TokenKind::String, " ", 21),
		Token::new(TokenKind::OpeningTag, "<p>", 22),
		Token::new(TokenKind::String, "checkout new ", 25),
		Token::new(TokenKind::OpeningTag, "<link>", 38),
		Token::new(TokenKind::String, "features", 44),
		Token::new(TokenKind::ClosingTag, "</link>", 52),
		Token::new(TokenKind::String, "!", 59),
		Token::new(TokenKind::ClosingTag, "</p>", 60),
	]
}

pub fn greeting_tree() -> Tree {
	Tree {
		children: vec![
			text("Hey, "),
			Node::Placeholder {
				name: "username".into(),
			},
			text(","),
			Node::SelfClosingTag { name: "br".into() },
			text(" "),
			element("p", vec![
				text("checkout new "),
				element("link", vec![text("features")]),
				text("!"),
			]),
		],
	}
}

pub fn greeting_context() -> Context<Json> {
	Context::new()
		.with("username", "anmi")
		.leaf("br", |_| json!({ "nextLineComponent": true }))
		.element("p", |children, _| {
			json!({
				"paragraphComponent": true,
				"children": children,
			})
		})
		.element("link", |children, _| {
			json!({
				"linkComponent": true,
				"text": children,
			})
		})
}

/// Renderers that record the index they were called with.
pub fn indexed_context() -> Context<Json> {
	Context::new()
		.element("foo", |children, index| {
			json!({
				"tag": "foo",
				"children": children,
				"key": index,
			})
		})
		.leaf("br", |index| json!({ "tag": "br", "key": index }))
}

pub fn text(value: &str) -> Node {
	Node::Text(value.to_string())
}

pub fn element(name: &str, children: Vec<Node>) -> Node {
	Node::Element(Element {
		name: name.to_string(),
		raw_opening: format!("<{name}>"),
		children,
	})
}
