use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use float_cmp::approx_eq;

use crate::Config;
use crate::parser::Node;
use crate::parser::Tree;

/// A numeric context value. Placeholders render it in its canonical decimal
/// form: `5`, `1.5`, `NaN`, `Infinity`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
	Int(i64),
	Float(f64),
}

impl Number {
	pub fn as_f64(self) -> f64 {
		match self {
			Self::Int(value) => value as f64,
			Self::Float(value) => value,
		}
	}
}

impl Eq for Number {}
impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Int(value), Self::Int(other_value)) => value == other_value,
			_ => approx_eq!(f64, self.as_f64(), other.as_f64(), ulps = 2),
		}
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self {
			Self::Int(value) => write!(f, "{value}"),
			Self::Float(value) if value.is_nan() => write!(f, "NaN"),
			Self::Float(value) if value.is_infinite() => {
				if value.is_sign_negative() {
					write!(f, "-Infinity")
				} else {
					write!(f, "Infinity")
				}
			}
			Self::Float(value) if value == 0.0 => write!(f, "0"),
			Self::Float(value) => write!(f, "{value}"),
		}
	}
}

impl From<i64> for Number {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Number {
	fn from(value: i32) -> Self {
		Self::Int(value.into())
	}
}

impl From<u32> for Number {
	fn from(value: u32) -> Self {
		Self::Int(value.into())
	}
}

impl From<f64> for Number {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<f32> for Number {
	fn from(value: f32) -> Self {
		Self::Float(value.into())
	}
}

/// A context-supplied rendering function.
///
/// Opening tags call [`Renderer::render_element`] with their rendered children
/// and self-closing tags call [`Renderer::render_leaf`]. Either kind of
/// renderer can serve either kind of tag: an element renderer used for a
/// self-closing tag receives no children, and a leaf renderer used for an
/// opening tag ignores them.
pub enum Renderer<T> {
	/// `(children, index) -> T`
	Element(Arc<dyn Fn(Vec<T>, usize) -> T + Send + Sync>),
	/// `(index) -> T`
	Leaf(Arc<dyn Fn(usize) -> T + Send + Sync>),
}

impl<T> Renderer<T> {
	pub fn render_element(&self, children: Vec<T>, index: usize) -> T {
		match self {
			Self::Element(render) => render(children, index),
			Self::Leaf(render) => render(index),
		}
	}

	pub fn render_leaf(&self, index: usize) -> T {
		match self {
			Self::Element(render) => render(Vec::new(), index),
			Self::Leaf(render) => render(index),
		}
	}
}

impl<T> Clone for Renderer<T> {
	fn clone(&self) -> Self {
		match self {
			Self::Element(render) => Self::Element(Arc::clone(render)),
			Self::Leaf(render) => Self::Leaf(Arc::clone(render)),
		}
	}
}

impl<T> fmt::Debug for Renderer<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Element(_) => write!(f, "Renderer::Element(..)"),
			Self::Leaf(_) => write!(f, "Renderer::Leaf(..)"),
		}
	}
}

/// A value stored in a [`Context`].
#[derive(Debug, Clone)]
pub enum Value<T> {
	/// Text merged into the surrounding literal text.
	Text(String),
	/// A number merged into the surrounding literal text in decimal form.
	Number(Number),
	/// A function that renders tags of this name.
	Renderer(Renderer<T>),
	/// An output value emitted as-is by placeholders.
	Opaque(T),
}

impl<T> Value<T> {
	pub fn element<F>(render: F) -> Self
	where
		F: Fn(Vec<T>, usize) -> T + Send + Sync + 'static,
	{
		Self::Renderer(Renderer::Element(Arc::new(render)))
	}

	pub fn leaf<F>(render: F) -> Self
	where
		F: Fn(usize) -> T + Send + Sync + 'static,
	{
		Self::Renderer(Renderer::Leaf(Arc::new(render)))
	}

	pub fn opaque(value: T) -> Self {
		Self::Opaque(value)
	}
}

impl<T> From<&str> for Value<T> {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl<T> From<String> for Value<T> {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl<T> From<Number> for Value<T> {
	fn from(value: Number) -> Self {
		Self::Number(value)
	}
}

impl<T> From<i64> for Value<T> {
	fn from(value: i64) -> Self {
		Self::Number(value.into())
	}
}

impl<T> From<i32> for Value<T> {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}

impl<T> From<u32> for Value<T> {
	fn from(value: u32) -> Self {
		Self::Number(value.into())
	}
}

impl<T> From<f64> for Value<T> {
	fn from(value: f64) -> Self {
		Self::Number(value.into())
	}
}

impl<T> From<Renderer<T>> for Value<T> {
	fn from(value: Renderer<T>) -> Self {
		Self::Renderer(value)
	}
}

/// The result of looking a name up in a [`Context`].
#[derive(Debug)]
pub enum Reference<'a, T> {
	Text(&'a str),
	Number(Number),
	Callable(&'a Renderer<T>),
	Opaque(&'a T),
	Absent,
}

/// Named values and renderers supplied to a single render call.
#[derive(Debug, Clone)]
pub struct Context<T> {
	values: HashMap<String, Value<T>>,
}

impl<T> Default for Context<T> {
	fn default() -> Self {
		Self {
			values: HashMap::new(),
		}
	}
}

impl<T> Context<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a value, returning the value previously stored under `name`.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value<T>>) -> Option<Value<T>> {
		self.values.insert(name.into(), value.into())
	}

	#[must_use]
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value<T>>) -> Self {
		self.insert(name, value);
		self
	}

	/// Register a renderer for `<name>…</name>` tags.
	#[must_use]
	pub fn element<F>(self, name: impl Into<String>, render: F) -> Self
	where
		F: Fn(Vec<T>, usize) -> T + Send + Sync + 'static,
	{
		self.with(name, Value::element(render))
	}

	/// Register a renderer for `<name/>` tags.
	#[must_use]
	pub fn leaf<F>(self, name: impl Into<String>, render: F) -> Self
	where
		F: Fn(usize) -> T + Send + Sync + 'static,
	{
		self.with(name, Value::leaf(render))
	}

	#[must_use]
	pub fn opaque(self, name: impl Into<String>, value: T) -> Self {
		self.with(name, Value::Opaque(value))
	}

	pub fn get(&self, name: &str) -> Option<&Value<T>> {
		self.values.get(name)
	}

	pub fn resolve(&self, name: &str) -> Reference<'_, T> {
		match self.values.get(name) {
			None => Reference::Absent,
			Some(Value::Text(text)) => Reference::Text(text),
			Some(Value::Number(number)) => Reference::Number(*number),
			Some(Value::Renderer(renderer)) => Reference::Callable(renderer),
			Some(Value::Opaque(value)) => Reference::Opaque(value),
		}
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl<T, K, V> FromIterator<(K, V)> for Context<T>
where
	K: Into<String>,
	V: Into<Value<T>>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			values: iter
				.into_iter()
				.map(|(name, value)| (name.into(), value.into()))
				.collect(),
		}
	}
}

/// Render a tree against a context.
///
/// Adjacent literal text and text-like placeholder values are merged and
/// passed through the configured text wrapper as one unit. Every other output
/// value, and every function call, receives the index it will take in the
/// output of its level. Names missing from the context go to the missing
/// reference handler when one is configured and are skipped otherwise.
///
/// A placeholder bound to a [`Renderer`] never calls it and emits nothing,
/// since a function is not a `T`; it only ends the current text run.
pub fn inject<T: Clone>(tree: &Tree, config: &Config<T>, context: &Context<T>) -> Vec<T> {
	inject_nodes(&tree.children, config, context)
}

fn inject_nodes<'a, T: Clone>(
	nodes: &'a [Node],
	config: &Config<T>,
	context: &'a Context<T>,
) -> Vec<T> {
	let mut level = Level::new(config);

	for node in nodes {
		match node {
			Node::Text(text) => level.queue(Cow::Borrowed(text)),
			Node::Placeholder { name } => {
				match context.resolve(name) {
					Reference::Text(text) => level.queue(Cow::Borrowed(text)),
					Reference::Number(number) => level.queue(Cow::Owned(number.to_string())),
					Reference::Opaque(value) => {
						level.flush();
						level.push(value.clone());
					}
					Reference::Callable(_) => {
						// Placeholders never call renderers and a function is
						// not an output value, so only the text run ends here.
						tracing::trace!(%name, "renderer referenced by a placeholder");
						level.flush();
					}
					Reference::Absent => level.missing(name, Vec::new()),
				}
			}
			Node::SelfClosingTag { name } => {
				let index = level.flush();
				match context.resolve(name) {
					Reference::Callable(renderer) => level.push(renderer.render_leaf(index)),
					Reference::Text(_)
					| Reference::Number(_)
					| Reference::Opaque(_)
					| Reference::Absent => level.missing(name, Vec::new()),
				}
			}
			Node::Element(element) => {
				let index = level.flush();
				let children = inject_nodes(&element.children, config, context);
				match context.resolve(&element.name) {
					Reference::Callable(renderer) => {
						level.push(renderer.render_element(children, index));
					}
					Reference::Text(_)
					| Reference::Number(_)
					| Reference::Opaque(_)
					| Reference::Absent => level.missing(&element.name, children),
				}
			}
		}
	}

	level.finish()
}

/// Output and pending text of one tree level.
struct Level<'a, 'c, T> {
	config: &'c Config<T>,
	output: Vec<T>,
	pending: Vec<Cow<'a, str>>,
}

impl<'a, 'c, T> Level<'a, 'c, T> {
	fn new(config: &'c Config<T>) -> Self {
		Self {
			config,
			output: Vec::new(),
			pending: Vec::new(),
		}
	}

	fn queue(&mut self, text: Cow<'a, str>) {
		self.pending.push(text);
	}

	/// Wrap and emit the pending text, if any. Returns the index the next
	/// output value will take.
	fn flush(&mut self) -> usize {
		if !self.pending.is_empty() {
			let text = self.pending.concat();
			self.pending.clear();
			let index = self.output.len();
			self.output.push((self.config.text_wrapper)(text, index));
		}

		self.output.len()
	}

	fn push(&mut self, value: T) {
		self.output.push(value);
	}

	/// Route an unresolved name to the missing reference handler.
	fn missing(&mut self, name: &str, children: Vec<T>) {
		let Some(handler) = &self.config.missing_reference_handler else {
			return;
		};

		let index = self.flush();
		tracing::trace!(%name, index, "missing reference");
		self.output.push(handler(name, children, index));
	}

	fn finish(mut self) -> Vec<T> {
		self.flush();
		self.output
	}
}
