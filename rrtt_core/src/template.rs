use std::sync::Arc;

use crate::Config;
use crate::Context;
use crate::TemplateSyntaxError;
use crate::engine::inject;
use crate::parser::Tree;
use crate::parser::parse;

/// A compiled template, ready to be rendered any number of times.
///
/// The tree and configuration are shared read-only, so cloning is cheap and a
/// template can be rendered from several threads at once when `T` allows it.
pub struct Template<T> {
	tree: Arc<Tree>,
	config: Arc<Config<T>>,
}

impl<T: Clone> Template<T> {
	/// Render against `context`, producing a fresh output sequence.
	pub fn render(&self, context: &Context<T>) -> Vec<T> {
		inject(&self.tree, &self.config, context)
	}

	/// Turn the template into a plain render function.
	pub fn into_render_fn(self) -> impl Fn(&Context<T>) -> Vec<T> + Send + Sync {
		move |context: &Context<T>| self.render(context)
	}
}

impl<T> Template<T> {
	pub fn tree(&self) -> &Tree {
		&self.tree
	}

	pub fn config(&self) -> &Config<T> {
		&self.config
	}
}

impl<T> Clone for Template<T> {
	fn clone(&self) -> Self {
		Self {
			tree: Arc::clone(&self.tree),
			config: Arc::clone(&self.config),
		}
	}
}

impl<T> std::fmt::Debug for Template<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Template")
			.field("tree", &self.tree)
			.field("config", &self.config)
			.finish()
	}
}

/// Compile `template` with the default configuration.
///
/// ```rust
/// use rrtt_core::Context;
/// use rrtt_core::compile;
///
/// let template = compile::<String>("{count} apples").unwrap();
/// let output = template.render(&Context::new().with("count", 5));
///
/// assert_eq!(output, vec!["5 apples".to_string()]);
/// ```
pub fn compile<T>(template: &str) -> Result<Template<T>, TemplateSyntaxError>
where
	T: From<String> + 'static,
{
	compile_with(template, Config::default())
}

/// Compile `template` with the given configuration. Syntax errors surface
/// here, never at render time.
#[tracing::instrument(level = "debug", skip_all, fields(length = template.len()))]
pub fn compile_with<T: 'static>(
	template: &str,
	config: impl Into<Arc<Config<T>>>,
) -> Result<Template<T>, TemplateSyntaxError> {
	let config = config.into();
	let tree = parse(template, &config)?;
	tracing::debug!(depth = tree.depth(), nodes = tree.len(), "compiled template");

	Ok(Template {
		tree: Arc::new(tree),
		config,
	})
}
