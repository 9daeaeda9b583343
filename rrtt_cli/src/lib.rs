use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use rrtt_core::Context;
use rrtt_core::Node;
use rrtt_core::RrttError;
use rrtt_core::RrttResult;
use rrtt_core::Tree;
use serde_json::Value;
use serde_json::json;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Compile tag-and-placeholder templates into JSON element trees.",
	long_about = "rrtt compiles templates such as `Hello <b>{name}</b>!<br/>` once and renders \
	              them against a context of values.\n\nThe command line front end renders \
	              every tag as a JSON object, which makes it handy for inspecting how a \
	              template is structured.\n\nQuick start:\n  rrtt check  <file>  Report syntax \
	              errors\n  rrtt render <file>  Print the rendered output\n  rrtt tokens <file>  \
	              Print the token list"
)]
pub struct RrttCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. Relative file arguments and the
	/// `rrtt.toml` lookup start here.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Render a template and print the output as JSON.
	///
	/// Every tag becomes `{"tag": name, "children": [...], "key": index}`
	/// unless the context defines the name. Placeholders are filled from the
	/// context; missing ones are left out.
	Render {
		/// The template file.
		template: PathBuf,

		/// A JSON object with the values for placeholders. Strings and
		/// numbers join the surrounding text, anything else is emitted as-is.
		#[arg(long, short)]
		context: Option<PathBuf>,

		/// Wrap text as `{"text": ..., "key": index}` instead of plain
		/// strings.
		#[arg(long, default_value_t = false)]
		keyed: bool,
	},
	/// Compile a template and report syntax errors.
	///
	/// Exits with status code 1 when the template has unbalanced tags.
	Check {
		/// The template file.
		template: PathBuf,
	},
	/// Print the tokens of a template as JSON.
	Tokens {
		/// The template file.
		template: PathBuf,
	},
}

/// Build a render context from a JSON object.
pub fn json_context(value: Value) -> RrttResult<Context<Value>> {
	let Value::Object(entries) = value else {
		return Err(RrttError::Context(format!(
			"expected a JSON object, found {}",
			kind_of(&value)
		)));
	};

	let mut context = Context::new();

	for (name, value) in entries {
		match value {
			Value::String(text) => context.insert(name, text),
			Value::Number(number) => {
				match number.as_i64() {
					Some(int) => context.insert(name, int),
					None => context.insert(name, number.as_f64().unwrap_or(f64::NAN)),
				}
			}
			other => context.insert(name, rrtt_core::Value::Opaque(other)),
		};
	}

	Ok(context)
}

/// Register a generic element renderer for every tag in `tree` that the
/// context doesn't define.
pub fn with_tag_renderers(mut context: Context<Value>, tree: &Tree) -> Context<Value> {
	for name in tag_names(tree) {
		if context.get(&name).is_some() {
			continue;
		}

		let tag = name.clone();
		context.insert(
			name,
			rrtt_core::Value::element(move |children, index| {
				json!({ "tag": tag, "children": children, "key": index })
			}),
		);
	}

	context
}

/// Every tag name used in `tree`, sorted.
pub fn tag_names(tree: &Tree) -> BTreeSet<String> {
	let mut names = BTreeSet::new();
	collect_tag_names(&tree.children, &mut names);

	names
}

fn collect_tag_names(nodes: &[Node], names: &mut BTreeSet<String>) {
	for node in nodes {
		match node {
			Node::Element(element) => {
				names.insert(element.name.clone());
				collect_tag_names(&element.children, names);
			}
			Node::SelfClosingTag { name } => {
				names.insert(name.clone());
			}
			Node::Text(_) | Node::Placeholder { .. } => {}
		}
	}
}

/// The text wrapper used by `render`.
pub fn wrap_text(keyed: bool) -> impl Fn(String, usize) -> Value + Send + Sync + 'static {
	move |text, index| {
		if keyed {
			json!({ "text": text, "key": index })
		} else {
			Value::String(text)
		}
	}
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
