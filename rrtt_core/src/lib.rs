//! `rrtt_core` is the core library of rrtt, a small compiler from tag-and-placeholder
//! templates to trees of output values. A template such as
//! `Hey, {username},<br/> <p>checkout new <link>features</link>!</p>` is compiled once and
//! rendered against any number of contexts. The functions in each context decide what the
//! output looks like: strings, virtual DOM nodes, JSON, or anything else.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template string
//!   → Lexer (splits the text into tokens by an ordered category table)
//!   → Parser (matches opening and closing tags into a Tree, reports syntax errors)
//!   → Engine (renders the Tree against a Context, merging adjacent text)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — The [`Config`] value: text wrapper, name extraction, category patterns,
//!   tag pair matching, and the missing reference handler. Also loads the template syntax
//!   from `rrtt.toml`.
//!
//! ## Key Types
//!
//! - [`Template`] — A compiled template. Call [`Template::render`] with a [`Context`].
//! - [`Context`] — Named [`Value`]s for one render: text, numbers, renderers, or opaque
//!   output values.
//! - [`Tree`] and [`Node`] — The compiled form of a template.
//! - [`Token`] and [`TokenKind`] — The output of [`tokenize`].
//! - [`TemplateSyntaxError`] — Raised by [`build_tree`] and [`compile`] for unbalanced tags.
//!
//! ## Quick Start
//!
//! ```rust
//! use rrtt_core::Context;
//! use rrtt_core::compile;
//!
//! let template = compile::<String>("<b>Hello</b>, {name}!").unwrap();
//! let context = Context::new()
//! 	.with("name", "world")
//! 	.element("b", |children: Vec<String>, _| format!("**{}**", children.concat()));
//!
//! assert_eq!(template.render(&context), vec![
//! 	"**Hello**".to_string(),
//! 	", world!".to_string(),
//! ]);
//! ```

pub use config::Config;
pub use config::ConfigOverrides;
pub use engine::*;
pub use error::*;
pub use lexer::*;
pub use parser::*;
pub use template::*;
pub use tokens::*;

pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
mod lexer;
mod parser;
mod template;
mod tokens;

#[cfg(test)]
mod __fixtures;
