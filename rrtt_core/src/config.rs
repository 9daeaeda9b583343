use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::RrttError;
use crate::RrttResult;
use crate::tokens::Category;
use crate::tokens::TokenKind;

/// Default pattern for opening tags: `<name>`.
pub const DEFAULT_OPENING_TAG: &str = r"<[^>/]+>";
/// Default pattern for closing tags: `</name>`.
pub const DEFAULT_CLOSING_TAG: &str = r"</[^>/]+>";
/// Default pattern for self-closing tags: `<name/>`.
pub const DEFAULT_SELF_CLOSING_TAG: &str = r"<[^>/]+/>";
/// Default pattern for text placeholders: `{name}`.
pub const DEFAULT_TEXT_PLACEHOLDER: &str = r"\{[^{}]+\}";

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["rrtt.toml", ".rrtt.toml", ".config/rrtt.toml"];

static OPENING_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(DEFAULT_OPENING_TAG).unwrap());
static CLOSING_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(DEFAULT_CLOSING_TAG).unwrap());
static SELF_CLOSING_TAG: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(DEFAULT_SELF_CLOSING_TAG).unwrap());
static TEXT_PLACEHOLDER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(DEFAULT_TEXT_PLACEHOLDER).unwrap());

/// Wraps a run of coalesced literal text, receiving the output index it will
/// occupy.
pub type TextWrapper<T> = Arc<dyn Fn(String, usize) -> T + Send + Sync>;
/// Turns the raw text of a tag or placeholder token into the name used for
/// context lookup.
pub type NameExtractor = Arc<dyn Fn(&str) -> String + Send + Sync>;
/// Decides whether a raw closing tag closes the raw opening tag currently on
/// top of the stack.
pub type TagPairMatcher<T> = Arc<dyn Fn(&str, &str, &Config<T>) -> bool + Send + Sync>;
/// Fallback for names missing from the context: `(name, children, index)`.
pub type MissingReferenceHandler<T> = Arc<dyn Fn(&str, Vec<T>, usize) -> T + Send + Sync>;

/// Name extraction rules, one per markup kind.
#[derive(Clone)]
pub struct NameExtractors {
	pub opening_tag: NameExtractor,
	pub closing_tag: NameExtractor,
	pub self_closing_tag: NameExtractor,
	pub text_placeholder: NameExtractor,
}

impl NameExtractors {
	/// Extract the name of a raw token of the given kind. Literal text is
	/// returned unchanged.
	pub fn extract(&self, kind: TokenKind, raw: &str) -> String {
		match kind {
			TokenKind::String => raw.to_string(),
			TokenKind::OpeningTag => (self.opening_tag)(raw),
			TokenKind::ClosingTag => (self.closing_tag)(raw),
			TokenKind::SelfClosingTag => (self.self_closing_tag)(raw),
			TokenKind::TextPlaceholder => (self.text_placeholder)(raw),
		}
	}

	fn set(&mut self, kind: TokenKind, extractor: NameExtractor) {
		match kind {
			TokenKind::String => {}
			TokenKind::OpeningTag => self.opening_tag = extractor,
			TokenKind::ClosingTag => self.closing_tag = extractor,
			TokenKind::SelfClosingTag => self.self_closing_tag = extractor,
			TokenKind::TextPlaceholder => self.text_placeholder = extractor,
		}
	}
}

impl Default for NameExtractors {
	fn default() -> Self {
		Self {
			opening_tag: delimiter_extractor(1, 1),
			closing_tag: delimiter_extractor(2, 1),
			self_closing_tag: delimiter_extractor(1, 2),
			text_placeholder: delimiter_extractor(1, 1),
		}
	}
}

impl fmt::Debug for NameExtractors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NameExtractors").finish_non_exhaustive()
	}
}

/// Drop `prefix` characters from the front and `suffix` characters from the
/// back of `raw`. Too-short input yields an empty name.
pub fn strip_delimiters(raw: &str, prefix: usize, suffix: usize) -> String {
	let count = raw.chars().count();

	if count < prefix + suffix {
		return String::new();
	}

	raw.chars().skip(prefix).take(count - prefix - suffix).collect()
}

fn delimiter_extractor(prefix: usize, suffix: usize) -> NameExtractor {
	Arc::new(move |raw| strip_delimiters(raw, prefix, suffix))
}

/// Use the `name` capture group of `pattern`, falling back to `fallback` when
/// the raw text doesn't match.
fn capture_extractor(pattern: Regex, fallback: NameExtractor) -> NameExtractor {
	Arc::new(move |raw| {
		pattern
			.captures(raw)
			.and_then(|captures| captures.name("name"))
			.map_or_else(|| fallback(raw), |name| name.as_str().to_string())
	})
}

fn has_name_group(pattern: &Regex) -> bool {
	pattern.capture_names().flatten().any(|name| name == "name")
}

/// The default tag pair matcher: the extracted names must be equal.
pub fn names_match<T>(opening: &str, closing: &str, config: &Config<T>) -> bool {
	config.extractors.extract(TokenKind::OpeningTag, opening)
		== config.extractors.extract(TokenKind::ClosingTag, closing)
}

/// Everything that shapes how a template is tokenized, built, and rendered
/// into a sequence of `T`.
///
/// A configuration is a plain value. Derive variants with [`Config::merge`] or
/// the `with_*` helpers; nothing is shared or mutated behind the scenes.
pub struct Config<T> {
	/// Wraps each run of coalesced literal text.
	pub text_wrapper: TextWrapper<T>,
	pub extractors: NameExtractors,
	/// Pattern for opening tags. Always first in the category table.
	pub opening_tag: Regex,
	/// Pattern for closing tags. Always second in the category table.
	pub closing_tag: Regex,
	/// Further categories in precedence order, after the opening and closing
	/// tags. Defaults to self-closing tags then text placeholders.
	pub additional_categories: Vec<Category>,
	pub tag_pair_matcher: TagPairMatcher<T>,
	pub missing_reference_handler: Option<MissingReferenceHandler<T>>,
}

impl<T: 'static> Config<T> {
	/// The default syntax with a custom text wrapper. Use this when `T` can't
	/// be built from a `String`.
	pub fn new<F>(text_wrapper: F) -> Self
	where
		F: Fn(String, usize) -> T + Send + Sync + 'static,
	{
		Self {
			text_wrapper: Arc::new(text_wrapper),
			extractors: NameExtractors::default(),
			opening_tag: OPENING_TAG.clone(),
			closing_tag: CLOSING_TAG.clone(),
			additional_categories: default_additional_categories(),
			tag_pair_matcher: Arc::new(names_match::<T>),
			missing_reference_handler: None,
		}
	}

	/// Build a configuration from a textual [`Syntax`], compiling every
	/// pattern. Patterns with a `name` capture group also drive name
	/// extraction for their kind; the first such category of a kind wins.
	pub fn from_syntax<F>(syntax: &Syntax, text_wrapper: F) -> RrttResult<Self>
	where
		F: Fn(String, usize) -> T + Send + Sync + 'static,
	{
		let mut config = Self::new(text_wrapper);

		if let Some(pattern) = &syntax.opening_tag {
			config.opening_tag = compile_pattern(TokenKind::OpeningTag, pattern)?;
		}

		if let Some(pattern) = &syntax.closing_tag {
			config.closing_tag = compile_pattern(TokenKind::ClosingTag, pattern)?;
		}

		if let Some(categories) = &syntax.categories {
			config.additional_categories = categories
				.iter()
				.map(|source| {
					compile_pattern(source.kind, &source.pattern)
						.map(|pattern| Category::new(source.kind, pattern))
				})
				.collect::<RrttResult<_>>()?;
		}

		let defaults = NameExtractors::default();
		let mut named = vec![
			(TokenKind::OpeningTag, config.opening_tag.clone()),
			(TokenKind::ClosingTag, config.closing_tag.clone()),
		];
		named.extend(
			config
				.additional_categories
				.iter()
				.map(|category| (category.kind, category.pattern.clone())),
		);

		// Reverse so the earliest category of each kind is applied last.
		for (kind, pattern) in named.into_iter().rev() {
			if has_name_group(&pattern) {
				let fallback = match kind {
					TokenKind::ClosingTag => defaults.closing_tag.clone(),
					TokenKind::SelfClosingTag => defaults.self_closing_tag.clone(),
					TokenKind::TextPlaceholder => defaults.text_placeholder.clone(),
					TokenKind::OpeningTag | TokenKind::String => defaults.opening_tag.clone(),
				};
				config.extractors.set(kind, capture_extractor(pattern, fallback));
			}
		}

		Ok(config)
	}

	/// The full category table in precedence order.
	pub fn categories(&self) -> Vec<Category> {
		let mut categories = vec![
			Category::new(TokenKind::OpeningTag, self.opening_tag.clone()),
			Category::new(TokenKind::ClosingTag, self.closing_tag.clone()),
		];
		categories.extend(self.additional_categories.iter().cloned());

		categories
	}

	/// Produce a new configuration with every field set in `overrides`
	/// replaced. `self` is left untouched.
	#[must_use]
	pub fn merge(&self, overrides: ConfigOverrides<T>) -> Self {
		let mut config = self.clone();

		if let Some(text_wrapper) = overrides.text_wrapper {
			config.text_wrapper = text_wrapper;
		}
		if let Some(extractor) = overrides.opening_tag_name {
			config.extractors.opening_tag = extractor;
		}
		if let Some(extractor) = overrides.closing_tag_name {
			config.extractors.closing_tag = extractor;
		}
		if let Some(extractor) = overrides.self_closing_tag_name {
			config.extractors.self_closing_tag = extractor;
		}
		if let Some(extractor) = overrides.text_placeholder_name {
			config.extractors.text_placeholder = extractor;
		}
		if let Some(pattern) = overrides.opening_tag {
			config.opening_tag = pattern;
		}
		if let Some(pattern) = overrides.closing_tag {
			config.closing_tag = pattern;
		}
		if let Some(categories) = overrides.additional_categories {
			config.additional_categories = categories;
		}
		if let Some(matcher) = overrides.tag_pair_matcher {
			config.tag_pair_matcher = matcher;
		}
		if let Some(handler) = overrides.missing_reference_handler {
			config.missing_reference_handler = Some(handler);
		}

		config
	}

	#[must_use]
	pub fn with_text_wrapper<F>(self, text_wrapper: F) -> Self
	where
		F: Fn(String, usize) -> T + Send + Sync + 'static,
	{
		Self {
			text_wrapper: Arc::new(text_wrapper),
			..self
		}
	}

	#[must_use]
	pub fn with_missing_reference_handler<F>(self, handler: F) -> Self
	where
		F: Fn(&str, Vec<T>, usize) -> T + Send + Sync + 'static,
	{
		Self {
			missing_reference_handler: Some(Arc::new(handler)),
			..self
		}
	}

	#[must_use]
	pub fn with_tag_pair_matcher<F>(self, matcher: F) -> Self
	where
		F: Fn(&str, &str, &Config<T>) -> bool + Send + Sync + 'static,
	{
		Self {
			tag_pair_matcher: Arc::new(matcher),
			..self
		}
	}
}

impl<T: From<String> + 'static> Default for Config<T> {
	fn default() -> Self {
		Self::new(|text, _| T::from(text))
	}
}

impl<T> Clone for Config<T> {
	fn clone(&self) -> Self {
		Self {
			text_wrapper: Arc::clone(&self.text_wrapper),
			extractors: self.extractors.clone(),
			opening_tag: self.opening_tag.clone(),
			closing_tag: self.closing_tag.clone(),
			additional_categories: self.additional_categories.clone(),
			tag_pair_matcher: Arc::clone(&self.tag_pair_matcher),
			missing_reference_handler: self.missing_reference_handler.clone(),
		}
	}
}

impl<T> fmt::Debug for Config<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Config")
			.field("opening_tag", &self.opening_tag.as_str())
			.field("closing_tag", &self.closing_tag.as_str())
			.field("additional_categories", &self.additional_categories)
			.field(
				"missing_reference_handler",
				&self.missing_reference_handler.is_some(),
			)
			.finish_non_exhaustive()
	}
}

fn default_additional_categories() -> Vec<Category> {
	vec![
		Category::new(TokenKind::SelfClosingTag, SELF_CLOSING_TAG.clone()),
		Category::new(TokenKind::TextPlaceholder, TEXT_PLACEHOLDER.clone()),
	]
}

fn compile_pattern(kind: TokenKind, pattern: &str) -> RrttResult<Regex> {
	Regex::new(pattern).map_err(|e| RrttError::InvalidPattern {
		kind,
		reason: e.to_string(),
	})
}

/// Partial configuration. Every `Some` field replaces the matching field when
/// passed to [`Config::merge`].
pub struct ConfigOverrides<T> {
	pub text_wrapper: Option<TextWrapper<T>>,
	pub opening_tag_name: Option<NameExtractor>,
	pub closing_tag_name: Option<NameExtractor>,
	pub self_closing_tag_name: Option<NameExtractor>,
	pub text_placeholder_name: Option<NameExtractor>,
	pub opening_tag: Option<Regex>,
	pub closing_tag: Option<Regex>,
	pub additional_categories: Option<Vec<Category>>,
	pub tag_pair_matcher: Option<TagPairMatcher<T>>,
	pub missing_reference_handler: Option<MissingReferenceHandler<T>>,
}

impl<T> Default for ConfigOverrides<T> {
	fn default() -> Self {
		Self {
			text_wrapper: None,
			opening_tag_name: None,
			closing_tag_name: None,
			self_closing_tag_name: None,
			text_placeholder_name: None,
			opening_tag: None,
			closing_tag: None,
			additional_categories: None,
			tag_pair_matcher: None,
			missing_reference_handler: None,
		}
	}
}

/// The textual template syntax, as written in the `[syntax]` section of
/// `rrtt.toml`.
///
/// ```toml
/// [syntax]
/// opening_tag = "\\[(?<name>[a-z]+)\\]"
/// closing_tag = "\\[/(?<name>[a-z]+)\\]"
///
/// [[syntax.categories]]
/// kind = "text_placeholder"
/// pattern = "\\$\\{(?<name>[a-z]+)\\}"
/// ```
///
/// Missing fields keep the default `<name>`, `</name>`, `<name/>`, `{name}`
/// syntax. A `categories` list replaces the default self-closing and
/// placeholder categories entirely.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Syntax {
	#[serde(default)]
	pub opening_tag: Option<String>,
	#[serde(default)]
	pub closing_tag: Option<String>,
	#[serde(default)]
	pub categories: Option<Vec<CategorySource>>,
}

/// A category entry in [`Syntax`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CategorySource {
	pub kind: TokenKind,
	pub pattern: String,
}

/// Configuration loaded from an `rrtt.toml` file.
#[derive(Debug, Default, Deserialize)]
pub struct RrttConfig {
	#[serde(default)]
	pub syntax: Syntax,
}

impl RrttConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> RrttResult<Option<RrttConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;

		Self::from_toml_str(&content).map(Some)
	}

	pub fn from_toml_str(content: &str) -> RrttResult<RrttConfig> {
		toml::from_str(content).map_err(|e| RrttError::ConfigParse(e.to_string()))
	}
}
