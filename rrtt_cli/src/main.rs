use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use rrtt_cli::Commands;
use rrtt_cli::RrttCli;
use rrtt_cli::json_context;
use rrtt_cli::with_tag_renderers;
use rrtt_cli::wrap_text;
use rrtt_core::Config;
use rrtt_core::Context;
use rrtt_core::RrttError;
use rrtt_core::Template;
use rrtt_core::compile_with;
use rrtt_core::config::RrttConfig;
use rrtt_core::tokenize;
use serde_json::Value;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = RrttCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let default_level = if args.verbose { "debug" } else { "warn" };
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_env("RRTT_LOG")
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
		)
		.init();

	let result = match &args.command {
		Some(Commands::Render {
			template,
			context,
			keyed,
		}) => run_render(&args, template, context.as_deref(), *keyed),
		Some(Commands::Check { template }) => run_check(&args, template),
		Some(Commands::Tokens { template }) => run_tokens(&args, template),
		None => {
			eprintln!("No subcommand specified. Run `rrtt --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<RrttError>() {
			Ok(rrtt_err) => {
				let report: miette::Report = (*rrtt_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn resolve_root(args: &RrttCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the template syntax from `rrtt.toml`, falling back to the default
/// `<tag>`, `</tag>`, `<tag/>`, `{name}` syntax.
fn load_config(root: &Path, keyed: bool) -> Result<Config<Value>, RrttError> {
	let syntax = RrttConfig::load(root)?
		.map(|config| config.syntax)
		.unwrap_or_default();

	Config::from_syntax(&syntax, wrap_text(keyed))
}

fn read_template(root: &Path, template: &Path) -> Result<String, RrttError> {
	let path = root.join(template);
	tracing::debug!(path = %path.display(), "reading template");

	Ok(std::fs::read_to_string(path)?)
}

fn compile_file(root: &Path, template: &Path, keyed: bool) -> Result<Template<Value>, RrttError> {
	let source = read_template(root, template)?;
	let config = load_config(root, keyed)?;

	Ok(compile_with(&source, config)?)
}

fn run_render(
	args: &RrttCli,
	template: &Path,
	context: Option<&Path>,
	keyed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let compiled = compile_file(&root, template, keyed)?;

	let context = match context {
		Some(path) => {
			let content = std::fs::read_to_string(root.join(path))?;
			let value: Value = serde_json::from_str(&content)
				.map_err(|e| RrttError::Context(e.to_string()))?;
			json_context(value)?
		}
		None => Context::new(),
	};
	let context = with_tag_renderers(context, compiled.tree());

	let output = compiled.render(&context);
	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

fn run_check(args: &RrttCli, template: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	match compile_file(&root, template, false) {
		Ok(compiled) => {
			println!(
				"{} {} is valid ({} nodes, depth {}).",
				colored!("ok:", green),
				template.display(),
				compiled.tree().len(),
				compiled.tree().depth()
			);
			Ok(())
		}
		Err(RrttError::Syntax(error)) => {
			let report: miette::Report = error.into();
			eprintln!("{report:?}");
			process::exit(1);
		}
		Err(e) => Err(e.into()),
	}
}

fn run_tokens(args: &RrttCli, template: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let source = read_template(&root, template)?;
	let config = load_config(&root, false)?;
	let tokens = tokenize(&config.categories(), &source);

	println!("{}", serde_json::to_string_pretty(&tokens)?);

	Ok(())
}

