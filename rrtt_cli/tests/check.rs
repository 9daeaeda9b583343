mod common;

use clap::Parser;
use predicates::prelude::PredicateBooleanExt;
use rrtt_cli::Commands;
use rrtt_cli::RrttCli;
use rrtt_core::AnyEmptyResult;
use rstest::rstest;

#[test]
fn check_passes_for_balanced_template() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("ok.txt"), "<p>Hello <b>{name}</b></p><br/>")?;

	common::rrtt_cmd()
		.arg("check")
		.arg("ok.txt")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("ok.txt is valid"))
		.stdout(predicates::str::contains("depth 2"));

	Ok(())
}

#[test]
fn check_fails_for_unclosed_tag() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("open.txt"), "This <a>token")?;

	common::rrtt_cmd()
		.arg("check")
		.arg("open.txt")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::is_empty())
		.stderr(
			predicates::str::contains("expected closing tag")
				.and(predicates::str::contains("rrtt::template_syntax")),
		);

	Ok(())
}

#[rstest]
#[case::missing_file(&[], "absent.txt", "os error")]
#[case::invalid_pattern(
	&[(".rrtt.toml", "[syntax]\nopening_tag = '<('\n"), ("ok.txt", "text")],
	"ok.txt",
	"invalid pattern for `opening_tag`"
)]
#[case::invalid_toml(
	&[("rrtt.toml", "[syntax\n"), ("ok.txt", "text")],
	"ok.txt",
	"failed to parse config file"
)]
fn check_reports_other_failures(
	#[case] files: &[(&str, &str)],
	#[case] template: &str,
	#[case] message: &str,
) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	for (name, content) in files {
		std::fs::write(tmp.path().join(name), content)?;
	}

	common::rrtt_cmd()
		.arg("check")
		.arg(template)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains(message));

	Ok(())
}

#[test]
fn no_subcommand_exits_with_usage_hint() {
	common::rrtt_cmd()
		.assert()
		.code(1)
		.stderr(predicates::str::contains("rrtt --help"));
}

#[test]
fn parses_render_arguments() {
	let cli = RrttCli::parse_from([
		"rrtt", "render", "page.txt", "--context", "data.json", "--keyed", "--verbose",
	]);

	assert!(cli.verbose);
	assert!(matches!(
		cli.command,
		Some(Commands::Render { ref template, ref context, keyed: true })
			if template.to_str() == Some("page.txt")
				&& context.as_deref().and_then(|path| path.to_str()) == Some("data.json")
	));
}
