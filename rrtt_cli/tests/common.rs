use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn rrtt_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("rrtt"));
	cmd.env("NO_COLOR", "1").env_remove("RRTT_LOG");
	cmd
}
