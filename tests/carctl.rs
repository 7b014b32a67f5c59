use assert_cmd::Command;
use predicates::prelude::*;

fn carctl() -> Command {
    let mut cmd = Command::cargo_bin("carctl").expect("carctl binary");
    cmd.env("NO_COLOR", "1").env_remove("CARCTL_DEBUG");
    cmd
}

#[test]
fn no_command_prints_usage_and_fails() {
    carctl()
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Available Commands"))
        .stderr(predicate::str::contains("no subcommand provided"));
}

#[test]
fn unknown_command_fails() {
    carctl()
        .arg("fly")
        .assert()
        .failure()
        .stdout(predicate::str::contains("📁 Engine"))
        .stderr(predicate::str::contains("unknown command: fly"));
}

#[test]
fn help_lists_all_categories() {
    carctl()
        .arg("help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("📁 Engine")
                .and(predicate::str::contains("📁 Climate"))
                .and(predicate::str::contains("📁 Information"))
                .and(predicate::str::contains("--fanspeed <int>  Fan speed (1-5) (default: 3)"))
                .and(predicate::str::contains("carctl <command> [flags]")),
        );
}

#[test]
fn help_for_unknown_command_succeeds() {
    carctl()
        .args(["help", "fly"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("unknown command: fly")
                .and(predicate::str::contains("Available Commands")),
        );
}

#[test]
fn ac_uses_defaults() {
    carctl()
        .arg("ac")
        .assert()
        .success()
        .stdout("Setting AC temperature to 22°C with fan speed 3\n");
}

#[test]
fn ac_accepts_flags() {
    carctl()
        .args(["ac", "--temperature", "18", "--fanspeed=5"])
        .assert()
        .success()
        .stdout("Setting AC temperature to 18°C with fan speed 5\n");
}

#[test]
fn quiet_start() {
    carctl()
        .args(["start", "--quiet"])
        .assert()
        .success()
        .stdout("Quietly starting the car engine...\n");
}

#[test]
fn bad_flag_value_fails_without_usage() {
    carctl()
        .args(["heat", "--temperature", "warm"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to parse arguments for 'heat'"));
}

#[test]
fn unknown_flag_fails() {
    carctl()
        .args(["ac", "--bogus"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to parse arguments for 'ac'"));
}

#[test]
fn no_color_env_gives_plain_help() {
    carctl()
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{1b}[").not());
}
