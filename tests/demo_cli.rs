use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn demo(config: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("verbal-demo").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config-dir")
        .arg(config.path())
        .arg("--no-color");
    cmd
}

#[test]
fn test_verb_command_and_options() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .args([
            "builder",
            "prune",
            "-a",
            "-f",
            "--filter=until=24h",
            "--keep-storage",
            "10",
        ])
        .assert()
        .success()
        .stdout("builder prune all=true force=true filter=until=24h keep-storage=10\n");
}

#[test]
fn test_argument_with_spaces_stays_one_value() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .args(["user", "create", "john doe", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "user create username=john doe password=secret preventlogin=false",
        ));
}

#[test]
fn test_short_cluster() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .args(["user", "list", "-ad"])
        .assert()
        .success()
        .stdout("user list all=true desc=true\n");
}

#[test]
fn test_unknown_command_is_rejected_with_help() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .arg("nope")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Unknown command `nope`"))
        .stdout(predicate::str::contains("Usage: verbal-demo [OPTIONS] COMMAND"))
        .stdout(predicate::str::contains("Management Commands:"));
}

#[test]
fn test_help_flag() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Management Commands:"))
        .stdout(predicate::str::contains("  builder"))
        .stdout(predicate::str::contains("-c, --context string"))
        .stdout(predicate::str::contains("\x1b[").not());

    demo(&config)
        .args(["user", "create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Usage:  verbal-demo user create {username} {password} [Options]",
        ));
}

#[test]
fn test_version_flag() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_options_file_changes_flags_and_program_name() {
    let config = tempfile::tempdir().unwrap();
    fs::write(
        config.path().join("verbal.json"),
        r#"{"help_short_form": "?", "help_long_form": "usage", "program_name": "docker"}"#,
    )
    .unwrap();

    demo(&config)
        .arg("-?")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: docker [OPTIONS] COMMAND"))
        .stdout(predicate::str::contains("`COMMAND --usage` or `COMMAND -?`"));

    // -h is no longer the help flag
    demo(&config).arg("-h").assert().code(2).stdout(predicate::str::contains(
        "Unexpected option `-h`",
    ));
}

#[test]
fn test_invalid_options_file_fails() {
    let config = tempfile::tempdir().unwrap();
    fs::write(config.path().join("verbal.json"), r#"{"help_short_form": "v"}"#).unwrap();

    demo(&config)
        .arg("attach")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_globals_reach_handler() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .args(["-D", "attach", "web", "-H", "a", "-H", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("attach container=web"))
        .stdout(predicate::str::contains("[globals debug=true host=a,b]"));
}

#[test]
fn test_async_handler() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .args(["wait", "c1"])
        .assert()
        .success()
        .stdout("wait container=c1 exit=0\n");
}

#[test]
fn test_array_option_takes_following_values() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .args(["user", "perm", "bob", "-p", "read", "write"])
        .assert()
        .success()
        .stdout("user perm user=bob perm=read,write\n");
}

#[test]
fn test_quotes_in_arguments_reach_handler() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .args(["user", "create", "say \"hi\" now", "it's"])
        .assert()
        .success()
        .stdout("user create username=say \"hi\" now password=it's preventlogin=false\n");
}

#[test]
fn test_unquotable_argument_fails() {
    let config = tempfile::tempdir().unwrap();
    demo(&config)
        .args(["user", "create", "C:\\my dir\\", "secret"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("cannot be quoted"));
}
