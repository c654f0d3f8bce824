use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    Command::cargo_bin("battle-cli").unwrap()
}

#[test]
fn list_shows_bundled_scenarios() {
    cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("slime_attack"))
        .stdout(predicate::str::contains("phoenix_revive"));
}

#[test]
fn resolve_builtin_prints_log() {
    cli()
        .args(["resolve", "--builtin", "slime_attack", "--log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[START] Alex attacks!"))
        .stdout(predicate::str::contains("[HP][Slime] -50 (150/200)"))
        .stdout(predicate::str::contains("[END] Normal succeeded"));
}

#[test]
fn resolve_builtin_prints_json_report() {
    let out = cli()
        .args(["resolve", "--builtin", "phoenix_revive"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["action"]["success"], true);
    assert_eq!(report["action"]["hits"][0]["revived"], true);
    assert_eq!(report["allies"][1]["hp"], 60);
    assert_eq!(report["switches_on"][0], 12);
}

#[test]
fn resolve_needs_an_input() {
    cli().arg("resolve").assert().failure();
}

#[test]
fn unknown_builtin_fails_with_message() {
    cli()
        .args(["resolve", "--builtin", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn database_dump_contains_states() {
    cli()
        .args(["database", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\":\"Death\""));
}
