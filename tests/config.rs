mod common;

use common::TestContext;
use predicates::prelude::*;

#[test]
fn show_without_any_config_prints_builtin_defaults() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("builtin defaults"))
        .stdout(predicate::str::contains("Chapters directory: chapters"))
        .stdout(predicate::str::contains("Main document: main.tex"));
}

#[test]
fn a_discovered_config_reshapes_the_thesis_root() {
    let ctx = TestContext::new();
    ctx.write("texkit.toml", "root = \"doc\"\n");
    ctx.write("doc/main.tex", "\\input{missing.tex}\n");

    ctx.cli()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 missing"));
}

#[test]
fn discovery_walks_up_from_nested_directories() {
    let ctx = TestContext::new();
    ctx.write("texkit.toml", "\n");
    ctx.mkdir("chapters/intro");

    ctx.cli_in(ctx.path("chapters/intro"))
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("texkit.toml"))
        .stdout(predicate::str::contains("discovered"));
}

#[test]
fn the_hidden_location_works_too() {
    let ctx = TestContext::new();
    ctx.write(".texkit/config.toml", "chapters_dir = \"parts\"\n");

    ctx.cli()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".texkit"))
        .stdout(predicate::str::contains("Chapters directory: parts"));
}

#[test]
fn an_explicit_file_beats_discovery() {
    let ctx = TestContext::new();
    ctx.write("texkit.toml", "root = \".\"\n");
    ctx.write("other.toml", "root = \"elsewhere\"\n");

    ctx.cli()
        .args(["-f", "other.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("other.toml"))
        .stdout(predicate::str::contains("explicit"));
}

#[test]
fn generate_writes_a_starter_config_that_validates() {
    let ctx = TestContext::new();

    ctx.cli().args(["config", "generate"]).assert().success();
    assert!(ctx.path("texkit.toml").is_file());

    ctx.cli()
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config OK"));
}

#[test]
fn generate_refuses_to_overwrite_without_force() {
    let ctx = TestContext::new();
    ctx.write("texkit.toml", "root = \".\"\n");

    ctx.cli()
        .args(["config", "generate", "texkit.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn a_malformed_config_is_fatal_for_workflows() {
    let ctx = TestContext::new();
    ctx.write("texkit.toml", "root = [1]\n");

    ctx.cli()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("texkit.toml"));
}

#[test]
fn chdir_flag_relocates_the_whole_run() {
    let ctx = TestContext::new();
    ctx.write("project/texkit.toml", "\n");
    ctx.write("project/main.tex", "\\input{gone.tex}\n");

    ctx.cli()
        .args(["-C", "project", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 missing"));
}
