use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            cmd.env_remove("BACKEND_URL");
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

const RESULT: &str = r#"{
    "damage_detected": true,
    "similarity_score": 0.5,
    "damage_percentage": 40.0,
    "damage_count": 2,
    "damage_types": ["dent", "scratch"],
    "severity": "major",
    "message": "Significant damage"
}"#;

#[test]
fn render_table() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    let result = dir.child("result.json");
    result.write_str(RESULT)?;

    cargo_run!("damage-lens", "render", result.path())
        .success()
        .stdout(predicate::str::contains("Damage Detected"))
        .stdout(predicate::str::contains("50.0%"))
        .stdout(predicate::str::contains("Major Severity"))
        .stdout(predicate::str::contains("2 area(s) affected"));

    Ok(())
}

#[test]
fn render_json() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    let result = dir.child("result.json");
    result.write_str(r#"{"damage_detected": false, "error": "boom", "message": "Error occurred"}"#)?;

    cargo_run!("damage-lens", "render", result.path(), "--output-format", "json")
        .success()
        .stdout(predicate::str::contains(r#""view": "error""#))
        .stdout(predicate::str::contains(r#""message": "boom""#));

    Ok(())
}

#[test]
fn render_invalid() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    let result = dir.child("result.json");
    result.write_str(r#"{"damage_detected": true, "similarity_score": 0.5}"#)?;

    cargo_run!("damage-lens", "render", result.path())
        .failure()
        .stderr(predicate::str::contains("missing field"));

    Ok(())
}

#[test]
fn analyze_rejects_non_image() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    let notes = dir.child("notes.txt");
    notes.write_str("not an image")?;
    let after = dir.child("after.png");
    after.write_binary(b"\x89PNG")?;

    cargo_run!("damage-lens", "--backend", "http://127.0.0.1:9", "analyze", notes.path(), after.path())
        .failure()
        .stderr(predicate::str::contains("Please upload an image file"));

    Ok(())
}

#[test]
fn health_disconnected() -> Result<()> {
    cargo_run!("damage-lens", "--backend", "http://127.0.0.1:9", "health")
        .failure()
        .stdout(predicate::str::contains("Backend: Disconnected"));

    Ok(())
}
