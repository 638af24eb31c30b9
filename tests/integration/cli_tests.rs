/*!
 * Tests of the `align` command through the compiled binary
 */

use anyhow::Result;
use serde_json::{json, Value};
use std::process::{Command, Output};

use crate::common;

fn run_cli(args: &[&str]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_eduart-aligner")).args(args).output()?)
}

#[test]
fn test_align_withTwoFiles_shouldPrintRows() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "ko.txt", "안녕\n\n반가워\n")?;
    let target = common::create_test_file(temp_dir.path(), "en.txt", "Hi")?;

    let output = run_cli(&[
        "align",
        "--source", source.to_str().unwrap_or_default(),
        "--target", target.to_str().unwrap_or_default(),
        "--compact",
    ])?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let body: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        body,
        json!({"data": [{"id": 1, "kor": "안녕", "eng": "Hi"}, {"id": 2, "kor": "반가워", "eng": ""}]})
    );
    Ok(())
}

#[test]
fn test_align_withRequestFile_shouldWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let request = common::create_test_file(
        temp_dir.path(),
        "request.json",
        r#"{"kor_text": "하나\n둘", "eng_text": "one\ntwo"}"#,
    )?;
    let output_path = temp_dir.path().join("rows.json");

    let output = run_cli(&[
        "align",
        "--request", request.to_str().unwrap_or_default(),
        "--output", output_path.to_str().unwrap_or_default(),
    ])?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let body: Value = serde_json::from_str(&std::fs::read_to_string(&output_path)?)?;
    assert_eq!(body["data"].as_array().map(|rows| rows.len()), Some(2));
    Ok(())
}

#[test]
fn test_align_withInvalidRequestFile_shouldExitWithError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let request = common::create_test_file(temp_dir.path(), "request.json", r#"{"kor_text": "하나"}"#)?;

    let output = run_cli(&["align", "--request", request.to_str().unwrap_or_default()])?;

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("eng_text"));
    Ok(())
}

#[test]
fn test_align_withSourceOnly_shouldBeRejectedByArgumentParser() -> Result<()> {
    let output = run_cli(&["align", "--source", "ko.txt"])?;
    assert!(!output.status.success());
    Ok(())
}
