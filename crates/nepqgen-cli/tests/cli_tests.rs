//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn nepqgen() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("nepqgen").unwrap();
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("NEPQGEN_GEMINI_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// A command whose home and working directory are an empty temp dir.
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = nepqgen();
    cmd.env("HOME", dir.path()).current_dir(dir.path());
    cmd
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn files_with_extension(dir: &Path, ext: &str) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect()
}

#[test]
fn help_lists_subcommands() {
    nepqgen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("compare"))
        .stdout(predicate::str::contains("list-models"));
}

#[test]
fn validate_clean_question_file() {
    nepqgen()
        .arg("validate")
        .arg("--questions")
        .arg(fixture("questions.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("8 questions, 36 marks"))
        .stdout(predicate::str::contains("All questions valid"));
}

#[test]
fn validate_reports_problems() {
    nepqgen()
        .arg("validate")
        .arg("--questions")
        .arg(fixture("duplicates.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "question 2: duplicate question text (same as question 1)",
        ))
        .stdout(predicate::str::contains("question 3: mcq question has no options"))
        .stdout(predicate::str::contains("question 4: question carries zero marks"))
        .stdout(predicate::str::contains("3 warning(s) found"));
}

#[test]
fn validate_checks_total_marks_against_paper() {
    nepqgen()
        .arg("validate")
        .arg("--questions")
        .arg(fixture("duplicates.json"))
        .arg("--paper")
        .arg(fixture("paper.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "total marks 5 differ from configured total 36",
        ));
}

#[test]
fn validate_directory_skips_broken_files() {
    nepqgen()
        .arg("validate")
        .arg("--questions")
        .arg(fixture("question-bank"))
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions, 13 marks"))
        .stdout(predicate::str::contains("All questions valid"));
}

#[test]
fn validate_nonexistent_file() {
    nepqgen()
        .arg("validate")
        .arg("--questions")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created nepqgen.toml"))
        .stdout(predicate::str::contains("Created papers/example-questions.json"))
        .stdout(predicate::str::contains("Created papers/example-paper.toml"));

    assert!(dir.path().join("nepqgen.toml").exists());

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("nepqgen.toml already exists"));
}

#[test]
fn init_examples_are_valid() {
    let dir = TempDir::new().unwrap();
    isolated(&dir).arg("init").assert().success();

    isolated(&dir)
        .arg("validate")
        .arg("--questions")
        .arg("papers/example-questions.json")
        .arg("--paper")
        .arg("papers/example-paper.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All questions valid"));

    isolated(&dir)
        .arg("evaluate")
        .arg("--questions")
        .arg("papers/example-questions.json")
        .arg("--paper")
        .arg("papers/example-paper.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall score"));

    let output = dir.path().join("nepqgen-output");
    assert_eq!(files_with_extension(&output, "json").len(), 1);
}

#[test]
fn evaluate_writes_every_format() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");

    isolated(&dir)
        .arg("evaluate")
        .arg("--questions")
        .arg(fixture("questions.json"))
        .arg("--paper")
        .arg(fixture("paper.toml"))
        .arg("--output")
        .arg(&output)
        .arg("--format")
        .arg("all")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall score"))
        .stderr(predicate::str::contains("Cognitive distribution"));

    let json = files_with_extension(&output, "json");
    assert_eq!(json.len(), 1);
    assert_eq!(files_with_extension(&output, "html").len(), 1);
    assert_eq!(files_with_extension(&output, "md").len(), 1);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json[0]).unwrap()).unwrap();
    assert_eq!(report["title"], "Physics: Mechanics Unit Test");
    assert_eq!(report["stats"]["total_marks"], 36);
    assert_eq!(report["compliance"]["question_count"], 8);
    assert!(report.get("generation").is_none());
}

#[test]
fn evaluate_empty_question_set() {
    let dir = TempDir::new().unwrap();
    let questions = dir.path().join("empty.json");
    std::fs::write(&questions, "[]").unwrap();
    let output = dir.path().join("out");

    isolated(&dir)
        .arg("evaluate")
        .arg("--questions")
        .arg(&questions)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall score: 29.2"))
        .stderr(predicate::str::contains("WARNING: no questions found"));

    let json = files_with_extension(&output, "json");
    assert_eq!(json.len(), 1);
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json[0]).unwrap()).unwrap();
    assert_eq!(report["compliance"]["question_count"], 0);
    assert_eq!(report["compliance"]["question_type_score"], 75.0);
    assert_eq!(report["compliance"]["competency_score"], 0.0);
}

#[test]
fn evaluate_min_score_gate() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("evaluate")
        .arg("--questions")
        .arg(fixture("duplicates.json"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--min-score")
        .arg("99.5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("below the required 99.5"));
}

#[test]
fn evaluate_with_custom_rubric() {
    let dir = TempDir::new().unwrap();
    let rubric = dir.path().join("rubric.toml");
    std::fs::write(&rubric, "mcq_max_percentage = 5.0\nmcq_penalty = 50.0\n").unwrap();

    isolated(&dir)
        .arg("evaluate")
        .arg("--questions")
        .arg(fixture("questions.json"))
        .arg("--rubric")
        .arg(&rubric)
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .success();
}

#[test]
fn generate_offline_produces_report() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");

    isolated(&dir)
        .arg("generate")
        .arg("--syllabus")
        .arg(fixture("syllabus.txt"))
        .arg("--paper")
        .arg(fixture("paper.toml"))
        .arg("--offline")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 7 questions"))
        .stderr(predicate::str::contains("3 set(s) from fallback"));

    let json = files_with_extension(&output, "json");
    assert_eq!(json.len(), 1);
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json[0]).unwrap()).unwrap();
    assert_eq!(report["generation"]["model"], "offline");
    assert_eq!(report["generation"]["sets"].as_array().unwrap().len(), 3);
    assert_eq!(report["questions"][0]["type"], "mcq");
    assert_eq!(report["questions"][0]["topic"], "General Topics");
}

#[test]
fn generate_requires_configured_provider() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("generate")
        .arg("--syllabus")
        .arg(fixture("syllabus.txt"))
        .arg("--paper")
        .arg(fixture("paper.toml"))
        .arg("--model")
        .arg("ollama/llama3.1:8b")
        .assert()
        .failure()
        .stderr(predicate::str::contains("provider 'ollama' not found in config"));
}

#[test]
fn generate_rejects_missing_config_file() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("generate")
        .arg("--syllabus")
        .arg(fixture("syllabus.txt"))
        .arg("--paper")
        .arg(fixture("paper.toml"))
        .arg("--config")
        .arg("missing.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn compare_fails_on_regression() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good");
    let weak = dir.path().join("weak");

    isolated(&dir)
        .args(["evaluate", "--questions"])
        .arg(fixture("questions.json"))
        .arg("--output")
        .arg(&good)
        .assert()
        .success();
    isolated(&dir)
        .args(["evaluate", "--questions"])
        .arg(fixture("duplicates.json"))
        .arg("--output")
        .arg(&weak)
        .assert()
        .success();

    let baseline = files_with_extension(&good, "json").remove(0);
    let current = files_with_extension(&weak, "json").remove(0);

    nepqgen()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline)
        .arg("--current")
        .arg(&current)
        .arg("--fail-on-regression")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Regressions:"));

    nepqgen()
        .arg("compare")
        .arg("--baseline")
        .arg(&current)
        .arg("--current")
        .arg(&baseline)
        .arg("--fail-on-regression")
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 regressions"));
}

#[test]
fn list_models_without_providers() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("No providers configured"));
}

#[test]
fn list_models_uses_gemini_catalogue_without_key() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nepqgen.toml");
    std::fs::write(
        &config,
        "[providers.gemini]\ntype = \"gemini\"\napi_key = \"\"\n",
    )
    .unwrap();

    isolated(&dir)
        .arg("list-models")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider: gemini"))
        .stdout(predicate::str::contains("gemini-1.5-flash"));
}
