use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tempfile::TempDir;

const BANK: &str = "\
Unit I - Mechanics
Section A - (2 marks)
1. Define inertia.
2. State Newton's second law.
3. What is momentum?
Section B - (8 marks)
1. Derive the equations of motion.
2. Explain conservation of momentum.

Unit II - Optics
Section A -
1) What is refraction?
2) Define focal length.
Section B -
1) Explain total internal reflection.
2) Describe a compound microscope.
";

fn write_bank(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("bank.txt");
    fs::write(&path, BANK).unwrap();
    path
}

fn papergen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("papergen").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn text_bank_produces_archive_with_one_pdf_per_set() {
    let temp_dir = TempDir::new().unwrap();
    let bank = write_bank(temp_dir.path());

    papergen(temp_dir.path())
        .arg(&bank)
        .args(["--subject", "Physics", "--num-papers", "4", "--seed", "3", "--quiet"])
        .assert()
        .success();

    let out_dir = temp_dir.path().join("question_papers_Physics");
    let archive = File::open(out_dir.join("Question_Papers.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(archive).unwrap();
    assert_eq!(archive.len(), 4);

    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "Question_Paper_Set_1.pdf",
            "Question_Paper_Set_2.pdf",
            "Question_Paper_Set_3.pdf",
            "Question_Paper_Set_4.pdf",
        ]
    );

    let entry = archive.by_name("Question_Paper_Set_2.pdf").unwrap();
    assert!(entry.size() > 0);
}

#[test]
fn non_numeric_paper_count_falls_back_to_nine() {
    let temp_dir = TempDir::new().unwrap();
    let bank = write_bank(temp_dir.path());

    papergen(temp_dir.path())
        .arg(&bank)
        .args(["--num-papers", "lots", "--output", "out", "--quiet"])
        .assert()
        .success();

    let archive = File::open(temp_dir.path().join("out").join("Question_Papers.zip")).unwrap();
    let archive = zip::ZipArchive::new(archive).unwrap();
    assert_eq!(archive.len(), 9);
}

#[test]
fn unparseable_bank_exits_with_code_5() {
    let temp_dir = TempDir::new().unwrap();
    let bank = temp_dir.path().join("notes.txt");
    fs::write(&bank, "Some lecture notes\nwithout any unit headings\n").unwrap();

    papergen(temp_dir.path())
        .arg(&bank)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Could not parse any units"));

    assert!(!temp_dir.path().join("question_papers_Subject").exists());
}

#[test]
fn missing_bank_exits_with_code_3() {
    let temp_dir = TempDir::new().unwrap();

    papergen(temp_dir.path())
        .arg("missing.txt")
        .assert()
        .code(3);
}

#[test]
fn existing_output_needs_force() {
    let temp_dir = TempDir::new().unwrap();
    let bank = write_bank(temp_dir.path());
    let args = ["--num-papers", "1", "--output", "papers", "--quiet"];

    papergen(temp_dir.path()).arg(&bank).args(args).assert().success();
    papergen(temp_dir.path()).arg(&bank).args(args).assert().code(8);
    papergen(temp_dir.path())
        .arg(&bank)
        .args(args)
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn dry_run_lists_units_and_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let bank = write_bank(temp_dir.path());

    papergen(temp_dir.path())
        .arg(&bank)
        .args(["--dry-run", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unit I - Mechanics (Section A: 3, Section B: 2)"))
        .stdout(predicate::str::contains("Unit II - Optics"));

    assert!(!temp_dir.path().join("question_papers_Subject").exists());
}

#[test]
fn dry_run_names_the_run_directory() {
    let temp_dir = TempDir::new().unwrap();
    let bank = write_bank(temp_dir.path());

    papergen(temp_dir.path())
        .arg(&bank)
        .args(["--dry-run", "-v", "--output-format", "plain", "--subject", "Physics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("question_papers_Physics"));
}

#[test]
fn force_refuses_a_directory_papergen_did_not_write() {
    let temp_dir = TempDir::new().unwrap();
    let bank = write_bank(temp_dir.path());

    papergen(temp_dir.path())
        .arg(&bank)
        .args(["--output", ".", "--force", "--output-format", "plain"])
        .assert()
        .code(8);

    assert!(bank.exists());
}

#[test]
fn generate_config_writes_sample() {
    let temp_dir = TempDir::new().unwrap();

    papergen(temp_dir.path())
        .args(["--generate-config", "--config", "custom.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));

    let content = fs::read_to_string(temp_dir.path().join("custom.toml")).unwrap();
    assert!(content.contains("num_papers = 9"));
}
