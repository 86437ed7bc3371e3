use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dog-backup").unwrap();
    cmd.current_dir(dir.path()).env_remove("DOG_BACKUP_TOKEN");
    cmd
}

#[test]
fn help_lists_options() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--breed"))
        .stdout(contains("--all"));
}

#[test]
fn blank_breed_is_rejected_before_anything_runs() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["--breed", "   ", "--token", "abc"])
        .assert()
        .failure()
        .stderr(contains("breed cannot be empty"));
    assert!(!dir.path().join("dog_downloader.log").exists());
    assert!(!dir.path().join("download_results.json").exists());
}

#[test]
fn blank_token_is_rejected() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["--breed", "husky", "--token", " "])
        .assert()
        .failure()
        .stderr(contains("token cannot be empty"));
}

#[test]
fn breed_and_all_conflict() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["--breed", "husky", "--all", "--token", "abc"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}
