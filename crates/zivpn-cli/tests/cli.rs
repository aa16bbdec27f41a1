use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

const SAMPLE_CONFIG: &str = r#"{
  "listen": ":5667",
  "cert": "/etc/zivpn/zivpn.crt",
  "key": "/etc/zivpn/zivpn.key",
  "obfs": "zivpn",
  "auth": { "mode": "passwords", "config": ["existing"] }
}
"#;

/// A throwaway installation whose restart and rclone commands are `true`,
/// with logs kept inside the temp dir.
fn installation() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("etc");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("config.json"), SAMPLE_CONFIG).unwrap();
    fs::write(root.join("users.db"), "existing | 2099-12-31\n").unwrap();
    fs::write(root.join("domain"), "vpn.example.com\n").unwrap();

    let settings = format!(
        r#"
[paths]
config_root = "{root}"
staging_dir = "{staging}"
log_dir = "{logs}"
cron_file = "{cron}"

[services]
restart = ["zivpn"]
systemctl_bin = "true"
"#,
        root = root.display(),
        staging = dir.path().join("staging").display(),
        logs = dir.path().join("logs").display(),
        cron = dir.path().join("cron.d").join("zivpn-backup").display(),
    );
    fs::write(dir.path().join("admin.toml"), settings).unwrap();
    dir
}

fn zivpn(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zivpn"));
    cmd.arg("--config").arg(dir.path().join("admin.toml"));
    cmd.env_remove("ZIVPN_DIR");
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zivpn"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("ZiVPN"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zivpn"));
    cmd.arg("--version").assert().success();
}

#[test]
fn test_user_list_json() {
    let dir = installation();
    zivpn(&dir)
        .args(["--format", "json", "user", "list"])
        .assert()
        .success()
        .stdout(contains(r#""password": "existing""#))
        .stdout(contains(r#""status": "Active""#));
}

#[test]
fn test_user_create_then_duplicate_fails() {
    let dir = installation();
    zivpn(&dir)
        .args(["user", "create", "alice", "30"])
        .assert()
        .success()
        .stdout(contains("alice"))
        .stdout(contains("vpn.example.com"));

    zivpn(&dir)
        .args(["user", "create", "alice", "30"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Error:"))
        .stderr(contains("already exists"));

    let ledger = fs::read_to_string(dir.path().join("etc").join("users.db")).unwrap();
    assert_eq!(ledger.matches("alice |").count(), 1);
}

#[test]
fn test_delete_unknown_user_fails() {
    let dir = installation();
    zivpn(&dir)
        .args(["user", "delete", "ghost"])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn test_info_json() {
    let dir = installation();
    zivpn(&dir)
        .args(["--format", "json", "info"])
        .assert()
        .success()
        .stdout(contains(r#""credential_count": 1"#))
        .stdout(contains(r#""domain": "vpn.example.com""#));
}

#[test]
fn test_backup_auto_toggle_writes_cron_entry() {
    let dir = installation();
    zivpn(&dir)
        .args(["backup", "auto"])
        .assert()
        .success()
        .stdout(contains("enabled"));
    assert!(dir.path().join("cron.d").join("zivpn-backup").exists());

    zivpn(&dir)
        .args(["backup", "auto", "--status"])
        .assert()
        .success()
        .stdout(contains("Auto backup enabled"));
}
