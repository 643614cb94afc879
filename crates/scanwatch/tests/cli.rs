//! End-to-end tests for the `scanwatch` binary

use std::{
    io::{BufRead, BufReader},
    path::Path,
    process::{Child, Command as StdCommand, Stdio},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use assert_cmd::{cargo::CommandCargoExt, Command};
use predicates::prelude::*;
use scanwatch_core::instance::{signal_running, InstanceGuard, InstanceStatus};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Binary isolated from the user's real config and environment
fn isolated(home: &Path) -> Result<StdCommand, Box<dyn std::error::Error>> {
    let mut cmd = StdCommand::cargo_bin("scanwatch")?;
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("APPDATA", home.join("config"))
        .env_remove("SCANWATCH_SCAN_DIRECTORY")
        .env_remove("SCANWATCH_FILENAME_FILTER")
        .env_remove("SCANWATCH_MAX_WAIT_SECONDS")
        .env_remove("SCANWATCH_ATTEMPT_OPEN_ON_CREATE")
        .env("SCANWATCH_LOCK_DIR", home.join("locks"));
    Ok(cmd)
}

fn scanwatch(home: &Path) -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::from_std(isolated(home)?))
}

/// Running daemon whose stderr is read line by line; killed on drop
struct Daemon {
    child: Child,
    lines: mpsc::Receiver<String>,
}

impl Daemon {
    fn spawn(mut cmd: StdCommand) -> Result<Self, Box<dyn std::error::Error>> {
        let mut child = cmd
            .env("RUST_LOG", "info")
            .env("NO_COLOR", "1")
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;
        let stderr = child.stderr.take().ok_or("stderr not captured")?;

        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Ok(Self { child, lines })
    }

    /// Consume stderr up to the first line containing `needle`
    fn wait_for(&self, needle: &str) -> Result<String, Box<dyn std::error::Error>> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let left = deadline
                .checked_duration_since(Instant::now())
                .ok_or_else(|| format!("timed out waiting for {needle:?}"))?;
            let line = self
                .lines
                .recv_timeout(left)
                .map_err(|e| format!("no {needle:?} on stderr: {e}"))?;
            if line.contains(needle) {
                return Ok(line);
            }
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn test_help_lists_commands() -> TestResult {
    let home = TempDir::new()?;
    scanwatch(home.path())?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("open-folder"))
        .stdout(predicate::str::contains("--max-wait"));
    Ok(())
}

#[test]
fn test_config_shows_defaults() -> TestResult {
    let home = TempDir::new()?;
    scanwatch(home.path())?
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("filename_filter = \"*.*\""))
        .stdout(predicate::str::contains("max_wait_seconds = 30"))
        .stdout(predicate::str::contains("app_id = \"scanwatch\""));
    Ok(())
}

#[test]
fn test_config_layers_file_env_and_flags() -> TestResult {
    let home = TempDir::new()?;
    let file = home.path().join("scanwatch.toml");
    std::fs::write(
        &file,
        "filename_filter = \"*.tif\"\nmax_wait_seconds = 5\n\n[log]\ncapacity = 42\n",
    )?;

    scanwatch(home.path())?
        .env("SCANWATCH_MAX_WAIT_SECONDS", "12")
        .args(["config", "--config"])
        .arg(&file)
        .args(["--filter", "*.pdf"])
        .assert()
        .success()
        // flag beats file
        .stdout(predicate::str::contains("filename_filter = \"*.pdf\""))
        // env beats file
        .stdout(predicate::str::contains("max_wait_seconds = 12"))
        .stdout(predicate::str::contains("capacity = 42"));
    Ok(())
}

#[test]
fn test_out_of_range_max_wait_exits_1() -> TestResult {
    let home = TempDir::new()?;
    scanwatch(home.path())?
        .args(["config", "--max-wait", "99999"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_wait_seconds"));
    Ok(())
}

#[test]
fn test_missing_config_file_exits_1() -> TestResult {
    let home = TempDir::new()?;
    scanwatch(home.path())?
        .args(["config", "--config"])
        .arg(home.path().join("nope.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config file not found"));
    Ok(())
}

#[test]
fn test_malformed_config_file_exits_1() -> TestResult {
    let home = TempDir::new()?;
    let file = home.path().join("broken.toml");
    std::fs::write(&file, "max_wait_seconds = [")?;

    scanwatch(home.path())?
        .args(["config", "--config"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Parse error"));
    Ok(())
}

#[test]
fn test_run_with_missing_scan_dir_exits_2() -> TestResult {
    let home = TempDir::new()?;
    scanwatch(home.path())?
        .arg("run")
        .arg("--scan-dir")
        .arg(home.path().join("no-such-folder"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn test_open_folder_missing_dir_exits_2() -> TestResult {
    let home = TempDir::new()?;
    scanwatch(home.path())?
        .arg("open-folder")
        .arg("--scan-dir")
        .arg(home.path().join("no-such-folder"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Scan folder does not exist"));
    Ok(())
}

#[test]
fn test_second_instance_signals_and_exits_0() -> TestResult {
    let home = TempDir::new()?;
    let lock_dir = home.path().join("locks");
    let scans = home.path().join("scans");
    std::fs::create_dir_all(&scans)?;

    let status = InstanceGuard::acquire(&lock_dir, "scanwatch")?;
    assert!(matches!(status, InstanceStatus::Primary(_)));

    scanwatch(home.path())?
        .arg("--scan-dir")
        .arg(&scans)
        .assert()
        .success()
        .stdout(predicate::str::contains("already running"));

    assert!(lock_dir.join("scanwatch.wake").exists());
    drop(status);
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn test_explicit_config_restores_default_over_global() -> TestResult {
    let home = TempDir::new()?;
    let global_dir = home.path().join("config").join("scanwatch");
    std::fs::create_dir_all(&global_dir)?;
    std::fs::write(
        global_dir.join("config.toml"),
        "max_wait_seconds = 60\nattempt_open_on_create = true\n",
    )?;
    let explicit = home.path().join("office.toml");
    std::fs::write(
        &explicit,
        "max_wait_seconds = 30\nattempt_open_on_create = false\n",
    )?;

    scanwatch(home.path())?
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_wait_seconds = 60"));

    scanwatch(home.path())?
        .args(["config", "--config"])
        .arg(&explicit)
        .assert()
        .success()
        .stdout(predicate::str::contains("max_wait_seconds = 30"))
        .stdout(predicate::str::contains("attempt_open_on_create = false"));
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn test_daemon_opens_new_scan_and_shows_log_on_wake() -> TestResult {
    let home = TempDir::new()?;
    let scans = home.path().join("scans");
    let no_tools = home.path().join("bin");
    std::fs::create_dir_all(&scans)?;
    std::fs::create_dir_all(&no_tools)?;

    let mut cmd = isolated(home.path())?;
    // No xdg-open on PATH: the open is attempted and reported, nothing launches
    cmd.env("PATH", &no_tools)
        .arg("run")
        .arg("--scan-dir")
        .arg(&scans)
        .args(["--filter", "*.pdf", "--max-wait", "7"]);
    let daemon = Daemon::spawn(cmd)?;
    daemon.wait_for("Ready.")?;

    std::fs::write(scans.join("notes.txt"), b"ignored")?;
    std::fs::write(scans.join("receipt.pdf"), b"%PDF-1.7")?;

    let opening = daemon.wait_for("Opening")?;
    assert!(opening.contains("receipt.pdf"), "{opening}");
    daemon.wait_for("xdg-open")?;

    signal_running(&home.path().join("locks"), "scanwatch")?;
    daemon.wait_for("--- scanwatch activity log ---")?;
    daemon.wait_for("[INFO] Maximum wait time (secs): 7")?;
    let logged = daemon.wait_for("[INFO] Opening")?;
    assert!(logged.contains("receipt.pdf"), "{logged}");
    daemon.wait_for("[INFO] Another instance was started")?;
    Ok(())
}
