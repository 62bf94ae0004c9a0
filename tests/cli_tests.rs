use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mediamend(registry_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mediamend"));
    cmd.arg("--registry")
        .arg(registry_dir.path().join("progress.json"))
        .env_remove("RUST_LOG");
    cmd
}

fn ffmpeg_available() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    mediamend(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repair"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("process"));
}

#[test]
fn merge_help_shows_mode_flags() {
    let dir = TempDir::new().unwrap();
    mediamend(&dir)
        .args(["merge", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--crossfade-duration"));
}

#[test]
fn merge_on_empty_directory_merges_nothing() {
    let dir = TempDir::new().unwrap();
    let videos = TempDir::new().unwrap();
    mediamend(&dir)
        .arg("merge")
        .arg(videos.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged: 0"))
        .stdout(predicate::str::contains("Failed: 0"));
}

#[test]
fn merge_summary_as_json() {
    let dir = TempDir::new().unwrap();
    let videos = TempDir::new().unwrap();
    let output = mediamend(&dir)
        .arg("--json")
        .arg("merge")
        .arg(videos.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["merged"], serde_json::json!([]));
}

#[test]
fn unknown_merge_mode_is_rejected() {
    let dir = TempDir::new().unwrap();
    let videos = TempDir::new().unwrap();
    mediamend(&dir)
        .arg("merge")
        .arg(videos.path())
        .args(["--mode", "wipe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown merge mode"));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    mediamend(&dir)
        .args(["repair", "/nonexistent/clip.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    mediamend(&dir)
        .args(["scan", "/nonexistent/videos"])
        .assert()
        .failure();
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    mediamend(&dir)
        .args(["--config", "/nonexistent/mediamend.toml", "report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file does not exist"));
}

#[test]
fn report_on_empty_registry() {
    let dir = TempDir::new().unwrap();
    mediamend(&dir)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("No files with errors recorded"));
}

#[test]
fn merges_real_clips_when_ffmpeg_is_installed() {
    if !ffmpeg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let videos = TempDir::new().unwrap();

    for i in 1..=2 {
        let clip = videos.path().join(format!("clip_{}.mkv", i));
        let made = std::process::Command::new("ffmpeg")
            .args(["-y", "-v", "error", "-f", "lavfi", "-i"])
            .arg("testsrc=duration=2:size=160x120:rate=25")
            .args(["-f", "lavfi", "-i", "sine=frequency=440:duration=2"])
            .args(["-c:v", "libx264", "-c:a", "aac", "-shortest"])
            .arg(&clip)
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !made {
            // this ffmpeg build cannot produce the fixtures
            return;
        }
    }

    mediamend(&dir)
        .arg("merge")
        .arg(videos.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged: 1"));
    assert!(videos.path().join("clip_merged.mkv").exists());
    assert!(videos.path().join("logs").join("clip_merged_merge.log").exists());
}
