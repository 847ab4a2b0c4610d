//! Integration tests for the recite CLI
//!
//! Every test gets its own data directory through `RECITE_STORAGE__DATA_DIR`.
//! Reading tests use `true` / `false` as the speech program.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::time::{Duration, Instant};
use tempfile::TempDir;

const ENGLISH: &str = "Chapter 1\nHello\n\nWorld\n\nChapter 2\nBye\n";
const CHINESE: &str = "序言\n\n第一章 开端\n天色已晚。\n\n第二章 风起\n他推开门。\n\n第三章 落幕\n完。\n";

struct Env {
    data: TempDir,
    books: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            data: TempDir::new().unwrap(),
            books: TempDir::new().unwrap(),
        }
    }

    fn book(&self, name: &str, text: &str) -> PathBuf {
        let path = self.books.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("recite").unwrap();
        cmd.current_dir(self.books.path())
            .env("RECITE_STORAGE__DATA_DIR", self.data.path())
            .env("RECITE_SPEECH__COMMAND", "true")
            .env_remove("RUST_LOG");
        cmd
    }

    fn add(&self, path: &Path) {
        self.cmd().arg("add").arg(path).assert().success();
    }

    fn progress(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.data.path().join("progress.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

#[test]
fn test_empty_library() {
    let env = Env::new();
    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Library is empty"));
}

#[test]
fn test_add_detects_format_and_persists() {
    let env = Env::new();
    let book = env.book("novel.txt", CHINESE);

    env.cmd()
        .arg("add")
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("Detected format: chinese"))
        .stdout(predicate::str::contains("with 3 chapters and set as active"));

    let library = fs::read_to_string(env.data.path().join("library.json")).unwrap();
    assert!(library.contains("\"detected_pattern\": \"chinese\""));
    assert!(library.contains("第一章 开端"));
    assert!(!library.contains("序言"));

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            " * 1: novel.txt (3 chapters, last read: Ch 1, Seg 0)",
        ));
}

#[test]
fn test_add_duplicate_is_reported_not_fatal() {
    let env = Env::new();
    let book = env.book("a.txt", ENGLISH);
    env.add(&book);

    env.cmd()
        .arg("add")
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_add_failures() {
    let env = Env::new();
    let prose = env.book("prose.txt", "Just some text.\n\nNo headings here.\n");

    env.cmd()
        .arg("add")
        .arg(&prose)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    env.cmd()
        .arg("add")
        .arg(env.books.path().join("missing.txt"))
        .assert()
        .failure()
        .code(1);

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Library is empty"));
}

#[test]
fn test_chapters_and_where() {
    let env = Env::new();
    env.add(&env.book("a.txt", ENGLISH));

    env.cmd()
        .arg("chapters")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chapters for 'a.txt':"))
        .stdout(predicate::str::contains("1: Chapter 1"))
        .stdout(predicate::str::contains("2: Chapter 2"));

    env.cmd()
        .arg("where")
        .assert()
        .success()
        .stdout(predicate::str::contains("Last read: Chapter 1 (Chapter 1), Segment 0"));
}

#[test]
fn test_invalid_indices_exit_non_zero() {
    let env = Env::new();
    env.add(&env.book("a.txt", ENGLISH));

    for args in [["remove", "0"], ["remove", "2"], ["switch", "5"], ["read", "3"]] {
        env.cmd()
            .args(args)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("out of range"));
    }

    // 不是数字属于用法错误
    env.cmd().args(["switch", "abc"]).assert().failure().code(2);
}

#[test]
fn test_switch_and_remove() {
    let env = Env::new();
    let a = env.book("a.txt", ENGLISH);
    let b = env.book("b.txt", ENGLISH);
    env.add(&a);
    env.add(&b);

    env.cmd()
        .args(["switch", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched active novel to:"));

    env.cmd()
        .args(["switch", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is already active"));

    env.cmd()
        .args(["remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed novel 1: a.txt"))
        .stdout(predicate::str::contains("The active novel was removed."));

    env.cmd()
        .arg("where")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active novel"));

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("   1: b.txt"));
}

#[test]
fn test_config_toggle() {
    let env = Env::new();

    env.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("auto_next: false"));

    env.cmd()
        .args(["config", "auto_next"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set auto_next to: true"));

    env.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("auto_next: true"));

    env.cmd()
        .args(["config", "volume"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unknown config setting"));
}

#[cfg(unix)]
#[test]
fn test_read_one_segment_then_continue() {
    let env = Env::new();
    let book = env.book("a.txt", ENGLISH);
    env.add(&book);

    env.cmd()
        .arg("read")
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Reading Chapter 1: Chapter 1 ---"))
        .stdout(predicate::str::contains("[Segment 1/2]\nHello"))
        .stdout(predicate::str::contains("Auto-next disabled. Stopping."));

    let key = fs::canonicalize(&book).unwrap().display().to_string();
    let progress = env.progress();
    assert_eq!(progress[&key]["chapter_index"], 0);
    assert_eq!(progress[&key]["segment_index"], 0);

    env.cmd()
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Segment 1/1]\nBye"));

    env.cmd()
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already at the last chapter."));

    let progress = env.progress();
    assert_eq!(progress[&key]["chapter_index"], 1);
}

#[cfg(unix)]
#[test]
fn test_auto_next_reads_to_the_end() {
    let env = Env::new();
    env.add(&env.book("a.txt", ENGLISH));
    env.cmd().args(["config", "auto_next"]).assert().success();

    env.cmd()
        .arg("continue")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello"))
        .stdout(predicate::str::contains("World"))
        .stdout(predicate::str::contains("--- Reading Chapter 2: Chapter 2 ---"))
        .stdout(predicate::str::contains("Reached the end of the novel."));
}

#[cfg(unix)]
#[test]
fn test_speech_failure_exits_non_zero() {
    let env = Env::new();
    env.add(&env.book("a.txt", ENGLISH));

    env.cmd()
        .env("RECITE_SPEECH__COMMAND", "false")
        .arg("read")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("narration stopped at chapter 1, segment 0"));
}

/// 轮询直到条件成立，超时则失败
#[cfg(unix)]
fn wait_until(what: &str, timeout: Duration, mut ready: impl FnMut() -> bool) {
    let deadline = Instant::now() + timeout;
    while !ready() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(unix)]
#[test]
fn test_sigterm_during_speech_saves_progress_and_exits_cleanly() {
    use assert_cmd::cargo::CommandCargoExt;
    use std::process::Stdio;

    let env = Env::new();
    let book = env.book("a.txt", ENGLISH);
    env.add(&book);
    env.cmd().args(["config", "auto_next"]).assert().success();

    // 第二段开始时留下标记然后挂起；只有语音进程没被杀掉才会写出 finished
    let config = env.data.path().join("hanging.toml");
    fs::write(
        &config,
        r#"[speech]
command = "sh"
args = ['-c', 'case "$0" in World) touch started; sleep 2; touch finished;; esac']
"#,
    )
    .unwrap();

    let mut child = std::process::Command::cargo_bin("recite")
        .unwrap()
        .current_dir(env.books.path())
        .env("RECITE_STORAGE__DATA_DIR", env.data.path())
        .env_remove("RECITE_SPEECH__COMMAND")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config)
        .arg("read")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let started = env.books.path().join("started");
    wait_until("second segment", Duration::from_secs(10), || started.exists());

    let status = std::process::Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let mut exit = None;
    wait_until("recite to exit", Duration::from_secs(10), || {
        exit = child.try_wait().unwrap();
        exit.is_some()
    });
    assert_eq!(exit.and_then(|s| s.code()), Some(0));

    let key = fs::canonicalize(&book).unwrap().display().to_string();
    let progress = env.progress();
    assert_eq!(progress[&key]["chapter_index"], 0);
    assert_eq!(progress[&key]["segment_index"], 1);

    std::thread::sleep(Duration::from_secs(3));
    assert!(!env.books.path().join("finished").exists());
}

#[test]
fn test_corrupt_progress_is_ignored() {
    let env = Env::new();
    env.add(&env.book("a.txt", ENGLISH));
    fs::write(env.data.path().join("progress.json"), "{oops").unwrap();

    env.cmd()
        .arg("where")
        .assert()
        .success()
        .stdout(predicate::str::contains("Segment 0"));
}
