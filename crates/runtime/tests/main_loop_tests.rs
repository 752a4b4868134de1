use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(60);

fn runtime_main() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_runtime_main"));
    cmd.env("RUST_LOG", "info");
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd
}

/// Run to completion, killing the process if it outlives `TIMEOUT`.
fn run(mut cmd: Command) -> Output {
    let mut child = cmd.spawn().expect("failed to spawn runtime_main");
    let mut stdout = child.stdout.take().expect("stdout is piped");
    let mut stderr = child.stderr.take().expect("stderr is piped");
    let out = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).ok();
        buf
    });
    let err = thread::spawn(move || {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).ok();
        buf
    });

    let status = match child.wait_timeout(TIMEOUT).expect("failed to wait for runtime_main") {
        Some(status) => status,
        None => {
            child.kill().ok();
            panic!("runtime_main timed out after {TIMEOUT:?}");
        }
    };
    let output = Output {
        status,
        stdout: out.join().expect("stdout reader panicked"),
        stderr: err.join().expect("stderr reader panicked"),
    };
    eprintln!("--- stdout ---\n{}", String::from_utf8_lossy(&output.stdout));
    eprintln!("--- stderr ---\n{}", String::from_utf8_lossy(&output.stderr));
    output
}

fn write_config(name: &str, json: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("arena-{}-{name}.json", std::process::id()));
    std::fs::write(&path, json).expect("failed to write config");
    path
}

#[test]
fn headless_cave_run_finishes_episodes() {
    let mut cmd = runtime_main();
    cmd.args(["--agent", "cave-crawler", "--episodes", "2", "--max-steps", "100"]);
    let output = run(cmd);

    assert!(output.status.success(), "exit: {:?}", output.status.code());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("episode finished").count(), 2, "{stdout}");
    assert!(stdout.contains("run finished"));
}

#[test]
fn json_logs_are_one_object_per_line() {
    let mut cmd = runtime_main();
    cmd.args(["--agent", "pogo-bouncer", "--episodes", "1", "--max-steps", "50", "--log-json"]);
    let output = run(cmd);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(!lines.is_empty());
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap_or_else(|e| panic!("{e}: {line}"));
        assert!(value.get("level").is_some(), "{line}");
    }
}

#[test]
fn non_finite_config_is_fatal() {
    let path = write_config("non-finite", r#"{"cave_crawler":{"max_view_distance":1e39}}"#);
    let mut cmd = runtime_main();
    cmd.arg("--config").arg(&path).args(["--episodes", "1"]);
    let output = run(cmd);
    std::fs::remove_file(&path).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_view_distance"));
}

#[test]
fn config_file_selects_the_agent() {
    let path = write_config(
        "pogo",
        r#"{"agent":"pogo-bouncer","settings":{"max_steps":30,"seed":3}}"#,
    );
    let mut cmd = runtime_main();
    cmd.arg("--config").arg(&path).args(["--episodes", "1", "--policy", "zero"]);
    let output = run(cmd);
    std::fs::remove_file(&path).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("pogo-bouncer"));
}

#[test]
fn watch_requires_a_config_file() {
    let mut cmd = runtime_main();
    cmd.arg("--watch");
    let output = run(cmd);
    assert!(!output.status.success());
}

trait ChildExt {
    fn wait_timeout(&mut self, duration: Duration) -> std::io::Result<Option<ExitStatus>>;
}

impl ChildExt for std::process::Child {
    fn wait_timeout(&mut self, duration: Duration) -> std::io::Result<Option<ExitStatus>> {
        let start = Instant::now();
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(Some(status));
            }
            if start.elapsed() > duration {
                return Ok(None);
            }
            thread::sleep(Duration::from_millis(50));
        }
    }
}
