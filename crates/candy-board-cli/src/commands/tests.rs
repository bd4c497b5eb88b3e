use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

use candy_board_core::protocol::codec;
use candy_board_core::protocol::{Action, Category, Command, Envelope, ResultBody};

use super::*;
use crate::process::ProcessOutput;

const SETTLE: Duration = Duration::from_millis(50);

/// Records every process run and answers with canned results keyed by the
/// first argument (`suspend`, `resume`, `start`, `status`, ...).
#[derive(Default)]
struct FakeRunner {
    replies: HashMap<&'static str, ProcessOutput>,
    spawn_fails: bool,
    calls: Mutex<Vec<(String, Vec<String>, Instant)>>,
}

impl FakeRunner {
    fn with(mut self, verb: &'static str, code: i32, stdout: &str) -> Self {
        self.replies.insert(
            verb,
            ProcessOutput {
                code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    fn verbs(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, args, _)| args[0].clone())
            .collect()
    }

    fn called_at(&self, verb: &str) -> Instant {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(_, args, _)| args[0] == verb)
            .map(|(_, _, at)| *at)
            .unwrap()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<ProcessOutput> {
        self.calls.lock().unwrap().push((
            program.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
            Instant::now(),
        ));
        if self.spawn_fails {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        Ok(self.replies.get(args[0]).cloned().unwrap_or_default())
    }
}

fn settings_for(home: &Path) -> Settings {
    let mut settings = Settings::new(home, &home.join("service.sock"));
    settings.settle_delay = SETTLE;
    settings.timeout = Duration::from_secs(2);
    settings
}

fn attach_usb(home: &Path) {
    std::fs::write(home.join("__modem_serial_port"), "/dev/ttyUSB2\n").unwrap();
}

fn reply(envelope: &Envelope) -> Vec<u8> {
    codec::encode_envelope(envelope).unwrap()
}

/// Fake service: answer one request and report what arrived and when.
fn serve_once(settings: &Settings, reply: Vec<u8>) -> JoinHandle<(Command, Instant)> {
    let listener = UnixListener::bind(&settings.socket_path).unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = codec::decode_command(&mut stream).await.unwrap().unwrap();
        let received = Instant::now();
        stream.write_all(&reply).await.unwrap();
        (request, received)
    })
}

async fn never_contacted(listener: &UnixListener) -> bool {
    tokio::time::timeout(Duration::from_millis(50), listener.accept())
        .await
        .is_err()
}

fn texts(outcome: &Outcome) -> Vec<(Severity, String)> {
    outcome
        .messages
        .iter()
        .map(|m| (m.severity, m.body.to_pretty_string()))
        .collect()
}

#[test]
fn test_plan_routes_by_category_and_action() {
    let cases = [
        (Category::Version, Action::Show, Strategy::Local),
        (Category::Service, Action::Version, Strategy::Remote),
        (Category::Service, Action::Start, Strategy::ServiceControl),
        (Category::Service, Action::Status, Strategy::ServiceControl),
        (Category::Apn, Action::Set, Strategy::Remote),
        (Category::Network, Action::Deregister, Strategy::Remote),
        (Category::Modem, Action::Reset, Strategy::Remote),
        (Category::Connection, Action::Suspend, Strategy::Remote),
        (Category::Gnss, Action::Locate, Strategy::Remote),
        (Category::Sim, Action::Reset, Strategy::Unsupported),
        (Category::Apn, Action::Locate, Strategy::Unsupported),
    ];
    for (category, action, expected) in cases {
        assert_eq!(plan(&Command::new(category, action)), expected, "{} {}", category, action);
    }
}

#[test]
fn test_link_relevance() {
    assert!(is_link_relevant(&Command::new(Category::Gnss, Action::Status)));
    assert!(is_link_relevant(
        &Command::new(Category::Sim, Action::Show).with_link_control(true, false)
    ));
    assert!(!is_link_relevant(&Command::new(Category::Sim, Action::Show)));
}

#[tokio::test]
async fn test_service_missing() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(&dir.path().join("absent"));
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Sim, Action::Show))
        .await;

    assert_eq!(outcome.code, 1);
    assert_eq!(outcome.messages[0].severity, Severity::Error);
    assert!(outcome.messages[0].body.to_pretty_string().contains("missing"));
    assert!(runner.verbs().is_empty());
}

#[tokio::test]
async fn test_version_without_daemon() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::version())
        .await;

    assert_eq!(outcome.code, 0);
    assert_eq!(
        texts(&outcome),
        vec![
            (Severity::Notice, env!("CARGO_PKG_VERSION").to_string()),
            (
                Severity::Warn,
                "CANDY Board Service daemon is not running".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_version_with_daemon_does_not_connect() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let listener = UnixListener::bind(&settings.socket_path).unwrap();
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::version())
        .await;

    assert_eq!(outcome.code, 0);
    assert_eq!(outcome.messages.len(), 1);
    assert!(never_contacted(&listener).await);
}

#[tokio::test]
async fn test_modem_reset_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let listener = UnixListener::bind(&settings.socket_path).unwrap();
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Modem, Action::Reset))
        .await;

    assert_eq!(outcome.code, 1);
    assert_eq!(outcome.messages[0].severity, Severity::Warn);
    assert!(never_contacted(&listener).await);
}

#[tokio::test]
async fn test_modem_reset_confirmed() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let daemon = serve_once(&settings, reply(&Envelope::ok("reset")));
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Modem, Action::Reset).with_yes(true))
        .await;

    let (request, _) = daemon.await.unwrap();
    assert!(request.yes);
    assert_eq!(outcome.code, 0);
}

#[tokio::test]
async fn test_remote_without_socket() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Network, Action::Show))
        .await;

    assert_eq!(outcome.code, 1);
    assert_eq!(
        texts(&outcome),
        vec![(Severity::Error, "CANDY Board Service is not running".to_string())]
    );
}

#[tokio::test]
async fn test_direct_success_with_structured_result() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let result = json!({"apns": [{"apn": "soracom.io", "user": "sora"}]});
    let daemon = serve_once(&settings, reply(&Envelope::ok(result.clone())));
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Apn, Action::Ls))
        .await;

    let (request, _) = daemon.await.unwrap();
    assert_eq!(request, Command::new(Category::Apn, Action::Ls));
    assert_eq!(outcome.code, 0);
    assert_eq!(outcome.messages[0].severity, Severity::Notice);
    assert_eq!(outcome.messages[0].body, ResultBody::Json(result));
    assert!(runner.verbs().is_empty());
}

#[tokio::test]
async fn test_remote_failure_exits_two() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let daemon = serve_once(&settings, reply(&Envelope::error("ERROR", "SIM not inserted")));
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Sim, Action::Show))
        .await;

    daemon.await.unwrap();
    assert_eq!(outcome.code, 2);
    assert_eq!(
        texts(&outcome),
        vec![(Severity::Error, "SIM not inserted".to_string())]
    );
}

#[tokio::test]
async fn test_empty_reply_is_silent_success() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let daemon = serve_once(&settings, vec![0, 0, 0, 0]);
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Connection, Action::Status))
        .await;

    daemon.await.unwrap();
    assert_eq!(outcome, Outcome::success(Vec::new()));
}

#[tokio::test]
async fn test_silent_service_times_out() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings_for(dir.path());
    settings.timeout = Duration::from_millis(100);
    let listener = UnixListener::bind(&settings.socket_path).unwrap();
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Sim, Action::Show))
        .await;

    drop(listener);
    assert_eq!(outcome.code, 1);
    assert!(outcome.messages[0].body.to_pretty_string().starts_with("Timed out"));
}

#[tokio::test]
async fn test_gnss_on_uart_suspends_settles_and_resumes() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let daemon = serve_once(&settings, reply(&Envelope::ok("GNSS session started")));
    let runner = FakeRunner::default()
        .with("suspend", 0, "")
        .with("resume", 0, "");

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Gnss, Action::Start).with_qzss(true))
        .await;

    let (request, received) = daemon.await.unwrap();
    assert!(request.qzss);
    assert_eq!(runner.verbs(), vec!["suspend", "resume"]);

    let suspended = runner.called_at("suspend");
    let resumed = runner.called_at("resume");
    assert!(received.duration_since(suspended) >= SETTLE);
    assert!(resumed >= received);

    let calls = runner.calls.lock().unwrap();
    assert_eq!(Path::new(&calls[0].0), settings.link_script);
    assert_eq!(calls[0].1, vec!["suspend", "-q"]);
    drop(calls);

    assert_eq!(outcome.code, 0);
    assert_eq!(
        texts(&outcome),
        vec![
            (Severity::Notice, "GNSS session started".to_string()),
            (Severity::Notice, "Modem link resumed".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_gnss_on_usb_goes_direct() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    attach_usb(dir.path());
    let daemon = serve_once(&settings, reply(&Envelope::ok(json!({"fix": false}))));
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Gnss, Action::Status))
        .await;

    daemon.await.unwrap();
    assert_eq!(outcome.code, 0);
    assert!(runner.verbs().is_empty());
}

#[tokio::test]
async fn test_suspend_hard_failure_skips_remote_call() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let listener = UnixListener::bind(&settings.socket_path).unwrap();
    let runner = FakeRunner::default().with("suspend", 5, "modem busy");

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Gnss, Action::Locate))
        .await;

    assert_eq!(outcome.code, 1);
    assert_eq!(outcome.messages[0].severity, Severity::Error);
    assert!(outcome.messages[0].body.to_pretty_string().contains("modem busy"));
    assert_eq!(runner.verbs(), vec!["suspend"]);
    assert!(never_contacted(&listener).await);
}

#[tokio::test]
async fn test_suspend_spawn_failure() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let listener = UnixListener::bind(&settings.socket_path).unwrap();
    let runner = FakeRunner {
        spawn_fails: true,
        ..Default::default()
    };

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Gnss, Action::Stop))
        .await;

    assert_eq!(outcome.code, 1);
    assert!(never_contacted(&listener).await);
}

#[tokio::test]
async fn test_suspend_timeout_warns_and_proceeds() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let daemon = serve_once(&settings, reply(&Envelope::ok("stopped")));
    let runner = FakeRunner::default()
        .with("suspend", 3, "")
        .with("resume", 1, "");

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Gnss, Action::Stop))
        .await;

    daemon.await.unwrap();
    assert_eq!(outcome.code, 0);
    let messages = texts(&outcome);
    assert_eq!(messages[0].0, Severity::Warn);
    assert_eq!(messages[1], (Severity::Notice, "stopped".to_string()));
    assert_eq!(
        messages[2],
        (Severity::Notice, "Modem link already running".to_string())
    );
}

#[tokio::test]
async fn test_already_idle_link_skips_settle() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings_for(dir.path());
    settings.settle_delay = Duration::from_secs(30);
    let daemon = serve_once(&settings, reply(&Envelope::ok("ok")));
    let runner = FakeRunner::default().with("suspend", 1, "");

    let started = Instant::now();
    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Sim, Action::Show).with_link_control(true, false))
        .await;

    daemon.await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(outcome.code, 0);
    assert_eq!(runner.verbs(), vec!["suspend"]);
}

#[tokio::test]
async fn test_resume_failure_keeps_primary_exit_code() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let daemon = serve_once(&settings, reply(&Envelope::error("ERROR", "no signal")));
    let runner = FakeRunner::default().with("resume", 7, "");

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Network, Action::Show).with_link_control(false, true))
        .await;

    daemon.await.unwrap();
    assert_eq!(runner.verbs(), vec!["resume"]);
    assert_eq!(outcome.code, 2);
    let messages = texts(&outcome);
    assert_eq!(messages[0], (Severity::Error, "no signal".to_string()));
    assert_eq!(messages[1].0, Severity::Warn);
}

#[tokio::test]
async fn test_link_flags_on_uart_wrap_the_call() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let daemon = serve_once(&settings, reply(&Envelope::ok(json!({"registered": true}))));
    let runner = FakeRunner::default()
        .with("suspend", 0, "")
        .with("resume", 6, "");

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Network, Action::Show).with_link_control(true, true))
        .await;

    let (request, received) = daemon.await.unwrap();
    assert!(request.suspend && request.resume);
    assert_eq!(runner.verbs(), vec!["suspend", "resume"]);
    assert!(received.duration_since(runner.called_at("suspend")) >= SETTLE);
    assert!(runner.called_at("resume") >= received);

    assert_eq!(outcome.code, 0);
    assert_eq!(outcome.messages.len(), 2);
    assert_eq!(outcome.messages[0].severity, Severity::Notice);
    assert_eq!(outcome.messages[1].severity, Severity::Warn);
}

#[tokio::test]
async fn test_link_flags_on_usb_go_direct() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    attach_usb(dir.path());
    let daemon = serve_once(&settings, reply(&Envelope::ok("ok")));
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Sim, Action::Show).with_link_control(true, true))
        .await;

    let (request, _) = daemon.await.unwrap();
    assert!(request.suspend && request.resume);
    assert_eq!(outcome.code, 0);
    assert!(runner.verbs().is_empty());
}

#[tokio::test]
async fn test_service_status_inactive_is_success() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let runner = FakeRunner::default().with("status", 3, "Active: inactive (dead)");

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Service, Action::Status))
        .await;

    assert_eq!(outcome.code, 0);
    assert_eq!(
        texts(&outcome),
        vec![(Severity::Notice, "Active: inactive (dead)".to_string())]
    );

    let calls = runner.calls.lock().unwrap();
    assert_eq!(calls[0].0, "systemctl");
    assert_eq!(calls[0].1, vec!["status", "candy-board-service"]);
}

#[tokio::test]
async fn test_service_start_without_socket() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Service, Action::Start))
        .await;

    assert_eq!(outcome.code, 0);
    assert_eq!(
        texts(&outcome),
        vec![(Severity::Notice, "candy-board-service started".to_string())]
    );
}

#[tokio::test]
async fn test_service_control_failure() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let runner = FakeRunner::default().with("restart", 3, "");

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Service, Action::Restart))
        .await;

    assert_eq!(outcome.code, 1);
    assert_eq!(outcome.messages[0].severity, Severity::Error);
    assert!(outcome.messages[0]
        .body
        .to_pretty_string()
        .starts_with("`systemctl restart candy-board-service` failed (exit 3)"));
}

#[tokio::test]
async fn test_service_version_is_remote() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let daemon = serve_once(&settings, reply(&Envelope::ok("5.2.0")));
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Service, Action::Version))
        .await;

    let (request, _) = daemon.await.unwrap();
    assert_eq!(request.category, Category::Service);
    assert_eq!(request.action, Action::Version);
    assert_eq!(texts(&outcome), vec![(Severity::Notice, "5.2.0".to_string())]);
    assert!(runner.verbs().is_empty());
}

#[tokio::test]
async fn test_unsupported_pair() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(dir.path());
    let runner = FakeRunner::default();

    let outcome = Dispatcher::new(&settings, &runner)
        .dispatch(&Command::new(Category::Sim, Action::Locate))
        .await;

    assert_eq!(outcome.code, 1);
    assert_eq!(
        texts(&outcome),
        vec![(Severity::Error, "Unsupported command: sim locate".to_string())]
    );
}

#[test]
fn test_io_error_outcome_uses_errno() {
    let outcome = Outcome::from(CliError::Io(io::Error::from_raw_os_error(libc::ECONNRESET)));
    assert_eq!(outcome.code, libc::ECONNRESET);
    assert!(outcome.messages[0]
        .body
        .to_pretty_string()
        .starts_with("ECONNRESET"));
}
