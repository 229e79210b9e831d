use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, layout::Position, Terminal};
use tokio::sync::{mpsc, oneshot};

use crate::error::{TransportError, TRANSPORT_ERROR_MESSAGE};
use crate::executor::CommandExecutor;
use crate::protocol::CommandResponse;
use crate::tui::app::App;
use crate::tui::events::{handle_event, handle_key_event};
use crate::tui::rendering::ui;
use crate::tui::types::{AppMessage, FocusedControl, SubmissionOutcome};
use crate::tui::widgets::{category_color, input_view, InputView, PLACEHOLDER};

type Reply = Result<Option<CommandResponse>, TransportError>;

/// Answers every command the same way and records what it was sent.
struct FixedExecutor {
    reply: Reply,
    received: Arc<Mutex<Vec<String>>>,
}

impl FixedExecutor {
    fn new(reply: Result<CommandResponse, TransportError>) -> Self {
        Self::replying(reply.map(Some))
    }

    /// Answers with a blank body (`null`, `false`, `0`, `""`).
    fn blank() -> Self {
        Self::replying(Ok(None))
    }

    fn replying(reply: Reply) -> Self {
        Self {
            reply,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CommandExecutor for FixedExecutor {
    async fn execute(&self, command: &str) -> Reply {
        self.received.lock().unwrap().push(command.to_string());
        self.reply.clone()
    }

    fn target(&self) -> String {
        "fixed://test".to_string()
    }
}

/// Holds each command until the test releases it, so completion order is
/// under test control.
struct GatedExecutor {
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
}

impl GatedExecutor {
    fn new(commands: &[&str]) -> (Self, HashMap<String, oneshot::Sender<Reply>>) {
        let mut gates = HashMap::new();
        let mut releases = HashMap::new();
        for command in commands {
            let (tx, rx) = oneshot::channel();
            gates.insert(command.to_string(), rx);
            releases.insert(command.to_string(), tx);
        }
        (Self { gates: Mutex::new(gates) }, releases)
    }
}

#[async_trait]
impl CommandExecutor for GatedExecutor {
    async fn execute(&self, command: &str) -> Reply {
        let gate = self.gates.lock().unwrap().remove(command);
        match gate {
            Some(rx) => rx.await.unwrap_or(Err(TransportError::Request("gate dropped".to_string()))),
            None => Err(TransportError::Request(format!("unexpected command {}", command))),
        }
    }

    fn target(&self) -> String {
        "gated://test".to_string()
    }
}

fn app_with(executor: impl CommandExecutor + 'static) -> (App, mpsc::UnboundedReceiver<AppMessage>) {
    let mut app = App::new(Arc::new(executor));
    let rx = app.rx.take().unwrap();
    (app, rx)
}

async fn next_message(rx: &mut mpsc::UnboundedReceiver<AppMessage>) -> AppMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("completion in time")
        .expect("channel open")
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn render(app: &App) -> String {
    render_with_cursor(app).0
}

fn render_with_cursor(app: &App) -> (String, Position) {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|f| ui(f, app)).unwrap();
    let screen = terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    let cursor = terminal.get_cursor_position().unwrap();
    (screen, cursor)
}

#[tokio::test]
async fn test_app_creation() {
    let (app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));

    assert_eq!(app.input, "");
    assert_eq!(app.outcome, SubmissionOutcome::None);
    assert_eq!(app.focused, FocusedControl::Input);
    assert_eq!(app.latest_seq(), 0);
    assert_eq!(app.endpoint, "fixed://test");
    assert!(!app.should_quit);
}

#[tokio::test]
async fn test_input_change_is_verbatim() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));

    let long = "x".repeat(4096);
    for text in ["", " ", "ls -l /home", "  padded  ", "échó 'ünïcode' ✓", long.as_str()] {
        app.on_input_change(text.to_string());
        assert_eq!(app.input, text);
    }
}

#[tokio::test]
async fn test_typing_builds_input() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));

    for c in "ls -lx".chars() {
        handle_key_event(&mut app, key(KeyCode::Char(c)));
    }
    handle_key_event(&mut app, key(KeyCode::Backspace));
    assert_eq!(app.input, "ls -l");

    handle_event(&mut app, Event::Paste(" /home\n".to_string()));
    assert_eq!(app.input, "ls -l /home");

    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
    assert_eq!(app.input, "");
}

#[tokio::test]
async fn test_successful_submission_shows_result() {
    let executor = FixedExecutor::new(Ok(CommandResponse::new("ok", "done")));
    let received = Arc::clone(&executor.received);
    let (mut app, mut rx) = app_with(executor);

    app.on_input_change("ls -l /home".to_string());
    let seq = app.on_submit();
    assert_eq!(seq, 1);

    let msg = next_message(&mut rx).await;
    assert!(app.handle_message(msg));

    assert_eq!(app.outcome.category(), Some("ok"));
    assert_eq!(app.outcome.message(), "done");
    assert_eq!(*received.lock().unwrap(), vec!["ls -l /home".to_string()]);
    assert_eq!(app.input, "ls -l /home");
}

#[tokio::test]
async fn test_transport_failure_shows_fixed_message_without_category() {
    let (mut app, mut rx) = app_with(FixedExecutor::new(Err(TransportError::Unreachable(
        "connection refused".to_string(),
    ))));

    app.on_input_change("uptime".to_string());
    app.on_submit();
    let msg = next_message(&mut rx).await;
    app.handle_message(msg);

    assert_eq!(
        app.outcome,
        SubmissionOutcome::TransportError { message: TRANSPORT_ERROR_MESSAGE.to_string() }
    );
    assert_eq!(app.outcome.category(), None);
    assert_eq!(app.outcome.message(), "An error occurred while sending the command.");
    assert_eq!(app.input, "uptime");
}

#[tokio::test]
async fn test_submission_clears_previous_outcome() {
    let (executor, releases) = GatedExecutor::new(&["whoami"]);
    let (mut app, _rx) = app_with(executor);
    app.outcome = SubmissionOutcome::from(CommandResponse::new("ok", "old"));

    app.on_input_change("whoami".to_string());
    app.on_submit();

    assert!(app.outcome.is_none());
    assert!(!render(&app).contains("old"));
    drop(releases);
}

#[tokio::test]
async fn test_latest_submission_wins_when_earlier_completes_last() {
    let (executor, mut releases) = GatedExecutor::new(&["first", "second"]);
    let (mut app, mut rx) = app_with(executor);

    app.on_input_change("first".to_string());
    let first = app.on_submit();
    app.on_input_change("second".to_string());
    let second = app.on_submit();
    assert!(second > first);

    releases
        .remove("second")
        .unwrap()
        .send(Ok(Some(CommandResponse::new("ok", "second done"))))
        .unwrap();
    let msg = next_message(&mut rx).await;
    assert!(app.handle_message(msg));

    releases
        .remove("first")
        .unwrap()
        .send(Ok(Some(CommandResponse::new("error", "first done"))))
        .unwrap();
    let msg = next_message(&mut rx).await;
    assert!(!app.handle_message(msg));

    assert_eq!(app.outcome.category(), Some("ok"));
    assert_eq!(app.outcome.message(), "second done");
}

#[tokio::test]
async fn test_stale_completion_does_not_fill_cleared_outcome() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));
    app.on_submit();
    app.on_submit();

    let applied = app.handle_message(AppMessage::SubmissionComplete {
        seq: 1,
        outcome: SubmissionOutcome::from(CommandResponse::new("ok", "stale")),
    });

    assert!(!applied);
    assert!(app.outcome.is_none());
}

#[tokio::test]
async fn test_submit_gesture_never_leaves_form() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::new("ok", "done"))));
    app.on_input_change("df -h".to_string());

    assert_eq!(handle_key_event(&mut app, key(KeyCode::Enter)), ControlFlow::Continue(()));
    assert_eq!(app.latest_seq(), 1);

    handle_key_event(&mut app, key(KeyCode::Tab));
    assert_eq!(app.focused, FocusedControl::Submit);
    assert_eq!(handle_key_event(&mut app, key(KeyCode::Char(' '))), ControlFlow::Continue(()));
    assert_eq!(handle_key_event(&mut app, key(KeyCode::Enter)), ControlFlow::Continue(()));
    assert_eq!(app.latest_seq(), 3);

    assert!(!app.should_quit);
    assert_eq!(app.input, "df -h");
}

#[tokio::test]
async fn test_typing_on_submit_control_is_ignored() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));
    app.on_input_change("ls".to_string());
    app.cycle_focus();

    handle_key_event(&mut app, key(KeyCode::Char('x')));
    handle_key_event(&mut app, key(KeyCode::Backspace));
    handle_event(&mut app, Event::Paste("rm".to_string()));

    assert_eq!(app.input, "ls");
    assert_eq!(app.latest_seq(), 0);
}

#[tokio::test]
async fn test_quit_keys() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));

    assert_eq!(handle_key_event(&mut app, key(KeyCode::Esc)), ControlFlow::Break(()));
    assert_eq!(
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        ControlFlow::Break(())
    );
    // A plain 'q' is part of a command.
    assert_eq!(handle_key_event(&mut app, key(KeyCode::Char('q'))), ControlFlow::Continue(()));
    assert_eq!(app.input, "q");
}

#[tokio::test]
async fn test_same_command_twice_gives_same_outcome() {
    let (mut app, mut rx) = app_with(FixedExecutor::new(Ok(CommandResponse::new("ok", "uptime: 3 days"))));
    app.on_input_change("uptime".to_string());

    app.on_submit();
    let msg = next_message(&mut rx).await;
    app.handle_message(msg);
    let first = app.outcome.clone();

    app.on_submit();
    let msg = next_message(&mut rx).await;
    app.handle_message(msg);

    assert_eq!(app.outcome, first);
    assert_eq!(app.input, "uptime");
}

#[tokio::test]
async fn test_render_without_outcome() {
    let (app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));
    let screen = render(&app);

    assert!(screen.contains("Cognition Cockpit"));
    assert!(screen.contains("Command:"));
    assert!(screen.contains(PLACEHOLDER));
    assert!(screen.contains("Execute"));
    assert!(!screen.contains("Response"));
}

#[tokio::test]
async fn test_render_result_panel() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));
    app.on_input_change("ls -l /home".to_string());
    app.outcome = SubmissionOutcome::from(CommandResponse::new("ok", "done"));

    let screen = render(&app);
    assert!(screen.contains("ls -l /home"));
    assert!(screen.contains("Response [ok]"));
    assert!(screen.contains("done"));
}

#[tokio::test]
async fn test_render_transport_error_panel() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));
    app.outcome = SubmissionOutcome::transport_error();

    let screen = render(&app);
    assert!(screen.contains(TRANSPORT_ERROR_MESSAGE));
    assert!(screen.contains("Response"));
    assert!(!screen.contains("Response ["));
}

#[tokio::test]
async fn test_render_result_with_missing_fields() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));
    app.outcome = SubmissionOutcome::from(CommandResponse::default());

    let screen = render(&app);
    assert!(screen.contains("Response"));
    assert!(!screen.contains("Response ["));
}

#[test]
fn test_category_colors() {
    use ratatui::style::Color;

    assert_eq!(category_color(Some("ok")), Color::Green);
    assert_eq!(category_color(Some("error")), Color::Red);
    assert_eq!(category_color(Some("queued")), Color::Yellow);
    assert_eq!(category_color(None), Color::Reset);
}

#[test]
fn test_outcome_accessors() {
    assert_eq!(SubmissionOutcome::None.message(), "");
    assert_eq!(SubmissionOutcome::None.category(), None);

    let outcome = SubmissionOutcome::from(CommandResponse {
        status: Some("error".to_string()),
        message: None,
    });
    assert_eq!(outcome.category(), Some("error"));
    assert_eq!(outcome.message(), "");
}

#[tokio::test]
async fn test_input_stays_editable_while_request_in_flight() {
    let (executor, mut releases) = GatedExecutor::new(&["ls"]);
    let (mut app, mut rx) = app_with(executor);

    for c in "ls".chars() {
        handle_key_event(&mut app, key(KeyCode::Char(c)));
    }
    handle_key_event(&mut app, key(KeyCode::Enter));
    assert!(app.outcome.is_none());

    // The request is still held open; keep typing.
    for c in " -a".chars() {
        handle_key_event(&mut app, key(KeyCode::Char(c)));
    }
    handle_key_event(&mut app, key(KeyCode::Backspace));
    assert_eq!(app.input, "ls -");

    releases
        .remove("ls")
        .unwrap()
        .send(Ok(Some(CommandResponse::new("ok", "bin etc home"))))
        .unwrap();

    tokio::time::timeout(Duration::from_secs(2), async {
        while app.outcome.is_none() {
            app.drain_messages(&mut rx);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("completion in time");

    assert_eq!(app.outcome.category(), Some("ok"));
    assert_eq!(app.outcome.message(), "bin etc home");
    assert_eq!(app.input, "ls -");
}

#[tokio::test]
async fn test_blank_reply_shows_no_panel() {
    let (mut app, mut rx) = app_with(FixedExecutor::blank());
    app.outcome = SubmissionOutcome::from(CommandResponse::new("ok", "old"));
    app.on_input_change("true".to_string());

    app.on_submit();
    let msg = next_message(&mut rx).await;
    assert!(app.handle_message(msg));

    assert!(app.outcome.is_none());
    assert!(!render(&app).contains("Response"));
}

#[tokio::test]
async fn test_altgr_characters_reach_input() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));
    let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;

    for c in ['@', '{', '}', '~'] {
        let flow = handle_key_event(&mut app, KeyEvent::new(KeyCode::Char(c), altgr));
        assert_eq!(flow, ControlFlow::Continue(()));
    }
    assert_eq!(app.input, "@{}~");

    // Ctrl alone is still a shortcut.
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
    assert_eq!(app.input, "");
}

#[tokio::test]
async fn test_render_very_long_input() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));
    app.on_input_change("a".repeat(65535));

    let (screen, cursor) = render_with_cursor(&app);

    // 80 columns, two borders, one cell left for the cursor.
    assert!(screen.contains(&"a".repeat(77)));
    assert_eq!(cursor, Position { x: 78, y: 5 });
    assert_eq!(app.input.len(), 65535);

    app.on_input_change("b".repeat(200_000));
    let (_, cursor) = render_with_cursor(&app);
    assert_eq!(cursor, Position { x: 78, y: 5 });
}

#[tokio::test]
async fn test_cursor_uses_display_width() {
    let (mut app, _rx) = app_with(FixedExecutor::new(Ok(CommandResponse::default())));
    app.on_input_change("日本語".to_string());

    let (_, cursor) = render_with_cursor(&app);
    assert_eq!(cursor, Position { x: 7, y: 5 });
}

#[test]
fn test_input_view_scrolls_to_tail() {
    assert_eq!(input_view("ls", 10), InputView { visible: "ls", cursor_col: 2 });
    assert_eq!(input_view("abcdefghij", 5), InputView { visible: "ghij", cursor_col: 4 });
    // A wide char that would straddle the edge is left out.
    assert_eq!(input_view("x日本語", 6), InputView { visible: "本語", cursor_col: 4 });
    assert_eq!(input_view("abc", 0), InputView { visible: "", cursor_col: 0 });
}
