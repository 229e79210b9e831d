use std::sync::Arc;
use chrono::Local;
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info};

use crate::executor::CommandExecutor;

use super::types::{AppMessage, FocusedControl, SubmissionOutcome};

/// The command form: the text being typed and the outcome of the latest
/// submission.
pub struct App {
    // Form state
    pub input: String,
    pub outcome: SubmissionOutcome,
    pub focused: FocusedControl,

    // Chrome
    pub current_time: String,
    pub show_clock: bool,
    pub endpoint: String,

    executor: Arc<dyn CommandExecutor>,
    // Sequence number of the most recent submission; 0 before the first.
    latest_seq: u64,

    // Message channel
    pub tx: mpsc::UnboundedSender<AppMessage>,
    pub rx: Option<mpsc::UnboundedReceiver<AppMessage>>,

    pub should_quit: bool,
}

impl App {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let endpoint = executor.target();

        Self {
            input: String::new(),
            outcome: SubmissionOutcome::None,
            focused: FocusedControl::Input,
            current_time: Local::now().format("%H:%M:%S").to_string(),
            show_clock: true,
            endpoint,
            executor,
            latest_seq: 0,
            tx,
            rx: Some(rx),
            should_quit: false,
        }
    }

    pub fn update_time(&mut self) {
        self.current_time = Local::now().format("%H:%M:%S").to_string();
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Replaces the command text. No validation, no trimming.
    pub fn on_input_change(&mut self, text: String) {
        self.input = text;
    }

    pub fn insert_char(&mut self, c: char) {
        let mut text = self.input.clone();
        text.push(c);
        self.on_input_change(text);
    }

    pub fn delete_char(&mut self) {
        let mut text = self.input.clone();
        text.pop();
        self.on_input_change(text);
    }

    pub fn paste(&mut self, pasted: &str) {
        // The field is single-line.
        let mut text = self.input.clone();
        text.extend(pasted.chars().filter(|c| *c != '\n' && *c != '\r'));
        self.on_input_change(text);
    }

    pub fn clear_line(&mut self) {
        self.on_input_change(String::new());
    }

    pub fn cycle_focus(&mut self) {
        self.focused = self.focused.next();
    }

    /// Starts one request for the current input and returns its sequence
    /// number. The outcome is cleared until a completion for this sequence
    /// arrives; the input is left as it is.
    pub fn on_submit(&mut self) -> u64 {
        self.latest_seq += 1;
        let seq = self.latest_seq;
        self.outcome = SubmissionOutcome::None;

        let command = self.input.clone();
        info!(seq, bytes = command.len(), "submitting command");

        let executor = Arc::clone(&self.executor);
        let tx = self.tx.clone();
        task::spawn(async move {
            let outcome = SubmissionOutcome::from_reply(executor.execute(&command).await);
            let _ = tx.send(AppMessage::SubmissionComplete { seq, outcome });
        });

        seq
    }

    /// Applies a completion. Returns false when it belonged to a superseded
    /// submission and was dropped.
    pub fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::SubmissionComplete { seq, outcome } => {
                if seq != self.latest_seq {
                    debug!(seq, latest = self.latest_seq, "discarding stale completion");
                    return false;
                }
                self.outcome = outcome;
                true
            }
        }
    }

    /// Drains every completion that has arrived so far.
    pub fn drain_messages(&mut self, rx: &mut mpsc::UnboundedReceiver<AppMessage>) {
        while let Ok(msg) = rx.try_recv() {
            self.handle_message(msg);
        }
    }
}
