use std::io;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::TuiConfig;
use crate::executor::CommandExecutor;

use super::app::App;
use super::events;
use super::types::{AppMessage, FocusedControl};
use super::widgets;

pub async fn run_tui(executor: Arc<dyn CommandExecutor>, config: &TuiConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(executor);
    app.show_clock = config.show_clock;
    info!(endpoint = %app.endpoint, "command form started");

    let mut rx = app
        .rx
        .take()
        .ok_or_else(|| anyhow::anyhow!("Message receiver already taken"))?;
    let tick_rate = Duration::from_millis(config.tick_rate_ms.max(10));

    let res = run_app(&mut terminal, &mut app, &mut rx, tick_rate).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<AppMessage>,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        if app.should_quit {
            return Ok(());
        }

        app.update_time();
        app.drain_messages(rx);

        terminal.draw(|f| ui(f, app))?;

        // Requests run on spawned tasks, so the form stays editable meanwhile.
        if event::poll(tick_rate)? {
            if let ControlFlow::Break(()) = events::handle_event(app, event::read()?) {
                app.should_quit = true;
            }
        }
        tokio::task::yield_now().await;
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // Header
            Constraint::Length(3),  // Command input
            Constraint::Length(3),  // Execute
            Constraint::Min(3),     // Outcome
            Constraint::Length(1),  // Status bar
        ])
        .split(f.area());

    f.render_widget(widgets::create_header(app), chunks[0]);

    let input_area = chunks[1];
    let inner_width = input_area.width.saturating_sub(2);
    f.render_widget(widgets::create_input_field(app, inner_width), input_area);
    if app.focused == FocusedControl::Input {
        let view = widgets::input_view(&app.input, inner_width);
        f.set_cursor_position((
            input_area.x.saturating_add(1).saturating_add(view.cursor_col),
            input_area.y.saturating_add(1),
        ));
    }

    let button_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(13), Constraint::Min(0)])
        .split(chunks[2])[0];
    f.render_widget(widgets::create_submit_button(app), button_area);

    if let Some(panel) = widgets::create_outcome_panel(app) {
        f.render_widget(panel, chunks[3]);
    }

    f.render_widget(widgets::create_status_bar(app), chunks[4]);
}
