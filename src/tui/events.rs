use std::ops::ControlFlow;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::App;
use super::types::FocusedControl;

/// Dispatches one terminal event to the form.
pub fn handle_event(app: &mut App, event: Event) -> ControlFlow<()> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key_event(app, key),
        Event::Paste(text) => {
            if app.focused == FocusedControl::Input {
                app.paste(&text);
            }
            ControlFlow::Continue(())
        }
        _ => ControlFlow::Continue(()),
    }
}

/// Keyboard handling. The submit gesture is consumed here and never leaves
/// the form.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> ControlFlow<()> {
    // AltGr arrives as CONTROL|ALT and is plain text input.
    let shortcut = key.modifiers.contains(KeyModifiers::CONTROL)
        && !key.modifiers.contains(KeyModifiers::ALT);
    if shortcut {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => ControlFlow::Break(()),
            KeyCode::Char('u') if app.focused == FocusedControl::Input => {
                app.clear_line();
                ControlFlow::Continue(())
            }
            _ => ControlFlow::Continue(()),
        };
    }

    match key.code {
        KeyCode::Esc => return ControlFlow::Break(()),
        KeyCode::Tab | KeyCode::BackTab => app.cycle_focus(),
        KeyCode::Enter => {
            app.on_submit();
        }
        _ => match app.focused {
            FocusedControl::Input => match key.code {
                KeyCode::Char(c) => app.insert_char(c),
                KeyCode::Backspace => app.delete_char(),
                _ => {}
            },
            FocusedControl::Submit => {
                if key.code == KeyCode::Char(' ') {
                    app.on_submit();
                }
            }
        },
    }

    ControlFlow::Continue(())
}
