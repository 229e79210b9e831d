use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::app::App;
use super::types::FocusedControl;

pub const TITLE: &str = "Cognition Cockpit";
pub const SUBTITLE: &str = "Issue commands to the Sovereign Cognition Engine.";
pub const INPUT_LABEL: &str = " Command: ";
pub const PLACEHOLDER: &str = "e.g., ls -l /home";
pub const SUBMIT_LABEL: &str = "Execute";

/// Colour for an outcome category. Unknown categories still stand out;
/// no category renders plain.
pub fn category_color(category: Option<&str>) -> Color {
    match category {
        Some("ok") => Color::Green,
        Some("error") => Color::Red,
        Some(_) => Color::Yellow,
        None => Color::Reset,
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}

pub fn create_header(app: &App) -> Paragraph<'_> {
    let mut title = vec![
        Span::styled(TITLE, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];
    if app.show_clock {
        title.push(Span::raw(" | "));
        title.push(Span::styled(&app.current_time, Style::default().fg(Color::Yellow)));
    }

    let header_text = vec![
        Line::from(title),
        Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::DarkGray))),
    ];

    Paragraph::new(header_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)))
        .alignment(Alignment::Center)
}

/// The part of the input that fits in the field, and where the cursor sits
/// relative to the field's inner left edge.
#[derive(Debug, PartialEq, Eq)]
pub struct InputView<'a> {
    pub visible: &'a str,
    pub cursor_col: u16,
}

/// Scrolls the input horizontally so its tail and the cursor cell fit in
/// `inner_width` columns. Widths are display widths, not char counts.
pub fn input_view(input: &str, inner_width: u16) -> InputView<'_> {
    // One column stays free for the cursor after the last character.
    let available = usize::from(inner_width.saturating_sub(1));

    let total = input.width();
    if total <= available {
        return InputView {
            visible: input,
            cursor_col: total as u16,
        };
    }

    let mut start = input.len();
    let mut used = 0usize;
    for (idx, c) in input.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > available {
            break;
        }
        used += w;
        start = idx;
    }

    InputView {
        visible: &input[start..],
        cursor_col: used as u16,
    }
}

pub fn create_input_field(app: &App, inner_width: u16) -> Paragraph<'_> {
    let content = if app.input.is_empty() {
        Line::from(Span::styled(
            PLACEHOLDER,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from(input_view(&app.input, inner_width).visible)
    };

    Paragraph::new(content)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(INPUT_LABEL)
            .border_style(focus_style(app.focused == FocusedControl::Input)))
}

pub fn create_submit_button(app: &App) -> Paragraph<'_> {
    let focused = app.focused == FocusedControl::Submit;
    let label_style = if focused {
        Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    Paragraph::new(Line::from(Span::styled(format!(" {} ", SUBMIT_LABEL), label_style)))
        .block(Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(focused)))
        .alignment(Alignment::Center)
}

/// The outcome panel, or nothing while the outcome is cleared.
pub fn create_outcome_panel(app: &App) -> Option<Paragraph<'_>> {
    if app.outcome.is_none() {
        return None;
    }

    let category = app.outcome.category();
    let color = category_color(category);
    let title = match category {
        Some(status) => format!(" Response [{}] ", status),
        None => " Response ".to_string(),
    };

    let body: Vec<Line> = app
        .outcome
        .message()
        .lines()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(color))))
        .collect();

    Some(
        Paragraph::new(body)
            .block(Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(color)))
            .wrap(Wrap { trim: false }),
    )
}

pub fn create_status_bar(app: &App) -> Paragraph<'_> {
    Paragraph::new(Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Cyan)),
        Span::raw(" execute  "),
        Span::styled("Tab", Style::default().fg(Color::Cyan)),
        Span::raw(" focus  "),
        Span::styled("Ctrl+U", Style::default().fg(Color::Cyan)),
        Span::raw(" clear  "),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::raw(" quit  | "),
        Span::styled(&app.endpoint, Style::default().fg(Color::DarkGray)),
    ]))
    .style(Style::default().bg(Color::Black))
}
