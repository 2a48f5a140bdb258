use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use ratatui::Frame;

use timer_core::field_label;

use crate::{CountdownApp, PickerField};

/// Visible rows per wheel; the selected value sits on the middle row.
pub const WHEEL_ROWS: usize = 5;

const WHEEL_SPAN: i32 = 60;
const WHEEL_WIDTH: u16 = 10;
const TOGGLE_WIDTH: u16 = 14;

pub fn draw(frame: &mut Frame, app: &CountdownApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(WHEEL_ROWS as u16 + 2),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_pickers(frame, app, chunks[1]);
    draw_toggle(frame, app, chunks[2]);
    draw_footer(frame, chunks[3]);

    if app.notice_visible {
        draw_notice(frame);
    }
}

fn draw_header(frame: &mut Frame, app: &CountdownApp, area: Rect) {
    let status = if app.core.is_running() {
        Span::styled("counting down", Style::default().fg(Color::Green))
    } else if app.alarm_active() {
        Span::styled(
            "time's up!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("idle", Style::default().fg(Color::DarkGray))
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled("COUNTDOWN", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        status,
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_pickers(frame: &mut Frame, app: &CountdownApp, area: Rect) {
    let height = (WHEEL_ROWS as u16 + 2).min(area.height);
    let centered = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: area.width,
        height,
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(WHEEL_WIDTH),
            Constraint::Length(3),
            Constraint::Length(WHEEL_WIDTH),
            Constraint::Min(0),
        ])
        .split(centered);

    let flash = app.vibe.phase_on();
    draw_wheel(
        frame,
        columns[1],
        "min",
        app.core.minutes(),
        app.focus == PickerField::Minutes,
        flash,
    );
    draw_colon(frame, columns[2], flash);
    draw_wheel(
        frame,
        columns[3],
        "sec",
        app.core.seconds(),
        app.focus == PickerField::Seconds,
        flash,
    );
}

fn draw_wheel(frame: &mut Frame, area: Rect, title: &str, selected: u8, focused: bool, flash: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut selected_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    if flash {
        selected_style = selected_style.add_modifier(Modifier::REVERSED);
    }

    let lines: Vec<Line> = wheel_window(selected, WHEEL_ROWS)
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let style = if row == WHEEL_ROWS / 2 {
                selected_style
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::styled(field_label(value), style)
        })
        .collect();

    let wheel = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style),
    );
    frame.render_widget(wheel, area);
}

fn draw_colon(frame: &mut Frame, area: Rect, flash: bool) {
    let mut style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    if flash {
        style = style.add_modifier(Modifier::REVERSED);
    }
    // One leading blank so the colon lines up with the wheels' middle row
    // despite the wheels carrying a top border.
    let lines: Vec<Line> = (0..=WHEEL_ROWS)
        .map(|row| {
            if row == WHEEL_ROWS / 2 + 1 {
                Line::styled(":", style)
            } else {
                Line::raw("")
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_toggle(frame: &mut Frame, app: &CountdownApp, area: Rect) {
    let label = app.toggle_label();
    let accent = if label == "Stop" {
        Color::Red
    } else {
        Color::Green
    };

    let width = TOGGLE_WIDTH.min(area.width);
    let button_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y,
        width,
        height: area.height.min(3),
    };

    let button = Paragraph::new(Line::styled(
        label,
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(accent)),
    );
    frame.render_widget(button, button_area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let hints = Paragraph::new(Line::raw(
        "up/down set   left/right field   Enter start/stop   q quit",
    ))
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    frame.render_widget(hints, area);
}

fn draw_notice(frame: &mut Frame) {
    let area = centered_rect(44, 28, frame.area());
    frame.render_widget(Clear, area);

    let dialog = Paragraph::new(vec![
        Line::raw(""),
        Line::styled(
            "Select a value !!!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::styled("press any key", Style::default().fg(Color::DarkGray)),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(dialog, area);
}

/// Window of wheel values centered on the selection, wrapping over 0..=59.
fn wheel_window(selected: u8, rows: usize) -> Vec<u8> {
    let half = (rows / 2) as i32;
    (0..rows as i32)
        .map(|row| (i32::from(selected) + row - half).rem_euclid(WHEEL_SPAN) as u8)
        .collect()
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(rows[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_window_wraps_below_zero() {
        assert_eq!(wheel_window(0, 5), vec![58, 59, 0, 1, 2]);
    }

    #[test]
    fn wheel_window_wraps_past_fifty_nine() {
        assert_eq!(wheel_window(59, 5), vec![57, 58, 59, 0, 1]);
    }

    #[test]
    fn wheel_window_centers_selection() {
        let window = wheel_window(30, WHEEL_ROWS);
        assert_eq!(window[WHEEL_ROWS / 2], 30);
        assert_eq!(window, vec![28, 29, 30, 31, 32]);
    }

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(44, 28, outer);
        assert!(inner.width <= outer.width);
        assert!(inner.height <= outer.height);
        assert!(inner.x >= outer.x && inner.y >= outer.y);
    }
}
