use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::app::{App, AppState, LoginFocus};
use crate::routes::Route;

use super::safe_area::SafeArea;
use super::styles;

/// Swatch height in rows. Terminal cells are roughly twice as tall as
/// they are wide, so the canvas is twice as wide to keep the circle round.
const SWATCH_ROWS: u16 = 10;

/// Number of concentric rings drawn to fill the swatch.
const SWATCH_RINGS: u32 = 12;

pub fn render(frame: &mut Frame, app: &App) {
    let area = SafeArea::default().inner(frame.area());

    match app.route {
        Route::Index => render_welcome(frame, area),
        Route::Login => render_login(frame, app, area),
        Route::Home => render_home(frame, app, area),
    }

    if let Some(ref msg) = app.status_message {
        render_status_line(frame, msg, area);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_status_line(frame: &mut Frame, msg: &str, area: Rect) {
    if area.height == 0 {
        return;
    }
    let line_area = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
    let paragraph = Paragraph::new(Line::from(Span::styled(msg.to_string(), styles::error_style())))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, line_area);
}

/// The root screen: a colored swatch and a title.
fn render_welcome(frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(SWATCH_ROWS),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let swatch_area = centered_rect_fixed(SWATCH_ROWS * 2, SWATCH_ROWS, chunks[1]);
    let swatch = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            for ring in 1..=SWATCH_RINGS {
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: 0.95 * f64::from(ring) / f64::from(SWATCH_RINGS),
                    color: styles::SWATCH,
                });
            }
        });
    frame.render_widget(swatch, swatch_area);

    let title = Paragraph::new(Line::from(Span::styled(
        "Welcome to Sprout",
        styles::title_style(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[3]);

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("[Enter]", styles::help_key_style()),
        Span::styled(" continue  ", styles::muted_style()),
        Span::styled("[q]", styles::help_key_style()),
        Span::styled(" quit", styles::muted_style()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[4]);
}

fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.login_status();
    let error = status.error_message();
    let pending = status.is_pending();

    let height = if error.is_some() { 11 } else { 9 };
    let dialog = centered_rect_fixed(46, height, area);

    frame.render_widget(Clear, dialog);

    let mut lines = vec![Line::from("")];

    let email_focused = app.login_focus == LoginFocus::Email;
    let email_style = if email_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let email_display = format!("{:<24}", tail(&app.login_email, 24));
    let cursor = if email_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Email:    [", styles::muted_style()),
        Span::styled(format!("{}{}", email_display, cursor), email_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.chars().count().min(24));
    let password_display = format!("{:<24}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Button label swaps while a request is in flight
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if pending {
        styles::muted_style()
    } else if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let label = match (pending, button_focused) {
        (true, _) => " Signing in… ",
        (false, true) => " ▶ Sign in ◀ ",
        (false, false) => "   Sign in   ",
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("               ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if let Some(error) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" [Tab]", styles::help_key_style()),
        Span::styled(" next field  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" back", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(Span::styled(format!(" {} ", Route::Login.title()), styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.session.session();
    let dialog = centered_rect_fixed(50, 11, area);

    let mut lines = vec![Line::from("")];

    match session.auth() {
        Some(auth) => {
            lines.push(Line::from(Span::styled(
                format!("  Hello, {}", auth.user.display_name()),
                styles::title_style(),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  Email:     ", styles::muted_style()),
                Span::styled(auth.user.email.clone(), styles::list_item_style()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  User ID:   ", styles::muted_style()),
                Span::styled(auth.user.id.to_string(), styles::list_item_style()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Signed in: ", styles::muted_style()),
                Span::styled(
                    auth.signed_in_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string(),
                    styles::success_style(),
                ),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "  Not signed in",
                styles::highlight_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  [l]", styles::help_key_style()),
        Span::styled(" log out  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" welcome  ", styles::muted_style()),
        Span::styled("[q]", styles::help_key_style()),
        Span::styled(" quit", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(Span::styled(format!(" {} ", Route::Home.title()), styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

/// Last `max` characters of `s`, so the cursor end stays visible.
fn tail(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    match s.char_indices().nth(count - max) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 6, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
