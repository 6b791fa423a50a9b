use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, ProfileState};

use super::styles;

/// Width of the login dialog, borders included
const DIALOG_WIDTH: u16 = 50;

/// Visible width of the text fields
const FIELD_WIDTH: usize = 28;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);

    match app.state {
        AppState::Dashboard => render_dashboard(frame, app, chunks[1]),
        AppState::ConfirmingQuit => {
            render_dashboard(frame, app, chunks[1]);
            render_quit_overlay(frame);
        }
        AppState::LoggingIn | AppState::Quitting => render_login_form(frame, app, chunks[1]),
    }

    render_hints(frame, app, chunks[2]);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Login";
    let backend = app.base_url();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + backend.len() + 2),
        )),
        Span::styled(backend, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

/// Keep the tail of a field visible once it outgrows the box
fn field_tail(value: &str) -> String {
    let len = value.chars().count();
    if len <= FIELD_WIDTH {
        value.to_string()
    } else {
        value.chars().skip(len - FIELD_WIDTH).collect()
    }
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };
    let cursor = if focused { "▌" } else { " " };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(label, styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", value, cursor, width = FIELD_WIDTH),
            style,
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_login_form(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.status();
    let height = if status.visible { 11 } else { 9 };
    let dialog = centered_rect_fixed(DIALOG_WIDTH, height, area);

    frame.render_widget(Clear, dialog);

    let mut lines = vec![Line::from("")];

    lines.push(field_line(
        "Email:    ",
        field_tail(&app.login_email),
        app.login_focus == LoginFocus::Email,
    ));

    let masked = "*".repeat(app.login_password.chars().count());
    lines.push(field_line(
        "Password: ",
        field_tail(&masked),
        app.login_focus == LoginFocus::Password,
    ));

    // Login button, disabled while a request is in flight
    lines.push(Line::from(""));
    let button = if app.is_submitting() {
        Span::styled(" Logging in… ", styles::disabled_style())
    } else if app.login_focus == LoginFocus::Button {
        Span::styled(" ▶ Login ◀ ", styles::selected_style())
    } else {
        Span::styled("   Login   ", styles::field_style())
    };
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(17)),
        Span::raw("["),
        button,
        Span::raw("]"),
    ]));

    // Status message
    if status.visible {
        let style = status
            .kind
            .map(styles::message_style)
            .unwrap_or_else(styles::field_style);
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", status.text), style)));
    }

    let block = Block::default()
        .title(" Sign in ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];

    let status = app.status();
    if status.visible {
        let style = status
            .kind
            .map(styles::message_style)
            .unwrap_or_else(styles::field_style);
        lines.push(Line::from(Span::styled(format!("  {}", status.text), style)));
        lines.push(Line::from(""));
    }

    match &app.profile {
        ProfileState::NotLoaded => {
            lines.push(Line::from(Span::styled("  No profile loaded", styles::muted_style())));
        }
        ProfileState::Loading => {
            lines.push(Line::from(Span::styled("  Verifying session...", styles::info_style())));
        }
        ProfileState::Loaded(user) => {
            lines.push(Line::from(vec![
                Span::styled("  Name:  ", styles::muted_style()),
                Span::styled(user.name.clone(), styles::field_style()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Email: ", styles::muted_style()),
                Span::styled(user.email.clone(), styles::field_style()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  ID:    ", styles::muted_style()),
                Span::styled(user.id.to_string(), styles::muted_style()),
            ]));
        }
        ProfileState::Failed(error) => {
            lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
        }
    }

    let block = Block::default()
        .title(" Dashboard ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let hints: &[(&str, &str)] = match app.state {
        AppState::Dashboard | AppState::ConfirmingQuit => {
            &[("r", "verify again"), ("l", "back to login"), ("q", "quit")]
        }
        AppState::LoggingIn | AppState::Quitting => {
            &[("Tab", "next field"), ("Enter", "submit"), ("Esc", "quit")]
        }
    };

    let mut spans = vec![Span::raw(" ")];
    for (key, desc) in hints {
        spans.push(Span::styled(*key, styles::help_key_style()));
        spans.push(Span::raw(format!(" {}   ", desc)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(styles::status_bar_style()),
        area,
    );
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(DIALOG_WIDTH, 5, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  Quit?  "),
            Span::styled("[y]", styles::help_key_style()),
            Span::raw(" yes  "),
            Span::styled("[n]", styles::help_key_style()),
            Span::raw(" no"),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
