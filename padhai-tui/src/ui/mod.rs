use crate::app::{App, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

mod calendar_view;
mod confirm_dialog;
mod dashboard_view;
mod subjects_view;
pub(super) mod utils;

const TABS: [(&str, &str); 3] = [("1", "Dashboard"), ("2", "Calendar"), ("3", "Subjects")];

pub fn render(frame: &mut Frame, app: &mut App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);

    let body = root[1];
    match app.current_view {
        View::Dashboard => dashboard_view::render_dashboard_view(frame, app, body),
        View::Calendar => calendar_view::render_calendar_view(frame, app, body),
        View::ConfirmComplete => confirm_dialog::render_confirm_complete_dialog(frame, app, body),
        View::Subjects | View::Chapters => subjects_view::render_subjects_view(frame, app, body),
    }

    render_status_line(frame, root[2], app);
}

fn active_tab(view: View) -> usize {
    match view {
        View::Dashboard => 0,
        View::Calendar | View::ConfirmComplete => 1,
        View::Subjects | View::Chapters => 2,
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    let content = Rect {
        x: rows[1].x + 2,
        y: rows[1].y,
        width: rows[1].width.saturating_sub(4),
        height: 1,
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(24),
        ])
        .split(content);

    if app.is_loading() {
        let throbber = throbber_widgets_tui::Throbber::default()
            .style(Style::default().fg(Color::Yellow))
            .throbber_style(Style::default().fg(Color::Yellow))
            .throbber_set(throbber_widgets_tui::BRAILLE_SIX)
            .use_type(throbber_widgets_tui::WhichUse::Spin);
        frame.render_stateful_widget(throbber, cols[0], &mut app.throbber_state);
    }

    let active = active_tab(app.current_view);
    let mut spans = vec![Span::styled(
        "Padh-AI  ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    for (i, (key, label)) in TABS.iter().enumerate() {
        let style = if i == active {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{key} "), Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(*label, style));
        spans.push(Span::raw("   "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), cols[1]);

    if let Some(user) = &app.user {
        let badge = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", user.initials()),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::styled(format!(" {}", user.first_name()), Style::default().fg(Color::White)),
        ]))
        .alignment(Alignment::Right);
        frame.render_widget(badge, cols[2]);
    }
}

fn render_status_line(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.status_message {
        Some(message) => Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            "  q: Quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
