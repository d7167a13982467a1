use super::utils::{controls_bar, placeholder};
use super::*;
use crate::app::first_of_month;
use padhai::batch::QueryState;
use padhai::calendar::{classify, DayKey, RevisionStatus};
use time::{Date, Duration};

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

pub fn render_calendar_view(frame: &mut Frame, app: &App, body: Rect) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(10), Constraint::Length(3)])
        .split(body);

    frame.render_widget(
        controls_bar(&[
            ("←→↑↓", "Move"),
            ("[ ]", "Month"),
            ("T", "Today"),
            ("J/K", "Select"),
            ("Enter", "Complete"),
            ("R", "Refresh"),
        ]),
        outer[1],
    );

    if let QueryState::Failed(message) = &app.revisions {
        frame.render_widget(
            placeholder(format!("{message}\nPress r to retry"), Color::Red),
            outer[0],
        );
        return;
    }

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(20)])
        .split(outer[0]);

    render_month_grid(frame, app, panels[0]);
    render_day_list(frame, app, panels[1]);
}

/// Monday-first 6x7 grid of the cursor's month, starting on the Monday on or
/// before the first of the month.
pub fn grid_start(month_start: Date) -> Date {
    let lead = i64::from(month_start.weekday().number_days_from_monday());
    month_start - Duration::days(lead)
}

fn render_month_grid(frame: &mut Frame, app: &App, area: Rect) {
    let month_start = app.calendar.month_start();
    let today = app.reference.today();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Span::styled(
            format!(" {} {} ", month_start.month(), month_start.year()),
            Style::default().fg(Color::White),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from(
        WEEKDAYS
            .iter()
            .map(|d| Span::styled(format!(" {d} "), Style::default().fg(Color::DarkGray)))
            .collect::<Vec<_>>(),
    )];

    let start = grid_start(month_start);
    for week in 0..6 {
        let mut spans = Vec::with_capacity(7);
        for weekday in 0..7 {
            let date = start + Duration::days(week * 7 + weekday);
            let day = DayKey::new(date);
            let in_month = first_of_month(date) == month_start;
            spans.push(day_cell(app, day, today, in_month));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" •", Style::default().fg(Color::Cyan)),
        Span::styled(" revision  ", Style::default().fg(Color::DarkGray)),
        Span::styled("•", Style::default().fg(Color::Red)),
        Span::styled(" missed", Style::default().fg(Color::DarkGray)),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn day_cell(app: &App, day: DayKey, today: DayKey, in_month: bool) -> Span<'static> {
    let markers = app.day_markers(day);
    let marker = if markers.has_revision { "•" } else { " " };
    let text = format!("{:>2}{marker} ", day.date().day());

    let mut style = if !in_month || !markers.selectable {
        Style::default().fg(Color::DarkGray)
    } else if markers.has_missed {
        Style::default().fg(Color::Red)
    } else if markers.has_revision {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };
    if day == today {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if day == app.calendar.cursor {
        style = style.bg(Color::DarkGray).fg(Color::White);
    }
    Span::styled(text, style)
}

fn status_badge(status: RevisionStatus) -> Span<'static> {
    let (label, color) = match status {
        RevisionStatus::Completed => (" done ", Color::Green),
        RevisionStatus::Missed => (" missed ", Color::Red),
        RevisionStatus::Pending => (" pending ", Color::Yellow),
    };
    Span::styled(label, Style::default().fg(Color::Black).bg(color))
}

fn render_day_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Span::styled(
            format!(" {} ", app.calendar.cursor),
            Style::default().fg(Color::White),
        ));

    if app.revisions.is_loading() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(placeholder("Loading revisions...", Color::DarkGray), inner);
        return;
    }

    let revisions = app.selected_day_revisions();
    if revisions.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            placeholder("No revisions on this day", Color::DarkGray),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = revisions
        .iter()
        .map(|revision| {
            ListItem::new(Line::from(vec![
                status_badge(classify(revision, &app.reference)),
                Span::raw("  "),
                Span::styled(
                    revision.chapter_name.clone(),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("  {}", revision.subject_name),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block.padding(Padding::horizontal(1)))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");
    let mut state = ListState::default();
    state.select(Some(app.calendar.selected_revision));
    frame.render_stateful_widget(list, area, &mut state);
}
