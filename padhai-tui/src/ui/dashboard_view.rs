use super::utils::{controls_bar, placeholder};
use super::*;
use padhai::analytics::RevisionStats;
use padhai::batch::QueryState;

const COMPLETED: Color = Color::Green;
const MISSED: Color = Color::Red;
const DUE_TODAY: Color = Color::Yellow;
const UPCOMING: Color = Color::Blue;

pub fn render_dashboard_view(frame: &mut Frame, app: &App, body: Rect) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(10), Constraint::Length(3)])
        .split(body);

    frame.render_widget(
        controls_bar(&[("Enter", "Open today"), ("R", "Refresh"), ("Q", "Quit")]),
        outer[1],
    );

    match &app.revisions {
        QueryState::Loading => {
            frame.render_widget(placeholder("Loading revisions...", Color::DarkGray), outer[0]);
            return;
        }
        QueryState::Failed(message) => {
            frame.render_widget(
                placeholder(format!("{message}\nPress r to retry"), Color::Red),
                outer[0],
            );
            return;
        }
        QueryState::Ready(_) => {}
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(8),
        ])
        .split(outer[0]);

    render_welcome(frame, app, rows[0]);
    render_kpis(frame, &app.dashboard.stats, rows[1]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    render_performance(frame, &app.dashboard.stats, panels[0]);
    render_focus(frame, app, panels[1]);
}

fn render_welcome(frame: &mut Frame, app: &App, area: Rect) {
    let name = app.user.as_ref().map_or("Student", |u| u.first_name());
    let lines = vec![
        Line::from(Span::styled(
            format!("Welcome back, {name}"),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "You have completed {}% of your revisions",
                app.dashboard.stats.completion_rate
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().padding(Padding::horizontal(1))),
        area,
    );
}

fn render_kpis(frame: &mut Frame, stats: &RevisionStats, area: Rect) {
    let kpis = [
        ("Total", stats.total, Color::White),
        ("Completed", stats.completed, COMPLETED),
        ("Missed", stats.missed, MISSED),
        ("Due today", stats.due_today, DUE_TODAY),
        ("Upcoming", stats.upcoming, UPCOMING),
    ];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, kpis.len() as u32); 5])
        .split(area);

    for ((label, value, color), col) in kpis.iter().zip(cols.iter()) {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(
                value.to_string(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(*label, Style::default().fg(Color::DarkGray))),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(card, *col);
    }
}

fn render_performance(frame: &mut Frame, stats: &RevisionStats, area: Rect) {
    use tui_piechart::{PieChart, PieSlice};

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Span::styled(
            " Performance ",
            Style::default().fg(Color::White),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if stats.total == 0 {
        frame.render_widget(placeholder("No revisions yet", Color::DarkGray), inner);
        return;
    }

    let buckets = [
        ("Completed", stats.completed, COMPLETED),
        ("Missed", stats.missed, MISSED),
        ("Due today", stats.due_today, DUE_TODAY),
        ("Upcoming", stats.upcoming, UPCOMING),
    ];
    let slices: Vec<PieSlice> = buckets
        .iter()
        .filter(|(_, count, _)| *count > 0)
        .map(|(label, count, color)| {
            PieSlice::new(label, *count as f64 / stats.total as f64 * 100.0, *color)
        })
        .collect();

    // legend rows plus the insight line
    let text_rows = buckets.len() as u16 + 2;
    let pie_height = (inner.width / 2).min(inner.height.saturating_sub(text_rows));
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(pie_height), Constraint::Min(0)])
        .split(inner);

    let pie = PieChart::new(slices)
        .show_legend(false)
        .show_percentages(false);
    frame.render_widget(pie, split[0]);

    let mut lines: Vec<Line> = buckets
        .iter()
        .map(|(label, count, color)| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(*color)),
                Span::styled(
                    format!("{label}: {count}"),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        stats.insight().message(),
        Style::default().fg(Color::Cyan),
    )));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        split[1],
    );
}

fn render_focus(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = &app.dashboard;
    let muted = Style::default().fg(Color::DarkGray);
    let white = Style::default().fg(Color::White);

    let mut lines = vec![Line::from(Span::styled(
        "Today's focus",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];
    if dashboard.todays_focus().is_empty() {
        lines.push(Line::from(Span::styled("Nothing due today", muted)));
    }
    for revision in dashboard.todays_focus() {
        lines.push(Line::from(vec![
            Span::styled("• ", Style::default().fg(DUE_TODAY)),
            Span::styled(revision.chapter_name.clone(), white),
            Span::styled(format!("  {}", revision.subject_name), muted),
        ]));
    }
    let hidden = dashboard
        .todays_revisions
        .len()
        .saturating_sub(dashboard.todays_focus().len());
    if hidden > 0 {
        lines.push(Line::from(Span::styled(format!("  +{hidden} more"), muted)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Upcoming",
        Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD),
    )));
    match dashboard.next_upcoming() {
        None => lines.push(Line::from(Span::styled("No upcoming revisions", muted))),
        Some(next) => {
            lines.push(Line::from(Span::styled(
                format!("{} revisions scheduled", dashboard.upcoming_revisions.len()),
                white,
            )));
            lines.push(Line::from(vec![
                Span::styled("Next: ", muted),
                Span::styled(
                    format!("{} · {}", next.subject_name, next.chapter_name),
                    white,
                ),
                Span::styled(
                    format!("  {}", app.reference.day_of(&next.revision_date)),
                    muted,
                ),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(Span::styled(" Focus ", Style::default().fg(Color::White)))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(paragraph, area);
}
