use super::utils::{controls_bar, placeholder};
use super::*;
use crate::app::ChapterPanel;
use padhai::batch::QueryState;
use padhai::domain::{ChapterInsight, PerformanceLevel, Score, Subject};

pub fn render_subjects_view(frame: &mut Frame, app: &App, body: Rect) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(10), Constraint::Length(3)])
        .split(body);

    let controls: &[(&str, &str)] = if app.chapter_panel.is_some() {
        &[("↑↓", "Select"), ("Esc", "Back"), ("R", "Refresh")]
    } else {
        &[("↑↓", "Select"), ("Enter", "Chapters"), ("R", "Refresh")]
    };
    frame.render_widget(controls_bar(controls), outer[1]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(outer[0]);

    render_subject_list(frame, app, panels[0]);
    match &app.chapter_panel {
        Some(panel) => render_chapter_panel(frame, app, panel, panels[1]),
        None => render_subject_detail(frame, app.selected_subject(), panels[1]),
    }
}

fn titled(title: &str, focused: bool) -> Block<'static> {
    let color = if focused { Color::White } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(format!(" {title} "), Style::default().fg(color)))
}

fn render_subject_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = titled("Subjects", app.chapter_panel.is_none());
    let subjects = match &app.subjects {
        QueryState::Loading => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(placeholder("Loading subjects...", Color::DarkGray), inner);
            return;
        }
        QueryState::Failed(message) => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                placeholder(format!("{message}\nPress r to retry"), Color::Red),
                inner,
            );
            return;
        }
        QueryState::Ready(subjects) => subjects,
    };

    if subjects.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            placeholder("No subjects yet. Add one with `padhai-tui add-subject`", Color::DarkGray),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = subjects
        .iter()
        .map(|subject| {
            ListItem::new(Line::from(vec![
                Span::styled(subject.name.clone(), Style::default().fg(Color::White)),
                Span::styled(
                    format!(
                        "  {} chapters · {} pending",
                        subject.chapter_count, subject.pending_revisions
                    ),
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
    state.select(Some(app.selected_subject));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_subject_detail(frame: &mut Frame, subject: Option<&Subject>, area: Rect) {
    let block = titled("Summary", false).padding(Padding::horizontal(1));
    let Some(subject) = subject else {
        frame.render_widget(block, area);
        return;
    };

    let summary = &subject.score_summary;
    let muted = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            subject.name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Weak     ", muted),
            Span::styled(summary.weak.to_string(), level_style(PerformanceLevel::Weak)),
        ]),
        Line::from(vec![
            Span::styled("Average  ", muted),
            Span::styled(
                summary.average.to_string(),
                level_style(PerformanceLevel::Average),
            ),
        ]),
        Line::from(vec![
            Span::styled("Strong   ", muted),
            Span::styled(
                summary.strong.to_string(),
                level_style(PerformanceLevel::Strong),
            ),
        ]),
        Line::from(""),
    ];
    if summary.scored_chapters() == 0 {
        lines.push(Line::from(Span::styled("No scores yet", muted)));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Average score  ", muted),
            Span::styled(
                format!("{:.1}%", summary.average_percentage),
                Style::default().fg(Color::White),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn level_style(level: PerformanceLevel) -> Style {
    let color = match level {
        PerformanceLevel::Weak => Color::Red,
        PerformanceLevel::Average => Color::Yellow,
        PerformanceLevel::Strong => Color::Green,
    };
    Style::default().fg(color)
}

fn render_chapter_panel(frame: &mut Frame, app: &App, panel: &ChapterPanel, area: Rect) {
    let block = titled(&panel.subject.name, true);
    let chapters = match &panel.chapters {
        QueryState::Loading => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(placeholder("Loading chapters...", Color::DarkGray), inner);
            return;
        }
        QueryState::Failed(message) => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(placeholder(message.clone(), Color::Red), inner);
            return;
        }
        QueryState::Ready(chapters) => chapters,
    };

    if chapters.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(placeholder("No chapters yet", Color::DarkGray), inner);
        return;
    }

    let today = app.reference.today().date();
    let offset = app.reference.offset();
    let items: Vec<ListItem> = chapters
        .iter()
        .map(|chapter| {
            let mut spans = vec![Span::styled(
                format!("{:<22}", chapter.name),
                Style::default().fg(Color::White),
            )];
            match panel.scores.get(&chapter.id) {
                None | Some(QueryState::Loading) => {
                    spans.push(Span::styled("loading...", Style::default().fg(Color::DarkGray)));
                }
                Some(QueryState::Failed(_)) => {
                    spans.push(Span::styled("score unavailable", Style::default().fg(Color::Red)));
                }
                Some(QueryState::Ready(score)) => {
                    spans.extend(score_spans(score.as_ref(), today, offset));
                }
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block.padding(Padding::horizontal(1)))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");
    let mut state = ListState::default();
    state.select(Some(panel.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn score_spans(
    score: Option<&Score>,
    today: time::Date,
    offset: time::UtcOffset,
) -> Vec<Span<'static>> {
    let insight = ChapterInsight::from_score(score.map(|s| s.score_percentage));
    match score {
        None => vec![Span::styled(
            insight.message(),
            Style::default().fg(Color::DarkGray),
        )],
        Some(score) => vec![
            Span::styled(
                format!("{:>3}% ", score.score_percentage),
                level_style(score.performance_level),
            ),
            Span::styled(
                format!("{:<8}", score.performance_level.as_str()),
                level_style(score.performance_level),
            ),
            Span::styled(
                format!("{}d left  ", score.days_left(today, offset)),
                Style::default().fg(Color::White),
            ),
            Span::styled(insight.message(), Style::default().fg(Color::DarkGray)),
        ],
    }
}
