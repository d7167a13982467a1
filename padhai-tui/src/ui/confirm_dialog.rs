use super::utils::centered_rect;
use super::*;

pub fn render_confirm_complete_dialog(frame: &mut Frame, app: &mut App, body: Rect) {
    let (label, detail) = match &app.confirm {
        Some(revision) => (
            format!("{} · {}", revision.subject_name, revision.chapter_name),
            app.reference.day_of(&revision.revision_date).to_string(),
        ),
        None => (String::new(), String::new()),
    };

    // The calendar stays visible behind the dialog
    super::calendar_view::render_calendar_view(frame, app, body);

    let area = centered_rect(52, 10, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(label, Style::default().fg(Color::White))),
        Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] Yes", Style::default().fg(Color::Green)),
            Span::raw("    "),
            Span::styled("[n] No", Style::default().fg(Color::White)),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Mark revision completed? ")
                .padding(Padding::horizontal(1)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
