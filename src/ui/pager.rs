use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::pagination::PaginationController;
use crate::range::{compress, PageItem};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let pagination = app.pagination();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(48)])
        .split(area);

    frame.render_widget(
        Paragraph::new(page_strip(pagination, app.range_delta)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            showing_label(pagination),
            Style::default().fg(Color::Gray),
        )))
        .alignment(ratatui::layout::Alignment::Right),
        chunks[1],
    );
}

/// `« ‹ 1 ... 4 [5] 6 ... 12 › »` with the arrows dimmed when they would do
/// nothing.
pub fn page_strip(pagination: &PaginationController, delta: usize) -> Line<'static> {
    let enabled = Style::default().fg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray);
    let back = if pagination.has_previous_page() {
        enabled
    } else {
        disabled
    };
    let forward = if pagination.has_next_page() {
        enabled
    } else {
        disabled
    };

    let mut spans = vec![
        Span::styled("«", back),
        Span::raw(" "),
        Span::styled("‹", back),
        Span::raw(" "),
    ];

    for item in compress(pagination.page(), pagination.total_pages(), delta) {
        match item {
            PageItem::Page(n) if n == pagination.page() => spans.push(Span::styled(
                format!("[{}]", n),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            PageItem::Page(n) => spans.push(Span::raw(n.to_string())),
            PageItem::Ellipsis => spans.push(Span::styled(
                item.to_string(),
                Style::default().fg(Color::DarkGray),
            )),
        }
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled("›", forward));
    spans.push(Span::raw(" "));
    spans.push(Span::styled("»", forward));

    Line::from(spans)
}

pub fn showing_label(pagination: &PaginationController) -> String {
    let (start, end) = pagination.item_range();
    format!(
        "Showing {} to {} of {} · {} per page",
        start,
        end,
        pagination.total(),
        pagination.page_size()
    )
}
