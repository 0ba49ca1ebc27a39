mod list;
mod pager;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

use crate::action::ListTab;
use crate::app::App;

pub use pager::{page_strip, showing_label};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);

    match app.tab {
        ListTab::Orders => list::render_orders(frame, app, chunks[1]),
        ListTab::Products => list::render_products(frame, app, chunks[1]),
    }

    pager::render(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = vec![ListTab::Orders.title(), ListTab::Products.title()];

    let tabs = Tabs::new(titles)
        .block(
            Block::default().borders(Borders::ALL).title(Span::styled(
                format!(" posdesk - {} ", app.backend_name()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
        )
        .select(match app.tab {
            ListTab::Orders => 0,
            ListTab::Products => 1,
        })
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let form = app.status_form.state();

    let status = if let Some(error) = &app.error {
        Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(input) = &app.jump_input {
        Line::from(vec![
            Span::styled("Go to page: ", Style::default().fg(Color::Yellow)),
            Span::raw(input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else if let Some(input) = &app.search_input {
        Line::from(vec![
            Span::styled("Search products: ", Style::default().fg(Color::Yellow)),
            Span::raw(input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else if form.is_submitting {
        Line::from(Span::styled(
            "Updating order...",
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(error) = &form.error {
        Line::from(Span::styled(
            format!("Update failed: {}", error),
            Style::default().fg(Color::Red),
        ))
    } else if form.success {
        Line::from(Span::styled(
            "Order updated",
            Style::default().fg(Color::Green),
        ))
    } else if app.operations.is_any_loading() {
        Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        let help = match app.tab {
            ListTab::Orders => {
                "j/k: row | h/l: page | g/G: first/last | +/-: size | :: jump | f: filter | s: advance | r: reload | q: quit"
            }
            ListTab::Products => {
                "j/k: row | h/l: page | g/G: first/last | +/-: size | :: jump | /: search | r: reload | q: quit"
            }
        };
        Line::from(Span::styled(help, Style::default().fg(Color::Gray)))
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
