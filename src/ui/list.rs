use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::{order_key, App, ListView};
use crate::types::OrderStatus;

fn list_block<T>(title: String, view: &ListView<T>) -> Block<'static> {
    let title_style = if view.activity.is_busy() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    };
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, title_style))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

fn status_color(status: OrderStatus) -> Color {
    match status {
        OrderStatus::Pending => Color::Yellow,
        OrderStatus::Confirmed | OrderStatus::Preparing => Color::Blue,
        OrderStatus::Ready => Color::Green,
        OrderStatus::Served | OrderStatus::Completed => Color::Gray,
        OrderStatus::Cancelled => Color::Red,
    }
}

pub fn render_orders(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.orders;
    let title = match app.order_filter {
        Some(status) => format!(" Orders: {} ({}) ", status, view.pagination.total()),
        None => format!(" Orders ({}) ", view.pagination.total()),
    };
    let block = list_block(title, view);

    if view.rows.is_empty() && !view.activity.is_busy() {
        let empty = Paragraph::new("No orders")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .enumerate()
        .map(|(i, order)| {
            let style = if i == view.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let op = app.operations.get(&order_key(&order.id));
            let marker = if op.is_loading {
                Span::styled("… ", Style::default().fg(Color::Yellow))
            } else if op.error.is_some() {
                Span::styled("! ", Style::default().fg(Color::Red))
            } else if op.success {
                Span::styled("✓ ", Style::default().fg(Color::Green))
            } else {
                Span::raw("  ")
            };

            let customer = order.customer_name.as_deref().unwrap_or("-");

            let line = Line::from(vec![
                marker,
                Span::styled(format!("{:<10}", order.order_number), style),
                Span::raw(" "),
                Span::styled(
                    format!("{:<10}", order.status.to_string()),
                    Style::default().fg(status_color(order.status)),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<9}", order.order_type.to_string()),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(" "),
                Span::raw(format!("{:<14}", truncate(customer, 14))),
                Span::styled(
                    format!("{:>9.2}", order.total_amount),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw("  "),
                Span::styled(
                    format_age(order.created_at),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !view.rows.is_empty() {
        state.select(Some(view.selected));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

pub fn render_products(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.products;
    let title = match &app.product_search {
        Some(search) => format!(" Products: \"{}\" ({}) ", search, view.pagination.total()),
        None => format!(" Products ({}) ", view.pagination.total()),
    };
    let block = list_block(title, view);

    if view.rows.is_empty() && !view.activity.is_busy() {
        let empty = Paragraph::new("No products")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 30; // sku(10) + space(1) + price(9) + spaces(2) + stock(8)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let style = if i == view.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let stock_style = if product.stock_number <= 0 {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Gray)
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<10}", product.sku),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(format!("{:<flex$}", truncate(&product.name, flex)), style),
                Span::styled(
                    format!("{:>9.2}", product.price),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw("  "),
                Span::styled(format!("{:>4} pcs", product.stock_number), stock_style),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !view.rows.is_empty() {
        state.select(Some(view.selected));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn format_age(dt: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        "now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("Soto Betawi", 20), "Soto Betawi");
        assert_eq!(truncate("Nasi Goreng Spesial", 10), "Nasi Go...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn age_buckets() {
        assert_eq!(format_age(Utc::now()), "now");
        assert_eq!(format_age(Utc::now() - chrono::Duration::hours(3)), "3h");
        assert_eq!(format_age(Utc::now() - chrono::Duration::days(2)), "2d");
    }
}
