//! Dashboard rendering functions
//!
//! Pure mapping from app state to a frame: nothing here mutates the view
//! state, the controller, or anything remote.

use super::app::{DashApp, View};
use super::theme::Theme;
use crate::dashboard::TimelineItem;
use chrono::{DateTime, Utc};
use mockdeck_common::RequestLog;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

/// Draw the dashboard
pub fn draw(frame: &mut Frame, app: &DashApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Notice
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    match app.view {
        View::Timeline => draw_timeline(frame, app, chunks[1]),
        View::Responses => draw_responses(frame, app, chunks[1]),
    }
    draw_notice(frame, app, chunks[2]);
    draw_footer(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &DashApp, area: Rect) {
    let theme = &app.theme;
    let updated = app
        .last_refresh
        .map(|ts| ts.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(vec![
            Span::styled(
                " MOCKDECK ",
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled("· mock server console", Style::default().fg(theme.dim)),
        ]),
        Line::from(vec![
            Span::styled(" Server ", Style::default().fg(theme.dim)),
            Span::styled(app.server_url.as_str(), Style::default().fg(theme.key)),
            Span::styled("  Updated ", Style::default().fg(theme.dim)),
            Span::styled(updated, Style::default().fg(theme.text)),
            Span::styled("  Hanging ", Style::default().fg(theme.dim)),
            Span::styled(
                app.hanging_count().to_string(),
                Style::default().fg(theme.hanging),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_timeline(frame: &mut Frame, app: &DashApp, area: Rect) {
    let theme = &app.theme;
    let items = app.visible_items();

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;

    for (i, item) in items.iter().enumerate() {
        if i == app.selected {
            selected_line = lines.len();
        }
        let controls_hidden = item
            .hanging_id()
            .is_some_and(|id| app.controller.hides_controls(id));
        lines.push(summary_line(item, i == app.selected, controls_hidden, theme));
        if app.view_state.is_expanded(&item.identity()) {
            push_detail_lines(item, theme, &mut lines);
        }
    }

    if items.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No traffic yet - requests to the mock server will appear here",
            Style::default().fg(theme.dim),
        )));
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = scroll_offset(selected_line, lines.len(), inner_height);

    let block = Block::default()
        .title(format!(" Traffic ({}) ", items.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    frame.render_widget(
        Paragraph::new(lines).block(block).scroll((scroll as u16, 0)),
        area,
    );
}

/// One collapsed row of the timeline
fn summary_line<'a>(
    item: &'a TimelineItem,
    selected: bool,
    controls_hidden: bool,
    theme: &Theme,
) -> Line<'a> {
    let mut spans = vec![Span::styled(
        if selected { "▸ " } else { "  " },
        Style::default().fg(theme.key),
    )];

    match item {
        TimelineItem::Hanging(_) => {
            spans.push(Span::styled(
                "HANGING",
                Style::default()
                    .fg(theme.hanging)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        TimelineItem::Completed(log) => {
            spans.push(Span::styled(
                format_time(&log.timestamp),
                Style::default().fg(theme.dim),
            ));
        }
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("{:<7}", truncate_str(item.method(), 7)),
        Style::default().fg(theme.method),
    ));
    spans.push(Span::styled(item.path(), Style::default().fg(theme.path)));
    spans.push(Span::raw("  "));

    match item {
        TimelineItem::Hanging(_) => {
            // Controls disappear the moment an action goes out
            if controls_hidden {
                spans.push(Span::styled("resolving…", Style::default().fg(theme.dim)));
            } else {
                spans.push(Span::styled(
                    "[r]espond",
                    Style::default().fg(theme.success),
                ));
                spans.push(Span::raw(" "));
                spans.push(Span::styled("[d]rop", Style::default().fg(theme.error)));
            }
        }
        TimelineItem::Completed(log) => {
            let tone = status_tone(log.status_code);
            spans.push(Span::styled(
                status_label(log),
                Style::default().fg(tone_color(tone, theme)),
            ));
        }
    }

    let line = Line::from(spans);
    if selected {
        line.style(Style::default().bg(theme.selection_bg))
    } else {
        line
    }
}

/// Expanded detail well under a timeline row
fn push_detail_lines<'a>(item: &'a TimelineItem, theme: &Theme, lines: &mut Vec<Line<'a>>) {
    let label = Style::default().fg(theme.dim);
    let value = Style::default().fg(theme.text);

    lines.push(Line::from(Span::styled("      Headers", label)));
    for (name, values) in item.headers() {
        lines.push(Line::from(vec![
            Span::styled(format!("        {}: ", name), label),
            Span::styled(collapse_header_value(values), value),
        ]));
    }

    if let TimelineItem::Completed(log) = item {
        if let Some(params) = log.query_params.as_ref().filter(|p| !p.is_empty()) {
            lines.push(Line::from(Span::styled("      Query Parameters", label)));
            for (name, val) in params {
                lines.push(Line::from(vec![
                    Span::styled(format!("        {}: ", name), label),
                    Span::styled(val.as_str(), value),
                ]));
            }
        }
        if !log.body.is_empty() {
            lines.push(Line::from(Span::styled("      Request Body", label)));
            for body_line in log.body.lines() {
                lines.push(Line::from(Span::styled(
                    format!("        {}", body_line),
                    value,
                )));
            }
        }
    }

    let mut ip_spans = vec![
        Span::styled("      Direct IP ", label),
        Span::styled(item.direct_ip(), value),
    ];
    if let TimelineItem::Completed(log) = item {
        ip_spans.push(Span::styled("   Forwarded IP ", label));
        let forwarded = if log.forwarded_ip.is_empty() {
            "N/A"
        } else {
            log.forwarded_ip.as_str()
        };
        ip_spans.push(Span::styled(forwarded, value));
    }
    lines.push(Line::from(ip_spans));
    lines.push(Line::from(""));
}

fn draw_responses(frame: &mut Frame, app: &DashApp, area: Rect) {
    let theme = &app.theme;

    let header = Row::new(vec!["Path", "Status", "Mode", "Body"])
        .style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .responses
        .iter()
        .map(|(path, cfg)| {
            let tone = status_tone(cfg.status_code);
            let body = if cfg.body.trim().is_empty() {
                "(blank)".to_string()
            } else {
                truncate_str(cfg.body.lines().next().unwrap_or(""), 48)
            };

            Row::new(vec![
                Cell::from(path.as_str()).style(Style::default().fg(theme.path)),
                Cell::from(cfg.status_code.to_string())
                    .style(Style::default().fg(tone_color(tone, theme))),
                Cell::from(cfg.advanced.mode().label()),
                Cell::from(body).style(Style::default().fg(theme.text)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" Path Responses ({}) ", app.responses.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    )
    .row_highlight_style(Style::default().bg(theme.selection_bg));

    let mut state = TableState::default();
    state.select(Some(app.resp_selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_notice(frame: &mut Frame, app: &DashApp, area: Rect) {
    let theme = &app.theme;
    let line = match &app.notice {
        Some(notice) => {
            let color = if notice.is_error {
                theme.error
            } else {
                theme.success
            };
            Line::from(Span::styled(
                format!(" {}", notice.text),
                Style::default().fg(color),
            ))
        }
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_footer(frame: &mut Frame, app: &DashApp, area: Rect) {
    let theme = &app.theme;
    let hint = |k: &'static str, desc: &'static str| {
        vec![
            Span::styled(k, Style::default().fg(theme.key)),
            Span::styled(desc, Style::default().fg(theme.dim)),
        ]
    };

    let mut spans = vec![Span::raw(" ")];
    match app.view {
        View::Timeline => {
            spans.extend(hint("↑/↓", " navigate  "));
            spans.extend(hint("Enter", " expand  "));
            spans.extend(hint("r", " respond  "));
            spans.extend(hint("d", " drop  "));
        }
        View::Responses => {
            spans.extend(hint("↑/↓", " navigate  "));
        }
    }
    spans.extend(hint("Tab", " switch view  "));
    spans.extend(hint("R", " refresh  "));
    spans.extend(hint("t", " theme  "));
    spans.extend(hint("q", " quit"));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Status badge text: the dropped-connection sentinel reads DROPPED
fn status_label(log: &RequestLog) -> String {
    if log.is_dropped() {
        "DROPPED".to_string()
    } else {
        log.status_code.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusTone {
    Success,
    Error,
    Neutral,
}

/// 2xx reads as success, 4xx+ and dropped as error, the rest neutral
fn status_tone(code: u16) -> StatusTone {
    match code {
        0 => StatusTone::Error,
        200..=299 => StatusTone::Success,
        c if c >= 400 => StatusTone::Error,
        _ => StatusTone::Neutral,
    }
}

fn tone_color(tone: StatusTone, theme: &Theme) -> ratatui::style::Color {
    match tone {
        StatusTone::Success => theme.success,
        StatusTone::Error => theme.error,
        StatusTone::Neutral => theme.neutral,
    }
}

/// Single-valued header arrays collapse to the bare value; multi-valued
/// ones render as a list
fn collapse_header_value(values: &[String]) -> String {
    match values {
        [single] => single.clone(),
        many => format!("[{}]", many.join(", ")),
    }
}

/// Timestamp badge, matching the original dashboard's long format
fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y %-I:%M:%S %p").to_string()
}

/// Keep the selected row in view without mutating any state
fn scroll_offset(selected_line: usize, total: usize, height: usize) -> usize {
    if height == 0 || total <= height {
        return 0;
    }
    let max_offset = total - height;
    selected_line.saturating_sub(height / 2).min(max_offset)
}

/// Truncate any string to max length
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len && max_len > 3 {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn log_with_status(status_code: u16) -> RequestLog {
        RequestLog {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap(),
            method: "GET".to_string(),
            path: "/x".to_string(),
            headers: BTreeMap::new(),
            query_params: None,
            body: String::new(),
            direct_ip: String::new(),
            forwarded_ip: String::new(),
            response: String::new(),
            status_code,
        }
    }

    #[test]
    fn test_status_label_dropped_sentinel() {
        assert_eq!(status_label(&log_with_status(0)), "DROPPED");
        assert_eq!(status_label(&log_with_status(503)), "503");
    }

    #[test]
    fn test_status_tones() {
        assert_eq!(status_tone(200), StatusTone::Success);
        assert_eq!(status_tone(204), StatusTone::Success);
        assert_eq!(status_tone(302), StatusTone::Neutral);
        assert_eq!(status_tone(404), StatusTone::Error);
        assert_eq!(status_tone(500), StatusTone::Error);
        assert_eq!(status_tone(0), StatusTone::Error);
    }

    #[test]
    fn test_single_valued_headers_collapse() {
        assert_eq!(
            collapse_header_value(&["curl/8.0".to_string()]),
            "curl/8.0"
        );
        assert_eq!(
            collapse_header_value(&["a".to_string(), "b".to_string()]),
            "[a, b]"
        );
    }

    #[test]
    fn test_format_time_long_form() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        assert_eq!(format_time(&ts), "Mar 1, 2024 12:30:45 PM");

        let morning = Utc.with_ymd_and_hms(2024, 11, 23, 0, 5, 9).unwrap();
        assert_eq!(format_time(&morning), "Nov 23, 2024 12:05:09 AM");
    }

    #[test]
    fn test_scroll_offset_keeps_selection_in_view() {
        // Everything fits: no scrolling
        assert_eq!(scroll_offset(3, 5, 10), 0);
        // Selection deep in a long list: roughly centered
        assert_eq!(scroll_offset(50, 100, 10), 45);
        // Never scrolls past the end
        assert_eq!(scroll_offset(99, 100, 10), 90);
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("averylongpath", 10), "averylo...");
    }
}
