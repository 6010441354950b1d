use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use super::app::{Focus, MessageType, StatusMessage};
use super::layout::{AppLayout, centered_rect};
use super::timestamps::{format_date_created, format_timestamp};
use crate::models::{ConfidenceLevel, ImageItem, SearchHistoryEntry, confidence_percentage};
use crate::search::{SearchSession, SearchStatus, SortDirection};
use crate::utils::strip_ansi_codes;

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const DANGER: Color = Color::Rgb(239, 68, 68);
const BAR_BG: Color = Color::Rgb(24, 24, 27);

/// Snapshot of the history page being displayed
pub struct HistoryView {
    pub entries: Vec<SearchHistoryEntry>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    pub selected_idx: usize,
}

/// Everything a frame needs
pub struct RenderState<'a> {
    pub query: &'a str,
    pub items: &'a [ImageItem],
    pub selected_idx: usize,
    pub session: &'a SearchSession,
    pub showing_sources: bool,
    pub loading_sources: bool,
    pub sources_error: Option<&'a str>,
    pub sort: SortDirection,
    pub focus: Focus,
    pub show_details: bool,
    pub history: &'a HistoryView,
    pub status_message: Option<&'a StatusMessage>,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_search_bar(frame, layout.search_area, state);
    render_results_list(frame, layout.results_area, state);
    match state.focus {
        Focus::Results => {
            render_preview(frame, layout.side_area, state.items.get(state.selected_idx))
        }
        Focus::History => render_history(frame, layout.side_area, state.history),
    }
    render_status_bar(frame, layout.status_area, state);

    if state.show_details
        && let Some(item) = state.items.get(state.selected_idx)
    {
        render_details_popup(frame, centered_rect(80, 80, frame.area()), item);
    }
}

fn bordered<'a>(title: impl Into<Line<'a>>, focused: bool) -> Block<'a> {
    let border = if focused { ACCENT } else { MUTED };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

fn render_search_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let indicator = match state.session.status {
        SearchStatus::Debouncing => Span::styled(" …", Style::default().fg(MUTED)),
        SearchStatus::Searching => Span::styled(" searching", Style::default().fg(ACCENT)),
        _ => Span::raw(""),
    };

    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(ACCENT)),
        Span::styled(state.query, Style::default().fg(BRIGHT)),
        Span::styled("▏", Style::default().fg(ACCENT)),
        indicator,
    ]);

    let title = format!(" Search  ·  sort: {} ", state.sort.label());
    let paragraph = Paragraph::new(line).block(bordered(title, state.focus == Focus::Results));
    frame.render_widget(paragraph, area);
}

fn results_title(state: &RenderState) -> String {
    if state.showing_sources {
        if state.loading_sources {
            " Sources (loading…) ".to_string()
        } else {
            format!(" Sources ({}) ", state.items.len())
        }
    } else {
        format!(" Results ({}) ", state.items.len())
    }
}

/// Message shown in place of an empty list
fn empty_list_message(state: &RenderState) -> Option<String> {
    if state.showing_sources {
        return state.sources_error.map(|e| format!("Could not load sources: {}", e));
    }
    match state.session.status {
        SearchStatus::Idle => Some("Type at least 4 characters to search".to_string()),
        SearchStatus::Debouncing | SearchStatus::Searching => Some("Searching…".to_string()),
        SearchStatus::Failed => state.session.error.clone(),
        SearchStatus::Succeeded => Some("No images found".to_string()),
    }
}

fn render_results_list(frame: &mut Frame, area: Rect, state: &RenderState) {
    let block = bordered(results_title(state), false);

    if state.items.is_empty() {
        let text = empty_list_message(state).unwrap_or_default();
        let style = if state.session.status == SearchStatus::Failed || state.sources_error.is_some()
        {
            Style::default().fg(DANGER)
        } else {
            Style::default().fg(MUTED)
        };
        frame.render_widget(Paragraph::new(text).style(style).block(block), area);
        return;
    }

    let items: Vec<ListItem> = state
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let badge = match item.confidence {
                Some(score) => format!("{:>3}%", confidence_percentage(score)),
                None => "  - ".to_string(),
            };
            let title = strip_ansi_codes(&item.title).chars().take(60).collect::<String>();
            let content = format!("{} | {}", badge, title);

            let style = if idx == state.selected_idx {
                Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(confidence_color(item.confidence))
            };

            ListItem::new(content).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn confidence_color(confidence: Option<f64>) -> Color {
    match confidence.map(ConfidenceLevel::from_score) {
        Some(ConfidenceLevel::High) => ACCENT,
        Some(ConfidenceLevel::Medium) => Color::Rgb(234, 179, 8),
        Some(ConfidenceLevel::Low) => Color::Rgb(249, 115, 22),
        Some(ConfidenceLevel::VeryLow) => DANGER,
        None => MUTED,
    }
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(MUTED)),
        Span::raw(value),
    ])
}

/// Metadata lines shared by the preview pane and the detail popup
fn image_lines(item: &ImageItem) -> Vec<Line<'static>> {
    let confidence = match item.confidence {
        Some(score) => format!(
            "{} ({}%)",
            ConfidenceLevel::from_score(score).label(),
            confidence_percentage(score)
        ),
        None => "Unknown".to_string(),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            strip_ansi_codes(&item.title),
            Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD),
        )),
        field("Date", format_date_created(&item.date_created)),
        field("Confidence", confidence),
    ];
    if !item.source.is_empty() {
        lines.push(field("Source", strip_ansi_codes(&item.source)));
    }
    if !item.keywords.is_empty() {
        lines.push(field("Keywords", strip_ansi_codes(&item.keywords.join(", "))));
    }
    lines.push(field("URL", strip_ansi_codes(item.display_url())));
    lines
}

fn render_preview(frame: &mut Frame, area: Rect, item: Option<&ImageItem>) {
    let content = if let Some(item) = item {
        let mut lines = image_lines(item);
        lines.push(Line::from(""));
        if let Some(description) = item.plain_description() {
            // First paragraph only; the popup shows the rest
            let first = description.lines().next().unwrap_or_default().to_string();
            lines.push(Line::from(first));
        }
        Text::from(lines)
    } else {
        Text::from("No image selected")
    };

    let paragraph =
        Paragraph::new(content).block(bordered(" Preview ", false)).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_details_popup(frame: &mut Frame, area: Rect, item: &ImageItem) {
    let mut lines = image_lines(item);
    lines.push(Line::from(""));
    match item.plain_description() {
        Some(description) => {
            for line in description.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "No description available",
            Style::default().fg(MUTED),
        ))),
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(bordered(" Details (Esc to close) ", true))
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_history(frame: &mut Frame, area: Rect, view: &HistoryView) {
    let title = format!(" History ({}) · page {}/{} ", view.total, view.page, view.total_pages.max(1));
    let block = bordered(title, true);

    if view.entries.is_empty() {
        let paragraph =
            Paragraph::new("No searches yet").style(Style::default().fg(MUTED)).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = view
        .entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let mut meta = vec![format_timestamp(&entry.timestamp)];
            if let Some(count) = entry.results_count {
                meta.push(format!("{} results", count));
            }
            if let Some(confidence) = entry.confidence {
                meta.push(format!("{}%", confidence_percentage(confidence)));
            }
            let content = format!("{}  ({})", strip_ansi_codes(&entry.query), meta.join(", "));

            let style = if idx == view.selected_idx {
                Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };
            ListItem::new(content).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (status_text, style) = if let Some(msg) = state.status_message {
        let fg = match msg.message_type {
            MessageType::Success => ACCENT,
            MessageType::Error => DANGER,
        };
        (format!(" {} ", msg.text), Style::default().fg(fg).bg(BAR_BG))
    } else if let (SearchStatus::Failed, Some(error)) =
        (state.session.status, state.session.error.as_deref())
    {
        (format!(" [ERROR] {} | Ctrl+R: retry ", error), Style::default().fg(DANGER).bg(BAR_BG))
    } else {
        let mut parts = vec![];

        if !state.items.is_empty() {
            parts.push(format!("image {}/{}", state.selected_idx + 1, state.items.len()));
        }

        match state.focus {
            Focus::Results => {
                parts.push("Enter: search".to_string());
                parts.push("Ctrl+O: details".to_string());
                parts.push("Ctrl+S: sort".to_string());
                parts.push("Ctrl+Y: copy URL".to_string());
                parts.push("Tab: history".to_string());
            }
            Focus::History => {
                parts.push("Enter: re-run".to_string());
                parts.push("Del: remove".to_string());
                parts.push("←/→: page".to_string());
                parts.push("Ctrl+X: clear all".to_string());
            }
        }
        parts.push("Esc: back".to_string());
        parts.push("Ctrl+C: quit".to_string());

        (format!(" {} ", parts.join(" | ")), Style::default().fg(BRIGHT).bg(BAR_BG))
    };

    frame.render_widget(Paragraph::new(status_text).style(style), area);
}
