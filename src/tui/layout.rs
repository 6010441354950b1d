use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Gallery layout
pub struct AppLayout {
    pub search_area: Rect,
    pub results_area: Rect,
    pub side_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// - Search bar: top 3 rows
    /// - Results list: 60% width (left)
    /// - Preview or history: 40% width (right)
    /// - Status bar: bottom row
    pub fn new(area: Rect) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar with borders
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(vertical_chunks[1]);

        Self {
            search_area: vertical_chunks[0],
            results_area: horizontal_chunks[0],
            side_area: horizontal_chunks[1],
            status_area: vertical_chunks[2],
        }
    }
}

/// Rectangle covering `percent_x` by `percent_y` of `area`, centered
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let margin_y = (100 - percent_y.min(100)) / 2;
    let margin_x = (100 - percent_x.min(100)) / 2;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(margin_y),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(margin_y),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(margin_x),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(margin_x),
        ])
        .split(rows[1])[1]
}
