use ratatui::layout::Rect;

/// Map a unit-square position to a terminal cell inside `area`, keeping a
/// label of `width` cells fully visible.
pub fn to_cell(x: f64, y: f64, width: u16, area: Rect) -> (u16, u16) {
    let max_col = area.width.saturating_sub(width);
    let max_row = area.height.saturating_sub(1);

    let col = ((x.clamp(0.0, 1.0) * area.width as f64) as u16).min(max_col);
    let row = ((y.clamp(0.0, 1.0) * area.height as f64) as u16).min(max_row);

    (area.x + col, area.y + row)
}
