use crate::drawing::Point;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Horizontal raster pixels per terminal column on the canvas.
pub const PIXELS_PER_COLUMN: u32 = 8;

pub struct ComposeLayout {
    pub header_area: Rect,
    pub word_area: Rect,
    pub sentence_area: Rect,
    pub canvas_area: Rect,
    pub status_area: Rect,
    pub help_area: Rect,
}

pub struct QuizLayout {
    pub header_area: Rect,
    pub image_area: Rect,
    pub sentence_area: Rect,
    pub guess_area: Rect,
    pub status_area: Rect,
    pub help_area: Rect,
}

pub fn calculate_compose_chunks(area: Rect) -> ComposeLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    ComposeLayout {
        header_area: chunks[0],
        word_area: chunks[1],
        sentence_area: chunks[2],
        canvas_area: chunks[3],
        status_area: chunks[4],
        help_area: chunks[5],
    }
}

pub fn calculate_quiz_chunks(area: Rect) -> QuizLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    QuizLayout {
        header_area: chunks[0],
        image_area: chunks[1],
        sentence_area: chunks[2],
        guess_area: chunks[3],
        status_area: chunks[4],
        help_area: chunks[5],
    }
}

/// Raster width for a terminal `columns` wide, matching the compose canvas.
pub fn canvas_raster_width(columns: u16) -> u32 {
    // Outer margin and canvas borders take two columns each.
    (columns.saturating_sub(4).max(1) as u32) * PIXELS_PER_COLUMN
}

/// Maps terminal cells on the rendered canvas to drawing-surface pixels.
///
/// Client coordinates are terminal cells scaled to raster pixels; the
/// canvas origin in the same space is what the surface subtracts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub area: Rect,
    pub pixels_per_column: f32,
    pub pixels_per_row: f32,
}

impl CanvasGeometry {
    pub fn new(area: Rect, raster_width: u32, raster_height: u32) -> Self {
        let columns = area.width.max(1) as f32;
        let rows = area.height.max(1) as f32;
        Self {
            area,
            pixels_per_column: raster_width as f32 / columns,
            pixels_per_row: raster_height as f32 / rows,
        }
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && column < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height
    }

    pub fn origin(&self) -> Point {
        Point::new(
            self.area.x as f32 * self.pixels_per_column,
            self.area.y as f32 * self.pixels_per_row,
        )
    }

    /// Centre of the cell, in client pixel coordinates.
    pub fn client_point(&self, column: u16, row: u16) -> Point {
        Point::new(
            (column as f32 + 0.5) * self.pixels_per_column,
            (row as f32 + 0.5) * self.pixels_per_row,
        )
    }
}
