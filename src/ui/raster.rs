use image::RgbaImage;
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Centre pixel of each block; suits photos and illustrations.
    Nearest,
    /// Darkest pixel of each block, so thin pen strokes survive.
    Darkest,
}

type Rgb = [u8; 3];

/// Top and bottom colour for each cell, row-major, using half-block cells.
pub fn downsample(
    image: &RgbaImage,
    columns: u16,
    rows: u16,
    sampling: Sampling,
) -> Vec<Vec<(Rgb, Rgb)>> {
    let virtual_width = columns as u32;
    let virtual_height = rows as u32 * 2;
    if virtual_width == 0 || virtual_height == 0 || image.width() == 0 || image.height() == 0 {
        return Vec::new();
    }

    let sample = |vx: u32, vy: u32| -> Rgb {
        let x0 = vx * image.width() / virtual_width;
        let x1 = ((vx + 1) * image.width() / virtual_width).max(x0 + 1).min(image.width());
        let y0 = vy * image.height() / virtual_height;
        let y1 = ((vy + 1) * image.height() / virtual_height).max(y0 + 1).min(image.height());

        match sampling {
            Sampling::Nearest => {
                let p = image.get_pixel((x0 + x1) / 2, (y0 + y1) / 2);
                [p[0], p[1], p[2]]
            }
            Sampling::Darkest => {
                let mut darkest = [255u8, 255, 255];
                let mut darkest_luma = u32::MAX;
                for y in y0..y1 {
                    for x in x0..x1 {
                        let p = image.get_pixel(x, y);
                        let luma = 299 * p[0] as u32 + 587 * p[1] as u32 + 114 * p[2] as u32;
                        if luma < darkest_luma {
                            darkest_luma = luma;
                            darkest = [p[0], p[1], p[2]];
                        }
                    }
                }
                darkest
            }
        }
    };

    (0..rows as u32)
        .map(|row| {
            (0..virtual_width)
                .map(|col| (sample(col, row * 2), sample(col, row * 2 + 1)))
                .collect()
        })
        .collect()
}

/// Largest cell size that keeps the image's aspect ratio inside the area.
/// A cell shows two vertically stacked pixels, which is roughly square.
pub fn fit_cells(image_width: u32, image_height: u32, columns: u16, rows: u16) -> (u16, u16) {
    if image_width == 0 || image_height == 0 {
        return (0, 0);
    }
    let scale = f64::min(
        columns as f64 / image_width as f64,
        rows as f64 * 2.0 / image_height as f64,
    );
    let width = ((image_width as f64 * scale).floor() as u16).clamp(1, columns.max(1));
    let height = ((image_height as f64 * scale / 2.0).floor() as u16).clamp(1, rows.max(1));
    (width, height)
}

pub struct RasterView<'a> {
    image: &'a RgbaImage,
    sampling: Sampling,
    keep_aspect: bool,
}

impl<'a> RasterView<'a> {
    pub fn new(image: &'a RgbaImage) -> Self {
        Self {
            image,
            sampling: Sampling::Nearest,
            keep_aspect: false,
        }
    }

    pub fn sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn keep_aspect(mut self, keep_aspect: bool) -> Self {
        self.keep_aspect = keep_aspect;
        self
    }
}

impl Widget for RasterView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let (columns, rows) = if self.keep_aspect {
            fit_cells(self.image.width(), self.image.height(), area.width, area.height)
        } else {
            (area.width, area.height)
        };
        let x_offset = area.width.saturating_sub(columns) / 2;
        let y_offset = area.height.saturating_sub(rows) / 2;

        let cells = downsample(self.image, columns, rows, self.sampling);
        for (row, line) in cells.iter().enumerate() {
            for (col, (top, bottom)) in line.iter().enumerate() {
                let x = area.x + x_offset + col as u16;
                let y = area.y + y_offset + row as u16;
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char('▀')
                        .set_fg(Color::Rgb(top[0], top[1], top[2]))
                        .set_bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
                }
            }
        }
    }
}
