//! Share cards: the quiz illustration with the blanked sentence captioned
//! underneath, saved as a PNG file.

use crate::error::CardError;
use crate::image_data::EncodedImage;
use crate::models::QuizResult;
use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use regex::Regex;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const CARD_WIDTH: u32 = 800;
pub const CARD_PADDING: u32 = 40;
pub const CARD_LINE_HEIGHT: u32 = 48;
pub const CARD_FONT_SIZE: f32 = 32.0;
pub const WATERMARK: &str = "Visual Vocab";
pub const WATERMARK_FONT_SIZE: f32 = 14.0;
/// Tallest scaled illustration a card accepts.
pub const MAX_CARD_IMAGE_HEIGHT: u32 = 4 * CARD_WIDTH;

const SEPARATOR_HEIGHT: u32 = 2;
const CARD_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const SEPARATOR_COLOR: Rgba<u8> = Rgba([229, 231, 235, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([31, 41, 55, 255]);
const WATERMARK_COLOR: Rgba<u8> = Rgba([156, 163, 175, 255]);

/// Bold serif candidates tried when no font is configured.
const SYSTEM_SERIF_BOLD: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSerif-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSerif-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Georgia Bold.ttf",
    "/Library/Fonts/Georgia Bold.ttf",
    "C:\\Windows\\Fonts\\georgiab.ttf",
    "C:\\Windows\\Fonts\\timesbd.ttf",
];

lazy_static::lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("static regex");
}

/// Measures and draws card text.
pub trait CardTypeface {
    fn text_width(&self, text: &str, size: f32) -> f32;
    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size: f32,
        x: i32,
        y: i32,
        color: Rgba<u8>,
    );
}

pub struct FontTypeface {
    font: FontArc,
}

impl FontTypeface {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CardError> {
        let font =
            FontArc::try_from_vec(bytes).map_err(|e| CardError::InvalidFont(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn load(path: &Path) -> Result<Self, CardError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// The configured font, otherwise the first usable system serif bold.
    pub fn discover(configured: Option<&Path>) -> Result<Self, CardError> {
        if let Some(path) = configured {
            return Self::load(path);
        }
        SYSTEM_SERIF_BOLD
            .iter()
            .map(Path::new)
            .filter(|path| path.exists())
            .find_map(|path| Self::load(path).ok())
            .ok_or(CardError::FontUnavailable)
    }
}

impl CardTypeface for FontTypeface {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text_size(PxScale::from(size), &self.font, text).0 as f32
    }

    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size: f32,
        x: i32,
        y: i32,
        color: Rgba<u8>,
    ) {
        draw_text_mut(canvas, color, x, y, PxScale::from(size), &self.font, text);
    }
}

/// Greedy word wrap: words join the current line until the next one would
/// overflow `max_width`. A single overlong word gets a line of its own.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    typeface: &dyn CardTypeface,
    size: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };

        if !line.is_empty() && typeface.text_width(&candidate, size) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    pub width: u32,
    pub image_height: u32,
    pub lines: Vec<String>,
    pub height: u32,
}

pub fn layout_card(
    source_width: u32,
    source_height: u32,
    sentence: &str,
    typeface: &dyn CardTypeface,
) -> Result<CardLayout, CardError> {
    if source_width == 0 || source_height == 0 {
        return Err(CardError::EmptyImage);
    }

    let scaled_height = (source_height as f64 * CARD_WIDTH as f64 / source_width as f64).round();
    if scaled_height > MAX_CARD_IMAGE_HEIGHT as f64 {
        return Err(CardError::ImageTooTall {
            width: source_width,
            height: source_height,
        });
    }
    let image_height = (scaled_height as u32).max(1);
    let max_text_width = (CARD_WIDTH - 2 * CARD_PADDING) as f32;
    let lines = wrap_text(sentence, max_text_width, typeface, CARD_FONT_SIZE);
    let height = image_height + lines.len() as u32 * CARD_LINE_HEIGHT + 2 * CARD_PADDING;

    Ok(CardLayout {
        width: CARD_WIDTH,
        image_height,
        lines,
        height,
    })
}

pub fn compose_card(
    source: &DynamicImage,
    sentence: &str,
    typeface: &dyn CardTypeface,
) -> Result<RgbaImage, CardError> {
    let layout = layout_card(source.width(), source.height(), sentence, typeface)?;
    let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, CARD_BACKGROUND);

    let scaled = imageops::resize(
        &source.to_rgba8(),
        layout.width,
        layout.image_height,
        FilterType::Triangle,
    );
    imageops::replace(&mut canvas, &scaled, 0, 0);

    draw_filled_rect_mut(
        &mut canvas,
        Rect::at(0, layout.image_height as i32).of_size(layout.width, SEPARATOR_HEIGHT),
        SEPARATOR_COLOR,
    );

    let text_top = layout.image_height + CARD_PADDING;
    for (i, line) in layout.lines.iter().enumerate() {
        let line_width = typeface.text_width(line, CARD_FONT_SIZE);
        let x = ((layout.width as f32 - line_width) / 2.0).max(0.0) as i32;
        let slot_top = text_top + i as u32 * CARD_LINE_HEIGHT;
        let y = slot_top as f32 + (CARD_LINE_HEIGHT as f32 - CARD_FONT_SIZE) / 2.0;
        typeface.draw_text(&mut canvas, line, CARD_FONT_SIZE, x, y as i32, TEXT_COLOR);
    }

    let margin = CARD_PADDING / 2;
    let watermark_width = typeface.text_width(WATERMARK, WATERMARK_FONT_SIZE);
    let x = layout.width as f32 - margin as f32 - watermark_width;
    let y = layout.height as f32 - margin as f32 - WATERMARK_FONT_SIZE;
    typeface.draw_text(
        &mut canvas,
        WATERMARK,
        WATERMARK_FONT_SIZE,
        x.max(0.0) as i32,
        y.max(0.0) as i32,
        WATERMARK_COLOR,
    );

    Ok(canvas)
}

/// Decodes the result image and renders the card as PNG bytes.
pub fn render_card_png(
    result: &QuizResult,
    typeface: &dyn CardTypeface,
) -> Result<Vec<u8>, CardError> {
    let source = EncodedImage::new(result.image_url.clone()).decode_image()?;
    let card = compose_card(&source, &result.blanked_sentence, typeface)?;

    let mut bytes = Vec::new();
    card.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// `visual-vocab-<word>.png`, whitespace runs replaced by underscores.
pub fn card_file_name(word: &str) -> String {
    format!("visual-vocab-{}.png", WHITESPACE.replace_all(word.trim(), "_"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCard {
    pub path: PathBuf,
    /// `false` when the plain illustration was saved instead of a card.
    pub composited: bool,
}

/// Writes the card into `output_dir`, falling back to the plain
/// illustration when the card cannot be composed.
pub fn save_card(
    result: &QuizResult,
    output_dir: &Path,
    typeface: Option<&dyn CardTypeface>,
) -> Result<SavedCard, CardError> {
    let path = output_dir.join(card_file_name(&result.target_word));

    let composed = match typeface {
        Some(typeface) => render_card_png(result, typeface),
        None => Err(CardError::FontUnavailable),
    };

    match composed {
        Ok(bytes) => {
            std::fs::write(&path, bytes)?;
            tracing::info!("Saved card to {}", path.display());
            Ok(SavedCard {
                path,
                composited: true,
            })
        }
        Err(e) => {
            tracing::warn!("Card compositing failed ({}), saving the plain image", e);
            let bytes = EncodedImage::new(result.image_url.clone()).decode()?;
            std::fs::write(&path, bytes)?;
            Ok(SavedCard {
                path,
                composited: false,
            })
        }
    }
}
