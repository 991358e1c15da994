//! Freehand sketch surface.
//!
//! The surface owns an RGBA raster and turns pointer or touch drags into
//! round-capped strokes. Whenever a stroke ends (or the surface is cleared)
//! the owner is notified over a channel with the current export, or `None`
//! when there is no drawing.

use crate::error::ImageDataError;
use crate::image_data::EncodedImage;
use crossbeam_channel::Sender;
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::io::Cursor;

pub const DRAWING_HEIGHT: u32 = 300;
pub const STROKE_WIDTH: f32 = 6.0;
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const PEN_COLOR: Rgba<u8> = Rgba([17, 24, 39, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Input in client coordinates, before translation into the raster.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Press(Point),
    Move(Point),
    Release,
    Leave,
    /// Active touch points; only the first one draws.
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    TouchEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenState {
    Idle,
    Drawing,
}

pub struct DrawingSurface {
    raster: RgbaImage,
    state: PenState,
    last_point: Option<Point>,
    has_drawn: bool,
    origin: Point,
    ready: Sender<Option<EncodedImage>>,
}

impl DrawingSurface {
    pub fn new(width: u32, height: u32, ready: Sender<Option<EncodedImage>>) -> Self {
        Self {
            raster: RgbaImage::from_pixel(width.max(1), height.max(1), BACKGROUND),
            state: PenState::Idle,
            last_point: None,
            has_drawn: false,
            origin: Point::default(),
            ready,
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn state(&self) -> PenState {
        self.state
    }

    pub fn has_drawn(&self) -> bool {
        self.has_drawn
    }

    /// Top-left corner of the surface in client coordinates.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Press(point) => self.begin(point),
            PointerEvent::Move(point) => self.extend(point),
            PointerEvent::TouchStart(touches) => {
                if let Some(first) = touches.first() {
                    self.begin(*first);
                }
            }
            PointerEvent::TouchMove(touches) => {
                if let Some(first) = touches.first() {
                    self.extend(*first);
                }
            }
            PointerEvent::Release | PointerEvent::Leave | PointerEvent::TouchEnd => self.finish(),
        }
    }

    /// Repaints the background and tells the owner there is no drawing.
    pub fn clear(&mut self) {
        for pixel in self.raster.pixels_mut() {
            *pixel = BACKGROUND;
        }
        self.state = PenState::Idle;
        self.last_point = None;
        self.has_drawn = false;
        let _ = self.ready.send(None);
    }

    /// Encodes the current raster as a PNG data URI.
    pub fn export(&self) -> Result<EncodedImage, ImageDataError> {
        let mut bytes = Vec::new();
        self.raster
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(EncodedImage::from_png_bytes(&bytes))
    }

    /// The current drawing, if anything has been drawn since the last clear.
    pub fn snapshot(&self) -> Option<EncodedImage> {
        if !self.has_drawn {
            return None;
        }
        self.export().ok()
    }

    fn to_local(&self, point: Point) -> Point {
        Point::new(point.x - self.origin.x, point.y - self.origin.y)
    }

    fn begin(&mut self, point: Point) {
        self.state = PenState::Drawing;
        self.last_point = Some(self.to_local(point));
    }

    fn extend(&mut self, point: Point) {
        if self.state != PenState::Drawing {
            return;
        }
        let local = self.to_local(point);
        if let Some(last) = self.last_point {
            self.stroke_segment(last, local);
            self.has_drawn = true;
        }
        self.last_point = Some(local);
    }

    fn finish(&mut self) {
        if self.state != PenState::Drawing {
            return;
        }
        self.state = PenState::Idle;
        self.last_point = None;
        if !self.has_drawn {
            return;
        }
        match self.export() {
            Ok(image) => {
                let _ = self.ready.send(Some(image));
            }
            Err(e) => tracing::warn!("Failed to export drawing: {}", e),
        }
    }

    // Stamping discs one pixel apart gives round caps and joins.
    fn stroke_segment(&mut self, from: Point, to: Point) {
        let radius = (STROKE_WIDTH / 2.0).round() as i32;
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.hypot(dy).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (from.x + dx * t).round() as i32;
            let y = (from.y + dy * t).round() as i32;
            draw_filled_circle_mut(&mut self.raster, (x, y), radius, PEN_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, unbounded};

    fn surface() -> (DrawingSurface, Receiver<Option<EncodedImage>>) {
        let (tx, rx) = unbounded();
        (DrawingSurface::new(400, DRAWING_HEIGHT, tx), rx)
    }

    fn draw_line(surface: &mut DrawingSurface, from: Point, to: Point) {
        surface.handle(PointerEvent::Press(from));
        surface.handle(PointerEvent::Move(to));
        surface.handle(PointerEvent::Release);
    }

    #[test]
    fn test_new_surface_is_white() {
        let (surface, _rx) = surface();
        assert_eq!(surface.height(), DRAWING_HEIGHT);
        assert!(surface.image().pixels().all(|p| *p == BACKGROUND));
        assert_eq!(surface.state(), PenState::Idle);
    }

    #[test]
    fn test_clear_before_drawing_sends_no_image() {
        let (mut surface, rx) = surface();
        surface.clear();
        assert!(!surface.has_drawn());
        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.iter().all(|e| e.is_none()));
    }

    #[test]
    fn test_one_stroke_notifies_exactly_once() {
        let (mut surface, rx) = surface();
        surface.handle(PointerEvent::Press(Point::new(10.0, 10.0)));
        surface.handle(PointerEvent::Move(Point::new(40.0, 20.0)));
        surface.handle(PointerEvent::Move(Point::new(80.0, 60.0)));
        assert_eq!(rx.try_iter().count(), 0);
        surface.handle(PointerEvent::Release);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_some());
        assert!(surface.has_drawn());
        assert_eq!(surface.state(), PenState::Idle);
    }

    #[test]
    fn test_clear_after_drawing_sends_none() {
        let (mut surface, rx) = surface();
        draw_line(&mut surface, Point::new(10.0, 10.0), Point::new(50.0, 50.0));
        let _ = rx.try_iter().count();

        surface.clear();
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![None]);
        assert!(!surface.has_drawn());
        assert!(surface.image().pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_press_and_release_without_move_is_not_a_stroke() {
        let (mut surface, rx) = surface();
        surface.handle(PointerEvent::Press(Point::new(10.0, 10.0)));
        surface.handle(PointerEvent::Release);
        assert!(!surface.has_drawn());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_move_while_idle_draws_nothing() {
        let (mut surface, rx) = surface();
        surface.handle(PointerEvent::Move(Point::new(10.0, 10.0)));
        surface.handle(PointerEvent::Move(Point::new(60.0, 60.0)));
        surface.handle(PointerEvent::Leave);
        assert!(!surface.has_drawn());
        assert!(surface.image().pixels().all(|p| *p == BACKGROUND));
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_leave_ends_stroke() {
        let (mut surface, rx) = surface();
        surface.handle(PointerEvent::Press(Point::new(10.0, 10.0)));
        surface.handle(PointerEvent::Move(Point::new(30.0, 10.0)));
        surface.handle(PointerEvent::Leave);
        assert_eq!(surface.state(), PenState::Idle);
        assert_eq!(rx.try_iter().count(), 1);

        // Further movement after leaving must not extend the stroke.
        surface.handle(PointerEvent::Move(Point::new(200.0, 200.0)));
        assert_eq!(*surface.image().get_pixel(200, 200), BACKGROUND);
    }

    #[test]
    fn test_coordinates_are_relative_to_origin() {
        let (mut surface, _rx) = surface();
        surface.set_origin(Point::new(100.0, 50.0));
        draw_line(&mut surface, Point::new(110.0, 60.0), Point::new(130.0, 60.0));

        assert_eq!(*surface.image().get_pixel(20, 10), PEN_COLOR);
        assert_eq!(*surface.image().get_pixel(120, 60), BACKGROUND);
    }

    #[test]
    fn test_stroke_has_round_width() {
        let (mut surface, _rx) = surface();
        draw_line(&mut surface, Point::new(50.0, 50.0), Point::new(150.0, 50.0));
        // Inside the pen radius above and below the line.
        assert_eq!(*surface.image().get_pixel(100, 52), PEN_COLOR);
        assert_eq!(*surface.image().get_pixel(100, 48), PEN_COLOR);
        // Round cap extends past the endpoint.
        assert_eq!(*surface.image().get_pixel(152, 50), PEN_COLOR);
        assert_eq!(*surface.image().get_pixel(100, 70), BACKGROUND);
    }

    #[test]
    fn test_touch_uses_first_point() {
        let (mut surface, rx) = surface();
        surface.handle(PointerEvent::TouchStart(vec![
            Point::new(20.0, 20.0),
            Point::new(300.0, 250.0),
        ]));
        surface.handle(PointerEvent::TouchMove(vec![
            Point::new(60.0, 20.0),
            Point::new(350.0, 250.0),
        ]));
        surface.handle(PointerEvent::TouchEnd);

        assert_eq!(*surface.image().get_pixel(40, 20), PEN_COLOR);
        assert_eq!(*surface.image().get_pixel(320, 250), BACKGROUND);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_empty_touch_list_is_ignored() {
        let (mut surface, _rx) = surface();
        surface.handle(PointerEvent::TouchStart(vec![]));
        assert_eq!(surface.state(), PenState::Idle);
    }

    #[test]
    fn test_export_is_png_of_surface_size() {
        let (mut surface, rx) = surface();
        draw_line(&mut surface, Point::new(10.0, 10.0), Point::new(90.0, 90.0));
        let exported = rx.try_recv().unwrap().unwrap();

        assert!(exported.as_str().starts_with("data:image/png;base64,"));
        let decoded = exported.decode_image().unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (400, DRAWING_HEIGHT));
        assert_eq!(*decoded.get_pixel(50, 50), PEN_COLOR);
    }

    #[test]
    fn test_exported_snapshot_is_a_copy() {
        let (mut surface, rx) = surface();
        draw_line(&mut surface, Point::new(10.0, 10.0), Point::new(60.0, 10.0));
        let first = rx.try_recv().unwrap().unwrap();

        draw_line(&mut surface, Point::new(10.0, 200.0), Point::new(60.0, 200.0));
        let second = rx.try_recv().unwrap().unwrap();

        assert_ne!(first, second);
        let first_pixels = first.decode_image().unwrap().to_rgba8();
        assert_eq!(*first_pixels.get_pixel(30, 200), BACKGROUND);
    }

    #[test]
    fn test_header_strip_reproduces_payload() {
        let (mut surface, _rx) = surface();
        draw_line(&mut surface, Point::new(5.0, 5.0), Point::new(70.0, 40.0));
        let exported = surface.export().unwrap();

        let mut png = Vec::new();
        surface
            .image()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let expected = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &png);

        assert_eq!(crate::image_data::strip_data_uri_header(exported.as_str()), expected);
        assert_eq!(exported.decode().unwrap(), png);
    }

    #[test]
    fn test_snapshot_reflects_has_drawn() {
        let (mut surface, _rx) = surface();
        assert!(surface.snapshot().is_none());
        draw_line(&mut surface, Point::new(5.0, 5.0), Point::new(70.0, 40.0));
        assert!(surface.snapshot().is_some());
        surface.clear();
        assert!(surface.snapshot().is_none());
    }
}
