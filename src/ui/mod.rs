mod compose;
pub mod fields;
pub mod layout;
mod quiz;
pub mod raster;

pub use compose::{draw_compose, draw_generating};
pub use layout::{CanvasGeometry, calculate_compose_chunks, calculate_quiz_chunks};
pub use quiz::{draw_quit_confirmation, draw_quiz};
pub use raster::{RasterView, Sampling};
