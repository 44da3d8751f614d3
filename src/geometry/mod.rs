//! Geometry primitives and ICCCM size-hint enforcement.
pub mod rect;
pub mod size_hints;

pub use rect::{Point, Rect};
pub use size_hints::{apply_size_hints, Clamped, SizeHints};
