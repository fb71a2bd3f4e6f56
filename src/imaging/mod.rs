//! Image handling: a thin façade over a pixel engine.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::ImageReader::into_dimensions` |
//! | **Resize** | Lanczos3 via `DynamicImage::resize_exact` |
//! | **Composite** | `image::imageops::overlay` |
//! | **Text** | `imageproc` drawing + `ab_glyph` fonts |
//!
//! The module is split into:
//! - **Calculations**: Pure placement arithmetic (unit testable)
//! - **Parameters**: Colours and text style handed to the engine
//! - **Backend**: [`ImageEngine`] trait + [`RustEngine`]
//! - **Wrapper**: The [`Image`] wrapper combining state, placement and engine calls

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;
pub mod wrapper;

pub use backend::{Dimensions, EngineError, ImageEngine, Probe};
pub use calculations::{ParsePlacementError, Placement, Point, placement_coordinates};
pub use params::{Color, Drawer, MAX_STROKE_WIDTH, ParseColorError, Stroke};
pub use rust_backend::{RustEngine, RustHandle, is_writable_format};
pub use wrapper::{DEFAULT_BACKGROUND, Image, ImageError, Placed};
