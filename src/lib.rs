//! # Imprint
//!
//! A small image façade for building composed pictures: create or load an
//! image, resize it, stamp text and other images onto it at one of nine
//! anchor positions, and export the result as encoded bytes.
//!
//! ```text
//! create_new / load  →  resize / annotate / place_*  →  set_format  →  output
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The [`Image`](imaging::Image) wrapper, placement math, and the pixel engine |
//! | [`config`] | `imprint.toml` loading, validation and stock defaults |
//! | [`output`] | CLI output formatting for the `imprint` binary |
//!
//! # Design Decisions
//!
//! ## Engine Behind a Trait
//!
//! Every pixel operation goes through [`imaging::ImageEngine`]. The wrapper
//! owns state and placement arithmetic; the engine owns decoding, drawing and
//! encoding. Tests drive the wrapper through a recording mock, so placement
//! and state rules are checked without rendering anything.
//!
//! ## Explicit Blank State
//!
//! An [`Image`](imaging::Image) is either blank or holds a canvas. Operations
//! that need pixels fail with [`ImageError::Empty`](imaging::ImageError::Empty)
//! on a blank image instead of silently producing nothing.
//!
//! ## Pure-Rust Imaging
//!
//! The production engine uses the `image` crate (Lanczos3 resampling) and
//! `imageproc` for text. No system libraries are required.
//!
//! # Example
//!
//! ```
//! use imprint::imaging::{Image, RustEngine};
//!
//! let mut image = Image::new(RustEngine::new());
//! image.create_new(64, 32, "white").unwrap();
//! let png = image.output(Some("png")).unwrap();
//! assert!(png.starts_with(b"\x89PNG"));
//! ```

pub mod config;
pub mod imaging;
pub mod output;
