//! Image engine trait and shared types.
//!
//! The [`ImageEngine`] trait is the full set of capabilities the
//! [`Image`](super::wrapper::Image) wrapper needs from a pixel library: probe,
//! decode, blank canvas, geometry, resize, composite, annotate, text metrics,
//! output format, and encode.
//!
//! The production implementation is
//! [`RustEngine`](super::rust_backend::RustEngine): the `image` crate plus
//! `imageproc` for text. Tests drive the wrapper through `MockEngine`, which
//! records every call instead of touching pixels.

use super::params::Drawer;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown image format: {0}")]
    UnknownFormat(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("No output format set; call set_format first")]
    FormatNotSet,
    #[error("Font error: {0}")]
    Font(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel size of an image or a rendered text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Result of a metadata probe: header-level facts, no pixel decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub dimensions: Dimensions,
    /// e.g. `image/png`; `None` when the container is not recognized.
    pub mime: Option<String>,
}

/// Trait for image engines.
///
/// `Handle` is the engine's owned image object. The wrapper never looks
/// inside it; every read or mutation goes back through the engine.
pub trait ImageEngine {
    type Handle;

    /// Read dimensions and mime type from the file header.
    fn probe(&self, path: &Path) -> Result<Probe, EngineError>;

    /// Fully decode a file.
    fn decode(&self, path: &Path) -> Result<Self::Handle, EngineError>;

    /// Allocate a canvas filled with `background` (a colour name or hex string).
    fn blank(&self, width: u32, height: u32, background: &str)
    -> Result<Self::Handle, EngineError>;

    /// Current pixel size of a handle.
    fn geometry(&self, handle: &Self::Handle) -> Dimensions;

    /// Lanczos resample to `width` x `height`.
    fn resize(&self, handle: &mut Self::Handle, width: u32, height: u32)
    -> Result<(), EngineError>;

    /// Alpha-composite `overlay` over `canvas` with its top-left at `(x, y)`.
    fn composite(
        &self,
        canvas: &mut Self::Handle,
        overlay: &Self::Handle,
        x: i64,
        y: i64,
    ) -> Result<(), EngineError>;

    /// Draw `text` with its top-left at `(x, y)`, rotated `angle` degrees
    /// clockwise about the text box center.
    fn annotate(
        &self,
        handle: &mut Self::Handle,
        text: &str,
        x: i64,
        y: i64,
        angle: f32,
        drawer: &Drawer,
    ) -> Result<(), EngineError>;

    /// Size of `text` as it would be drawn with `drawer`.
    fn text_geometry(&self, text: &str, drawer: &Drawer) -> Result<Dimensions, EngineError>;

    /// Set the encoding used by [`encode`](Self::encode).
    fn set_format(&self, handle: &mut Self::Handle, format: &str) -> Result<(), EngineError>;

    /// Normalized name of the current output format, if any.
    fn format(&self, handle: &Self::Handle) -> Option<String>;

    /// Encode the handle in its current format.
    fn encode(&self, handle: &Self::Handle) -> Result<Vec<u8>, EngineError>;
}
