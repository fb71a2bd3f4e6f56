//! The [`Image`] wrapper: one engine handle plus the metadata recorded
//! alongside it.
//!
//! An `Image` is either **Blank** (freshly constructed, no pixels) or
//! **Loaded** (after [`Image::create_new`] or [`Image::load`]). There is no way
//! back to Blank. Operations that need pixels fail with [`ImageError::Empty`]
//! on a Blank image before the engine is touched.
//!
//! ```ignore
//! let mut image = Image::new(RustEngine::new());
//! image.create_new(800, 600, "white")?;
//! image.place_image("logo.png".as_ref(), Placement::BottomRight, 0, 0)?;
//! image.place_text("© 2026", Placement::BottomLeft, &drawer)?;
//! let png = image.output(Some("png"))?;
//! ```

use super::backend::{Dimensions, EngineError, ImageEngine};
use super::calculations::{Placement, Point, placement_coordinates};
use super::params::Drawer;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Background used by [`Image::create_new`] callers that have no preference.
pub const DEFAULT_BACKGROUND: &str = "white";

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image not found: {0}")]
    NotFound(PathBuf),
    #[error("Image is empty; create or load one first")]
    Empty,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, ImageError>;

/// Where an anchored overlay went: its measured size and top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placed {
    pub size: Dimensions,
    pub at: Point,
}

/// Pixel content present: the handle plus its cached size.
struct Canvas<H> {
    handle: H,
    width: u32,
    height: u32,
}

enum State<H> {
    Blank,
    Loaded(Canvas<H>),
}

/// An image owned through an [`ImageEngine`].
pub struct Image<E: ImageEngine> {
    engine: E,
    path: Option<PathBuf>,
    mime: Option<String>,
    background: Option<String>,
    state: State<E::Handle>,
}

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ImageError::NotFound(path.to_path_buf()))
    }
}

impl<E: ImageEngine> Image<E> {
    /// A Blank image backed by `engine`.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            path: None,
            mime: None,
            background: None,
            state: State::Blank,
        }
    }

    /// Construct and [`load`](Self::load) in one step.
    pub fn open(engine: E, path: impl AsRef<Path>) -> Result<Self> {
        let mut image = Self::new(engine);
        image.load(path)?;
        Ok(image)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Source file of the last successful [`load`](Self::load).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Mime type reported by the probe at load time.
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// Background recorded by [`create_new`](Self::create_new); `None` once a
    /// file has been loaded.
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.state, State::Blank)
    }

    /// Current size; zero by zero while Blank.
    pub fn dimensions(&self) -> Dimensions {
        match &self.state {
            State::Blank => Dimensions::default(),
            State::Loaded(canvas) => Dimensions {
                width: canvas.width,
                height: canvas.height,
            },
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions().width
    }

    pub fn height(&self) -> u32 {
        self.dimensions().height
    }

    /// Replace the content with a `width` x `height` canvas filled with `background`.
    #[instrument(skip(self))]
    pub fn create_new(&mut self, width: u32, height: u32, background: &str) -> Result<&mut Self> {
        let handle = self.engine.blank(width, height, background)?;
        self.state = State::Loaded(Canvas {
            handle,
            width,
            height,
        });
        self.background = Some(background.to_string());
        self.path = None;
        self.mime = None;
        info!(width, height, background, "created canvas");
        Ok(self)
    }

    /// Decode the file at `path` into this image.
    ///
    /// Size and mime type come from a header probe; the pixels from a full
    /// decode. Nothing is recorded unless both succeed. A background from an
    /// earlier [`create_new`](Self::create_new) is cleared.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        require_file(path)?;

        let probe = self.engine.probe(path)?;
        let handle = self.engine.decode(path)?;

        let Dimensions { width, height } = probe.dimensions;
        self.state = State::Loaded(Canvas {
            handle,
            width,
            height,
        });
        self.path = Some(path.to_path_buf());
        self.mime = probe.mime;
        self.background = None;
        info!(width, height, mime = ?self.mime, "loaded image");
        Ok(self)
    }

    /// Lanczos resample to `width` x `height`.
    ///
    /// The stored size is whatever the engine reports afterwards, which may
    /// differ from the request.
    #[instrument(skip(self))]
    pub fn resize(&mut self, width: u32, height: u32) -> Result<&mut Self> {
        let engine = &self.engine;
        let State::Loaded(canvas) = &mut self.state else {
            return Err(ImageError::Empty);
        };
        engine.resize(&mut canvas.handle, width, height)?;
        let actual = engine.geometry(&canvas.handle);
        canvas.width = actual.width;
        canvas.height = actual.height;
        debug!(
            requested_w = width,
            requested_h = height,
            width = actual.width,
            height = actual.height,
            "resized"
        );
        Ok(self)
    }

    /// Set the encoding used by [`output`](Self::output), e.g. `"jpeg"`.
    pub fn set_format(&mut self, format: &str) -> Result<&mut Self> {
        let engine = &self.engine;
        let State::Loaded(canvas) = &mut self.state else {
            return Err(ImageError::Empty);
        };
        engine.set_format(&mut canvas.handle, format)?;
        Ok(self)
    }

    /// Current output format. `None` while Blank and for fresh canvases
    /// until [`set_format`](Self::set_format) is called.
    pub fn format(&self) -> Option<String> {
        match &self.state {
            State::Blank => None,
            State::Loaded(canvas) => self.engine.format(&canvas.handle),
        }
    }

    /// Draw `text` with the top-left of its box at `(x, y)`, rotated `angle`
    /// degrees clockwise.
    #[instrument(skip(self, drawer))]
    pub fn annotate(
        &mut self,
        text: &str,
        x: i64,
        y: i64,
        angle: f32,
        drawer: &Drawer,
    ) -> Result<()> {
        let engine = &self.engine;
        let State::Loaded(canvas) = &mut self.state else {
            return Err(ImageError::Empty);
        };
        engine.annotate(&mut canvas.handle, text, x, y, angle, drawer)?;
        Ok(())
    }

    /// Size of `text` as drawn with `drawer`. Needs no pixel content.
    pub fn text_geometry(&self, text: &str, drawer: &Drawer) -> Result<Dimensions> {
        Ok(self.engine.text_geometry(text, drawer)?)
    }

    /// Where a `target`-sized box goes on this image for `placement`.
    pub fn placement_coordinates(&self, target: Dimensions, placement: Placement) -> Point {
        placement_coordinates(self.dimensions(), target, placement)
    }

    /// Measure `text`, anchor it at `placement`, and draw it unrotated.
    #[instrument(skip(self, drawer))]
    pub fn place_text(
        &mut self,
        text: &str,
        placement: Placement,
        drawer: &Drawer,
    ) -> Result<Placed> {
        if self.is_blank() {
            return Err(ImageError::Empty);
        }
        let size = self.text_geometry(text, drawer)?;
        let at = self.placement_coordinates(size, placement);
        debug!(%placement, x = at.x, y = at.y, width = size.width, height = size.height, "placing text");
        self.annotate(text, at.x, at.y, 0.0, drawer)?;
        Ok(Placed { size, at })
    }

    /// Composite the image at `path` over this one, anchored at `placement`.
    ///
    /// When both `width` and `height` are non-zero the overlay is resized
    /// first; otherwise it keeps its own size.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn place_image(
        &mut self,
        path: &Path,
        placement: Placement,
        width: u32,
        height: u32,
    ) -> Result<Placed> {
        if self.is_blank() {
            return Err(ImageError::Empty);
        }
        require_file(path)?;

        let mut overlay = self.engine.decode(path)?;
        if width != 0 && height != 0 {
            self.engine.resize(&mut overlay, width, height)?;
        }
        let size = self.engine.geometry(&overlay);
        let at = self.placement_coordinates(size, placement);
        debug!(%placement, x = at.x, y = at.y, width = size.width, height = size.height, "placing image");

        let engine = &self.engine;
        let canvas = match &mut self.state {
            State::Loaded(canvas) => canvas,
            State::Blank => return Err(ImageError::Empty),
        };
        engine.composite(&mut canvas.handle, &overlay, at.x, at.y)?;
        Ok(Placed { size, at })
    }

    /// Encode the image. An explicit `format` replaces the stored one first.
    #[instrument(skip(self))]
    pub fn output(&mut self, format: Option<&str>) -> Result<Vec<u8>> {
        let engine = &self.engine;
        let canvas = match &mut self.state {
            State::Loaded(canvas) => canvas,
            State::Blank => return Err(ImageError::Empty),
        };
        if let Some(format) = format {
            engine.set_format(&mut canvas.handle, format)?;
        }
        let bytes = engine.encode(&canvas.handle)?;
        debug!(bytes = bytes.len(), "encoded");
        Ok(bytes)
    }
}
