//! Pure Rust image engine.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image::ImageReader::decode` |
//! | Blank canvas | `image::RgbaImage::from_pixel` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Composite | `image::imageops::overlay` (alpha "over") |
//! | Text metrics | `imageproc::drawing::text_size` + `ab_glyph` line metrics and glyph bounds |
//! | Text drawing | `imageproc::drawing::draw_text_mut` into coverage masks |
//! | Rotated text | `imageproc::geometric_transformations::rotate_about_center` |
//! | Encode | `DynamicImage::write_to` |

use super::backend::{Dimensions, EngineError, ImageEngine, Probe};
use super::params::{Color, Drawer, MAX_STROKE_WIDTH};
use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Engine handle: decoded pixels plus the encoding chosen for export.
#[derive(Debug, Clone)]
pub struct RustHandle {
    image: DynamicImage,
    format: Option<ImageFormat>,
}

impl RustHandle {
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}

/// Pure Rust engine using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustEngine;

impl RustEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a format name (`"jpeg"`, `"jpg"`, `"PNG"`, ...) to an encodable format.
fn parse_format(name: &str) -> Result<ImageFormat, EngineError> {
    let lower = name.trim().to_ascii_lowercase();
    ImageFormat::from_extension(&lower)
        .filter(|f| f.writing_enabled())
        .ok_or_else(|| EngineError::UnknownFormat(name.to_string()))
}

/// Canonical lowercase name for a format.
fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Avif => "avif",
        ImageFormat::Bmp => "bmp",
        other => other.extensions_str().first().copied().unwrap_or("unknown"),
    }
}

/// True if `name` is a format this engine can encode to.
pub fn is_writable_format(name: &str) -> bool {
    parse_format(name).is_ok()
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, EngineError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

fn load_font(path: &Path) -> Result<FontVec, EngineError> {
    let bytes = std::fs::read(path)
        .map_err(|e| EngineError::Font(format!("failed to read {}: {e}", path.display())))?;
    FontVec::try_from_vec(bytes)
        .map_err(|_| EngineError::Font(format!("{} is not a usable font", path.display())))
}

fn font_scale(drawer: &Drawer) -> Result<PxScale, EngineError> {
    if !(drawer.size > 0.0 && drawer.size.is_finite()) {
        return Err(EngineError::Font(format!(
            "font size must be positive, got {}",
            drawer.size
        )));
    }
    Ok(PxScale::from(drawer.size))
}

fn checked_stroke_width(drawer: &Drawer) -> Result<u32, EngineError> {
    let width = drawer.stroke_width();
    if width > MAX_STROKE_WIDTH {
        return Err(EngineError::Font(format!(
            "stroke width {width} exceeds the maximum of {MAX_STROKE_WIDTH}"
        )));
    }
    Ok(width)
}

/// Pixel extent of `text` as `draw_text_mut` lays it out from `(0, 0)`.
///
/// Starts from advance width by line height (ascent to descent) and grows
/// to cover every glyph's ink, so negative side bearings and overhangs
/// past the last advance are included. `left` and `top` are never positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextBox {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl TextBox {
    fn width(&self) -> u32 {
        (self.right - self.left) as u32
    }

    fn height(&self) -> u32 {
        (self.bottom - self.top) as u32
    }
}

/// Mirrors the glyph layout of `imageproc::drawing::draw_text_mut`.
fn text_box(font: &FontVec, scale: PxScale, text: &str) -> TextBox {
    let scaled = font.as_scaled(scale);
    let (advance, _) = text_size(scale, font, text);
    let mut bounds = TextBox {
        left: 0,
        top: 0,
        right: advance as i32,
        bottom: (scaled.ascent() - scaled.descent()).ceil() as i32,
    };

    let mut caret = 0.0f32;
    let mut last: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        if let Some(outlined) = font.outline_glyph(glyph) {
            if let Some(last) = last {
                caret += scaled.kern(id, last);
            }
            last = Some(id);
            let bb = outlined.px_bounds();
            bounds.left = bounds.left.min(bb.min.x.round() as i32);
            bounds.top = bounds.top.min(bb.min.y.round() as i32);
            bounds.right = bounds.right.max(bb.max.x.round() as i32);
            bounds.bottom = bounds.bottom.max(bb.max.y.round() as i32);
        }
    }
    bounds
}

/// Size of the rendered text including the stroke on every side.
fn measure(bounds: TextBox, stroke: u32) -> Dimensions {
    Dimensions {
        width: bounds.width() + 2 * stroke,
        height: bounds.height() + 2 * stroke,
    }
}

/// Offsets of a filled disc of the given radius, used to fatten glyphs into an outline.
fn disc_offsets(radius: u32) -> Vec<(i32, i32)> {
    let r = radius as i32;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Draw `text` once per offset into a coverage mask.
fn coverage_mask(
    font: &FontVec,
    scale: PxScale,
    text: &str,
    size: Dimensions,
    origin: (i32, i32),
    offsets: &[(i32, i32)],
) -> GrayImage {
    let mut mask = GrayImage::new(size.width, size.height);
    for &(dx, dy) in offsets {
        draw_text_mut(
            &mut mask,
            Luma([255u8]),
            origin.0 + dx,
            origin.1 + dy,
            scale,
            font,
            text,
        );
    }
    mask
}

/// Combine fill and stroke coverage into a straight-alpha RGBA layer,
/// fill composited over stroke.
fn colorize(fill_mask: &GrayImage, fill: Color, stroke: Option<(&GrayImage, Color)>) -> RgbaImage {
    let [fr, fg, fb, fa] = fill.rgba().map(f32::from);
    RgbaImage::from_fn(fill_mask.width(), fill_mask.height(), |x, y| {
        let f = fill_mask.get_pixel(x, y)[0] as f32 / 255.0 * fa / 255.0;
        let (s, [sr, sg, sb, _]) = match stroke {
            Some((mask, color)) => (
                mask.get_pixel(x, y)[0] as f32 / 255.0 * color.alpha() as f32 / 255.0,
                color.rgba().map(f32::from),
            ),
            None => (0.0, [0.0; 4]),
        };
        let out_a = f + s * (1.0 - f);
        if out_a <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        let mix = |fc: f32, sc: f32| ((fc * f + sc * s * (1.0 - f)) / out_a).round() as u8;
        Rgba([
            mix(fr, sr),
            mix(fg, sg),
            mix(fb, sb),
            (out_a * 255.0).round() as u8,
        ])
    })
}

/// Rotate a layer clockwise about its center on a square canvas big enough
/// to hold every orientation. Returns the rotated layer and how far its
/// top-left moved up and left relative to the unrotated layer.
fn rotate_layer(layer: RgbaImage, angle: f32) -> (RgbaImage, i64, i64) {
    let (w, h) = layer.dimensions();
    let side = ((w as f64).hypot(h as f64)).ceil() as u32;
    let off_x = (side - w) / 2;
    let off_y = (side - h) / 2;

    let mut square = RgbaImage::new(side, side);
    image::imageops::replace(&mut square, &layer, off_x as i64, off_y as i64);
    let rotated = rotate_about_center(
        &square,
        angle.to_radians(),
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    );
    (rotated, off_x as i64, off_y as i64)
}

fn is_unrotated(angle: f32) -> bool {
    let normalized = angle.rem_euclid(360.0);
    normalized < 0.01 || (360.0 - normalized) < 0.01
}

impl ImageEngine for RustEngine {
    type Handle = RustHandle;

    fn probe(&self, path: &Path) -> Result<Probe, EngineError> {
        let reader = open_reader(path)?;
        let mime = reader.format().map(|f| f.to_mime_type().to_string());
        let (width, height) = reader.into_dimensions().map_err(|e| {
            EngineError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {e}",
                path.display()
            ))
        })?;
        Ok(Probe {
            dimensions: Dimensions { width, height },
            mime,
        })
    }

    fn decode(&self, path: &Path) -> Result<RustHandle, EngineError> {
        let reader = open_reader(path)?;
        let format = reader.format();
        let image = reader.decode().map_err(|e| {
            EngineError::ProcessingFailed(format!("Failed to decode {}: {e}", path.display()))
        })?;
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "decoded"
        );
        Ok(RustHandle { image, format })
    }

    fn blank(&self, width: u32, height: u32, background: &str) -> Result<RustHandle, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::ProcessingFailed(format!(
                "canvas dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let color: Color = background
            .parse()
            .map_err(|_| EngineError::InvalidColor(background.to_string()))?;
        let image = RgbaImage::from_pixel(width, height, Rgba(color.rgba()));
        Ok(RustHandle {
            image: DynamicImage::ImageRgba8(image),
            format: None,
        })
    }

    fn geometry(&self, handle: &RustHandle) -> Dimensions {
        Dimensions {
            width: handle.image.width(),
            height: handle.image.height(),
        }
    }

    fn resize(&self, handle: &mut RustHandle, width: u32, height: u32) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::ProcessingFailed(format!(
                "resize target must be non-zero, got {width}x{height}"
            )));
        }
        handle.image = handle
            .image
            .resize_exact(width, height, FilterType::Lanczos3);
        Ok(())
    }

    fn composite(
        &self,
        canvas: &mut RustHandle,
        overlay: &RustHandle,
        x: i64,
        y: i64,
    ) -> Result<(), EngineError> {
        image::imageops::overlay(&mut canvas.image, &overlay.image, x, y);
        Ok(())
    }

    fn annotate(
        &self,
        handle: &mut RustHandle,
        text: &str,
        x: i64,
        y: i64,
        angle: f32,
        drawer: &Drawer,
    ) -> Result<(), EngineError> {
        let scale = font_scale(drawer)?;
        let stroke_width = checked_stroke_width(drawer)?;
        let font = load_font(&drawer.font)?;
        let bounds = text_box(&font, scale, text);
        let size = measure(bounds, stroke_width);
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let origin = (
            stroke_width as i32 - bounds.left,
            stroke_width as i32 - bounds.top,
        );
        let fill_mask = coverage_mask(&font, scale, text, size, origin, &[(0, 0)]);
        let stroke_mask = drawer.stroke.map(|stroke| {
            let mask = coverage_mask(
                &font,
                scale,
                text,
                size,
                origin,
                &disc_offsets(stroke.width),
            );
            (mask, stroke.color)
        });
        let layer = colorize(
            &fill_mask,
            drawer.fill,
            stroke_mask.as_ref().map(|(mask, color)| (mask, *color)),
        );

        let (layer, shift_x, shift_y) = if is_unrotated(angle) {
            (layer, 0, 0)
        } else {
            rotate_layer(layer, angle)
        };
        image::imageops::overlay(&mut handle.image, &layer, x - shift_x, y - shift_y);
        Ok(())
    }

    fn text_geometry(&self, text: &str, drawer: &Drawer) -> Result<Dimensions, EngineError> {
        let scale = font_scale(drawer)?;
        let stroke_width = checked_stroke_width(drawer)?;
        let font = load_font(&drawer.font)?;
        Ok(measure(text_box(&font, scale, text), stroke_width))
    }

    fn set_format(&self, handle: &mut RustHandle, format: &str) -> Result<(), EngineError> {
        handle.format = Some(parse_format(format)?);
        Ok(())
    }

    fn format(&self, handle: &RustHandle) -> Option<String> {
        handle.format.map(|f| format_name(f).to_string())
    }

    fn encode(&self, handle: &RustHandle) -> Result<Vec<u8>, EngineError> {
        let format = handle.format.ok_or(EngineError::FormatNotSet)?;
        let mut buf = Cursor::new(Vec::new());
        let written = match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgb8(handle.image.to_rgb8()).write_to(&mut buf, format)
            }
            _ => handle.image.write_to(&mut buf, format),
        };
        written.map_err(|e| {
            EngineError::ProcessingFailed(format!("{} encode failed: {e}", format_name(format)))
        })?;
        Ok(buf.into_inner())
    }
}
