//! End-to-end checks of the `Image` wrapper over the real pixel engine.
//!
//! Every test encodes its result and decodes the bytes again, so what is
//! asserted is what a caller would write to disk.

use image::{GenericImageView, Rgba, RgbaImage};
use imprint::imaging::{Image, ImageError, Placement, RustEngine};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn solid_png(dir: &TempDir, name: &str, width: u32, height: u32, color: Rgba<u8>) -> PathBuf {
    let path = dir.path().join(name);
    RgbaImage::from_pixel(width, height, color)
        .save(&path)
        .unwrap();
    path
}

fn canvas(width: u32, height: u32) -> Image<RustEngine> {
    let mut image = Image::new(RustEngine::new());
    image.create_new(width, height, "white").unwrap();
    image
}

fn decode(bytes: &[u8]) -> image::DynamicImage {
    image::load_from_memory(bytes).unwrap()
}

#[test]
fn created_canvas_exports_at_requested_size() {
    let mut image = canvas(320, 200);
    let png = image.output(Some("png")).unwrap();

    let decoded = decode(&png);
    assert_eq!(decoded.dimensions(), (320, 200));
    assert_eq!(decoded.get_pixel(160, 100), WHITE);
}

#[test]
fn repeated_output_is_stable() {
    let mut image = canvas(64, 48);
    let first = image.output(Some("png")).unwrap();
    let second = image.output(None).unwrap();
    assert_eq!(first, second);
    assert_eq!(image.format().as_deref(), Some("png"));
}

#[test]
fn overlay_lands_in_bottom_right_corner() {
    let tmp = TempDir::new().unwrap();
    let logo = solid_png(&tmp, "logo.png", 100, 50, RED);

    let mut image = canvas(800, 600);
    image
        .place_image(&logo, Placement::BottomRight, 0, 0)
        .unwrap();
    let decoded = decode(&image.output(Some("png")).unwrap());

    assert_eq!(decoded.get_pixel(750, 575), RED);
    assert_eq!(decoded.get_pixel(700, 550), RED);
    assert_eq!(decoded.get_pixel(799, 599), RED);
    assert_eq!(decoded.get_pixel(650, 575), WHITE);
    assert_eq!(decoded.get_pixel(750, 549), WHITE);
}

#[test]
fn overlay_is_resized_before_placement() {
    let tmp = TempDir::new().unwrap();
    let logo = solid_png(&tmp, "logo.png", 10, 10, RED);

    let mut image = canvas(100, 100);
    image
        .place_image(&logo, Placement::MidCenter, 40, 20)
        .unwrap();
    let decoded = decode(&image.output(Some("png")).unwrap());

    // 40x20 centered on 100x100 covers x 30..70, y 40..60
    assert_eq!(decoded.get_pixel(50, 50), RED);
    assert_eq!(decoded.get_pixel(31, 41), RED);
    assert_eq!(decoded.get_pixel(25, 50), WHITE);
    assert_eq!(decoded.get_pixel(50, 35), WHITE);
}

#[test]
fn loaded_file_keeps_its_format_and_size() {
    let tmp = TempDir::new().unwrap();
    let path = solid_png(&tmp, "photo.png", 90, 60, RED);

    let mut image = Image::open(RustEngine::new(), &path).unwrap();
    assert!(!image.is_blank());
    assert_eq!((image.width(), image.height()), (90, 60));
    assert_eq!(image.mime(), Some("image/png"));
    assert_eq!(image.path(), Some(path.as_path()));

    let decoded = decode(&image.output(None).unwrap());
    assert_eq!(decoded.dimensions(), (90, 60));
}

#[test]
fn resize_then_export_as_jpeg() {
    let tmp = TempDir::new().unwrap();
    let path = solid_png(&tmp, "photo.png", 400, 300, RED);

    let mut image = Image::open(RustEngine::new(), &path).unwrap();
    image.resize(200, 100).unwrap().set_format("jpg").unwrap();
    assert_eq!(image.format().as_deref(), Some("jpeg"));

    let jpeg = image.output(None).unwrap();
    assert_eq!(
        image::guess_format(&jpeg).unwrap(),
        image::ImageFormat::Jpeg
    );
    assert_eq!(decode(&jpeg).dimensions(), (200, 100));
}

#[test]
fn missing_file_is_not_found() {
    let mut image = Image::new(RustEngine::new());
    let result = image.load(Path::new("/nonexistent/photo.png"));
    assert!(matches!(result, Err(ImageError::NotFound(_))));
    assert!(image.is_blank());
}

#[test]
fn blank_image_cannot_be_exported() {
    let mut image = Image::new(RustEngine::new());
    assert!(matches!(image.output(Some("png")), Err(ImageError::Empty)));
}

#[test]
fn corrupt_file_leaves_previous_content() {
    let tmp = TempDir::new().unwrap();
    let broken = tmp.path().join("broken.png");
    std::fs::write(&broken, b"not a picture").unwrap();

    let mut image = canvas(30, 20);
    let result = image.load(&broken);
    assert!(matches!(result, Err(ImageError::Engine(_))));
    assert_eq!((image.width(), image.height()), (30, 20));
    assert_eq!(image.path(), None);
}
