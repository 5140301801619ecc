// SPDX-License-Identifier: PMPL-1.0-or-later
//! Screenshot annotation.
//!
//! Outlines every located finding on a copy of the captured screenshot.
//! Rectangles are drawn in finding order; overlaps simply stack.

use crate::error::Result;
use crate::finding::{Finding, Rect};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Outline color
pub const HIGHLIGHT: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Outline width in pixels, drawn inward from the box edge
pub const OUTLINE_WIDTH: u32 = 4;

/// Decode `screenshot` and outline the bbox of every finding that has one
pub fn annotate_screenshot(screenshot: &[u8], findings: &[Finding]) -> Result<RgbaImage> {
    let mut image = image::load_from_memory(screenshot)?.to_rgba8();
    let mut drawn = 0usize;

    for bbox in findings.iter().filter_map(|f| f.bbox.as_ref()) {
        draw_outline(&mut image, bbox, OUTLINE_WIDTH, HIGHLIGHT);
        drawn += 1;
    }

    tracing::debug!("Drew {} outline(s) on {}x{} screenshot", drawn, image.width(), image.height());
    Ok(image)
}

/// Draw a `width`-pixel outline whose outer corners are
/// `(x, y)` and `(x + width, y + height)`, inclusive, clipped to the image
pub fn draw_outline(image: &mut RgbaImage, rect: &Rect, width: u32, color: Rgba<u8>) {
    let (img_w, img_h) = (image.width() as i64, image.height() as i64);
    if img_w == 0 || img_h == 0 {
        return;
    }

    let ((x0, y0), (x1, y1)) = rect.corners();
    // Saturating casts; NaN becomes 0
    let (x0, y0, x1, y1) = (
        x0.round() as i64,
        y0.round() as i64,
        x1.round() as i64,
        y1.round() as i64,
    );
    if x1 < 0 || y1 < 0 || x0 >= img_w || y0 >= img_h {
        return;
    }

    for inset in 0..width as i64 {
        let (left, top, right, bottom) = (
            x0.saturating_add(inset),
            y0.saturating_add(inset),
            x1.saturating_sub(inset),
            y1.saturating_sub(inset),
        );
        if left > right || top > bottom {
            break;
        }

        // Iterate only over the visible span of each edge
        let (span_left, span_right) = (left.max(0), right.min(img_w - 1));
        let (span_top, span_bottom) = (top.max(0), bottom.min(img_h - 1));

        for x in span_left..=span_right {
            put(image, x, top, color);
            put(image, x, bottom, color);
        }
        for y in span_top..=span_bottom {
            put(image, left, y, color);
            put(image, right, y, color);
        }
    }
}

fn put(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    image.put_pixel(x as u32, y as u32, color);
}

/// Encode an annotated image as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn blank_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, WHITE);
        encode_png(&image).expect("encode")
    }

    fn located(x: f64, y: f64, w: f64, h: f64) -> Finding {
        Finding::wcag("test", Severity::MAJOR).with_bbox(Some(Rect::new(x, y, w, h)))
    }

    #[test]
    fn test_rectangle_corners() {
        let png = blank_png(100, 60);
        let image = annotate_screenshot(&png, &[located(10.0, 10.0, 50.0, 20.0)]).expect("annotate");

        assert_eq!(*image.get_pixel(10, 10), HIGHLIGHT);
        assert_eq!(*image.get_pixel(60, 30), HIGHLIGHT);
        assert_eq!(*image.get_pixel(60, 10), HIGHLIGHT);
        assert_eq!(*image.get_pixel(10, 30), HIGHLIGHT);
        // Inner edge of the 4px band
        assert_eq!(*image.get_pixel(13, 20), HIGHLIGHT);
        assert_eq!(*image.get_pixel(14, 20), WHITE);
        // Interior and exterior untouched
        assert_eq!(*image.get_pixel(35, 20), WHITE);
        assert_eq!(*image.get_pixel(9, 10), WHITE);
        assert_eq!(*image.get_pixel(61, 30), WHITE);
        assert_eq!(*image.get_pixel(35, 31), WHITE);
    }

    #[test]
    fn test_finding_without_bbox_draws_nothing() {
        let png = blank_png(40, 40);
        let findings = vec![Finding::heuristic("Help and documentation", Severity::COSMETIC)];
        let image = annotate_screenshot(&png, &findings).expect("annotate");
        assert!(image.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_clipped_to_image() {
        let png = blank_png(20, 20);
        let image = annotate_screenshot(&png, &[located(-5.0, 15.0, 100.0, 100.0)]).expect("annotate");
        assert_eq!(image.dimensions(), (20, 20));
        assert_eq!(*image.get_pixel(0, 15), HIGHLIGHT);
        assert_eq!(*image.get_pixel(10, 18), HIGHLIGHT);
        assert_eq!(*image.get_pixel(10, 19), WHITE);
    }

    #[test]
    fn test_oversized_box_is_clipped_quickly() {
        let png = blank_png(10, 10);
        let findings = [
            located(0.0, 0.0, 1e12, 4.0),
            located(-1e15, -1e15, 2e15, 2e15),
            located(f64::MAX, 0.0, f64::MAX, 1.0),
        ];
        let image = annotate_screenshot(&png, &findings).expect("annotate");
        assert_eq!(*image.get_pixel(0, 0), HIGHLIGHT);
        assert_eq!(*image.get_pixel(9, 0), HIGHLIGHT);
        assert_eq!(*image.get_pixel(5, 4), HIGHLIGHT);
        // The 2e15 box has every edge off-screen
        assert_eq!(*image.get_pixel(5, 7), WHITE);
    }

    #[test]
    fn test_box_outside_image_draws_nothing() {
        let png = blank_png(10, 10);
        let image = annotate_screenshot(&png, &[located(50.0, 50.0, 5.0, 5.0), located(-20.0, 0.0, 5.0, 5.0)])
            .expect("annotate");
        assert!(image.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_small_box_fills() {
        let png = blank_png(20, 20);
        let image = annotate_screenshot(&png, &[located(5.0, 5.0, 2.0, 2.0)]).expect("annotate");
        for x in 5..=7 {
            for y in 5..=7 {
                assert_eq!(*image.get_pixel(x, y), HIGHLIGHT);
            }
        }
        assert_eq!(*image.get_pixel(8, 8), WHITE);
    }

    #[test]
    fn test_input_bytes_untouched() {
        let png = blank_png(30, 30);
        let before = png.clone();
        let _ = annotate_screenshot(&png, &[located(1.0, 1.0, 10.0, 10.0)]).expect("annotate");
        assert_eq!(png, before);
    }

    #[test]
    fn test_undecodable_screenshot() {
        assert!(annotate_screenshot(b"not an image", &[]).is_err());
    }
}
