//! Off-screen capture of the ticket region
//!
//! Renders the ticket card into a cell buffer, then paints each cell's
//! background and glyph into an RGBA canvas at a fixed upscale factor.
//! The canvas starts fully opaque so no transparency reaches the output.

use super::card::{TicketCard, INK, PAPER};
use super::font::{self, BoxArms, GlyphShape};
use crate::{DateQuestError, Result};
use image::{imageops::FilterType, DynamicImage, Rgba, RgbaImage};
use ratatui::{buffer::Buffer, layout::Rect, style::Color, style::Modifier, widgets::Widget};

/// Width of one terminal cell in unscaled pixels
pub const CELL_WIDTH_PX: u32 = 6;
/// Height of one terminal cell in unscaled pixels
pub const CELL_HEIGHT_PX: u32 = 10;
/// Upscale factor used for exports
pub const EXPORT_SCALE: u32 = 2;

/// Pixel size of a captured region at the given scale
pub fn capture_dimensions(region: Rect, scale: u32) -> (u32, u32) {
    (
        region.width as u32 * CELL_WIDTH_PX * scale,
        region.height as u32 * CELL_HEIGHT_PX * scale,
    )
}

/// Rasterize the ticket card.
///
/// `picture` is composited into the card's image area, cropped to cover it.
pub fn capture_region(
    card: TicketCard<'_>,
    picture: Option<&DynamicImage>,
    scale: u32,
) -> Result<RgbaImage> {
    if scale == 0 {
        return Err(DateQuestError::CaptureError(
            "Capture scale must be greater than 0".to_string(),
        ));
    }

    let region = TicketCard::region();
    let mut buffer = Buffer::empty(region);
    card.render(region, &mut buffer);

    let mut canvas = rasterize(&buffer, scale);

    if let Some(picture) = picture {
        let slot = TicketCard::image_area(region);
        composite(&mut canvas, picture, slot, scale)?;
    }

    Ok(canvas)
}

/// Paint every cell of `buffer` into a new canvas
pub fn rasterize(buffer: &Buffer, scale: u32) -> RgbaImage {
    let area = buffer.area;
    let (width, height) = capture_dimensions(area, scale);
    let background = to_rgba(PAPER, Rgba([255, 255, 255, 255]));
    let mut canvas = RgbaImage::from_pixel(width, height, background);

    let cell_w = CELL_WIDTH_PX * scale;
    let cell_h = CELL_HEIGHT_PX * scale;

    for row in 0..area.height {
        for col in 0..area.width {
            let cell = buffer.get(area.x + col, area.y + row);
            let x0 = col as u32 * cell_w;
            let y0 = row as u32 * cell_h;

            let bg = to_rgba(cell.bg, background);
            fill_rect(&mut canvas, x0, y0, cell_w, cell_h, bg);

            let fg = to_rgba(cell.fg, to_rgba(INK, Rgba([0, 0, 0, 255])));
            let bold = cell.modifier.contains(Modifier::BOLD);
            for ch in cell.symbol().chars().take(1) {
                draw_glyph(&mut canvas, font::glyph(ch), x0, y0, scale, fg, bold);
            }
        }
    }

    canvas
}

fn composite(canvas: &mut RgbaImage, picture: &DynamicImage, slot: Rect, scale: u32) -> Result<()> {
    let x = slot.x as u32 * CELL_WIDTH_PX * scale;
    let y = slot.y as u32 * CELL_HEIGHT_PX * scale;
    let (w, h) = capture_dimensions(slot, scale);
    if w == 0 || h == 0 {
        return Err(DateQuestError::CaptureError(
            "Ticket image area is empty".to_string(),
        ));
    }
    if picture.width() == 0 || picture.height() == 0 {
        return Err(DateQuestError::CaptureError(
            "Ticket image has no pixels".to_string(),
        ));
    }

    let fitted = picture.resize_to_fill(w, h, FilterType::Triangle).to_rgba8();
    image::imageops::overlay(canvas, &fitted, x as i64, y as i64);
    Ok(())
}

fn draw_glyph(
    canvas: &mut RgbaImage,
    shape: GlyphShape,
    x0: u32,
    y0: u32,
    scale: u32,
    color: Rgba<u8>,
    bold: bool,
) {
    match shape {
        GlyphShape::Blank => {}
        GlyphShape::Bitmap(columns) => {
            // One font pixel of left margin keeps glyphs centered in a 6px cell
            let left = x0;
            let top = y0 + scale;
            for (cx, bits) in columns.iter().enumerate() {
                for cy in 0..font::GLYPH_HEIGHT {
                    if bits >> cy & 1 == 1 {
                        let px = left + cx as u32 * scale;
                        let py = top + cy * scale;
                        fill_rect(canvas, px, py, scale, scale, color);
                        if bold {
                            fill_rect(canvas, px + scale.div_ceil(2), py, scale, scale, color);
                        }
                    }
                }
            }
        }
        GlyphShape::Box(arms) => draw_box(canvas, arms, x0, y0, scale, color),
    }
}

fn draw_box(canvas: &mut RgbaImage, arms: BoxArms, x0: u32, y0: u32, scale: u32, color: Rgba<u8>) {
    let cell_w = CELL_WIDTH_PX * scale;
    let cell_h = CELL_HEIGHT_PX * scale;
    let cx = x0 + cell_w / 2;
    let cy = y0 + cell_h / 2;
    let t = scale;

    if arms.left {
        fill_rect(canvas, x0, cy, cx - x0 + t, t, color);
    }
    if arms.right {
        fill_rect(canvas, cx, cy, x0 + cell_w - cx, t, color);
    }
    if arms.up {
        fill_rect(canvas, cx, y0, t, cy - y0 + t, color);
    }
    if arms.down {
        fill_rect(canvas, cx, cy, t, y0 + cell_h - cy, color);
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = (x + w).min(canvas.width());
    let y_end = (y + h).min(canvas.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

/// Map a terminal color to an opaque pixel; `Reset` takes `fallback`
pub fn to_rgba(color: Color, fallback: Rgba<u8>) -> Rgba<u8> {
    let (r, g, b) = match color {
        Color::Reset => return fallback,
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::Red => (205, 49, 49),
        Color::Green => (13, 188, 121),
        Color::Yellow => (229, 229, 16),
        Color::Blue => (36, 114, 200),
        Color::Magenta => (188, 63, 188),
        Color::Cyan => (17, 168, 205),
        Color::Gray => (229, 229, 229),
        Color::DarkGray => (102, 102, 102),
        Color::LightRed => (241, 76, 76),
        Color::LightGreen => (35, 209, 139),
        Color::LightYellow => (245, 245, 67),
        Color::LightBlue => (59, 142, 234),
        Color::LightMagenta => (214, 112, 214),
        Color::LightCyan => (41, 184, 219),
        Color::White => (255, 255, 255),
        Color::Indexed(i) => indexed_rgb(i),
    };
    Rgba([r, g, b, 255])
}

fn indexed_rgb(index: u8) -> (u8, u8, u8) {
    match index {
        0..=15 => {
            let base = if index >= 8 { 128 } else { 0 };
            let level = if index >= 8 { 127 } else { 170 };
            let bit = |n: u8| if index & n != 0 { base + level } else { base / 2 };
            (bit(1), bit(2), bit(4))
        }
        16..=231 => {
            let i = index - 16;
            let step = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (step(i / 36), step((i / 6) % 6), step(i % 6))
        }
        _ => {
            let level = 8 + (index - 232) * 10;
            (level, level, level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::card::{TICKET_HEIGHT, TICKET_WIDTH};
    use crate::models::catalog;
    use chrono::NaiveDate;

    fn issued() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
    }

    fn solid(r: u8, g: u8, b: u8, w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([r, g, b, 255])))
    }

    #[test]
    fn test_capture_dimensions_use_scale() {
        let option = catalog().remove(0);
        let image = capture_region(TicketCard::new(&option, issued()), None, EXPORT_SCALE).unwrap();
        assert_eq!(image.width(), TICKET_WIDTH as u32 * CELL_WIDTH_PX * 2);
        assert_eq!(image.height(), TICKET_HEIGHT as u32 * CELL_HEIGHT_PX * 2);
    }

    #[test]
    fn test_capture_is_fully_opaque() {
        let option = catalog().remove(0);
        let transparent = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 0])));
        let image =
            capture_region(TicketCard::new(&option, issued()), Some(&transparent), 1).unwrap();
        assert!(image.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_picture_is_composited_into_image_area() {
        let option = catalog().remove(2);
        let picture = solid(0, 0, 255, 64, 64);
        let image = capture_region(TicketCard::new(&option, issued()), Some(&picture), 2).unwrap();

        let slot = TicketCard::image_area(TicketCard::region());
        let cx = (slot.x as u32 + slot.width as u32 / 2) * CELL_WIDTH_PX * 2;
        let cy = (slot.y as u32 + slot.height as u32 / 2) * CELL_HEIGHT_PX * 2;
        let center = image.get_pixel(cx, cy).0;
        assert!(center[2] > 240 && center[0] < 15 && center[1] < 15);

        // The gutter right of the slot keeps the paper color
        let gutter = (slot.x + slot.width) as u32 * CELL_WIDTH_PX * 2 + 1;
        assert_eq!(*image.get_pixel(gutter, cy), to_rgba(PAPER, Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_text_pixels_are_drawn() {
        let option = catalog().remove(0);
        let image = capture_region(TicketCard::new(&option, issued()), None, 1).unwrap();
        let paper = to_rgba(PAPER, Rgba([0, 0, 0, 255]));
        let ink_like = image.pixels().filter(|p| **p != paper).count();
        assert!(ink_like > 1000);
    }

    #[test]
    fn test_zero_scale_is_rejected() {
        let option = catalog().remove(0);
        let result = capture_region(TicketCard::new(&option, issued()), None, 0);
        assert!(matches!(result, Err(DateQuestError::CaptureError(_))));
    }

    #[test]
    fn test_color_mapping() {
        let fallback = Rgba([1, 2, 3, 255]);
        assert_eq!(to_rgba(Color::Reset, fallback), fallback);
        assert_eq!(to_rgba(Color::Rgb(9, 8, 7), fallback), Rgba([9, 8, 7, 255]));
        assert_eq!(to_rgba(Color::Indexed(16), fallback), Rgba([0, 0, 0, 255]));
        assert_eq!(to_rgba(Color::Indexed(231), fallback), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_rasterize_box_corner() {
        let area = Rect::new(0, 0, 1, 1);
        let mut buffer = Buffer::empty(area);
        buffer.get_mut(0, 0).set_symbol("┌").set_fg(Color::Black).set_bg(Color::White);
        let image = rasterize(&buffer, 1);
        // center is inked, top-left corner is not
        assert_eq!(*image.get_pixel(3, 5), Rgba([0, 0, 0, 255]));
        assert_eq!(*image.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        // right arm reaches the edge, left arm is absent
        assert_eq!(*image.get_pixel(5, 5), Rgba([0, 0, 0, 255]));
        assert_eq!(*image.get_pixel(0, 5), Rgba([255, 255, 255, 255]));
    }
}
