//! PNG slides: 960×540 logical pixels rendered at scale 2 on a dark
//! background, one file per slide.

use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use log::debug;
use rusttype::{Font, Scale, point};

use super::{ExportError, ExportOptions, font_file, slide_file_name};
use crate::core::record::Slide;

pub const SLIDE_WIDTH: u32 = 960;
pub const SLIDE_HEIGHT: u32 = 540;
pub const RENDER_SCALE: u32 = 2;

const BACKGROUND: [u8; 3] = [0x0f, 0x17, 0x2a];
const TEXT: [u8; 3] = [0xf8, 0xfa, 0xfc];
const MUTED: [u8; 3] = [0x94, 0xa3, 0xb8];

const PADDING: f32 = 64.0;
const TITLE_SIZE: f32 = 40.0;
const COVER_TITLE_SIZE: f32 = 56.0;
const BODY_SIZE: f32 = 22.0;
const FOOTER_SIZE: f32 = 14.0;

struct Fonts {
    regular: Font<'static>,
    bold: Font<'static>,
}

fn load_font(options: &ExportOptions, variant: &str) -> Result<Font<'static>, ExportError> {
    let path = font_file(options, variant);
    let bytes = std::fs::read(&path)
        .map_err(|e| ExportError::Font(format!("{}: {e}", path.display())))?;
    Font::try_from_vec(bytes).ok_or_else(|| ExportError::Font(format!("{}: not a TrueType font", path.display())))
}

/// Canvas in logical pixels; every coordinate is multiplied by the render scale.
struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    fn new() -> Self {
        let [r, g, b] = BACKGROUND;
        Self {
            image: RgbaImage::from_pixel(SLIDE_WIDTH * RENDER_SCALE, SLIDE_HEIGHT * RENDER_SCALE, Rgba([r, g, b, 255])),
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 3]) {
        let s = RENDER_SCALE as f32;
        let [r, g, b] = color;
        let (x0, y0) = ((x * s) as u32, (y * s) as u32);
        let (x1, y1) = (((x + w) * s) as u32, ((y + h) * s) as u32);
        for py in y0..y1.min(self.image.height()) {
            for px in x0..x1.min(self.image.width()) {
                self.image.put_pixel(px, py, Rgba([r, g, b, 255]));
            }
        }
    }

    /// Draws one line with its top-left corner at (x, y).
    fn draw_text(&mut self, font: &Font<'_>, size: f32, x: f32, y: f32, text: &str, color: [u8; 3]) {
        let s = RENDER_SCALE as f32;
        let scale = Scale::uniform(size * s);
        let ascent = font.v_metrics(scale).ascent;
        let (width, height) = (self.image.width() as i32, self.image.height() as i32);
        for glyph in font.layout(text, scale, point(x * s, y * s + ascent)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                let pixel = self.image.get_pixel_mut(px as u32, py as u32);
                for (channel, target) in pixel.0.iter_mut().zip(color) {
                    let blended = *channel as f32 * (1.0 - coverage) + target as f32 * coverage;
                    *channel = blended.round() as u8;
                }
            });
        }
    }
}

/// Width of `text` in logical pixels.
fn text_width(font: &Font<'_>, size: f32, text: &str) -> f32 {
    let scale = Scale::uniform(size);
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Greedy word wrap against a pixel width.
fn wrap_to_width(font: &Font<'_>, size: f32, text: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() { word.to_string() } else { format!("{current} {word}") };
        if !current.is_empty() && text_width(font, size, &candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// The opening slide gets the large centred layout.
fn is_cover(slide: &Slide) -> bool {
    let kind = slide.kind.trim();
    kind.eq_ignore_ascii_case("intro") || kind.eq_ignore_ascii_case("title")
}

fn render_slide(fonts: &Fonts, slide: &Slide, n: usize, total: usize, owner: &str, accent: [u8; 3]) -> RgbaImage {
    let mut canvas = Canvas::new();
    let content_width = SLIDE_WIDTH as f32 - 2.0 * PADDING;
    canvas.fill_rect(0.0, 0.0, SLIDE_WIDTH as f32, 8.0, accent);

    if is_cover(slide) {
        let mut y = SLIDE_HEIGHT as f32 / 2.0 - COVER_TITLE_SIZE * 1.5;
        for line in wrap_to_width(&fonts.bold, COVER_TITLE_SIZE, &slide.title, content_width) {
            canvas.draw_text(&fonts.bold, COVER_TITLE_SIZE, PADDING, y, &line, TEXT);
            y += COVER_TITLE_SIZE * 1.2;
        }
        canvas.fill_rect(PADDING, y + 8.0, 120.0, 4.0, accent);
        y += 32.0;
        for item in &slide.content {
            for line in wrap_to_width(&fonts.regular, BODY_SIZE, item, content_width) {
                canvas.draw_text(&fonts.regular, BODY_SIZE, PADDING, y, &line, MUTED);
                y += BODY_SIZE * 1.4;
            }
        }
    } else {
        let mut y = PADDING;
        for line in wrap_to_width(&fonts.bold, TITLE_SIZE, &slide.title, content_width) {
            canvas.draw_text(&fonts.bold, TITLE_SIZE, PADDING, y, &line, accent);
            y += TITLE_SIZE * 1.25;
        }
        y += 16.0;
        let bullet_indent = 28.0;
        for item in &slide.content {
            canvas.fill_rect(PADDING + 4.0, y + BODY_SIZE * 0.45, 8.0, 8.0, accent);
            for line in wrap_to_width(&fonts.regular, BODY_SIZE, item, content_width - bullet_indent) {
                if y > SLIDE_HEIGHT as f32 - PADDING {
                    break;
                }
                canvas.draw_text(&fonts.regular, BODY_SIZE, PADDING + bullet_indent, y, &line, TEXT);
                y += BODY_SIZE * 1.4;
            }
            y += 10.0;
        }
    }

    let footer_y = SLIDE_HEIGHT as f32 - 36.0;
    canvas.draw_text(&fonts.regular, FOOTER_SIZE, PADDING, footer_y, owner, MUTED);
    let counter = format!("{n} / {total}");
    let counter_x = SLIDE_WIDTH as f32 - PADDING - text_width(&fonts.regular, FOOTER_SIZE, &counter);
    canvas.draw_text(&fonts.regular, FOOTER_SIZE, counter_x, footer_y, &counter, MUTED);

    canvas.image
}

/// Renders every slide and writes `Slide_<n>_<owner>.png` files.
pub fn write_slides(
    slides: &[Slide],
    owner: &str,
    accent: (u8, u8, u8),
    options: &ExportOptions,
) -> Result<Vec<PathBuf>, ExportError> {
    let fonts = Fonts {
        regular: load_font(options, "Regular")?,
        bold: load_font(options, "Bold")?,
    };
    let accent = [accent.0, accent.1, accent.2];

    let mut written = Vec::with_capacity(slides.len());
    for (i, slide) in slides.iter().enumerate() {
        let image = render_slide(&fonts, slide, i + 1, slides.len(), owner, accent);
        let path = options.output_dir.join(slide_file_name(i + 1, owner));
        image.save(&path).map_err(|e| ExportError::Image(format!("{}: {e}", path.display())))?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
