//! PDF output through `genpdf`: A4 portrait, fixed 10 mm margins.
//!
//! Glyphs are laid out left to right; right-to-left documents are right
//! aligned but not reshaped.

use std::path::Path;

use genpdf::elements::{Break, Paragraph, UnorderedList};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Document as PdfDocument, Element as _, PaperSize, SimplePageDecorator};

use super::{ExportError, ExportOptions};
use crate::core::settings::CvSettings;
use crate::render::{Block, Direction, Document, markdown};

const MARGIN_MM: i32 = 10;

fn points(value: f64) -> u8 {
    value.round().clamp(6.0, 72.0) as u8
}

struct Styles {
    align: Alignment,
    name: Style,
    headline: Style,
    heading: Style,
    title: Style,
    muted: Style,
}

impl Styles {
    fn new(doc: &Document, settings: &CvSettings) -> Self {
        let (r, g, b) = settings.accent_rgb();
        let accent = Color::Rgb(r, g, b);
        let gray = Color::Rgb(0x4b, 0x55, 0x63);
        Self {
            align: match doc.direction {
                Direction::Rtl => Alignment::Right,
                Direction::Ltr => Alignment::Left,
            },
            name: Style::new().bold().with_font_size(points(settings.heading_size * 1.6)),
            headline: Style::new().bold().with_color(accent),
            heading: Style::new()
                .bold()
                .with_font_size(points(settings.heading_size))
                .with_color(accent),
            title: Style::new().bold(),
            muted: Style::new().with_color(gray),
        }
    }

    fn paragraph(&self, text: String, style: Style) -> impl genpdf::Element + use<> {
        Paragraph::new(text).aligned(self.align).styled(style)
    }
}

fn base_font_size(doc: &Document, settings: &CvSettings) -> f64 {
    match doc.direction {
        Direction::Rtl => settings.base_font_size,
        Direction::Ltr => settings.font_size.points(),
    }
}

/// Lays out one document and writes it to `path`.
pub fn write_pdf(
    doc: &Document,
    settings: &CvSettings,
    options: &ExportOptions,
    path: &Path,
) -> Result<(), ExportError> {
    let family = genpdf::fonts::from_files(&options.font_dir, &options.font_family, None).map_err(|e| {
        ExportError::Font(format!(
            "{} in {}: {e}",
            options.font_family,
            options.font_dir.display()
        ))
    })?;

    let mut pdf = PdfDocument::new(family);
    pdf.set_title(doc.name.clone());
    pdf.set_paper_size(PaperSize::A4);
    pdf.set_font_size(points(base_font_size(doc, settings)));
    pdf.set_line_spacing(settings.line_height);
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    pdf.set_page_decorator(decorator);

    let styles = Styles::new(doc, settings);
    let gap = settings.section_spacing / 2.0;

    pdf.push(styles.paragraph(doc.name.clone(), styles.name));
    pdf.push(styles.paragraph(doc.headline.clone(), styles.headline));
    if !doc.contact.is_empty() {
        pdf.push(styles.paragraph(doc.contact.join("  |  "), styles.muted));
    }

    for section in &doc.sections {
        pdf.push(Break::new(gap.max(0.5)));
        pdf.push(styles.paragraph(section.heading.clone(), styles.heading));
        for block in &section.blocks {
            match block {
                Block::Paragraph(text) => pdf.push(styles.paragraph(text.clone(), Style::new())),
                Block::Entry(entry) => {
                    let mut head = entry.title.clone();
                    if !entry.period.trim().is_empty() {
                        head.push_str("  ·  ");
                        head.push_str(entry.period.trim());
                    }
                    pdf.push(styles.paragraph(head, styles.title));
                    if !entry.subtitle.is_empty() {
                        pdf.push(styles.paragraph(entry.subtitle.clone(), styles.muted));
                    }
                    if !entry.bullets.is_empty() {
                        let mut list = UnorderedList::new();
                        for bullet in &entry.bullets {
                            list.push(Paragraph::new(bullet.clone()).aligned(styles.align));
                        }
                        pdf.push(list);
                    }
                }
                Block::Tags { label, items } => {
                    pdf.push(styles.paragraph(label.clone(), styles.title));
                    pdf.push(styles.paragraph(items.join("  ·  "), Style::new()));
                }
                Block::Markdown(content) => {
                    for line in markdown::to_lines(content) {
                        if line.is_empty() {
                            pdf.push(Break::new(0.5));
                        } else {
                            pdf.push(styles.paragraph(line, Style::new()));
                        }
                    }
                }
            }
        }
    }

    pdf.render_to_file(path).map_err(|e| ExportError::Pdf(e.to_string()))
}
