//! Standalone HTML preview with the record's settings applied as inline CSS.

use pulldown_cmark::{Event, Parser};

use super::{Block, Direction, Document, markdown};
use crate::core::settings::CvSettings;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders user Markdown; embedded HTML is shown as text, never interpreted.
fn markdown_html(content: &str) -> String {
    let events = Parser::new_ext(content, markdown::options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    pulldown_cmark::html::push_html(&mut out, events);
    out
}

fn stylesheet(doc: &Document, settings: &CvSettings) -> String {
    let (r, g, b) = settings.accent_rgb();
    let (family, size) = match doc.direction {
        Direction::Rtl => (settings.arabic_font.css_family(), settings.base_font_size),
        Direction::Ltr => (settings.english_font.css_family(), settings.font_size.points()),
    };
    format!(
        "body{{font-family:{family};font-size:{size}pt;line-height:{lh};color:#1f2937;max-width:210mm;margin:0 auto;padding:10mm}}\
         header{{border-bottom:2px solid rgb({r},{g},{b});padding-bottom:8px}}\
         h1{{margin:0;font-size:{h1}pt}}\
         .headline{{color:rgb({r},{g},{b});font-weight:600}}\
         .contact{{color:#4b5563}}\
         section{{margin-top:{spacing}em}}\
         h2{{font-size:{h2}pt;color:rgb({r},{g},{b});border-bottom:1px solid #e5e7eb}}\
         .entry-head{{display:flex;justify-content:space-between;font-weight:600}}\
         .subtitle{{color:#4b5563}}\
         .tags span{{display:inline-block;border:1px solid rgb({r},{g},{b});border-radius:4px;padding:0 6px;margin:2px}}",
        lh = settings.line_height,
        h1 = settings.heading_size * 1.6,
        spacing = settings.section_spacing / 2.0,
        h2 = settings.heading_size,
    )
}

pub fn to_html(doc: &Document, settings: &CvSettings) -> String {
    let dir = doc.direction.as_str();
    let mut out = String::new();
    out.push_str(&format!(
        "<!DOCTYPE html>\n<html dir=\"{dir}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n",
        escape(&doc.name),
        stylesheet(doc, settings)
    ));

    out.push_str("<header>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape(&doc.name)));
    out.push_str(&format!("<div class=\"headline\">{}</div>\n", escape(&doc.headline)));
    if !doc.contact.is_empty() {
        let contact: Vec<String> = doc.contact.iter().map(|c| escape(c)).collect();
        out.push_str(&format!("<div class=\"contact\">{}</div>\n", contact.join(" &middot; ")));
    }
    out.push_str("</header>\n");

    for section in &doc.sections {
        out.push_str(&format!("<section>\n<h2>{}</h2>\n", escape(&section.heading)));
        for block in &section.blocks {
            match block {
                Block::Paragraph(text) => out.push_str(&format!("<p>{}</p>\n", escape(text))),
                Block::Entry(entry) => {
                    out.push_str("<div class=\"entry\">\n<div class=\"entry-head\">");
                    out.push_str(&format!("<span>{}</span>", escape(&entry.title)));
                    if !entry.period.trim().is_empty() {
                        out.push_str(&format!("<span>{}</span>", escape(&entry.period)));
                    }
                    out.push_str("</div>\n");
                    if !entry.subtitle.is_empty() {
                        out.push_str(&format!("<div class=\"subtitle\">{}</div>\n", escape(&entry.subtitle)));
                    }
                    if !entry.bullets.is_empty() {
                        out.push_str("<ul>\n");
                        for bullet in &entry.bullets {
                            out.push_str(&format!("<li>{}</li>\n", escape(bullet)));
                        }
                        out.push_str("</ul>\n");
                    }
                    out.push_str("</div>\n");
                }
                Block::Tags { label, items } => {
                    out.push_str(&format!("<h3>{}</h3>\n<div class=\"tags\">", escape(label)));
                    for item in items {
                        out.push_str(&format!("<span>{}</span>", escape(item)));
                    }
                    out.push_str("</div>\n");
                }
                Block::Markdown(content) => out.push_str(&markdown_html(content)),
            }
        }
        out.push_str("</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{CvData, ListKind};
    use crate::render::{TemplateKind, render};

    #[test]
    fn test_html_escapes_record_text() {
        let mut record = CvData::default();
        record.personal_info.full_name = "<script>alert(1)</script>".into();
        let html = to_html(&render(&record, TemplateKind::English), &record.settings);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_custom_section_markdown_is_rendered_without_raw_html() {
        let mut record = CvData::default();
        let id = record.add_entry(ListKind::CustomSections);
        record
            .set_entry_field(ListKind::CustomSections, &id, "content", "- **Red Crescent** volunteer\n- <img src=x>".into())
            .unwrap();
        let html = to_html(&render(&record, TemplateKind::Arabic), &record.settings);
        assert!(html.contains("<html dir=\"rtl\">"));
        assert!(html.contains("<strong>Red Crescent</strong>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_accent_color_reaches_stylesheet() {
        let mut record = CvData::default();
        record.settings.set("accentColor", "#0f766e").unwrap();
        let html = to_html(&render(&record, TemplateKind::English), &record.settings);
        assert!(html.contains("rgb(15,118,110)"));
    }
}
