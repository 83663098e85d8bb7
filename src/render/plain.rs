//! ATS-friendly plain layout: uppercase headings, no decoration, skills as
//! comma-separated text. Also the text writer every template can go through.

use super::{Block, Direction, Document, Labels, english, markdown};

pub fn labels() -> Labels {
    Labels {
        direction: Direction::Ltr,
        name_placeholder: "YOUR NAME",
        title_placeholder: "Professional Title",
        summary: "SUMMARY",
        experience: "EXPERIENCE",
        education: "EDUCATION",
        certifications: "CERTIFICATIONS",
        projects: "PROJECTS",
        skills: "SKILLS",
        technical_skills: "Technical Skills",
        soft_skills: "Soft Skills",
        activities: "ADDITIONAL ACTIVITIES",
        education_title: english::education_title,
        skill_tags: false,
    }
}

fn wrap_options(width: usize, indent: &str) -> textwrap::Options<'_> {
    textwrap::Options::new(width.max(20))
        .initial_indent(indent)
        .subsequent_indent(indent)
        .break_words(false)
}

fn push_wrapped(out: &mut String, text: &str, width: usize, indent: &str) {
    for line in textwrap::wrap(text, wrap_options(width, indent)) {
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

/// Writes a document as wrapped plain text.
pub fn to_text(doc: &Document, width: usize) -> String {
    let mut out = String::new();
    out.push_str(&doc.name);
    out.push('\n');
    out.push_str(&doc.headline);
    out.push('\n');
    if !doc.contact.is_empty() {
        push_wrapped(&mut out, &doc.contact.join(" | "), width, "");
    }

    for section in &doc.sections {
        out.push('\n');
        out.push_str(&section.heading);
        out.push('\n');
        for block in &section.blocks {
            match block {
                Block::Paragraph(text) => push_wrapped(&mut out, text, width, ""),
                Block::Entry(entry) => {
                    let mut head = entry.title.clone();
                    if !entry.subtitle.is_empty() {
                        head.push_str(" | ");
                        head.push_str(&entry.subtitle);
                    }
                    if !entry.period.trim().is_empty() {
                        head.push_str(" | ");
                        head.push_str(&entry.period);
                    }
                    push_wrapped(&mut out, &head, width, "");
                    for bullet in &entry.bullets {
                        let mut lines = textwrap::wrap(bullet, wrap_options(width, "  ")).into_iter();
                        if let Some(first) = lines.next() {
                            out.push_str("- ");
                            out.push_str(first.trim());
                            out.push('\n');
                        }
                        for line in lines {
                            out.push_str(line.trim_end());
                            out.push('\n');
                        }
                    }
                }
                Block::Tags { label, items } => {
                    push_wrapped(&mut out, &format!("{label}: {}", items.join(", ")), width, "")
                }
                Block::Markdown(content) => {
                    for line in markdown::to_lines(content) {
                        if line.is_empty() {
                            out.push('\n');
                        } else {
                            push_wrapped(&mut out, &line, width, "");
                        }
                    }
                }
            }
        }
    }
    out
}
