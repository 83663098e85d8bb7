//! # Templates
//!
//! Pure functions from the record to a printable [`Document`]. A document is
//! a small tree (header, sections, blocks) that the HTML, plain-text and PDF
//! writers all consume, so every output skips exactly the same things.
//!
//! ```text
//! CvData ──render(kind)──▶ Document ──▶ html::to_html
//!                                   ├──▶ plain::to_text
//!                                   └──▶ export::pdf
//! ```
//!
//! Entries whose guiding field is blank (experience title, education degree,
//! custom section title, certification/project name) are left out, and a
//! section with nothing left in it is dropped entirely.

pub mod arabic;
pub mod english;
pub mod html;
pub mod markdown;
pub mod plain;

use clap::ValueEnum;

use crate::core::record::{CvData, Education};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TemplateKind {
    /// Right-to-left professional layout
    #[default]
    Arabic,
    /// Modern left-to-right layout
    English,
    /// Unstyled text for ATS portals
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// One dated item: a job, a degree, a certificate, a project.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub title: String,
    pub subtitle: String,
    pub period: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(String),
    Entry(Entry),
    /// A labelled group of short items (skills).
    Tags { label: String, items: Vec<String> },
    /// User-authored Markdown (custom sections).
    Markdown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub direction: Direction,
    pub name: String,
    pub headline: String,
    pub contact: Vec<String>,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

/// Fixed text a template puts around the record.
pub struct Labels {
    pub direction: Direction,
    pub name_placeholder: &'static str,
    pub title_placeholder: &'static str,
    pub summary: &'static str,
    pub experience: &'static str,
    pub education: &'static str,
    pub certifications: &'static str,
    pub projects: &'static str,
    pub skills: &'static str,
    pub technical_skills: &'static str,
    pub soft_skills: &'static str,
    pub activities: &'static str,
    pub education_title: fn(&Education) -> String,
    /// Skills as tag groups, or as comma-separated paragraphs.
    pub skill_tags: bool,
}

pub fn render(record: &CvData, kind: TemplateKind) -> Document {
    let labels = match kind {
        TemplateKind::Arabic => arabic::labels(),
        TemplateKind::English => english::labels(),
        TemplateKind::Plain => plain::labels(),
    };
    build(record, &labels)
}

/// Splits achievement text into display lines: one per non-blank line, with
/// a leading `•` or `-` marker removed.
pub fn achievement_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.strip_prefix('•')
                .or_else(|| line.strip_prefix('-'))
                .unwrap_or(line)
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if filled(value) { value.trim().to_string() } else { placeholder.to_string() }
}

fn push_section(sections: &mut Vec<Section>, heading: &str, blocks: Vec<Block>) {
    if !blocks.is_empty() {
        sections.push(Section {
            heading: heading.to_string(),
            blocks,
        });
    }
}

fn build(record: &CvData, labels: &Labels) -> Document {
    let info = &record.personal_info;
    let contact = [&info.location, &info.email, &info.phone]
        .into_iter()
        .filter(|v| filled(v))
        .map(|v| v.trim().to_string())
        .collect();

    let mut sections = Vec::new();

    if filled(&record.about_me) {
        push_section(&mut sections, labels.summary, vec![Block::Paragraph(record.about_me.trim().to_string())]);
    }

    let experience = record
        .experience
        .iter()
        .filter(|e| filled(&e.title))
        .map(|e| {
            Block::Entry(Entry {
                title: e.title.trim().to_string(),
                subtitle: e.company.trim().to_string(),
                period: e.period.clone(),
                bullets: achievement_lines(&e.achievements),
            })
        })
        .collect();
    push_section(&mut sections, labels.experience, experience);

    let education = record
        .education
        .iter()
        .filter(|e| filled(&e.degree))
        .map(|e| {
            Block::Entry(Entry {
                title: (labels.education_title)(e),
                subtitle: e.institution.trim().to_string(),
                period: e.graduation_year.clone(),
                bullets: if filled(&e.grade) { vec![e.grade.trim().to_string()] } else { Vec::new() },
            })
        })
        .collect();
    push_section(&mut sections, labels.education, education);

    let certifications = record
        .certifications
        .iter()
        .filter(|c| filled(&c.name))
        .map(|c| {
            Block::Entry(Entry {
                title: c.name.trim().to_string(),
                subtitle: String::new(),
                period: c.date.clone(),
                bullets: Vec::new(),
            })
        })
        .collect();
    push_section(&mut sections, labels.certifications, certifications);

    let projects = record
        .projects
        .iter()
        .filter(|p| filled(&p.name))
        .map(|p| {
            Block::Entry(Entry {
                title: p.name.trim().to_string(),
                subtitle: String::new(),
                period: String::new(),
                bullets: achievement_lines(&p.description),
            })
        })
        .collect();
    push_section(&mut sections, labels.projects, projects);

    for custom in record.custom_sections.iter().filter(|s| filled(&s.title)) {
        let blocks = if filled(&custom.content) {
            vec![Block::Markdown(custom.content.clone())]
        } else {
            Vec::new()
        };
        // A titled section is shown even while its content is still empty
        sections.push(Section {
            heading: custom.title.trim().to_string(),
            blocks,
        });
    }

    let technical: Vec<String> = record.technical_skill_list().into_iter().map(String::from).collect();
    let soft: Vec<String> = record
        .soft_skills
        .iter()
        .filter(|s| filled(s))
        .map(|s| s.trim().to_string())
        .collect();
    let mut skills = Vec::new();
    for (label, items) in [(labels.technical_skills, technical), (labels.soft_skills, soft)] {
        if items.is_empty() {
            continue;
        }
        skills.push(if labels.skill_tags {
            Block::Tags {
                label: label.to_string(),
                items,
            }
        } else {
            Block::Paragraph(format!("{label}: {}", items.join(", ")))
        });
    }
    push_section(&mut sections, labels.skills, skills);

    if filled(&record.additional_activities) {
        push_section(
            &mut sections,
            labels.activities,
            vec![Block::Paragraph(record.additional_activities.trim().to_string())],
        );
    }

    Document {
        direction: labels.direction,
        name: or_placeholder(&info.full_name, labels.name_placeholder),
        headline: or_placeholder(&record.job_target, labels.title_placeholder),
        contact,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::ListKind;

    fn entry_titles(doc: &Document, heading: &str) -> Vec<String> {
        doc.section(heading)
            .map(|s| {
                s.blocks
                    .iter()
                    .filter_map(|b| match b {
                        Block::Entry(e) => Some(e.title.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_achievement_lines_strip_markers_and_blanks() {
        let lines = achievement_lines("• Closed books monthly\n\n  - Cut costs 10%\r\nLed audit\n-\n");
        assert_eq!(lines, vec!["Closed books monthly", "Cut costs 10%", "Led audit"]);
    }

    #[test]
    fn test_empty_experience_has_no_section() {
        let record = CvData::default();
        for kind in [TemplateKind::Arabic, TemplateKind::English, TemplateKind::Plain] {
            let doc = render(&record, kind);
            assert!(doc.sections.is_empty(), "{kind:?} rendered {:?}", doc.sections);
        }
    }

    #[test]
    fn test_titled_experience_appears_with_period_verbatim() {
        let mut record = CvData::default();
        let id = record.add_entry(ListKind::Experience);
        record.set_entry_field(ListKind::Experience, &id, "title", "Auditor".into()).unwrap();
        record.set_entry_field(ListKind::Experience, &id, "period", " 2019 – now ".into()).unwrap();

        let doc = render(&record, TemplateKind::English);
        let section = doc.section("Work Experience").unwrap();
        let Block::Entry(entry) = &section.blocks[0] else {
            panic!("expected entry");
        };
        assert_eq!(entry.title, "Auditor");
        assert_eq!(entry.period, " 2019 – now ");
    }

    #[test]
    fn test_blank_guiding_fields_are_skipped() {
        let mut record = CvData::default();
        let kept = record.add_entry(ListKind::Experience);
        record.set_entry_field(ListKind::Experience, &kept, "title", "Chemist".into()).unwrap();
        let blank = record.add_entry(ListKind::Experience);
        record.set_entry_field(ListKind::Experience, &blank, "company", "Pfizer".into()).unwrap();

        let edu = record.add_entry(ListKind::Education);
        record.set_entry_field(ListKind::Education, &edu, "major", "Chemistry".into()).unwrap();

        let section = record.add_entry(ListKind::CustomSections);
        record.set_entry_field(ListKind::CustomSections, &section, "title", "  ".into()).unwrap();
        record.set_entry_field(ListKind::CustomSections, &section, "content", "Volunteering".into()).unwrap();

        for kind in [TemplateKind::Arabic, TemplateKind::English] {
            let doc = render(&record, kind);
            let labels = match kind {
                TemplateKind::Arabic => arabic::labels(),
                _ => english::labels(),
            };
            assert_eq!(entry_titles(&doc, labels.experience), vec!["Chemist".to_string()]);
            assert!(doc.section(labels.education).is_none());
            assert_eq!(doc.sections.len(), 1);
        }
    }

    #[test]
    fn test_header_placeholders_and_contact() {
        let mut record = CvData::default();
        let doc = render(&record, TemplateKind::Arabic);
        assert_eq!(doc.name, "الاسم الكامل");
        assert_eq!(doc.direction, Direction::Rtl);
        assert!(doc.contact.is_empty());

        record.personal_info.full_name = "Sara Ali".into();
        record.personal_info.email = "sara@example.com".into();
        let doc = render(&record, TemplateKind::English);
        assert_eq!(doc.name, "Sara Ali");
        assert_eq!(doc.headline, "Professional Title");
        assert_eq!(doc.contact, vec!["sara@example.com".to_string()]);
    }

    #[test]
    fn test_skills_render_as_tags_or_text() {
        let mut record = CvData::default();
        record.technical_skills.software = "Excel, , SAP ".into();
        record.toggle_soft_skill("Teamwork");

        let doc = render(&record, TemplateKind::English);
        let skills = doc.section("Skills & Expertise").unwrap();
        assert_eq!(
            skills.blocks[0],
            Block::Tags {
                label: "Technical Skills".into(),
                items: vec!["Excel".into(), "SAP".into()]
            }
        );

        let doc = render(&record, TemplateKind::Plain);
        let skills = doc.section("SKILLS").unwrap();
        assert_eq!(skills.blocks[0], Block::Paragraph("Technical Skills: Excel, SAP".into()));
    }
}
