//! Modern left-to-right layout.

use super::{Direction, Labels};
use crate::core::record::Education;

pub fn labels() -> Labels {
    Labels {
        direction: Direction::Ltr,
        name_placeholder: "YOUR NAME",
        title_placeholder: "Professional Title",
        summary: "Profile Summary",
        experience: "Work Experience",
        education: "Education",
        certifications: "Certifications",
        projects: "Projects",
        skills: "Skills & Expertise",
        technical_skills: "Technical Skills",
        soft_skills: "Soft Skills",
        activities: "Additional Activities",
        education_title,
        skill_tags: true,
    }
}

pub(super) fn education_title(entry: &Education) -> String {
    let degree = entry.degree.trim();
    match entry.major.trim() {
        "" => degree.to_string(),
        major => format!("{degree} in {major}"),
    }
}
