//! Right-to-left professional layout.

use super::{Direction, Labels};
use crate::core::record::Education;

pub fn labels() -> Labels {
    Labels {
        direction: Direction::Rtl,
        name_placeholder: "الاسم الكامل",
        title_placeholder: "المسمى الوظيفي المستهدف",
        summary: "الملخص المهني",
        experience: "الخبرة العملية",
        education: "التعليم والمؤهلات",
        certifications: "الشهادات والدورات",
        projects: "المشاريع",
        skills: "المهارات والقدرات",
        technical_skills: "المهارات التقنية",
        soft_skills: "المهارات الشخصية",
        activities: "الأنشطة الإضافية",
        education_title,
        skill_tags: true,
    }
}

/// `degree - major`, or just the degree.
fn education_title(entry: &Education) -> String {
    let degree = entry.degree.trim();
    match entry.major.trim() {
        "" => degree.to_string(),
        major => format!("{degree} - {major}"),
    }
}
