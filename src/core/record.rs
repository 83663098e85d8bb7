//! # CV Record
//!
//! The one piece of data the whole application revolves around.
//!
//! ```text
//! CvData
//! ├── personal_info: PersonalInfo        // name, contact, languages
//! ├── about_me / job_target / ...        // free text
//! ├── experience: Vec<Experience>        // ordered, each with a stable id
//! ├── education: Vec<Education>
//! ├── certifications: Vec<Certification>
//! ├── custom_sections: Vec<CustomSection>
//! ├── projects: Vec<Project>
//! ├── technical_skills / soft_skills
//! ├── interview_prep / linkedin_analysis / cv_refresh / presentation
//! └── settings: CvSettings               // rendering only
//! ```
//!
//! Serialises to the camelCase JSON shape the model sees as context.
//! The record is never written to disk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::patch::CvPatch;
use crate::core::settings::CvSettings;

/// Labels offered by the soft-skill picker. Any other label can still be toggled.
pub const SOFT_SKILL_CATALOG: [&str; 6] = [
    "القيادة",
    "العمل الجماعي",
    "حل المشكلات",
    "التواصل الفعال",
    "إدارة الوقت",
    "التفكير النقدي",
];

/// Title given to a freshly added custom section.
pub const NEW_SECTION_TITLE: &str = "قسم جديد";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// No entry with this id in the named list.
    UnknownEntry { list: ListKind, id: String },
    /// The entry type has no such field.
    UnknownField { list: ListKind, field: String },
    /// A reorder position is past the end of the list.
    OutOfRange { list: ListKind, index: usize, len: usize },
    /// A settings key or value that could not be applied.
    InvalidSetting(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::UnknownEntry { list, id } => write!(f, "no {list} entry with id {id}"),
            RecordError::UnknownField { list, field } => {
                write!(f, "{list} entries have no field '{field}'")
            }
            RecordError::OutOfRange { list, index, len } => {
                write!(f, "position {index} is out of range for {list} ({len} entries)")
            }
            RecordError::InvalidSetting(msg) => write!(f, "invalid setting: {msg}"),
        }
    }
}

impl std::error::Error for RecordError {}

// ============================================================================
// Record
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub gender: String,
    pub age: String,
    pub phone: String,
    pub email: String,
    pub location: String,
    pub native_language: String,
    pub english_level: String,
}

impl Default for PersonalInfo {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            gender: String::new(),
            age: String::new(),
            phone: String::new(),
            email: String::new(),
            location: String::new(),
            native_language: String::from("العربية"),
            english_level: String::new(),
        }
    }
}

impl PersonalInfo {
    pub const FIELDS: &'static [&'static str] = &[
        "fullName",
        "gender",
        "age",
        "phone",
        "email",
        "location",
        "nativeLanguage",
        "englishLevel",
    ];

    /// Sets one field by its camelCase name. Returns false for unknown names.
    pub fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "fullName" => &mut self.full_name,
            "gender" => &mut self.gender,
            "age" => &mut self.age,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "location" => &mut self.location,
            "nativeLanguage" => &mut self.native_language,
            "englishLevel" => &mut self.english_level,
            _ => return false,
        };
        *slot = value;
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSkills {
    pub software: String,
    pub accounting_systems: String,
    pub lab_equipment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub title: String,
    pub period: String,
    pub achievements: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub degree: String,
    pub major: String,
    pub institution: String,
    pub graduation_year: String,
    pub grade: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub id: String,
    pub name: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSection {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Behavioral,
    Technical,
    #[default]
    Fit,
}

impl QuestionKind {
    /// Lenient mapping for labels coming back from the model.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "behavioral" | "behavioural" => QuestionKind::Behavioral,
            "technical" => QuestionKind::Technical,
            _ => QuestionKind::Fit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestionKind::Behavioral => "behavioral",
            QuestionKind::Technical => "technical",
            QuestionKind::Fit => "fit",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    pub answer: String,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewPrep {
    pub target_company: String,
    pub questions: Vec<InterviewQuestion>,
    pub tips: Vec<String>,
    pub is_unlocked: bool,
}

impl InterviewPrep {
    /// Questions as the gate allows them to be seen: premium answers are
    /// blanked until the gate is unlocked.
    pub fn visible_questions(&self) -> Vec<InterviewQuestion> {
        self.questions
            .iter()
            .map(|q| {
                if q.is_premium && !self.is_unlocked {
                    InterviewQuestion {
                        answer: String::new(),
                        ..q.clone()
                    }
                } else {
                    q.clone()
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub section: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInAnalysis {
    pub score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub keywords: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    pub is_unlocked: bool,
}

/// Keywords shown before the LinkedIn gate is unlocked.
pub const LOCKED_KEYWORD_PREVIEW: usize = 3;
/// Suggestions shown before the LinkedIn gate is unlocked.
pub const LOCKED_SUGGESTION_PREVIEW: usize = 2;

impl LinkedInAnalysis {
    /// An analysis exists once the model has scored the profile.
    pub fn has_result(&self) -> bool {
        self.score > 0.0
    }

    pub fn visible_keywords(&self) -> &[String] {
        if self.is_unlocked {
            &self.keywords
        } else {
            &self.keywords[..self.keywords.len().min(LOCKED_KEYWORD_PREVIEW)]
        }
    }

    pub fn visible_suggestions(&self) -> &[Suggestion] {
        if self.is_unlocked {
            &self.suggestions
        } else {
            &self.suggestions[..self.suggestions.len().min(LOCKED_SUGGESTION_PREVIEW)]
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub before: String,
    pub after: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRefreshAnalysis {
    pub old_score: f64,
    pub new_score: f64,
    pub missing_keywords: Vec<String>,
    pub improvements: Vec<Improvement>,
    pub is_processed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub title: String,
    pub content: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub slides: Vec<Slide>,
    pub is_generated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvData {
    pub personal_info: PersonalInfo,
    pub about_me: String,
    pub job_target: String,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub custom_sections: Vec<CustomSection>,
    pub technical_skills: TechnicalSkills,
    pub soft_skills: Vec<String>,
    pub additional_activities: String,
    pub job_description: String,
    pub cover_letter: String,
    pub interview_prep: InterviewPrep,
    #[serde(rename = "linkedInAnalysis")]
    pub linkedin_analysis: LinkedInAnalysis,
    pub cv_refresh: CvRefreshAnalysis,
    pub presentation: Presentation,
    pub settings: CvSettings,
}

// ============================================================================
// Lists
// ============================================================================

/// The reorderable lists of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Experience,
    Education,
    Certifications,
    CustomSections,
    Projects,
}

impl ListKind {
    pub const ALL: [ListKind; 5] = [
        ListKind::Experience,
        ListKind::Education,
        ListKind::Certifications,
        ListKind::CustomSections,
        ListKind::Projects,
    ];

    /// The record key for this list, also used as the id prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Experience => "experience",
            ListKind::Education => "education",
            ListKind::Certifications => "certifications",
            ListKind::CustomSections => "customSections",
            ListKind::Projects => "projects",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "experience" | "exp" | "job" => Ok(ListKind::Experience),
            "education" | "edu" => Ok(ListKind::Education),
            "certifications" | "certification" | "cert" => Ok(ListKind::Certifications),
            "customsections" | "section" | "sections" | "custom" => Ok(ListKind::CustomSections),
            "projects" | "project" => Ok(ListKind::Projects),
            other => Err(format!("unknown list '{other}'")),
        }
    }
}

/// Generates a list entry identifier: `<list>-<uuid>`.
pub fn new_entry_id(list: ListKind) -> String {
    format!("{}-{}", list.as_str(), uuid::Uuid::new_v4())
}

/// Behaviour shared by every entry type stored in a reorderable list.
pub trait ListEntry: Clone {
    const LIST: ListKind;

    /// An empty entry carrying the given id.
    fn with_id(id: String) -> Self;

    fn id(&self) -> &str;

    /// Sets one field by its camelCase name. Returns false for unknown names.
    fn set_field(&mut self, field: &str, value: String) -> bool;

    /// The field a template checks before showing this entry.
    fn guiding_field(&self) -> &str;
}

impl ListEntry for Experience {
    const LIST: ListKind = ListKind::Experience;

    fn with_id(id: String) -> Self {
        Self { id, ..Default::default() }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "company" => &mut self.company,
            "title" => &mut self.title,
            "period" => &mut self.period,
            "achievements" => &mut self.achievements,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn guiding_field(&self) -> &str {
        &self.title
    }
}

impl ListEntry for Education {
    const LIST: ListKind = ListKind::Education;

    fn with_id(id: String) -> Self {
        Self { id, ..Default::default() }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "degree" => &mut self.degree,
            "major" => &mut self.major,
            "institution" => &mut self.institution,
            "graduationYear" => &mut self.graduation_year,
            "grade" => &mut self.grade,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn guiding_field(&self) -> &str {
        &self.degree
    }
}

impl ListEntry for Certification {
    const LIST: ListKind = ListKind::Certifications;

    fn with_id(id: String) -> Self {
        Self { id, ..Default::default() }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "date" => &mut self.date,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn guiding_field(&self) -> &str {
        &self.name
    }
}

impl ListEntry for CustomSection {
    const LIST: ListKind = ListKind::CustomSections;

    fn with_id(id: String) -> Self {
        Self {
            id,
            title: NEW_SECTION_TITLE.to_string(),
            content: String::new(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "title" => &mut self.title,
            "content" => &mut self.content,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn guiding_field(&self) -> &str {
        &self.title
    }
}

impl ListEntry for Project {
    const LIST: ListKind = ListKind::Projects;

    fn with_id(id: String) -> Self {
        Self { id, ..Default::default() }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "description" => &mut self.description,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn guiding_field(&self) -> &str {
        &self.name
    }
}

fn push_new<T: ListEntry>(entries: &mut Vec<T>) -> String {
    let id = new_entry_id(T::LIST);
    entries.push(T::with_id(id.clone()));
    id
}

fn set_in<T: ListEntry>(
    entries: &mut [T],
    id: &str,
    field: &str,
    value: String,
) -> Result<(), RecordError> {
    let entry = entries
        .iter_mut()
        .find(|e| e.id() == id)
        .ok_or_else(|| RecordError::UnknownEntry { list: T::LIST, id: id.to_string() })?;
    if entry.set_field(field, value) {
        Ok(())
    } else {
        Err(RecordError::UnknownField { list: T::LIST, field: field.to_string() })
    }
}

fn remove_in<T: ListEntry>(entries: &mut Vec<T>, id: &str) -> Result<(), RecordError> {
    let before = entries.len();
    entries.retain(|e| e.id() != id);
    if entries.len() == before {
        return Err(RecordError::UnknownEntry { list: T::LIST, id: id.to_string() });
    }
    Ok(())
}

/// Moves the element at `from` to `to`, shifting the ones in between.
fn move_in<T: ListEntry>(entries: &mut Vec<T>, from: usize, to: usize) -> Result<(), RecordError> {
    let len = entries.len();
    for index in [from, to] {
        if index >= len {
            return Err(RecordError::OutOfRange { list: T::LIST, index, len });
        }
    }
    if from != to {
        let item = entries.remove(from);
        entries.insert(to, item);
    }
    Ok(())
}

/// Runs `$body` with `$entries` bound to the list named by `$list`.
macro_rules! on_list {
    ($data:expr, $list:expr, $entries:ident => $body:expr) => {
        match $list {
            ListKind::Experience => {
                let $entries = &mut $data.experience;
                $body
            }
            ListKind::Education => {
                let $entries = &mut $data.education;
                $body
            }
            ListKind::Certifications => {
                let $entries = &mut $data.certifications;
                $body
            }
            ListKind::CustomSections => {
                let $entries = &mut $data.custom_sections;
                $body
            }
            ListKind::Projects => {
                let $entries = &mut $data.projects;
                $body
            }
        }
    };
}

impl CvData {
    /// Shallow merge: every key present in the patch replaces the current
    /// value wholesale, every absent key is left alone.
    pub fn merge(&mut self, patch: CvPatch) {
        let CvPatch {
            personal_info,
            about_me,
            job_target,
            education,
            experience,
            projects,
            certifications,
            custom_sections,
            technical_skills,
            soft_skills,
            additional_activities,
            job_description,
            cover_letter,
            interview_prep,
            linkedin_analysis,
            cv_refresh,
            presentation,
            settings,
        } = patch;

        if let Some(v) = personal_info {
            self.personal_info = v;
        }
        if let Some(v) = about_me {
            self.about_me = v;
        }
        if let Some(v) = job_target {
            self.job_target = v;
        }
        if let Some(v) = education {
            self.education = v;
        }
        if let Some(v) = experience {
            self.experience = v;
        }
        if let Some(v) = projects {
            self.projects = v;
        }
        if let Some(v) = certifications {
            self.certifications = v;
        }
        if let Some(v) = custom_sections {
            self.custom_sections = v;
        }
        if let Some(v) = technical_skills {
            self.technical_skills = v;
        }
        if let Some(v) = soft_skills {
            self.soft_skills = v;
        }
        if let Some(v) = additional_activities {
            self.additional_activities = v;
        }
        if let Some(v) = job_description {
            self.job_description = v;
        }
        if let Some(v) = cover_letter {
            self.cover_letter = v;
        }
        if let Some(v) = interview_prep {
            self.interview_prep = v;
        }
        if let Some(v) = linkedin_analysis {
            self.linkedin_analysis = v;
        }
        if let Some(v) = cv_refresh {
            self.cv_refresh = v;
        }
        if let Some(v) = presentation {
            self.presentation = v;
        }
        if let Some(settings) = settings {
            self.settings = settings.clamped();
        }
    }

    /// Appends an empty entry and returns its new id.
    pub fn add_entry(&mut self, list: ListKind) -> String {
        on_list!(self, list, entries => push_new(entries))
    }

    pub fn set_entry_field(
        &mut self,
        list: ListKind,
        id: &str,
        field: &str,
        value: String,
    ) -> Result<(), RecordError> {
        on_list!(self, list, entries => set_in(entries, id, field, value))
    }

    pub fn remove_entry(&mut self, list: ListKind, id: &str) -> Result<(), RecordError> {
        on_list!(self, list, entries => remove_in(entries, id))
    }

    /// Drag-reorder: relocates one element, every other element keeps its identity.
    pub fn move_entry(&mut self, list: ListKind, from: usize, to: usize) -> Result<(), RecordError> {
        on_list!(self, list, entries => move_in(entries, from, to))
    }

    /// Adds the label if absent, removes it if present.
    pub fn toggle_soft_skill(&mut self, label: &str) {
        if let Some(pos) = self.soft_skills.iter().position(|s| s == label) {
            self.soft_skills.remove(pos);
        } else {
            self.soft_skills.push(label.to_string());
        }
    }

    /// The comma-separated technical skills as trimmed, non-empty items.
    pub fn technical_skill_list(&self) -> Vec<&str> {
        self.technical_skills
            .software
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Name used for exported files; falls back when empty.
    pub fn display_name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let name = self.personal_info.full_name.trim();
        if name.is_empty() { fallback } else { name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_experience(n: usize) -> CvData {
        let mut data = CvData::default();
        for i in 0..n {
            let id = data.add_entry(ListKind::Experience);
            data.set_entry_field(ListKind::Experience, &id, "title", format!("Role {i}"))
                .unwrap();
        }
        data
    }

    #[test]
    fn test_default_record_is_empty() {
        let data = CvData::default();
        assert!(data.experience.is_empty());
        assert_eq!(data.personal_info.native_language, "العربية");
        assert_eq!(data.settings.accent_color, "#4f46e5");
        assert!(!data.interview_prep.is_unlocked);
    }

    #[test]
    fn test_add_entry_assigns_prefixed_unique_ids() {
        let mut data = CvData::default();
        let a = data.add_entry(ListKind::Education);
        let b = data.add_entry(ListKind::Education);
        assert!(a.starts_with("education-"));
        assert_ne!(a, b);
        assert_eq!(data.education.len(), 2);
    }

    #[test]
    fn test_new_custom_section_has_default_title() {
        let mut data = CvData::default();
        data.add_entry(ListKind::CustomSections);
        assert_eq!(data.custom_sections[0].title, NEW_SECTION_TITLE);
    }

    #[test]
    fn test_set_entry_field_rejects_unknown_field_and_id() {
        let mut data = record_with_experience(1);
        let id = data.experience[0].id.clone();
        let err = data
            .set_entry_field(ListKind::Experience, &id, "salary", "lots".into())
            .unwrap_err();
        assert!(matches!(err, RecordError::UnknownField { .. }));

        let err = data
            .set_entry_field(ListKind::Experience, "nope", "title", "x".into())
            .unwrap_err();
        assert!(matches!(err, RecordError::UnknownEntry { .. }));
        assert_eq!(data.experience[0].title, "Role 0");
    }

    #[test]
    fn test_move_entry_preserves_ids_and_values() {
        let mut data = record_with_experience(4);
        let before = data.experience.clone();

        data.move_entry(ListKind::Experience, 0, 2).unwrap();

        let order: Vec<&str> = data.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(order, vec!["Role 1", "Role 2", "Role 0", "Role 3"]);

        let mut sorted_before = before.clone();
        let mut sorted_after = data.experience.clone();
        sorted_before.sort_by(|a, b| a.id.cmp(&b.id));
        sorted_after.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(sorted_before, sorted_after);
    }

    #[test]
    fn test_move_entry_backwards() {
        let mut data = record_with_experience(3);
        data.move_entry(ListKind::Experience, 2, 0).unwrap();
        let order: Vec<&str> = data.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(order, vec!["Role 2", "Role 0", "Role 1"]);
    }

    #[test]
    fn test_move_entry_out_of_range_is_rejected() {
        let mut data = record_with_experience(2);
        let before = data.clone();
        let err = data.move_entry(ListKind::Experience, 0, 5).unwrap_err();
        assert_eq!(
            err,
            RecordError::OutOfRange { list: ListKind::Experience, index: 5, len: 2 }
        );
        assert_eq!(data, before);
    }

    #[test]
    fn test_remove_entry() {
        let mut data = record_with_experience(2);
        let id = data.experience[0].id.clone();
        data.remove_entry(ListKind::Experience, &id).unwrap();
        assert_eq!(data.experience.len(), 1);
        assert!(data.remove_entry(ListKind::Experience, &id).is_err());
    }

    #[test]
    fn test_toggle_soft_skill_twice_restores_membership() {
        let mut data = CvData::default();
        data.toggle_soft_skill(SOFT_SKILL_CATALOG[0]);
        data.toggle_soft_skill(SOFT_SKILL_CATALOG[3]);
        let original = data.soft_skills.clone();

        data.toggle_soft_skill(SOFT_SKILL_CATALOG[1]);
        data.toggle_soft_skill(SOFT_SKILL_CATALOG[1]);
        assert_eq!(data.soft_skills, original);

        data.toggle_soft_skill(SOFT_SKILL_CATALOG[0]);
        data.toggle_soft_skill(SOFT_SKILL_CATALOG[0]);
        let mut a = data.soft_skills.clone();
        let mut b = original.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_technical_skill_list_trims_and_drops_empty() {
        let mut data = CvData::default();
        data.technical_skills.software = " Excel, SAP ,, SQL ,".into();
        assert_eq!(data.technical_skill_list(), vec!["Excel", "SAP", "SQL"]);
    }

    #[test]
    fn test_linkedin_gate_limits_preview() {
        let analysis = LinkedInAnalysis {
            score: 70.0,
            keywords: (0..6).map(|i| format!("k{i}")).collect(),
            suggestions: (0..4)
                .map(|i| Suggestion { section: format!("s{i}"), action: "a".into() })
                .collect(),
            ..Default::default()
        };
        assert_eq!(analysis.visible_keywords().len(), 3);
        assert_eq!(analysis.visible_suggestions().len(), 2);

        let unlocked = LinkedInAnalysis { is_unlocked: true, ..analysis };
        assert_eq!(unlocked.visible_keywords().len(), 6);
        assert_eq!(unlocked.visible_suggestions().len(), 4);
    }

    #[test]
    fn test_interview_gate_hides_premium_answers() {
        let prep = InterviewPrep {
            questions: vec![
                InterviewQuestion {
                    kind: QuestionKind::Behavioral,
                    question: "q1".into(),
                    answer: "a1".into(),
                    is_premium: false,
                },
                InterviewQuestion {
                    kind: QuestionKind::Technical,
                    question: "q2".into(),
                    answer: "a2".into(),
                    is_premium: true,
                },
            ],
            ..Default::default()
        };
        let visible = prep.visible_questions();
        assert_eq!(visible[0].answer, "a1");
        assert_eq!(visible[1].answer, "");
        assert_eq!(visible[1].question, "q2");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(CvData::default()).unwrap();
        assert!(json.get("personalInfo").is_some());
        assert!(json.get("linkedInAnalysis").is_some());
        assert!(json["interviewPrep"].get("isUnlocked").is_some());
    }

    #[test]
    fn test_list_kind_parses_aliases() {
        assert_eq!("exp".parse::<ListKind>(), Ok(ListKind::Experience));
        assert_eq!("Section".parse::<ListKind>(), Ok(ListKind::CustomSections));
        assert!("hobbies".parse::<ListKind>().is_err());
    }
}
