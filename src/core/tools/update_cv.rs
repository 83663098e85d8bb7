//! # Update CV Tool
//!
//! Lets the model fill in the record from a conversation or a pasted CV.
//! The same draft types decode the refresh panel's structured answer.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Tool, ToolError};
use crate::core::patch::CvPatch;
use crate::core::record::{CvData, Experience, ListKind, PersonalInfo, TechnicalSkills, new_entry_id};

/// Contact fields the model may fill in. Omitted or blank fields keep the
/// value already in the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfoDraft {
    /// Full name as it should appear on the CV
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// City and country
    pub location: Option<String>,
}

impl PersonalInfoDraft {
    /// Fields of `later` that are set and non-blank win over `self`.
    pub fn then(self, later: PersonalInfoDraft) -> PersonalInfoDraft {
        let pick = |earlier: Option<String>, later: Option<String>| match later {
            Some(value) if !value.trim().is_empty() => Some(value),
            _ => earlier,
        };
        PersonalInfoDraft {
            full_name: pick(self.full_name, later.full_name),
            phone: pick(self.phone, later.phone),
            email: pick(self.email, later.email),
            location: pick(self.location, later.location),
        }
    }

    /// Returns `current` with every non-blank drafted field written over it.
    pub fn overlay(&self, current: &PersonalInfo) -> PersonalInfo {
        let pick = |draft: &Option<String>, existing: &String| match draft.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => existing.clone(),
        };
        PersonalInfo {
            full_name: pick(&self.full_name, &current.full_name),
            phone: pick(&self.phone, &current.phone),
            email: pick(&self.email, &current.email),
            location: pick(&self.location, &current.location),
            ..current.clone()
        }
    }
}

/// One job as the model describes it. Identifiers are assigned on our side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceDraft {
    pub company: String,
    /// Job title
    pub title: String,
    /// Free-form period, e.g. "2021 - present"
    pub period: String,
    /// One achievement per line
    pub achievements: String,
}

impl ExperienceDraft {
    fn is_blank(&self) -> bool {
        [&self.company, &self.title, &self.period, &self.achievements]
            .iter()
            .all(|s| s.trim().is_empty())
    }

    pub fn into_entry(self) -> Experience {
        Experience {
            id: new_entry_id(ListKind::Experience),
            company: self.company.trim().to_string(),
            title: self.title.trim().to_string(),
            period: self.period.trim().to_string(),
            achievements: self.achievements.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillsDraft {
    /// Comma-separated software and technical skills
    pub software: String,
}

/// Arguments of `update_cv_data`. Every key is optional; absent keys leave
/// the record alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CvUpdate {
    pub personal_info: Option<PersonalInfoDraft>,
    /// The role the candidate is applying for
    pub job_target: Option<String>,
    /// Professional summary
    pub about_me: Option<String>,
    /// Replaces the whole experience list
    pub experience: Option<Vec<ExperienceDraft>>,
    pub technical_skills: Option<SkillsDraft>,
    /// Replaces the selected soft skills
    pub soft_skills: Option<Vec<String>>,
}

impl CvUpdate {
    /// Trims text and drops blank list items.
    pub fn normalized(self) -> Self {
        Self {
            personal_info: self.personal_info,
            job_target: self.job_target.map(|s| s.trim().to_string()),
            about_me: self.about_me.map(|s| s.trim().to_string()),
            experience: self
                .experience
                .map(|list| list.into_iter().filter(|e| !e.is_blank()).collect()),
            technical_skills: self.technical_skills,
            soft_skills: self.soft_skills.map(|skills| {
                let mut out: Vec<String> = Vec::new();
                for skill in skills.into_iter().map(|s| s.trim().to_string()) {
                    if !skill.is_empty() && !out.contains(&skill) {
                        out.push(skill);
                    }
                }
                out
            }),
        }
    }

    /// Combines two updates as if `self` were applied first and `later` second.
    pub fn then(self, later: CvUpdate) -> CvUpdate {
        let personal_info = match (self.personal_info, later.personal_info) {
            (Some(earlier), Some(later)) => Some(earlier.then(later)),
            (earlier, later) => later.or(earlier),
        };
        CvUpdate {
            personal_info,
            job_target: later.job_target.or(self.job_target),
            about_me: later.about_me.or(self.about_me),
            experience: later.experience.or(self.experience),
            technical_skills: later.technical_skills.or(self.technical_skills),
            soft_skills: later.soft_skills.or(self.soft_skills),
        }
    }

    /// Builds the patch to merge into `current`. Experience entries get fresh
    /// identifiers; technical-skill fields other than `software` are kept.
    pub fn into_patch(self, current: &CvData) -> CvPatch {
        CvPatch {
            personal_info: self.personal_info.map(|d| d.overlay(&current.personal_info)),
            job_target: self.job_target,
            about_me: self.about_me,
            experience: self
                .experience
                .map(|list| list.into_iter().map(ExperienceDraft::into_entry).collect()),
            technical_skills: self.technical_skills.map(|d| TechnicalSkills {
                software: d.software.trim().to_string(),
                ..current.technical_skills.clone()
            }),
            soft_skills: self.soft_skills,
            ..Default::default()
        }
    }
}

pub struct UpdateCvTool;

#[async_trait]
impl Tool for UpdateCvTool {
    const NAME: &'static str = "update_cv_data";
    const DESCRIPTION: &'static str = "Updates the CV: personal info, job target, summary, experience, \
        technical skills and soft skills. Only send the keys that should change.";
    type Args = CvUpdate;
    type Output = CvUpdate;

    async fn call(&self, args: CvUpdate) -> Result<CvUpdate, ToolError> {
        let update = args.normalized();
        if update == CvUpdate::default() {
            return Err(ToolError("update_cv_data called without any fields".into()));
        }
        Ok(update)
    }
}
