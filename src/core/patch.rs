//! # Record Patches
//!
//! A `CvPatch` names the top-level keys that should change. Assistant
//! replies are turned into one and applied with `CvData::merge`; section
//! editors change single fields through the record's own methods.
//! Keys left as `None` are never touched, so an answer arriving late can't
//! clobber keys it does not own.

use serde::{Deserialize, Serialize};

use crate::core::record::{
    Certification, CustomSection, CvRefreshAnalysis, Education, Experience, InterviewPrep,
    LinkedInAnalysis, PersonalInfo, Presentation, Project, TechnicalSkills,
};
use crate::core::settings::CvSettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<Experience>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<Certification>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_sections: Option<Vec<CustomSection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_skills: Option<TechnicalSkills>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_activities: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_prep: Option<InterviewPrep>,
    #[serde(rename = "linkedInAnalysis", skip_serializing_if = "Option::is_none")]
    pub linkedin_analysis: Option<LinkedInAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_refresh: Option<CvRefreshAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<Presentation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<CvSettings>,
}

impl CvPatch {
    pub fn is_empty(&self) -> bool {
        *self == CvPatch::default()
    }

    /// Names of the keys this patch sets, for logging.
    pub fn keys(&self) -> Vec<String> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{CvData, ListKind};

    fn populated() -> CvData {
        let mut data = CvData::default();
        data.personal_info.full_name = "Mona Adel".into();
        data.about_me = "Accountant".into();
        data.job_target = "Senior Accountant".into();
        let id = data.add_entry(ListKind::Experience);
        data.set_entry_field(ListKind::Experience, &id, "title", "Auditor".into())
            .unwrap();
        data.soft_skills = vec!["القيادة".into()];
        data
    }

    #[test]
    fn test_merge_keeps_keys_absent_from_patch() {
        let mut data = populated();
        let before = data.clone();

        data.merge(CvPatch {
            about_me: Some("Financial analyst".into()),
            ..Default::default()
        });

        assert_eq!(data.about_me, "Financial analyst");
        assert_eq!(data.personal_info, before.personal_info);
        assert_eq!(data.job_target, before.job_target);
        assert_eq!(data.experience, before.experience);
        assert_eq!(data.soft_skills, before.soft_skills);
        assert_eq!(data.settings, before.settings);
    }

    #[test]
    fn test_merge_replaces_present_keys_wholesale() {
        let mut data = populated();
        data.merge(CvPatch {
            experience: Some(Vec::new()),
            soft_skills: Some(vec!["إدارة الوقت".into()]),
            ..Default::default()
        });
        assert!(data.experience.is_empty());
        assert_eq!(data.soft_skills, vec!["إدارة الوقت".to_string()]);
    }

    #[test]
    fn test_merge_empty_patch_is_identity() {
        let mut data = populated();
        let before = data.clone();
        data.merge(CvPatch::default());
        assert_eq!(data, before);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut data = CvData::default();
        data.merge(CvPatch { job_target: Some("A".into()), ..Default::default() });
        data.merge(CvPatch { job_target: Some("B".into()), ..Default::default() });
        assert_eq!(data.job_target, "B");
    }

    #[test]
    fn test_merge_clamps_settings() {
        let mut data = CvData::default();
        data.merge(CvPatch {
            settings: Some(CvSettings { heading_size: 99.0, ..Default::default() }),
            ..Default::default()
        });
        assert_eq!(data.settings.heading_size, 26.0);
    }

    #[test]
    fn test_keys_lists_only_present_fields() {
        let patch = CvPatch {
            cover_letter: Some(String::new()),
            linkedin_analysis: Some(LinkedInAnalysis::default()),
            ..Default::default()
        };
        let mut keys = patch.keys();
        keys.sort();
        assert_eq!(keys, vec!["coverLetter", "linkedInAnalysis"]);
        assert!(CvPatch::default().is_empty());
    }
}
