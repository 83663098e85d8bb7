//! # Actions
//!
//! Everything that can happen in cvai becomes an `Action`.
//! User types `/add experience`? That's `Action::AddEntry(ListKind::Experience)`.
//! The model answers? That's `Action::AssistFinished { panel, result }`.
//!
//! The `update()` function takes the current state and an action,
//! mutates the state, and returns the `Effect` the adapter should run.
//! No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use log::{info, warn};

use crate::core::assist::{AssistError, AssistJob, AssistReply, AssistTask, Panel};
use crate::core::record::{ListKind, PersonalInfo, RecordError};
use crate::core::state::{App, ChatMessage};
use crate::export::{ExportError, ExportJob, PDF_FALLBACK_NAME, SLIDES_FALLBACK_NAME};
use crate::inference::{Attachment, Source};
use crate::render::TemplateKind;

/// Chat reply shown when the model only called the update tool.
pub const CHAT_UPDATED: &str = "CV updated from our conversation.";

/// Free-text fields of the record that are edited as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    AboutMe,
    JobTarget,
    AdditionalActivities,
    JobDescription,
    CoverLetter,
}

impl TextField {
    pub const ALL: [TextField; 5] = [
        TextField::AboutMe,
        TextField::JobTarget,
        TextField::AdditionalActivities,
        TextField::JobDescription,
        TextField::CoverLetter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextField::AboutMe => "aboutMe",
            TextField::JobTarget => "jobTarget",
            TextField::AdditionalActivities => "additionalActivities",
            TextField::JobDescription => "jobDescription",
            TextField::CoverLetter => "coverLetter",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aboutme" | "about" | "summary" => Ok(TextField::AboutMe),
            "jobtarget" | "target" | "title" => Ok(TextField::JobTarget),
            "additionalactivities" | "activities" => Ok(TextField::AdditionalActivities),
            "jobdescription" | "jd" => Ok(TextField::JobDescription),
            "coverletter" | "cover" => Ok(TextField::CoverLetter),
            other => Err(format!("unknown field '{other}'")),
        }
    }
}

/// Which sub-field of the technical skills block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechField {
    Software,
    AccountingSystems,
    LabEquipment,
}

impl FromStr for TechField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "software" => Ok(TechField::Software),
            "accountingsystems" | "accounting" => Ok(TechField::AccountingSystems),
            "labequipment" | "lab" => Ok(TechField::LabEquipment),
            other => Err(format!("unknown technical skill field '{other}'")),
        }
    }
}

/// Which result gate to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Interview,
    LinkedIn,
}

#[derive(Debug)]
pub enum Action {
    SetPersonalField { field: String, value: String },
    SetText { field: TextField, value: String },
    AddEntry(ListKind),
    SetEntryField { list: ListKind, id: String, field: String, value: String },
    RemoveEntry { list: ListKind, id: String },
    MoveEntry { list: ListKind, from: usize, to: usize },
    ToggleSoftSkill(String),
    SetTechnicalSkill { field: TechField, value: String },
    SetSetting { key: String, value: String },
    SetTargetCompany(String),
    SelectTemplate(TemplateKind),
    Attach(Attachment),
    ClearAttachments,
    /// Send one panel's request to the model.
    Submit(AssistTask),
    AssistFinished { panel: Panel, result: Result<AssistReply, AssistError> },
    Unlock(Gate),
    ExportPdf,
    ExportSlides,
    ExportFinished(Result<Vec<PathBuf>, ExportError>),
    Quit,
}

/// Work the adapter must start after an update.
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    Quit,
    SpawnAssist(AssistJob),
    Export(ExportJob),
}

fn record_edit(app: &mut App, result: Result<(), RecordError>, done: &str) -> Effect {
    match result {
        Ok(()) => {
            app.error = None;
            app.status_message = done.to_string();
        }
        Err(e) => {
            warn!("Edit rejected: {e}");
            app.error = Some(e.to_string());
        }
    }
    Effect::None
}

/// Refuses requests that have nothing to work on.
fn validate(app: &App, task: &AssistTask) -> Result<(), String> {
    let has_files = !app.attachments.is_empty();
    match task {
        AssistTask::Refresh { old_cv } if old_cv.trim().is_empty() && !has_files => {
            Err("Paste the old CV text or attach the file first".into())
        }
        AssistTask::LinkedIn { profile } if profile.trim().is_empty() && !has_files => {
            Err("Paste the LinkedIn profile text or attach the profile PDF first".into())
        }
        AssistTask::Chat { message } if message.trim().is_empty() => Err("Nothing to send".into()),
        _ => Ok(()),
    }
}

fn submit(app: &mut App, task: AssistTask) -> Effect {
    let panel = task.panel();
    if app.is_busy(panel) {
        app.error = Some(format!("The {panel} request is still running"));
        return Effect::None;
    }
    if let Err(msg) = validate(app, &task) {
        app.error = Some(msg);
        return Effect::None;
    }

    if let AssistTask::Chat { message } = &task {
        app.transcript.push(ChatMessage {
            source: Source::User,
            text: message.trim().to_string(),
        });
    }

    app.in_flight.insert(panel);
    app.error = None;
    app.status_message = format!("Working on {panel}...");
    info!("Submitting {panel} ({} attachments)", app.attachments.len());

    Effect::SpawnAssist(AssistJob {
        task,
        attachments: std::mem::take(&mut app.attachments),
        snapshot: app.record.clone(),
    })
}

fn finish_assist(app: &mut App, panel: Panel, result: Result<AssistReply, AssistError>) -> Effect {
    app.in_flight.remove(&panel);
    match result {
        Ok(reply) => {
            let patch = reply.to_patch(&app.record);
            info!("{panel} finished, updating {:?}", patch.keys());
            app.record.merge(patch);
            if let AssistReply::Chat { text, update } = &reply {
                let shown = match (text, update) {
                    (Some(text), _) => Some(text.clone()),
                    (None, Some(_)) => Some(CHAT_UPDATED.to_string()),
                    (None, None) => None,
                };
                if let Some(text) = shown {
                    app.transcript.push(ChatMessage {
                        source: Source::Model,
                        text,
                    });
                }
            }
            app.error = None;
            app.status_message = format!("{panel} updated");
        }
        Err(e) => {
            warn!("{panel} failed: {e}");
            app.error = Some(format!("{panel} failed: {e}"));
            app.status_message = String::from("Ready");
        }
    }
    Effect::None
}

fn start_export(app: &mut App, job: ExportJob) -> Effect {
    if app.is_exporting {
        app.error = Some("An export is already running".into());
        return Effect::None;
    }
    app.is_exporting = true;
    app.error = None;
    app.status_message = String::from("Exporting...");
    Effect::Export(job)
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::SetPersonalField { field, value } => {
            if app.record.personal_info.set_field(&field, value) {
                app.error = None;
                Effect::None
            } else {
                app.error = Some(format!(
                    "unknown personal field '{field}' (expected one of {})",
                    PersonalInfo::FIELDS.join(", ")
                ));
                Effect::None
            }
        }
        Action::SetText { field, value } => {
            let slot = match field {
                TextField::AboutMe => &mut app.record.about_me,
                TextField::JobTarget => &mut app.record.job_target,
                TextField::AdditionalActivities => &mut app.record.additional_activities,
                TextField::JobDescription => &mut app.record.job_description,
                TextField::CoverLetter => &mut app.record.cover_letter,
            };
            *slot = value;
            app.error = None;
            Effect::None
        }
        Action::AddEntry(list) => {
            let id = app.record.add_entry(list);
            info!("Added {list} entry {id}");
            app.error = None;
            app.status_message = format!("Added a {list} entry");
            Effect::None
        }
        Action::SetEntryField { list, id, field, value } => {
            let result = app.record.set_entry_field(list, &id, &field, value);
            record_edit(app, result, "Saved")
        }
        Action::RemoveEntry { list, id } => {
            let result = app.record.remove_entry(list, &id);
            record_edit(app, result, "Removed")
        }
        Action::MoveEntry { list, from, to } => {
            let result = app.record.move_entry(list, from, to);
            record_edit(app, result, "Moved")
        }
        Action::ToggleSoftSkill(label) => {
            let label = label.trim();
            if !label.is_empty() {
                app.record.toggle_soft_skill(label);
            }
            Effect::None
        }
        Action::SetTechnicalSkill { field, value } => {
            let skills = &mut app.record.technical_skills;
            match field {
                TechField::Software => skills.software = value,
                TechField::AccountingSystems => skills.accounting_systems = value,
                TechField::LabEquipment => skills.lab_equipment = value,
            }
            Effect::None
        }
        Action::SetSetting { key, value } => {
            let result = app.record.settings.set(&key, &value);
            record_edit(app, result, "Style updated")
        }
        Action::SetTargetCompany(company) => {
            app.record.interview_prep.target_company = company.trim().to_string();
            Effect::None
        }
        Action::SelectTemplate(kind) => {
            app.template = kind;
            app.status_message = format!("Template: {kind:?}");
            Effect::None
        }
        Action::Attach(attachment) => {
            app.status_message = format!("Attached {}", attachment.file_name);
            app.attachments.push(attachment);
            Effect::None
        }
        Action::ClearAttachments => {
            app.attachments.clear();
            Effect::None
        }
        Action::Submit(task) => submit(app, task),
        Action::AssistFinished { panel, result } => finish_assist(app, panel, result),
        Action::Unlock(gate) => {
            match gate {
                Gate::Interview => app.record.interview_prep.is_unlocked = true,
                Gate::LinkedIn => app.record.linkedin_analysis.is_unlocked = true,
            }
            app.status_message = String::from("Unlocked");
            Effect::None
        }
        Action::ExportPdf => {
            let job = ExportJob::Pdf {
                document: app.document(),
                settings: app.record.settings.clone(),
                owner: app.record.display_name_or(PDF_FALLBACK_NAME).to_string(),
            };
            start_export(app, job)
        }
        Action::ExportSlides => {
            let deck = &app.record.presentation;
            if !deck.is_generated || deck.slides.is_empty() {
                app.error = Some("Generate the presentation first".into());
                return Effect::None;
            }
            let job = ExportJob::Slides {
                slides: deck.slides.clone(),
                owner: app.record.display_name_or(SLIDES_FALLBACK_NAME).to_string(),
                accent: app.record.settings.accent_rgb(),
            };
            start_export(app, job)
        }
        Action::ExportFinished(result) => {
            app.is_exporting = false;
            match result {
                Ok(paths) => {
                    info!("Export wrote {} file(s)", paths.len());
                    app.status_message = format!("Exported {} file(s)", paths.len());
                    app.last_export = paths;
                    app.error = None;
                }
                Err(e) => {
                    warn!("Export failed: {e}");
                    app.error = Some(format!("Export failed: {e}"));
                }
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}
