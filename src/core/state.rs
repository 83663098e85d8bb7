//! # Application State
//!
//! Core business state for cvai. Domain logic only; the shell keeps nothing
//! of its own beyond the input line.
//!
//! ```text
//! App
//! ├── provider: Arc<dyn CompletionProvider>  // hosted model
//! ├── options: AssistOptions                 // model name, output limit
//! ├── export_options: ExportOptions          // output dir, fonts
//! ├── record: CvData                         // the CV being edited
//! ├── in_flight: HashSet<Panel>              // panels waiting on the model
//! ├── transcript: Vec<ChatMessage>           // chat panel history
//! ├── attachments: Vec<Attachment>           // queued for the next request
//! ├── template: TemplateKind                 // preview/export layout
//! ├── is_exporting: bool
//! ├── last_export: Vec<PathBuf>
//! ├── status_message: String
//! └── error: Option<String>
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::assist::{AssistOptions, Panel};
use crate::core::config::ResolvedConfig;
use crate::core::record::CvData;
use crate::export::ExportOptions;
use crate::inference::{Attachment, CompletionProvider, Source};
use crate::render::{Document, TemplateKind, render};

/// One line of the chat panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub source: Source,
    pub text: String,
}

pub struct App {
    pub provider: Arc<dyn CompletionProvider>,
    pub options: AssistOptions,
    pub export_options: ExportOptions,
    pub record: CvData,
    pub in_flight: HashSet<Panel>,
    pub transcript: Vec<ChatMessage>,
    pub attachments: Vec<Attachment>,
    pub template: TemplateKind,
    pub is_exporting: bool,
    /// Files written by the most recent export.
    pub last_export: Vec<PathBuf>,
    pub status_message: String,
    pub error: Option<String>,
}

impl App {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        options: AssistOptions,
        export_options: ExportOptions,
        template: TemplateKind,
    ) -> Self {
        Self {
            provider,
            options,
            export_options,
            record: CvData::default(),
            in_flight: HashSet::new(),
            transcript: Vec::new(),
            attachments: Vec::new(),
            template,
            is_exporting: false,
            last_export: Vec::new(),
            status_message: String::from("Welcome to cvai!"),
            error: None,
        }
    }

    pub fn from_config(provider: Arc<dyn CompletionProvider>, config: &ResolvedConfig) -> Self {
        Self::new(
            provider,
            AssistOptions {
                model: config.model_name.clone(),
                max_output_tokens: config.max_output_tokens,
            },
            ExportOptions {
                output_dir: config.output_dir.clone(),
                font_dir: config.font_dir.clone(),
                font_family: config.font_family.clone(),
            },
            config.template,
        )
    }

    pub fn is_busy(&self, panel: Panel) -> bool {
        self.in_flight.contains(&panel)
    }

    /// The record laid out with the selected template.
    pub fn document(&self) -> Document {
        render(&self.record, self.template)
    }
}
