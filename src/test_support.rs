//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::assist::AssistOptions;
use crate::core::state::App;
use crate::export::ExportOptions;
use crate::inference::{Completion, CompletionProvider, CompletionRequest, Context, ProviderError};
use crate::render::TemplateKind;

/// What a provider was asked, in a form tests can compare.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub context: Context,
    pub model: String,
    pub schema_name: Option<String>,
    pub tool_names: Vec<String>,
    pub max_output_tokens: u32,
}

/// A provider that answers every request with the same scripted result and
/// remembers what it was asked.
pub struct ScriptedProvider {
    answer: Result<Completion, ProviderError>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new(completion: Completion) -> Self {
        Self {
            answer: Ok(completion),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers with plain text.
    pub fn text(text: &str) -> Self {
        Self::new(Completion {
            text: Some(text.to_string()),
            ..Default::default()
        })
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            answer: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().ok()?.last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        let recorded = RecordedRequest {
            context: request.context.clone(),
            model: request.model.to_string(),
            schema_name: request.response_schema.map(|s| s.name.clone()),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            max_output_tokens: request.max_output_tokens,
        };
        self.requests.lock().expect("request log poisoned").push(recorded);
        self.answer.clone()
    }
}

/// Creates a test App whose provider answers with an empty completion.
pub fn test_app() -> App {
    App::new(
        Arc::new(ScriptedProvider::new(Completion::default())),
        AssistOptions {
            model: "test-model".to_string(),
            max_output_tokens: 4000,
        },
        ExportOptions {
            output_dir: PathBuf::from("out"),
            font_dir: PathBuf::from("fonts"),
            font_family: "NotoSans".to_string(),
        },
        TemplateKind::default(),
    )
}
