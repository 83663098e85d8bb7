//! OpenRouter provider implementation using the Responses API.
//!
//! This module uses OpenAI Responses API terminology:
//! - "input" (array of messages, not "context")
//! - "role" (not "source")
//! - content parts: input_text, input_image, input_file
//! - "text.format" for structured output

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::provider::http_client;
use crate::inference::{
    Completion, CompletionProvider, CompletionRequest, ContextSegment, FunctionCall, Part,
    ProviderError, ResponseSchema, Source, ToolDefinition,
};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

// ============================================================================
// OpenRouter Responses API Types
// ============================================================================

/// Role in an input message (OpenAI terminology)
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
enum InputContent {
    #[serde(rename = "input_text")]
    InputText { text: String },
    #[serde(rename = "output_text")]
    OutputText { text: String },
    #[serde(rename = "input_image")]
    InputImage { image_url: String },
    #[serde(rename = "input_file")]
    InputFile { filename: String, file_data: String },
}

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type")]
enum InputItem {
    #[serde(rename = "message")]
    Message { role: Role, content: Vec<InputContent> },
}

/// Tool definition for the API request
#[derive(Serialize, Debug)]
struct ApiToolDefinition {
    #[serde(rename = "type")]
    tool_type: &'static str, // always "function"
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize, Debug)]
struct TextFormat {
    #[serde(rename = "type")]
    format_type: &'static str, // always "json_schema"
    name: String,
    schema: serde_json::Value,
    strict: bool,
}

#[derive(Serialize, Debug)]
struct TextConfig {
    format: TextFormat,
}

/// The request body for the Responses API
#[derive(Serialize, Debug)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<TextConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiToolDefinition>>,
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct ResponsesResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize, Debug)]
struct OutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<OutputContent>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize, Debug)]
struct OutputContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn part_to_content(source: Source, part: &Part) -> InputContent {
    match part {
        Part::Text(text) if source == Source::Model => InputContent::OutputText { text: text.clone() },
        Part::Text(text) => InputContent::InputText { text: text.clone() },
        Part::Attachment(att) if att.is_image() => InputContent::InputImage {
            image_url: att.data_url(),
        },
        Part::Attachment(att) => InputContent::InputFile {
            filename: att.file_name.clone(),
            file_data: att.data_url(),
        },
    }
}

/// Converts context segments into Responses API input format.
fn context_to_input(items: &[ContextSegment]) -> Vec<InputItem> {
    items
        .iter()
        .map(|seg| InputItem::Message {
            role: match seg.source {
                Source::Directive => Role::System,
                Source::User => Role::User,
                Source::Model => Role::Assistant,
            },
            content: seg.parts.iter().map(|p| part_to_content(seg.source, p)).collect(),
        })
        .collect()
}

/// Converts tool definitions to API format. Returns None if empty (omitted from JSON).
fn tools_to_api(tools: &[ToolDefinition]) -> Option<Vec<ApiToolDefinition>> {
    if tools.is_empty() {
        return None;
    }
    Some(
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                tool_type: "function",
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect(),
    )
}

fn schema_to_text_config(schema: Option<&ResponseSchema>) -> Option<TextConfig> {
    schema.map(|s| TextConfig {
        format: TextFormat {
            format_type: "json_schema",
            name: s.name.clone(),
            schema: s.schema.clone(),
            strict: false,
        },
    })
}

fn response_to_completion(response: ResponsesResponse) -> Result<Completion, ProviderError> {
    let mut text = String::new();
    let mut function_calls = Vec::new();

    for item in response.output {
        match item.item_type.as_str() {
            "message" => {
                for content in item.content.into_iter().filter(|c| c.content_type == "output_text") {
                    text.push_str(&content.text);
                }
            }
            "function_call" => {
                let arguments = if item.arguments.trim().is_empty() {
                    serde_json::Value::Object(Default::default())
                } else {
                    serde_json::from_str(&item.arguments).map_err(|e| {
                        ProviderError::Parse(format!("bad arguments for {}: {e}", item.name))
                    })?
                };
                function_calls.push(FunctionCall {
                    name: item.name,
                    arguments,
                });
            }
            other => debug!("Ignoring output item of type {other}"),
        }
    }

    Ok(Completion {
        text: if text.is_empty() { None } else { Some(text) },
        function_calls,
        truncated: response.status == "incomplete",
    })
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// OpenRouter API provider using Responses API
pub struct OpenRouterProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Creates a new OpenRouter provider.
    ///
    /// # Arguments
    /// * `api_key` - OpenRouter API key
    /// * `base_url` - Optional custom base URL (defaults to OpenRouter's API)
    /// * `timeout` - Upper bound for a whole request
    pub fn new(api_key: String, base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: http_client(timeout),
        }
    }

    /// Sends a request to the Responses endpoint and decodes the envelope.
    async fn send_request(&self, request: &ResponsesRequest) -> Result<ResponsesResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Config(
                "OpenRouter API key is not set (OPENROUTER_API_KEY or [openrouter].api_key)".to_string(),
            ));
        }

        let json_body = serde_json::to_string(request)
            .map_err(|e| ProviderError::Network(format!("Request serialization failed: {e}")))?;
        debug!("Raw OpenRouter Request: {} bytes", json_body.len());

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("OpenRouter response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("OpenRouter API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Parse(format!("{e}: {body}")))
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "OpenRouter"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        let responses_request = ResponsesRequest {
            model: request.model.to_string(),
            input: context_to_input(&request.context.items),
            text: schema_to_text_config(request.response_schema),
            tools: tools_to_api(request.tools),
            max_output_tokens: request.max_output_tokens,
        };

        info!(
            "OpenRouter Responses API request: model={}, input_count={}, schema={:?}",
            request.model,
            responses_request.input.len(),
            request.response_schema.map(|s| s.name.as_str()),
        );

        let response = self.send_request(&responses_request).await?;
        let completion = response_to_completion(response)?;

        info!(
            "OpenRouter completion: text_len={}, function_calls={}, truncated={}",
            completion.text.as_ref().map_or(0, String::len),
            completion.function_calls.len(),
            completion.truncated,
        );
        Ok(completion)
    }
}
