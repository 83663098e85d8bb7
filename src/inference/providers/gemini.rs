//! Gemini provider using the `generateContent` REST endpoint.
//!
//! Gemini terminology differs from ours:
//! - "contents" with roles `user` / `model` (no system role)
//! - "systemInstruction" carries the directive
//! - "inlineData" carries base64 attachments
//! - "functionDeclarations" / "functionCall" for tools

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::provider::http_client;
use crate::inference::{
    Completion, CompletionProvider, CompletionRequest, Context, FunctionCall, Part, ProviderError,
    Source, ToolDefinition,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<ApiPart>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ApiTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters_json_schema: serde_json::Value,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_json_schema: Option<serde_json::Value>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    function_call: Option<ApiFunctionCall>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize, Debug)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn part_to_api(part: &Part) -> ApiPart {
    match part {
        Part::Text(text) => ApiPart {
            text: Some(text.clone()),
            inline_data: None,
        },
        Part::Attachment(att) => ApiPart {
            text: None,
            inline_data: Some(InlineData {
                mime_type: att.mime_type.clone(),
                data: att.data.clone(),
            }),
        },
    }
}

/// Splits our context into Gemini's system instruction and contents.
fn context_to_contents(context: &Context) -> (Option<Content>, Vec<Content>) {
    let system = context.directive().map(|text| Content {
        role: None,
        parts: vec![ApiPart {
            text: Some(text),
            inline_data: None,
        }],
    });
    let contents = context
        .turns()
        .map(|seg| Content {
            role: Some(match seg.source {
                Source::Model => "model",
                _ => "user",
            }),
            parts: seg.parts.iter().map(part_to_api).collect(),
        })
        .collect();
    (system, contents)
}

fn tools_to_api(tools: &[ToolDefinition]) -> Vec<ApiTool> {
    if tools.is_empty() {
        return Vec::new();
    }
    vec![ApiTool {
        function_declarations: tools
            .iter()
            .map(|t| FunctionDeclaration {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters_json_schema: t.parameters.clone(),
            })
            .collect(),
    }]
}

/// Collapses the first candidate into a `Completion`.
fn response_to_completion(response: GenerateContentResponse) -> Result<Completion, ProviderError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(ProviderError::Parse(format!("Gemini returned no answer: {reason}")));
    };

    let mut text = String::new();
    let mut function_calls = Vec::new();
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if part.thought {
            continue;
        }
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(call) = part.function_call {
            function_calls.push(FunctionCall {
                name: call.name,
                arguments: call.args,
            });
        }
    }

    Ok(Completion {
        text: if text.is_empty() { None } else { Some(text) },
        function_calls,
        truncated: candidate.finish_reason.as_deref() == Some("MAX_TOKENS"),
    })
}

// ============================================================================
// Provider Implementation
// ============================================================================

pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    ///
    /// # Arguments
    /// * `api_key` - Google AI Studio API key
    /// * `base_url` - Optional custom base URL (defaults to the public v1beta API)
    /// * `timeout` - Upper bound for a whole request
    pub fn new(api_key: String, base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: http_client(timeout),
        }
    }

    async fn send_request(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Config(
                "Gemini API key is not set (GEMINI_API_KEY or [gemini].api_key)".to_string(),
            ));
        }

        let json_body = serde_json::to_string(request)
            .map_err(|e| ProviderError::Network(format!("Request serialization failed: {e}")))?;
        debug!("Raw Gemini Request: {} bytes", json_body.len());

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("Gemini response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Gemini API error: {} - {}", status, err_body);
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
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        let (system_instruction, contents) = context_to_contents(request.context);

        let body = GenerateContentRequest {
            contents,
            system_instruction,
            tools: tools_to_api(request.tools),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
                response_mime_type: request.response_schema.map(|_| "application/json"),
                response_json_schema: request.response_schema.map(|s| s.schema.clone()),
            },
        };

        info!(
            "Gemini generateContent request: model={}, contents={}, schema={:?}, tools={}",
            request.model,
            body.contents.len(),
            request.response_schema.map(|s| s.name.as_str()),
            request.tools.len(),
        );

        let response = self.send_request(request.model, &body).await?;
        let completion = response_to_completion(response)?;

        info!(
            "Gemini completion: text_len={}, function_calls={}, truncated={}",
            completion.text.as_ref().map_or(0, String::len),
            completion.function_calls.len(),
            completion.truncated,
        );
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{Attachment, ContextSegment};

    #[test]
    fn test_context_to_contents_moves_directive_to_system_instruction() {
        let mut context = Context::new("Be concise.");
        context.add_user_message("Hello");
        context.add(ContextSegment::text(Source::Model, "Hi"));

        let (system, contents) = context_to_contents(&context);

        let system = system.unwrap();
        assert_eq!(system.role, None);
        assert_eq!(system.parts[0].text.as_deref(), Some("Be concise."));
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, Some("user"));
        assert_eq!(contents[1].role, Some("model"));
    }

    #[test]
    fn test_attachment_becomes_inline_data() {
        let mut context = Context::new("sys");
        let attachment = Attachment::from_bytes("cv.pdf", "application/pdf", b"%PDF");
        context.add_user_parts("Analyze", &[attachment]);

        let (_, contents) = context_to_contents(&context);
        let json = serde_json::to_value(&contents[0]).unwrap();

        assert_eq!(json["parts"][0]["text"], "Analyze");
        assert_eq!(json["parts"][1]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(json["parts"][1]["inlineData"]["data"], "JVBERg==");
        assert!(json["parts"][1].get("text").is_none());
    }

    #[test]
    fn test_request_serializes_schema_and_tools() {
        let body = GenerateContentRequest {
            contents: vec![],
            system_instruction: None,
            tools: tools_to_api(&[ToolDefinition {
                name: "update_cv".into(),
                description: "Update the CV".into(),
                parameters: serde_json::json!({"type": "object"}),
            }]),
            generation_config: GenerationConfig {
                max_output_tokens: 1024,
                response_mime_type: Some("application/json"),
                response_json_schema: Some(serde_json::json!({"type": "object"})),
            },
        };
        let json = serde_json::to_value(&body).unwrap();

        assert!(json.get("systemInstruction").is_none());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            json["tools"][0]["functionDeclarations"][0]["parametersJsonSchema"]["type"],
            "object"
        );
    }

    #[test]
    fn test_no_tools_omits_tools_key() {
        let body = GenerateContentRequest {
            contents: vec![],
            system_instruction: None,
            tools: tools_to_api(&[]),
            generation_config: GenerationConfig {
                max_output_tokens: 10,
                response_mime_type: None,
                response_json_schema: None,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_to_completion_joins_text_and_skips_thoughts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"thinking...","thought":true},
                {"text":"Hello "},
                {"text":"world"},
                {"functionCall":{"name":"update_cv","args":{"jobTarget":"Analyst"}}}
            ]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();

        let completion = response_to_completion(response).unwrap();
        assert_eq!(completion.text.as_deref(), Some("Hello world"));
        assert_eq!(completion.function_calls.len(), 1);
        assert_eq!(completion.function_calls[0].arguments["jobTarget"], "Analyst");
        assert!(!completion.truncated);
    }

    #[test]
    fn test_response_to_completion_flags_max_tokens() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"}]},"finishReason":"MAX_TOKENS"}]}"#,
        )
        .unwrap();
        assert!(response_to_completion(response).unwrap().truncated);
    }

    #[test]
    fn test_response_without_candidates_reports_block_reason() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = response_to_completion(response).unwrap_err();
        assert!(matches!(err, ProviderError::Parse(msg) if msg.contains("SAFETY")));
    }
}
