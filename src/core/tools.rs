//! # Tools
//!
//! Functions the chat model may call instead of answering in prose.
//! Each tool is a struct implementing [`Tool`]; its argument type doubles as
//! the JSON Schema the model is shown, so the two can't drift apart.
//!
//! Calling a tool never touches the record. It validates the model's
//! arguments and returns a typed value the reducer can apply later.

pub mod update_cv;

use std::fmt;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::inference::types::{FunctionCall, ToolDefinition, json_schema_for};

pub use update_cv::{CvUpdate, ExperienceDraft, PersonalInfoDraft, SkillsDraft, UpdateCvTool};

#[derive(Debug, Clone, PartialEq)]
pub struct ToolError(pub String);

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tool error: {}", self.0)
    }
}

impl std::error::Error for ToolError {}

#[async_trait]
pub trait Tool: Send + Sync {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    type Args: DeserializeOwned + JsonSchema + Send;
    type Output: Serialize + Send;

    async fn call(&self, args: Self::Args) -> Result<Self::Output, ToolError>;

    /// The declaration sent to the model.
    fn definition() -> ToolDefinition
    where
        Self: Sized,
    {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: Self::DESCRIPTION.to_string(),
            parameters: json_schema_for::<Self::Args>(),
        }
    }
}

/// Decodes a function call's arguments and runs the tool on them.
pub async fn invoke<T: Tool>(tool: &T, call: &FunctionCall) -> Result<T::Output, ToolError> {
    if call.name != T::NAME {
        return Err(ToolError(format!("Unknown tool: {}", call.name)));
    }
    let args: T::Args = serde_json::from_value(call.arguments.clone())
        .map_err(|e| ToolError(format!("bad arguments for {}: {e}", T::NAME)))?;
    tool.call(args).await
}

/// Returns the list of tool definitions available to the chat model.
pub fn available() -> Vec<ToolDefinition> {
    vec![UpdateCvTool::definition()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_invoke_update_cv() {
        let call = FunctionCall {
            name: "update_cv_data".into(),
            arguments: json!({ "jobTarget": "  Data Analyst ", "softSkills": ["القيادة"] }),
        };
        let update = invoke(&UpdateCvTool, &call).await.unwrap();
        assert_eq!(update.job_target.as_deref(), Some("Data Analyst"));
        assert_eq!(update.soft_skills, Some(vec!["القيادة".to_string()]));
    }

    #[tokio::test]
    async fn test_invoke_bad_args() {
        let call = FunctionCall {
            name: "update_cv_data".into(),
            arguments: json!({ "experience": "not a list" }),
        };
        let err = invoke(&UpdateCvTool, &call).await.unwrap_err();
        assert!(err.0.contains("bad arguments"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let call = FunctionCall {
            name: "nonexistent".into(),
            arguments: json!({}),
        };
        let err = invoke(&UpdateCvTool, &call).await.unwrap_err();
        assert!(err.0.contains("Unknown tool"));
    }

    #[test]
    fn test_available_includes_update_cv() {
        let tools = available();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "update_cv_data");
        assert_eq!(tools[0].parameters["type"], "object");
        assert!(tools[0].parameters["properties"].get("experience").is_some());
    }
}
