use std::fs;
use std::io;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Source {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model")]
    Model,
    #[serde(rename = "system")]
    Directive,
}

/// A binary file sent alongside the prompt (CV scan, LinkedIn PDF export, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    /// Base64 (standard alphabet, padded) encoded file contents.
    pub data: String,
}

/// Guesses a MIME type from a file extension. Unknown extensions are sent as
/// opaque binary and left to the provider to accept or reject.
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

impl Attachment {
    pub fn from_bytes(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Reads and encodes a file from disk.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self::from_bytes(file_name, mime_type_for(path), &bytes))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// `data:` URL form used by OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Attachment(Attachment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextSegment {
    pub source: Source,
    pub parts: Vec<Part>,
}

impl ContextSegment {
    pub fn text(source: Source, text: impl Into<String>) -> Self {
        Self {
            source,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// Everything the model gets to read for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub items: Vec<ContextSegment>,
}

impl Context {
    /// Creates a context that starts with the given system directive.
    pub fn new(directive: impl Into<String>) -> Self {
        Self {
            items: vec![ContextSegment::text(Source::Directive, directive)],
        }
    }

    pub fn add(&mut self, segment: ContextSegment) -> &ContextSegment {
        self.items.push(segment);
        self.items.last().expect("just pushed")
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) -> &ContextSegment {
        self.add(ContextSegment::text(Source::User, content))
    }

    /// Adds one user turn holding a text part followed by the attachments.
    pub fn add_user_parts(&mut self, text: impl Into<String>, attachments: &[Attachment]) -> &ContextSegment {
        let mut parts = vec![Part::Text(text.into())];
        parts.extend(attachments.iter().cloned().map(Part::Attachment));
        self.add(ContextSegment {
            source: Source::User,
            parts,
        })
    }

    /// Concatenated text of all directive segments, if any.
    pub fn directive(&self) -> Option<String> {
        let text: Vec<&str> = self
            .items
            .iter()
            .filter(|seg| seg.source == Source::Directive)
            .flat_map(|seg| seg.parts.iter())
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Attachment(_) => None,
            })
            .collect();
        if text.is_empty() { None } else { Some(text.join("\n\n")) }
    }

    /// Segments that are part of the conversation proper (no directives).
    pub fn turns(&self) -> impl Iterator<Item = &ContextSegment> {
        self.items.iter().filter(|seg| seg.source != Source::Directive)
    }
}

/// Generates a self-contained JSON Schema (no `$ref`s) for `T`.
///
/// Doc comments on the type's fields become `description`s the model can read.
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.option_add_null_type = false;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut value = serde_json::to_value(root).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        obj.remove("definitions");
    }
    value
}

/// A JSON output shape the model is asked to conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl ResponseSchema {
    pub fn for_type<T: JsonSchema>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: json_schema_for::<T>(),
        }
    }
}

/// A function the model can call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value, // JSON Schema
}

/// A function call requested by the model, arguments already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// A provider's answer to one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: Option<String>,
    pub function_calls: Vec<FunctionCall>,
    /// The model stopped because it ran out of output tokens.
    pub truncated: bool,
}
