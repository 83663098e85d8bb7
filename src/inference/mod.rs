pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{CompletionProvider, CompletionRequest, ProviderError};
pub use providers::{GeminiProvider, OpenRouterProvider};
pub use types::{
    Attachment, Completion, Context, ContextSegment, FunctionCall, Part, ResponseSchema, Source,
    ToolDefinition,
};
