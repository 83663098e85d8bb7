//! cvai library exports for testing

use clap::ValueEnum;

pub mod core;
pub mod export;
pub mod inference;
pub mod render;
pub mod shell;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenRouter,
}
