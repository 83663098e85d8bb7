//! # Core Application Logic
//!
//! This module contains cvai's business logic.
//! It knows nothing about the shell or any other front end.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Record (CV data)     │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Assist (AI panels)   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │   Shell    │      │  Render    │      │  Export    │
//!     │  Adapter   │      │ templates  │      │ PDF / PNG  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`record`]: `CvData` and its list operations
//! - [`settings`]: rendering settings stored in the record
//! - [`patch`]: partial updates merged into the record
//! - [`state`]: the `App` struct, all application state in one place
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`assist`]: the AI panels (refresh, interview, LinkedIn, cover letter, ...)
//! - [`json_repair`]: decoding of truncated or fenced model JSON
//! - [`tools`]: functions the chat model may call
//! - [`config`]: config file, env and CLI resolution

pub mod action;
pub mod assist;
pub mod config;
pub mod json_repair;
pub mod patch;
pub mod record;
pub mod settings;
pub mod state;
pub mod tools;
