//! Search configuration.
//!
//! - [`search_config`] - per-wiki toggles, loaded from JSON
//! - [`profiles`] - named profiles and their per-context selection

pub mod profiles;
pub mod search_config;

pub use profiles::{ContextualOverride, ProfileService, ProfileType, CONTEXT_DEFAULT, CONTEXT_PREFIXSEARCH};
pub use search_config::{SearchConfig, DEFAULT_SYNTAX_WEIGHT};
