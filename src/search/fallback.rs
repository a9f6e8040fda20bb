//! Fallback methods run when the initial search returns poor results.

use crate::config::{ProfileType, CONTEXT_DEFAULT};
use crate::error::{Error, Result};
use crate::search::query::SearchQuery;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Kind of fallback, from the `class` of a method definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    /// "Did you mean" suggestion from the phrase suggester
    PhraseSuggest,
    /// Search another language wiki when the query language differs
    LangDetect,
}

impl FallbackKind {
    fn from_class(class: &str) -> Option<Self> {
        match class {
            "phrase_suggest" => Some(FallbackKind::PhraseSuggest),
            "lang_detect" => Some(FallbackKind::LangDetect),
            _ => None,
        }
    }
}

/// A configured fallback method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackMethod {
    pub name: String,
    pub kind: FallbackKind,
    pub params: Value,
}

impl FallbackMethod {
    /// Build the method for a query, `None` when it cannot apply to it
    fn build(name: &str, kind: FallbackKind, params: Value, query: &SearchQuery) -> Result<Option<Self>> {
        match kind {
            FallbackKind::PhraseSuggest => {
                if !query.is_with_dym_suggestion() || query.offset() != 0 {
                    return Ok(None);
                }
                if params.get("profile").is_none() {
                    return Err(Error::Profile(
                        "Missing mandatory parameter 'profile'".to_string(),
                    ));
                }
            }
            FallbackKind::LangDetect => {
                if !query.cross_search_strategy().is_cross_language_search_supported() {
                    return Ok(None);
                }
            }
        }

        Ok(Some(Self {
            name: name.to_string(),
            kind,
            params,
        }))
    }
}

/// Ordered list of fallback methods for a request
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct FallbackRunner {
    methods: Vec<FallbackMethod>,
}

impl FallbackRunner {
    pub fn new(methods: Vec<FallbackMethod>) -> Self {
        Self { methods }
    }

    /// Shared runner without any method
    pub fn noop_runner() -> Arc<FallbackRunner> {
        static NOOP: OnceLock<Arc<FallbackRunner>> = OnceLock::new();
        NOOP.get_or_init(|| Arc::new(FallbackRunner::default())).clone()
    }

    /// Build the runner from the query config's `fallbacks` profile in the
    /// default context
    pub fn create(query: &SearchQuery) -> Result<Arc<FallbackRunner>> {
        Self::create_in_context(query, CONTEXT_DEFAULT, &BTreeMap::new())
    }

    /// Build the runner from the `fallbacks` profile of a context.
    ///
    /// Fallbacks are optional: a context without a fallbacks profile gets
    /// the no-op runner.
    pub fn create_in_context(
        query: &SearchQuery,
        context: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Arc<FallbackRunner>> {
        let profiles = query.search_config().profile_service();
        if !profiles.supports_context(ProfileType::Fallbacks, context) {
            return Ok(Self::noop_runner());
        }

        let profile = profiles.load_profile(ProfileType::Fallbacks, context, params)?;
        let mut methods = Vec::new();

        if let Some(defs) = profile.get("methods").and_then(Value::as_object) {
            for (name, def) in defs {
                let class = def.get("class").and_then(Value::as_str).ok_or_else(|| {
                    Error::Profile("Invalid FallbackMethod: missing 'class' definition in profile".to_string())
                })?;
                let kind = FallbackKind::from_class(class).ok_or_else(|| {
                    Error::Profile(format!("Invalid FallbackMethod: unknown class {}", class))
                })?;
                let params = def.get("params").cloned().unwrap_or(Value::Null);

                if let Some(method) = FallbackMethod::build(name, kind, params, query)? {
                    methods.push(method);
                }
            }
        }

        Ok(Arc::new(Self::new(methods)))
    }

    pub fn methods(&self) -> &[FallbackMethod] {
        &self.methods
    }

    pub fn is_noop(&self) -> bool {
        self.methods.is_empty()
    }
}
