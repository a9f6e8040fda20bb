//! Named configuration profiles.
//!
//! Profiles are grouped by [`ProfileType`]. For each type the service keeps a
//! repository of named profiles, a default profile name per context and an
//! optional list of contextual overrides. Overrides build a profile name from
//! a template and the request's profile context parameters, e.g. the template
//! `wsum_{lang}` with `{"lang": "fr"}` resolves to `wsum_fr` when that profile
//! exists.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Context used when the caller did not ask for a specific one
pub const CONTEXT_DEFAULT: &str = "default";

/// Context used by prefix (title completion) searches
pub const CONTEXT_PREFIXSEARCH: &str = "prefixsearch";

/// Kind of profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    Rescore,
    FtQueryBuilder,
    Completion,
    PhraseSuggester,
    Fallbacks,
    Similarity,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Rescore => "rescore",
            ProfileType::FtQueryBuilder => "ft_query_builder",
            ProfileType::Completion => "completion",
            ProfileType::PhraseSuggester => "phrase_suggester",
            ProfileType::Fallbacks => "fallbacks",
            ProfileType::Similarity => "similarity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rescore" => Some(ProfileType::Rescore),
            "ft_query_builder" => Some(ProfileType::FtQueryBuilder),
            "completion" => Some(ProfileType::Completion),
            "phrase_suggester" => Some(ProfileType::PhraseSuggester),
            "fallbacks" => Some(ProfileType::Fallbacks),
            "similarity" => Some(ProfileType::Similarity),
            _ => None,
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives a profile name from the profile context parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualOverride {
    /// Name template, `{param}` placeholders are replaced by context parameters
    pub template: String,
    /// Lower values win when several overrides resolve
    #[serde(default)]
    pub priority: u32,
}

impl ContextualOverride {
    /// Resolve the template, `None` when a placeholder has no parameter
    pub fn overridden_name(&self, params: &BTreeMap<String, String>) -> Option<String> {
        let mut name = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            name.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after.find('}')?;
            let value = params.get(&after[..end])?;
            name.push_str(value);
            rest = &after[end + 1..];
        }
        name.push_str(rest);

        Some(name)
    }
}

/// Profile repositories, defaults and overrides for every profile type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileService {
    /// Profiles by type, then by name
    #[serde(default)]
    pub repositories: BTreeMap<ProfileType, BTreeMap<String, Value>>,

    /// Default profile name by type, then by context
    #[serde(default)]
    pub defaults: BTreeMap<ProfileType, BTreeMap<String, String>>,

    /// Contextual overrides by type, then by context
    #[serde(default)]
    pub overrides: BTreeMap<ProfileType, BTreeMap<String, Vec<ContextualOverride>>>,
}

impl ProfileService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a profile
    pub fn register_profile(&mut self, profile_type: ProfileType, name: &str, profile: Value) {
        self.repositories
            .entry(profile_type)
            .or_default()
            .insert(name.to_string(), profile);
    }

    /// Set the profile used for a context when nothing overrides it
    pub fn register_default_profile(&mut self, profile_type: ProfileType, context: &str, name: &str) {
        self.defaults
            .entry(profile_type)
            .or_default()
            .insert(context.to_string(), name.to_string());
    }

    pub fn register_contextual_override(
        &mut self,
        profile_type: ProfileType,
        context: &str,
        template: &str,
        priority: u32,
    ) {
        self.overrides
            .entry(profile_type)
            .or_default()
            .entry(context.to_string())
            .or_default()
            .push(ContextualOverride {
                template: template.to_string(),
                priority,
            });
    }

    pub fn has_profile(&self, profile_type: ProfileType, name: &str) -> bool {
        self.repositories
            .get(&profile_type)
            .is_some_and(|repo| repo.contains_key(name))
    }

    /// Check whether a default profile is declared for the context
    pub fn supports_context(&self, profile_type: ProfileType, context: &str) -> bool {
        self.defaults
            .get(&profile_type)
            .is_some_and(|contexts| contexts.contains_key(context))
    }

    /// Names of the profiles available for a type
    pub fn list_profiles(&self, profile_type: ProfileType) -> Vec<&str> {
        self.repositories
            .get(&profile_type)
            .map(|repo| repo.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Load a profile by its name
    pub fn load_profile_by_name(
        &self,
        profile_type: ProfileType,
        name: &str,
        fail_if_missing: bool,
    ) -> Result<Option<&Value>> {
        let profile = self
            .repositories
            .get(&profile_type)
            .and_then(|repo| repo.get(name));

        if profile.is_none() && fail_if_missing {
            return Err(Error::Profile(format!(
                "Cannot load a profile type {}: {} not found",
                profile_type, name
            )));
        }
        Ok(profile)
    }

    /// Load the profile selected for a context
    pub fn load_profile(
        &self,
        profile_type: ProfileType,
        context: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<&Value> {
        let name = self.get_profile_name(profile_type, context, params)?;
        self.load_profile_by_name(profile_type, &name, true)?
            .ok_or_else(|| Error::Profile(format!("Profile {} vanished", name)))
    }

    /// Name of the profile to use for a type in a context.
    ///
    /// The context default must exist. Contextual overrides that resolve to an
    /// existing profile take precedence, lowest priority first.
    pub fn get_profile_name(
        &self,
        profile_type: ProfileType,
        context: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<String> {
        let default = self
            .defaults
            .get(&profile_type)
            .and_then(|contexts| contexts.get(context))
            .ok_or_else(|| {
                Error::Profile(format!(
                    "No default profile found for {} in context {}",
                    profile_type, context
                ))
            })?;

        if !self.has_profile(profile_type, default) {
            return Err(Error::Profile(format!(
                "The default profile {} does not exist in profile repositories of type {}",
                default, profile_type
            )));
        }

        let overrides = self
            .overrides
            .get(&profile_type)
            .and_then(|contexts| contexts.get(context));

        let Some(overrides) = overrides else {
            return Ok(default.clone());
        };

        let mut best: Option<(u32, String)> = None;
        for over in overrides {
            if best.as_ref().is_some_and(|(prio, _)| over.priority >= *prio) {
                continue;
            }
            if let Some(name) = over.overridden_name(params) {
                if self.has_profile(profile_type, &name) {
                    best = Some((over.priority, name));
                }
            }
        }

        Ok(best.map(|(_, name)| name).unwrap_or_else(|| default.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> ProfileService {
        let mut service = ProfileService::new();
        service.register_profile(ProfileType::Rescore, "classic", json!({}));
        service.register_profile(ProfileType::Rescore, "wsum_fr", json!({"lang": "fr"}));
        service.register_profile(ProfileType::Rescore, "empty", json!({}));
        service.register_default_profile(ProfileType::Rescore, CONTEXT_DEFAULT, "classic");
        service
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_has_profile() {
        let service = service();
        assert!(service.has_profile(ProfileType::Rescore, "classic"));
        assert!(!service.has_profile(ProfileType::Rescore, "missing"));
        assert!(!service.has_profile(ProfileType::Completion, "classic"));
    }

    #[test]
    fn test_default_profile_name() {
        let service = service();
        let name = service
            .get_profile_name(ProfileType::Rescore, CONTEXT_DEFAULT, &BTreeMap::new())
            .unwrap();
        assert_eq!(name, "classic");
    }

    #[test]
    fn test_missing_default_is_error() {
        let service = service();
        let err = service
            .get_profile_name(ProfileType::Rescore, CONTEXT_PREFIXSEARCH, &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, Error::Profile(_)));
    }

    #[test]
    fn test_default_must_exist_in_repository() {
        let mut service = service();
        service.register_default_profile(ProfileType::Rescore, CONTEXT_DEFAULT, "ghost");
        assert!(service
            .get_profile_name(ProfileType::Rescore, CONTEXT_DEFAULT, &BTreeMap::new())
            .is_err());
    }

    #[test]
    fn test_contextual_override() {
        let mut service = service();
        service.register_contextual_override(ProfileType::Rescore, CONTEXT_DEFAULT, "wsum_{lang}", 10);

        let fr = service
            .get_profile_name(ProfileType::Rescore, CONTEXT_DEFAULT, &params(&[("lang", "fr")]))
            .unwrap();
        assert_eq!(fr, "wsum_fr");

        // No such profile: falls back to the default
        let de = service
            .get_profile_name(ProfileType::Rescore, CONTEXT_DEFAULT, &params(&[("lang", "de")]))
            .unwrap();
        assert_eq!(de, "classic");

        // Missing parameter: override does not apply
        let none = service
            .get_profile_name(ProfileType::Rescore, CONTEXT_DEFAULT, &BTreeMap::new())
            .unwrap();
        assert_eq!(none, "classic");
    }

    #[test]
    fn test_override_priority() {
        let mut service = service();
        service.register_contextual_override(ProfileType::Rescore, CONTEXT_DEFAULT, "wsum_{lang}", 10);
        service.register_contextual_override(ProfileType::Rescore, CONTEXT_DEFAULT, "empty", 5);
        let name = service
            .get_profile_name(ProfileType::Rescore, CONTEXT_DEFAULT, &params(&[("lang", "fr")]))
            .unwrap();
        assert_eq!(name, "empty");
    }

    #[test]
    fn test_load_profile_by_name() {
        let service = service();
        let profile = service
            .load_profile_by_name(ProfileType::Rescore, "wsum_fr", true)
            .unwrap();
        assert_eq!(profile, Some(&json!({"lang": "fr"})));

        assert!(service
            .load_profile_by_name(ProfileType::Rescore, "missing", false)
            .unwrap()
            .is_none());
        assert!(service
            .load_profile_by_name(ProfileType::Rescore, "missing", true)
            .is_err());
    }

    #[test]
    fn test_profile_type_names_round_trip() {
        for t in [
            ProfileType::Rescore,
            ProfileType::FtQueryBuilder,
            ProfileType::Completion,
            ProfileType::PhraseSuggester,
            ProfileType::Fallbacks,
            ProfileType::Similarity,
        ] {
            assert_eq!(ProfileType::from_name(t.as_str()), Some(t));
        }
        assert_eq!(ProfileType::from_name("nope"), None);
    }

    #[test]
    fn test_deserialize_service() {
        let service: ProfileService = serde_json::from_value(json!({
            "repositories": { "rescore": { "classic": {} } },
            "defaults": { "rescore": { "default": "classic" } }
        }))
        .unwrap();
        assert!(service.supports_context(ProfileType::Rescore, CONTEXT_DEFAULT));
        assert!(!service.supports_context(ProfileType::Fallbacks, CONTEXT_DEFAULT));
    }
}
