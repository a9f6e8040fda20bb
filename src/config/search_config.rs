use crate::config::profiles::{CONTEXT_DEFAULT, ProfileService, ProfileType};
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::parser::cleanup::QuestionMarkStripLevel;
use crate::utils::get_config_path;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Weight of a syntax not listed in the syntax weight table
pub const DEFAULT_SYNTAX_WEIGHT: u32 = 1;

/// Per-wiki search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Identity of the wiki this config was built for
    #[serde(default = "default_wiki_id")]
    pub wiki_id: String,

    /// True when this config describes the wiki serving the request
    #[serde(default = "default_local_wiki")]
    pub local_wiki: bool,

    /// Allow searching sister projects in the same language
    #[serde(default)]
    pub enable_cross_project_search: bool,

    /// Allow searching the same project in other languages
    #[serde(default)]
    pub enable_alt_language: bool,

    /// Number of results requested from each sister project.
    /// If None, the regular default limit is used
    #[serde(default)]
    pub num_cross_project_search_results: Option<usize>,

    #[serde(default)]
    pub strip_question_marks: QuestionMarkStripLevel,

    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Extra indices to query alongside the wiki index, by namespace
    #[serde(default)]
    pub extra_indices: BTreeMap<Namespace, Vec<String>>,

    /// How "complex" each syntax is, used to classify searches
    #[serde(default = "default_syntax_weights")]
    pub syntax_weights: BTreeMap<String, u32>,

    #[serde(default = "default_profiles")]
    pub profiles: ProfileService,
}

fn default_wiki_id() -> String {
    "local".to_string()
}

fn default_local_wiki() -> bool {
    true
}

fn default_language_code() -> String {
    "en".to_string()
}

fn default_syntax_weights() -> BTreeMap<String, u32> {
    [
        ("full_text", 10),
        // regex is really tough
        ("regex", u32::MAX),
        ("more_like", 100),
        ("near_match", 10),
        ("prefix", 2),
        ("deepcategory", 20),
    ]
    .into_iter()
    .map(|(name, weight)| (name.to_string(), weight))
    .collect()
}

fn default_profiles() -> ProfileService {
    let mut profiles = ProfileService::new();
    profiles.register_profile(ProfileType::Rescore, "classic", json!({"i18n_msg": "cirrussearch-qi-profile-classic"}));
    profiles.register_profile(ProfileType::Rescore, "empty", json!({}));
    profiles.register_default_profile(ProfileType::Rescore, CONTEXT_DEFAULT, "classic");
    profiles.register_profile(ProfileType::FtQueryBuilder, "default", json!({"builder_class": "query_string"}));
    profiles.register_profile(ProfileType::FtQueryBuilder, "perfield_builder", json!({"builder_class": "simple_match"}));
    profiles.register_default_profile(ProfileType::FtQueryBuilder, CONTEXT_DEFAULT, "default");
    profiles
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            wiki_id: default_wiki_id(),
            local_wiki: default_local_wiki(),
            enable_cross_project_search: false,
            enable_alt_language: false,
            num_cross_project_search_results: None,
            strip_question_marks: QuestionMarkStripLevel::default(),
            language_code: default_language_code(),
            extra_indices: BTreeMap::new(),
            syntax_weights: default_syntax_weights(),
            profiles: default_profiles(),
        }
    }
}

impl SearchConfig {
    /// Config of a sister wiki, identified by its wiki id
    pub fn for_wiki(wiki_id: &str) -> Self {
        Self {
            wiki_id: wiki_id.to_string(),
            local_wiki: false,
            ..Self::default()
        }
    }

    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SearchConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Reject configs the query parser cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.language_code.trim().is_empty() {
            return Err(Error::Config("language_code must not be empty".to_string()));
        }
        if self.wiki_id.trim().is_empty() {
            return Err(Error::Config("wiki_id must not be empty".to_string()));
        }
        Ok(())
    }

    /// Copy of this config with question mark stripping disabled
    pub fn without_question_mark_stripping(&self) -> Arc<SearchConfig> {
        Arc::new(Self {
            strip_question_marks: QuestionMarkStripLevel::No,
            ..self.clone()
        })
    }

    pub fn wiki_id(&self) -> &str {
        &self.wiki_id
    }

    pub fn is_local_wiki(&self) -> bool {
        self.local_wiki
    }

    pub fn is_cross_project_search_enabled(&self) -> bool {
        self.enable_cross_project_search
    }

    pub fn is_cross_language_search_enabled(&self) -> bool {
        self.enable_alt_language
    }

    pub fn num_cross_project_search_results(&self) -> Option<usize> {
        self.num_cross_project_search_results
    }

    pub fn question_mark_strip_level(&self) -> QuestionMarkStripLevel {
        self.strip_question_marks
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn profile_service(&self) -> &ProfileService {
        &self.profiles
    }

    /// Weight of a syntax feature, see [`DEFAULT_SYNTAX_WEIGHT`]
    pub fn syntax_weight(&self, syntax: &str) -> u32 {
        self.syntax_weights
            .get(syntax)
            .copied()
            .unwrap_or(DEFAULT_SYNTAX_WEIGHT)
    }

    pub fn extra_indices_for(&self, ns: Namespace) -> &[String] {
        self.extra_indices
            .get(&ns)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
