use serde::{Deserialize, Serialize};

/// Debugging flags of a search request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugOptions {
    /// Return the backend query instead of running it
    #[serde(default)]
    pub dump_query: bool,

    /// Return the raw backend response
    #[serde(default)]
    pub dump_result: bool,

    /// Explain format requested for scores (e.g. `pretty`, `raw`)
    #[serde(default)]
    pub explain: Option<String>,

    /// Bypass the query cache
    #[serde(default)]
    pub disable_query_cache: bool,
}

impl DebugOptions {
    /// No debugging
    pub fn default_options() -> Self {
        Self::default()
    }

    /// Dump queries with caching disabled, for stable snapshots
    pub fn for_dumping_queries_in_unit_tests() -> Self {
        Self {
            dump_query: true,
            disable_query_cache: true,
            ..Self::default()
        }
    }

    pub fn is_dump_query(&self) -> bool {
        self.dump_query
    }

    pub fn is_return_raw(&self) -> bool {
        self.dump_query || self.dump_result
    }
}
