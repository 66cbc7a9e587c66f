//! Tree diagnostics options

/// Environment variable enabling per-node creation traces.
pub const CREATION_TRACES_ENV: &str = "STUBTREE_CREATION_TRACES";
/// Environment variable overriding the node-tree dump limit (in bytes).
pub const DUMP_LIMIT_ENV: &str = "STUBTREE_DUMP_LIMIT";

/// Options controlling how much diagnostic detail the tree records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    /// Capture a backtrace for every node when it is created, and append those
    /// traces to stub/AST binding failure reports.
    pub creation_traces: bool,
    /// Maximum size of a node-tree dump in a failure report, unless
    /// `creation_traces` is enabled.
    pub dump_limit: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            creation_traces: false,
            dump_limit: 8 * 1024,
        }
    }
}

impl TreeOptions {
    /// Defaults, overridden by `STUBTREE_CREATION_TRACES` and
    /// `STUBTREE_DUMP_LIMIT` when set.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(value) = std::env::var(CREATION_TRACES_ENV) {
            options.creation_traces = matches!(value.as_str(), "1" | "true" | "yes");
        }
        if let Some(limit) = std::env::var(DUMP_LIMIT_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
        {
            options.dump_limit = limit;
        }
        options
    }

    pub fn with_creation_traces(mut self, enabled: bool) -> Self {
        self.creation_traces = enabled;
        self
    }

    pub fn with_dump_limit(mut self, limit: usize) -> Self {
        self.dump_limit = limit;
        self
    }
}
