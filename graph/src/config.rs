//! Rate graph configuration.

/// Configuration for a [`RateGraph`](crate::RateGraph).
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Name used in log spans, to tell graphs apart.
    pub name: String,
    /// Vertex count above which a rebuild logs a warning.
    /// Rebuilds are O(V³).
    pub vertex_warn_threshold: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            vertex_warn_threshold: 500,
        }
    }
}

impl GraphConfig {
    /// Create a config with the given graph name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("BESTRATE_GRAPH_NAME") {
            config.name = name;
        }

        if let Ok(threshold) = std::env::var("BESTRATE_VERTEX_WARN_THRESHOLD") {
            if let Ok(threshold) = threshold.parse() {
                config.vertex_warn_threshold = threshold;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Graph name cannot be empty".to_string());
        }

        if self.vertex_warn_threshold == 0 {
            return Err("Vertex warning threshold must be at least 1".to_string());
        }

        Ok(())
    }
}
