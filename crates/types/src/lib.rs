//! Shared plain types consumed by the engine and the TUI.

/// Sentinel used by cluster metadata when a value is unknown.
pub const NA: &str = "n/a";

/// Represents how the prompt interprets typed text when producing suggestions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestMode {
    /// Prefix-driven completion; the default.
    AutoComplete,
    /// Substring search across every indexed vocabulary.
    FullText,
}

impl Default for SuggestMode {
    fn default() -> Self {
        Self::AutoComplete
    }
}

/// Represents the role of an input buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// Buffer for entering commands.
    Command,
    /// Buffer for entering filter expressions.
    Filter,
}

/// Identifies the cluster the dashboard is currently bound to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterMeta {
    /// Cluster name, or [`NA`] when unknown.
    pub cluster: String,
    /// Kube context name, or [`NA`] when unknown.
    pub context: String,
}

impl ClusterMeta {
    pub fn new(cluster: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            context: context.into(),
        }
    }

    /// Build a metadata value with both sides unknown.
    pub fn unknown() -> Self {
        Self::new(NA, NA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_meta_uses_sentinel() {
        let meta = ClusterMeta::unknown();
        assert_eq!(meta.cluster, NA);
        assert_eq!(meta.context, NA);
    }
}
