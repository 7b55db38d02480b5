//! Tunable knobs for the matcher pipeline. Kept as a plain struct with a
//! `Default` rather than compile-time constants — a hospital deployment may
//! want a tighter trigram threshold than another, and these are cheap to
//! expose without touching pipeline logic.

/// Matcher tunables. Construct with [`MatcherConfig::default`] and
/// override individual fields; there is no config-file loader in this
/// crate, the host process owns that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Minimum [`crate::trigram::similarity`] score for a catalog row to
    /// even be considered at Stage 2.
    pub trigram_threshold: f64,
    /// Maximum number of Stage 2 candidates pulled per row, after
    /// threshold filtering.
    pub stage2_candidate_limit: usize,
    /// Maximum number of supplier price rows kept per matched drug.
    pub price_row_limit: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            trigram_threshold: 0.85,
            stage2_candidate_limit: 20,
            price_row_limit: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MatcherConfig::default();
        assert_eq!(config.trigram_threshold, 0.85);
        assert_eq!(config.stage2_candidate_limit, 20);
        assert_eq!(config.price_row_limit, 20);
    }
}
