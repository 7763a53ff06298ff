//! Engine configuration, read from the environment with fallbacks.

use crate::models::ScoringConfig;

/// Largest atomic batch the stores are expected to accept.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Manual seeds rank as `base - seed`, above any realistic club point total.
pub const DEFAULT_MANUAL_SEED_BASE: i64 = 1_000_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    /// Upper bound for one batched player or ledger write.
    pub max_batch_size: usize,
    pub manual_seed_base: i64,
    /// Scoring used when rebuilding club ledgers and global XP.
    pub ledger_scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            manual_seed_base: DEFAULT_MANUAL_SEED_BASE,
            ledger_scoring: ScoringConfig::LEDGER,
        }
    }
}

impl EngineConfig {
    /// Override defaults with `DRAW_MAX_BATCH_SIZE` and `DRAW_MANUAL_SEED_BASE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_batch_size = std::env::var("DRAW_MAX_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.max_batch_size);
        let manual_seed_base = std::env::var("DRAW_MANUAL_SEED_BASE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.manual_seed_base);
        Self {
            max_batch_size,
            manual_seed_base,
            ..defaults
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }
}
