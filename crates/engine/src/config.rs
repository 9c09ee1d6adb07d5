//! Engine configuration from the environment
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `GEMFALL_SEED` | `1` | RNG seed |
//! | `GEMFALL_DIFFICULTY` | `normal` | `easy`, `normal` or `hard` |
//! | `GEMFALL_LEVEL_PATH` | unset | JSON level file |
//!
//! Unparseable values fall back to the default.

use tracing::warn;

use gemfall_types::Difficulty;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub level_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            difficulty: Difficulty::Normal,
            level_path: None,
        }
    }
}

impl EngineConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from any key lookup (the environment in production, a map in tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let seed = match lookup("GEMFALL_SEED") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid GEMFALL_SEED, using default");
                defaults.seed
            }),
            None => defaults.seed,
        };

        let difficulty = match lookup("GEMFALL_DIFFICULTY") {
            Some(raw) => Difficulty::from_str(raw.trim()).unwrap_or_else(|| {
                warn!(value = %raw, "invalid GEMFALL_DIFFICULTY, using default");
                defaults.difficulty
            }),
            None => defaults.difficulty,
        };

        let level_path = lookup("GEMFALL_LEVEL_PATH")
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            seed,
            difficulty,
            level_path,
        }
    }
}
