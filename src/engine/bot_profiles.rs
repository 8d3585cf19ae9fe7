//! Named bot profiles: strategy plus MCTS overrides, loaded from TOML.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::engine::models::{MctsPreset, StrategyConfig, StrategyKind};
use crate::error::{EngineError, Result};

const BUILTIN_PROFILES: &str = include_str!("../../bot_profiles.toml");

#[derive(Debug, Deserialize, Clone)]
pub struct BotProfile {
    pub description: Option<String>,
    #[serde(default = "default_strategy")]
    pub strategy: StrategyKind,

    // MCTS only; unset fields come from the preset.
    pub preset: Option<MctsPreset>,
    pub max_iterations: Option<usize>,
    pub max_time_ms: Option<u64>,
    pub simulation_depth: Option<usize>,
    pub exploration_constant: Option<f64>,
    pub seed: Option<u64>,
}

fn default_strategy() -> StrategyKind {
    StrategyKind::Mcts
}

impl BotProfile {
    pub fn to_strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            kind: self.strategy,
            preset: self.preset,
            max_iterations: self.max_iterations,
            max_time_ms: self.max_time_ms,
            simulation_depth: self.simulation_depth,
            exploration_constant: self.exploration_constant,
            seed: self.seed,
        }
    }
}

/// Maps difficulty tiers to profile names.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProductionConfig {
    pub easy: Option<String>,
    pub medium: Option<String>,
    pub hard: Option<String>,
    pub default: Option<String>,
}

impl ProductionConfig {
    pub fn resolve(&self, difficulty: &str) -> Option<&str> {
        match difficulty {
            "easy" => self.easy.as_deref(),
            "medium" => self.medium.as_deref(),
            "hard" => self.hard.as_deref(),
            _ => self.default.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotProfilesFile {
    #[serde(default)]
    pub profiles: HashMap<String, BotProfile>,
    #[serde(default)]
    pub production: ProductionConfig,
}

impl BotProfilesFile {
    /// The profiles shipped with the crate.
    pub fn builtin() -> Self {
        toml::from_str(BUILTIN_PROFILES).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "built-in bot profiles failed to parse");
            Self::default()
        })
    }

    /// Resolve a profile name, a difficulty tier (`easy`, `medium`, `hard`) or
    /// a bare strategy name to a strategy configuration.
    pub fn resolve(&self, name: &str) -> Result<StrategyConfig> {
        if let Some(profile) = self.profiles.get(name) {
            return Ok(profile.to_strategy_config());
        }
        if matches!(name, "easy" | "medium" | "hard") {
            if let Some(profile) = self
                .production
                .resolve(name)
                .and_then(|p| self.profiles.get(p))
            {
                return Ok(profile.to_strategy_config());
            }
        }
        name.parse::<StrategyKind>()
            .map(StrategyConfig::of)
            .map_err(|_| {
                let mut known: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
                known.sort_unstable();
                EngineError::invalid_config(format!(
                    "unknown bot profile '{name}' (known: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Load profiles from a TOML file at the given path.
pub fn load_profiles(path: &Path) -> Result<BotProfilesFile> {
    let content = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| EngineError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Try the well-known paths, falling back to the built-in profiles.
pub fn load_default_profiles() -> BotProfilesFile {
    let candidates = [
        "bot_profiles.toml",
        "../bot_profiles.toml",
        "/etc/ludo/bot_profiles.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_profiles(p) {
                Ok(profiles) => {
                    tracing::info!(path = %p.display(), count = profiles.profiles.len(), "loaded bot profiles");
                    return profiles;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load bot profiles");
                }
            }
        }
    }
    tracing::info!("no bot_profiles.toml found, using built-in defaults");
    BotProfilesFile::builtin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let file = BotProfilesFile::builtin();
        assert!(file.profiles.len() >= 6);
        let hard = file.resolve("mcts_hard").unwrap();
        assert_eq!(hard.kind, StrategyKind::Mcts);
        assert_eq!(hard.mcts_params().max_iterations, 2000);
        assert_eq!(file.resolve("easy").unwrap().kind, StrategyKind::Aggressive);
        assert_eq!(file.resolve("medium").unwrap().preset, Some(MctsPreset::Easy));
    }

    #[test]
    fn test_resolve_bare_strategy_name() {
        let file = BotProfilesFile::default();
        assert_eq!(file.resolve("responsible").unwrap().kind, StrategyKind::Responsible);
        assert!(matches!(file.resolve("nope"), Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_load_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot_profiles.toml");
        std::fs::write(
            &path,
            r#"
[profiles.quick]
max_iterations = 25
seed = 3

[profiles.careful]
strategy = "responsible"

[production]
hard = "quick"
"#,
        )
        .unwrap();
        let file = load_profiles(&path).unwrap();
        let quick = file.resolve("hard").unwrap();
        assert_eq!(quick.kind, StrategyKind::Mcts);
        let params = quick.mcts_params();
        assert_eq!((params.max_iterations, params.seed), (25, Some(3)));
        assert_eq!(file.resolve("careful").unwrap().kind, StrategyKind::Responsible);
    }

    #[test]
    fn test_load_profiles_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[profiles.x]\nstrategy = \"telepathy\"\n").unwrap();
        assert!(matches!(load_profiles(&path), Err(EngineError::Toml { .. })));
        assert!(matches!(
            load_profiles(&dir.path().join("absent.toml")),
            Err(EngineError::Io { .. })
        ));
    }
}
