//! Configuration loading for Splice.
//!
//! Raw TOML structs with `Option` fields live here; [`SpliceConfig::snapshot`]
//! resolves them into the clamped [`ConfigurationSnapshot`] the override
//! units read. Writing configuration back is the settings surface's job.
//!
//! ```toml
//! enabled = true
//!
//! [mining]
//! linear_cost_enabled = true
//! linear_cost_per_mine = 6
//! mine_cost_multiplier = 1.0
//! production_multiplier = 1.5
//! production_targets = ["player", "humans"]
//!
//! [nation]
//! unrest_offset = -1.5
//! ignore_hostile_claims = "player_only"
//!
//! [[fingerprints]]
//! routine = "FactionState.MissionControlCost(int)"
//! body = "dumps/mission_control_cost.il"
//! expected = "A9B38584F8457697061D08116BFB03B113492B6A1C39AB1B950A21C13F425943"
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use splice_core::{
    FileBody, FingerprintError, FingerprintRecord, FingerprintRegistry, TargetRoutine,
};
use splice_types::{
    ConfigurationSnapshot, ExclusiveTargets, ExpectedDigest, MiningSettings, NationSettings,
    RoutineName, RoutineNameError, TargetGroups,
};
use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "SPLICE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("fingerprints[{index}]: {source}")]
    InvalidRoutine {
        index: usize,
        #[source]
        source: RoutineNameError,
    },
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}

#[derive(Debug, Default, Deserialize)]
pub struct SpliceConfig {
    /// Master switch. Default: true.
    pub enabled: Option<bool>,
    pub mining: Option<MiningConfig>,
    pub nation: Option<NationConfig>,
    /// Routine bodies to verify from the command line.
    #[serde(default)]
    pub fingerprints: Vec<FingerprintConfig>,
    /// Directory relative body paths are resolved against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MiningConfig {
    #[serde(default)]
    pub linear_cost_enabled: bool,
    /// Default: 6. Range: 1..=15.
    pub linear_cost_per_mine: Option<i32>,
    /// Default: 1.0. Range: 0.0..=2.0.
    pub mine_cost_multiplier: Option<f32>,
    /// Default: 1.0. Range: 0.0..=10.0.
    pub production_multiplier: Option<f32>,
    #[serde(default)]
    pub production_targets: TargetGroups,
}

#[derive(Debug, Default, Deserialize)]
pub struct NationConfig {
    /// Default: 0.0. Range: -10.0..=10.0.
    pub unrest_offset: Option<f32>,
    /// Default: 0.0. Range: -10.0..=10.0.
    pub cohesion_offset: Option<f32>,
    #[serde(default)]
    pub ignore_hostile_claims: ExclusiveTargets,
    #[serde(default)]
    pub ignore_diplomatic_cooldowns: ExclusiveTargets,
    #[serde(default)]
    pub claim_all_capitals: ExclusiveTargets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FingerprintConfig {
    pub routine: String,
    /// Absent or empty: not pinned yet.
    #[serde(default)]
    pub expected: Option<String>,
    /// Dump of the routine's compiled body. Absent: treated as unresolved.
    pub body: Option<PathBuf>,
}

impl SpliceConfig {
    /// Load from [`config_path`]. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str::<Self>(&content) {
            Ok(mut config) => {
                config.base_dir = path.parent().map(Path::to_path_buf);
                tracing::info!(path = %path.display(), "Configuration loaded");
                Ok(config)
            }
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Resolve into the snapshot override units read, clamping out-of-range values.
    #[must_use]
    pub fn snapshot(&self) -> ConfigurationSnapshot {
        let defaults = ConfigurationSnapshot::default();
        let mining = self.mining.as_ref().map_or(defaults.mining, |raw| {
            let base = MiningSettings::default();
            MiningSettings {
                linear_cost_enabled: raw.linear_cost_enabled,
                linear_cost_per_mine: raw.linear_cost_per_mine.unwrap_or(base.linear_cost_per_mine),
                mine_cost_multiplier: raw.mine_cost_multiplier.unwrap_or(base.mine_cost_multiplier),
                production_multiplier: raw
                    .production_multiplier
                    .unwrap_or(base.production_multiplier),
                production_targets: raw.production_targets,
            }
        });
        let nation = self
            .nation
            .as_ref()
            .map_or(defaults.nation, |raw| NationSettings {
                unrest_offset: raw.unrest_offset.unwrap_or(0.0),
                cohesion_offset: raw.cohesion_offset.unwrap_or(0.0),
                ignore_hostile_claims: raw.ignore_hostile_claims,
                ignore_diplomatic_cooldowns: raw.ignore_diplomatic_cooldowns,
                claim_all_capitals: raw.claim_all_capitals,
            });

        let raw = ConfigurationSnapshot {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            mining,
            nation,
        };
        let snapshot = raw.clone().normalized();
        if snapshot != raw {
            tracing::warn!("Configuration values outside supported ranges were clamped");
        }
        snapshot
    }

    /// Build the fingerprint table from the `[[fingerprints]]` entries.
    pub fn fingerprint_registry(&self) -> Result<FingerprintRegistry, ConfigError> {
        self.fingerprint_registry_with(|_| ExpectedDigest::Unpinned)
    }

    /// Like [`SpliceConfig::fingerprint_registry`], with `default_pin`
    /// supplying the pin for entries that have no `expected` key. An explicit
    /// empty `expected` stays unpinned.
    pub fn fingerprint_registry_with(
        &self,
        default_pin: impl Fn(&RoutineName) -> ExpectedDigest,
    ) -> Result<FingerprintRegistry, ConfigError> {
        let mut registry = FingerprintRegistry::new();
        for (index, entry) in self.fingerprints.iter().enumerate() {
            let name = RoutineName::new(entry.routine.as_str())
                .map_err(|source| ConfigError::InvalidRoutine { index, source })?;
            let expected = match entry.expected.as_deref() {
                Some(pin) => ExpectedDigest::parse(pin),
                None => default_pin(&name),
            };
            let target = match &entry.body {
                Some(body) => {
                    TargetRoutine::resolved(name, Arc::new(FileBody::new(self.resolve_path(body))))
                }
                None => TargetRoutine::unresolved(name),
            };
            registry.register(FingerprintRecord::new(target, expected))?;
        }
        Ok(registry)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// `$SPLICE_CONFIG`, else `~/.splice/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".splice").join("config.toml"))
}
