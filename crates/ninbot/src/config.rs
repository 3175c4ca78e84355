//! Configuration loading and resolution.
//!
//! A configuration file is TOML:
//!
//! ```toml
//! [account]
//! name = "naruto"
//! password = "ramen"
//! rank = "Genin"
//!
//! [battle]
//! sequence = ["Basic Attack", "Clone Technique"]
//! rest = 60
//!
//! [train]
//! sequence = "+Taijutsu, -Ninjutsu"
//! rest = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use ninbot_core::client::{InvalidTrainingStat, UnknownRank};
use ninbot_core::{Rank, TrainingStat};
use serde::Deserialize;

/// Directory configuration names are looked up in.
pub const CONF_DIR: &str = "conf";
pub const DEFAULT_CONF_FILE: &str = "default.toml";
pub const CONFIG_ENV: &str = "NINBOT_CONFIG";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Can't read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Rank(#[from] UnknownRank),

    #[error(transparent)]
    TrainingStat(#[from] InvalidTrainingStat),

    #[error("The {0} sequence is empty")]
    EmptySequence(&'static str),
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub account: Account,
    pub battle: BattleConfig,
    pub train: TrainConfig,
    pub transport: TransportConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub name: String,
    pub password: String,
    pub rank: Rank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattleConfig {
    /// Action names, cycled through for each round.
    pub sequence: Vec<String>,
    /// Seconds to rest between battles.
    pub rest: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub sequence: Vec<TrainingStat>,
    /// Seconds to rest between trainings.
    pub rest: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    pub timeout_secs: u64,
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ── File format ──

#[derive(Deserialize)]
struct RawConfig {
    account: RawAccount,
    battle: RawSection,
    train: RawSection,
    #[serde(default)]
    transport: RawTransport,
}

#[derive(Deserialize)]
struct RawAccount {
    name: String,
    password: String,
    rank: String,
}

#[derive(Deserialize)]
struct RawSection {
    sequence: Sequence,
    #[serde(default)]
    rest: u64,
}

#[derive(Deserialize, Default)]
struct RawTransport {
    timeout_secs: Option<u64>,
}

/// A TOML array or a comma-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Sequence {
    List(Vec<String>),
    Csv(String),
}

impl Sequence {
    fn into_entries(self) -> Vec<String> {
        let entries = match self {
            Sequence::List(items) => items,
            Sequence::Csv(s) => s.split(',').map(str::to_string).collect(),
        };
        entries
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse and validate configuration text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;

        let actions = raw.battle.sequence.into_entries();
        if actions.is_empty() {
            return Err(ConfigError::EmptySequence("battle"));
        }
        let stats = raw
            .train
            .sequence
            .into_entries()
            .iter()
            .map(|s| s.parse::<TrainingStat>())
            .collect::<Result<Vec<_>, _>>()?;
        if stats.is_empty() {
            return Err(ConfigError::EmptySequence("train"));
        }

        Ok(Self {
            account: Account {
                name: raw.account.name,
                password: raw.account.password,
                rank: raw.account.rank.parse()?,
            },
            battle: BattleConfig {
                sequence: actions,
                rest: raw.battle.rest,
            },
            train: TrainConfig {
                sequence: stats,
                rest: raw.train.rest,
            },
            transport: TransportConfig {
                timeout_secs: raw.transport.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
        })
    }
}

/// Resolve the configuration file path.
///
/// An explicit name is looked up under `conf/` unless it already names an
/// existing file. Without one, `NINBOT_CONFIG` is used, then
/// `conf/default.toml`.
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    resolve_with_env(explicit, std::env::var(CONFIG_ENV).ok())
}

fn resolve_with_env(explicit: Option<&str>, env_path: Option<String>) -> PathBuf {
    if let Some(name) = explicit {
        let path = PathBuf::from(name);
        if path.is_file() {
            return path;
        }
        return Path::new(CONF_DIR).join(name);
    }

    if let Some(env_path) = env_path {
        return PathBuf::from(env_path);
    }

    Path::new(CONF_DIR).join(DEFAULT_CONF_FILE)
}
