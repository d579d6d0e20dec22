//! Configuration for the AIS client
//!
//! The configuration is built in three layers:
//! 1. the default configuration embedded in the crate (`pmoais.yaml`)
//! 2. an optional YAML file, deep-merged over the defaults
//! 3. environment overrides of the form `PMOAIS_CONFIG__TIMEOUTS__STREAM_MS=3000`
//!
//! Keys are case-insensitive. Override values are parsed as YAML scalars when
//! possible, so numbers stay numbers.
//!
//! # Example
//!
//! ```no_run
//! use pmoais::{AisClient, AisConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = AisConfig::load(Some("pmoais.yaml".as_ref()))?;
//! let client = AisClient::builder().config(&config).build()?;
//! # Ok(())
//! # }
//! ```

use crate::constants::*;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::{env, fs, path::Path, time::Duration};
use tracing::{debug, info, warn};

const DEFAULT_CONFIG: &str = include_str!("pmoais.yaml");

const ENV_PREFIX: &str = "PMOAIS_CONFIG__";

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AisConfig {
    /// Speaker host, with or without scheme and port
    pub host: String,
    /// User-Agent sent once the gate info is known
    pub user_agent: String,
    /// Provider endpoints
    pub endpoints: Endpoints,
    /// Per-call timeouts
    pub timeouts: Timeouts,
}

impl Default for AisConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: Endpoints::default(),
            timeouts: Timeouts::default(),
        }
    }
}

/// Provider endpoint templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Type listing template, `{audio_nature}` placeholder
    pub audio_type: String,
    /// Name lookup template, `{audio_nature}` and `{audio_type}` placeholders
    pub audio_name: String,
    /// Audiobook catalogue
    pub audiobooks: String,
    /// Tune-in directory root
    pub tunein: String,
    /// Metadata sharing endpoint
    pub audio_info: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            audio_type: AUDIO_TYPE_URL.to_string(),
            audio_name: AUDIO_NAME_URL.to_string(),
            audiobooks: AUDIOBOOKS_URL.to_string(),
            tunein: TUNE_IN_URL.to_string(),
            audio_info: AUDIO_INFO_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Type listing URL for a nature token ("Radio", "Podcast")
    pub fn audio_type_url(&self, nature: &str) -> String {
        self.audio_type.replace("{audio_nature}", nature)
    }

    /// Name lookup URL for a nature token and a sub-type
    ///
    /// The sub-type is form-encoded; natures are fixed ASCII tokens.
    pub fn audio_name_url(&self, nature: &str, audio_type: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(audio_type.as_bytes()).collect();
        self.audio_name
            .replace("{audio_nature}", nature)
            .replace("{audio_type}", &encoded)
    }
}

/// Per-call timeouts, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub gate_ms: u64,
    pub command_ms: u64,
    pub status_ms: u64,
    pub listing_ms: u64,
    pub name_ms: u64,
    pub stream_ms: u64,
    pub share_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            gate_ms: GATE_TIMEOUT_MS,
            command_ms: COMMAND_TIMEOUT_MS,
            status_ms: STATUS_TIMEOUT_MS,
            listing_ms: LISTING_TIMEOUT_MS,
            name_ms: NAME_TIMEOUT_MS,
            stream_ms: STREAM_TIMEOUT_MS,
            share_ms: SHARE_TIMEOUT_MS,
        }
    }
}

impl Timeouts {
    pub fn gate(&self) -> Duration {
        Duration::from_millis(self.gate_ms)
    }

    pub fn command(&self) -> Duration {
        Duration::from_millis(self.command_ms)
    }

    pub fn status(&self) -> Duration {
        Duration::from_millis(self.status_ms)
    }

    pub fn listing(&self) -> Duration {
        Duration::from_millis(self.listing_ms)
    }

    pub fn name(&self) -> Duration {
        Duration::from_millis(self.name_ms)
    }

    pub fn stream(&self) -> Duration {
        Duration::from_millis(self.stream_ms)
    }

    pub fn share(&self) -> Duration {
        Duration::from_millis(self.share_ms)
    }
}

impl AisConfig {
    /// Loads the configuration
    ///
    /// This method:
    /// 1. Loads the default embedded configuration
    /// 2. Merges it with the YAML file at `path` if present
    /// 3. Applies `PMOAIS_CONFIG__*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_vars(path, env::vars())
    }

    /// Same as [`AisConfig::load`] with an explicit set of variables
    pub fn load_with_vars<I>(path: Option<&Path>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if let Some(path) = path {
            match fs::read(path) {
                Ok(data) => {
                    info!(config_file=%path.display(), "Loaded config file");
                    let external: Value = serde_yaml::from_slice(&data)?;
                    merge_yaml(&mut value, &lower_keys(external));
                }
                Err(_) => {
                    info!(config_file=%path.display(), "Config file not found, using default embedded config");
                }
            }
        }

        apply_env_overrides(&mut value, vars);

        serde_yaml::from_value(value).map_err(|e| anyhow!("Invalid AIS configuration: {}", e))
    }

    /// Parses a YAML document over the embedded defaults, without env overrides
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut value, &lower_keys(external));
        serde_yaml::from_value(value).map_err(|e| anyhow!("Invalid AIS configuration: {}", e))
    }
}

fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let key_path = stripped.split("__").collect::<Vec<_>>();
            debug!(key = %key, "Applying config override");
            if let Err(e) = set_value(config, &key_path, convert_env_value(&value)) {
                warn!(key = %key, "Ignoring config override: {}", e);
            }
        }
    }
}

fn set_value(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn convert_env_value(value: &str) -> Value {
    if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
        return parsed;
    }
    Value::String(value.to_string())
}

fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys).collect()),
        _ => value,
    }
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // scalars and sequences are replaced
        (d, e) => *d = e.clone(),
    }
}
