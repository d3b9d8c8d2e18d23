use std::{fmt, path::PathBuf};

use log::LevelFilter;

use crate::cache::{EvictionPolicy, CACHE_MAX_ENTRIES, CACHE_MIN_ENTRIES};

pub const DEFAULT_DISK_PATH: &str = "jbod.img";

pub const ENV_DISK: &str = "MDADM_DISK";
pub const ENV_CACHE: &str = "MDADM_CACHE";
pub const ENV_EVICTION: &str = "MDADM_EVICTION";
pub const ENV_LOG: &str = "MDADM_LOG";

/// 运行时配置，来自环境变量
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub disk_path: PathBuf,           // 磁盘镜像路径
    pub cache_entries: Option<usize>, // None 表示不启用缓存
    pub eviction: EvictionPolicy,     // 缓存替换策略
    pub log_level: LevelFilter,       // 日志级别
}

impl Default for Config {
    fn default() -> Self {
        Self {
            disk_path: PathBuf::from(DEFAULT_DISK_PATH),
            cache_entries: None,
            eviction: EvictionPolicy::default(),
            log_level: LevelFilter::Warn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}='{}': {}", self.key, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DISK).filter(|p| !p.is_empty()) {
            config.disk_path = PathBuf::from(path);
        }

        if let Some(value) = lookup(ENV_CACHE) {
            let entries: usize = value.trim().parse().map_err(|_| ConfigError {
                key: ENV_CACHE,
                value: value.clone(),
                reason: "not a number".to_string(),
            })?;
            if entries != 0 && !(CACHE_MIN_ENTRIES..=CACHE_MAX_ENTRIES).contains(&entries) {
                return Err(ConfigError {
                    key: ENV_CACHE,
                    value,
                    reason: format!(
                        "must be 0 or within [{}, {}]",
                        CACHE_MIN_ENTRIES, CACHE_MAX_ENTRIES
                    ),
                });
            }
            config.cache_entries = (entries != 0).then_some(entries);
        }

        if let Some(value) = lookup(ENV_EVICTION) {
            config.eviction = value.trim().parse().map_err(|reason| ConfigError {
                key: ENV_EVICTION,
                value: value.clone(),
                reason,
            })?;
        }

        if let Some(value) = lookup(ENV_LOG) {
            config.log_level = value.trim().parse().map_err(|_| ConfigError {
                key: ENV_LOG,
                value: value.clone(),
                reason: "expected off, error, warn, info, debug or trace".to_string(),
            })?;
        }

        Ok(config)
    }
}
