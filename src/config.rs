//! Configuration module

use crate::defaults::*;
use crate::index::DistanceMetric;
use crate::search::SearchMethod;
use anyhow::Context;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub acl: AclConfig,
    pub ingest: IngestConfig,
    pub api: ApiConfig,
}

impl Config {
    /// Load config from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let engine = EngineConfig {
            collection_name: lookup("COLLECTION_NAME")
                .unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string()),
            default_top_k: parse_or(&lookup, "DEFAULT_TOP_K", DEFAULT_TOP_K)?,
            search_method: match lookup("SEARCH_METHOD") {
                Some(v) => v
                    .parse()
                    .map_err(|e| anyhow::anyhow!("SEARCH_METHOD: {}", e))?,
                None => SearchMethod::default(),
            },
            embedding_dims: parse_or(&lookup, "EMBEDDING_DIMS", DEFAULT_EMBEDDING_DIMS)?,
            distance_metric: match lookup("DISTANCE_METRIC") {
                Some(v) => v
                    .parse()
                    .map_err(|e| anyhow::anyhow!("DISTANCE_METRIC: {}", e))?,
                None => DistanceMetric::default(),
            },
        };

        if engine.collection_name.trim().is_empty() {
            anyhow::bail!("COLLECTION_NAME must not be empty");
        }
        if engine.default_top_k == 0 {
            anyhow::bail!("DEFAULT_TOP_K must be positive");
        }
        if engine.embedding_dims == 0 {
            anyhow::bail!("EMBEDDING_DIMS must be positive");
        }

        let acl = AclConfig {
            path: lookup("ACL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ACL_PATH)),
        };

        let ingest = IngestConfig {
            resources_dir: lookup("RESOURCES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RESOURCES_DIR)),
            snapshot_path: lookup("SNAPSHOT_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            init_on_start: parse_bool_or(&lookup, "INIT_ON_START", true)?,
        };

        let api = ApiConfig {
            host: lookup("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "API_PORT", DEFAULT_PORT)?,
        };

        Ok(Self {
            engine,
            acl,
            ingest,
            api,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, v)),
        None => Ok(default),
    }
}

fn parse_bool_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> anyhow::Result<bool> {
    match lookup(key).as_deref().map(str::trim) {
        None => Ok(default),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some("false") | Some("0") | Some("no") => Ok(false),
        Some(other) => anyhow::bail!("invalid value for {}: {:?}", key, other),
    }
}

/// Search and index configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub collection_name: String,
    pub default_top_k: usize,
    pub search_method: SearchMethod,
    pub embedding_dims: usize,
    pub distance_metric: DistanceMetric,
}

/// ACL source
#[derive(Debug, Clone)]
pub struct AclConfig {
    pub path: PathBuf,
}

/// Resource ingestion and persistence
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub resources_dir: PathBuf,
    /// Snapshot written on shutdown and restored on startup, if set
    pub snapshot_path: Option<PathBuf>,
    /// Reset the collection and ingest `resources_dir` at startup
    ///
    /// Ignored when a snapshot was restored from `snapshot_path`.
    pub init_on_start: bool,
}

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl ApiConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
