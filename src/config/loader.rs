use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::{AppConfig, KeyFile};

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["kepler.toml", "config/kepler.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置失败 {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("解析配置失败 {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("解析密钥文件失败 {path}: {source}")]
    KeyFile {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("密钥文件缺少 `{0}`")]
    Missing(&'static str),
    #[error("`{field}` 无效: {reason}")]
    InvalidKey { field: String, reason: String },
}

pub fn load_config(path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let candidate_paths = match path {
        Some(p) => vec![p],
        None => DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .collect::<Vec<PathBuf>>(),
    };

    for candidate in candidate_paths {
        if let Some(config) = try_load_file(&candidate)? {
            debug!(target: "config", path = %candidate.display(), "已加载配置");
            return Ok(config);
        }
    }

    Ok(AppConfig::default())
}

fn try_load_file(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: AppConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(config))
}

/// 读取钱包与代币密钥文件；与应用配置不同，它没有默认值。
pub fn load_key_file(path: &Path) -> Result<KeyFile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::KeyFile {
        path: path.to_path_buf(),
        source,
    })
}
