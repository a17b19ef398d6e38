use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use uvtt_core::uvtt::DEFAULT_FORMAT_VERSION;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `UVTT_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("UVTT_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 输出文件相关配置。
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// UVTT `format` 字段，需与目标导入工具的版本核对。
    #[serde(default = "OutputConfig::default_format_version")]
    pub format_version: f64,
    /// 未指定输出路径时替换输入文件扩展名所用的扩展名。
    #[serde(default = "OutputConfig::default_extension")]
    pub extension: String,
    /// JSON 缩进空格数，0 表示单行输出。
    #[serde(default = "OutputConfig::default_indent")]
    pub indent: usize,
    #[serde(default = "OutputConfig::default_create_missing_dirs")]
    pub create_missing_dirs: bool,
}

impl OutputConfig {
    fn default_format_version() -> f64 {
        DEFAULT_FORMAT_VERSION
    }

    fn default_extension() -> String {
        "uvtt".to_string()
    }

    fn default_indent() -> usize {
        4
    }

    fn default_create_missing_dirs() -> bool {
        true
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format_version: Self::default_format_version(),
            extension: Self::default_extension(),
            indent: Self::default_indent(),
            create_missing_dirs: Self::default_create_missing_dirs(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
