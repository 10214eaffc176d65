use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "ZVIEW_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tessellation: TessellationConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub text: TextConfig,
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

    /// 自动发现配置文件：优先读取环境变量 `ZVIEW_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        let cwd = env::current_dir().map_err(|source| ConfigError::Context {
            message: "获取当前工作目录失败".to_string(),
            source,
        })?;
        Self::discover_in(env::var_os(CONFIG_ENV), &cwd)
    }

    fn discover_in(explicit: Option<OsString>, cwd: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = cwd.join("config").join("default.toml");
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级（`EnvFilter` 语法）。
#[derive(Debug, Clone, PartialEq, Deserialize)]
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

/// 曲线采样等分数与块嵌套上限。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    pub arc_divisions: usize,
    pub ellipse_divisions: usize,
    pub spline_bezier_divisions: usize,
    pub spline_curve_divisions: usize,
    pub max_block_depth: usize,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            arc_divisions: 32,
            ellipse_divisions: 50,
            spline_bezier_divisions: 50,
            spline_curve_divisions: 100,
            max_block_depth: 32,
        }
    }
}

/// 视口适配使用的画布像素尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// 等宽估算时每个字符的宽度与字高之比。
    pub advance_factor: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            advance_factor: 0.6,
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
