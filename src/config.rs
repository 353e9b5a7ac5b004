//! 测试平台配置
//!
//! 配置文件为 TOML 格式，按以下顺序查找：
//! 1. 命令行 `--config` 指定的路径
//! 2. `config.toml`
//! 3. `./config/config.toml`
//!
//! 都不存在时使用默认配置
//! （延迟 2000ms、20 条记录、回归组件关闭）。

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认查找的配置文件路径
const CONFIG_PATHS: [&str; 2] = ["config.toml", "./config/config.toml"];

/// 测试平台配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务配置
    pub http: HttpConfig,
    /// 模拟数据接口配置
    pub catalog: CatalogConfig,
    /// 性能回归注入开关
    pub regression: RegressionConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
    /// 请求超时时间（秒）
    pub timeout_seconds: u64,
}

/// 模拟数据接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 每次请求的人为延迟（毫秒）
    pub delay_ms: u64,
    /// 每次返回的记录数
    pub record_count: usize,
}

/// 性能回归注入配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// 首页是否挂载阻塞延迟组件
    pub blocking_delay: bool,
    /// 阻塞时长（毫秒）
    pub blocking_delay_ms: u64,
    /// 首页是否挂载批量渲染组件
    pub bulk_render: bool,
    /// 批量生成的条目数
    pub bulk_item_count: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
    /// 日志目录
    pub log_dir: PathBuf,
    /// 日志文件名前缀
    pub file_prefix: String,
    /// 是否写入滚动日志文件
    pub file_output: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            timeout_seconds: 30,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            record_count: 20,
        }
    }
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            blocking_delay: false,
            blocking_delay_ms: 500,
            bulk_render: false,
            bulk_item_count: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("./logs"),
            file_prefix: "testbed".to_string(),
            file_output: true,
        }
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| ConfigError::Validation(format!("无效的监听地址: {}", e)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl CatalogConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl RegressionConfig {
    pub fn blocking_duration(&self) -> Duration {
        Duration::from_millis(self.blocking_delay_ms)
    }
}

impl Config {
    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::FileWrite(e.to_string()))?;
        }

        fs::write(path.as_ref(), content).map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Validation("绑定地址不能为空".to_string()));
        }
        if self.http.port == 0 {
            return Err(ConfigError::Validation("HTTP端口必须大于0".to_string()));
        }
        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::Validation("请求超时时间必须大于0".to_string()));
        }

        if self.catalog.record_count == 0 {
            return Err(ConfigError::Validation("记录数必须大于0".to_string()));
        }
        if self.catalog.delay_ms >= self.http.timeout_seconds.saturating_mul(1000) {
            return Err(ConfigError::Validation(format!(
                "接口延迟 {}ms 必须小于请求超时 {}s",
                self.catalog.delay_ms, self.http.timeout_seconds
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("文件读取错误: {0}")]
    FileRead(String),
    #[error("文件写入错误: {0}")]
    FileWrite(String),
    #[error("配置解析错误: {0}")]
    Parse(String),
    #[error("配置序列化错误: {0}")]
    Serialize(String),
    #[error("配置验证错误: {0}")]
    Validation(String),
}

/// 从文件或默认值加载配置
///
/// 返回配置以及实际读取的文件路径（使用默认配置时为 `None`）。
/// 日志系统依赖配置初始化，所以这里不打日志，由调用方在初始化后记录来源。
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((Config::load_from_file(path)?, Some(path.to_path_buf())));
    }

    for path in CONFIG_PATHS {
        if Path::new(path).exists() {
            return Ok((Config::load_from_file(path)?, Some(PathBuf::from(path))));
        }
    }

    Ok((Config::default(), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.catalog.delay(), Duration::from_millis(2000));
        assert_eq!(config.catalog.record_count, 20);
        assert!(!config.regression.blocking_delay);
        assert!(!config.regression.bulk_render);
        assert_eq!(config.regression.blocking_duration(), Duration::from_millis(500));
        assert_eq!(config.regression.bulk_item_count, 5000);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.catalog.record_count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.http.port = 0;
        assert!(config.validate().is_err());

        // 延迟不小于超时的配置，接口永远只能返回 408
        let mut config = Config::default();
        config.catalog.delay_ms = 60_000;
        config.http.timeout_seconds = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.catalog.delay_ms = 1_000;
        assert!(config.validate().is_err());

        config.catalog.delay_ms = 999;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("testbed.toml");

        let mut config = Config::default();
        config.catalog.delay_ms = 150;
        config.regression.bulk_render = true;
        config.save_to_file(&config_path).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.catalog.delay_ms, 150);
        assert!(loaded.regression.bulk_render);
        assert_eq!(loaded.http.port, config.http.port);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("partial.toml");
        fs::write(&config_path, "[catalog]\ndelay_ms = 10\n").unwrap();

        let (config, source) = load_config(Some(&config_path)).unwrap();
        assert_eq!(source.as_deref(), Some(config_path.as_path()));
        assert_eq!(config.catalog.delay_ms, 10);
        assert_eq!(config.catalog.record_count, 20);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("broken.toml");
        fs::write(&config_path, "[catalog\n").unwrap();

        assert!(matches!(
            Config::load_from_file(&config_path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::default();
        assert_eq!(
            config.http.socket_addr().unwrap(),
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );

        let mut http = HttpConfig::default();
        http.bind_address = "not an address".to_string();
        assert!(http.socket_addr().is_err());
    }
}
