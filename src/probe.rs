//! 性能门禁探针
//!
//! 对每个路由：
//! 1. 请求页面，记录完整响应耗时和页面大小
//! 2. 页面带有产品列表时，挂载一个走 HTTP 的列表视图，记录从挂载到结束的接口延迟；
//!    静态页面不会请求接口，接口延迟记为 0
//! 3. 结果追加写入 CSV，接口延迟超过该路由的阈值即判定为性能回归
//!
//! 路由可以来自路由配置文件（TOML）。配合 `git diff --name-only --cached`，
//! 只测试暂存区改动触发的路由；没有配置或读不到暂存文件时按单一路由模式运行。
//!
//! 同一时间只允许一个探针运行，通过锁文件互斥。

use chrono::Local;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::app::pages::layout::FEATURE_LIST_SLOT_ID;
use crate::views::{FeatureList, HttpProductSource, ListState};

pub const LOCK_FILE_NAME: &str = "performance_test.lock";

/// 默认查找的路由配置文件
const ROUTES_CONFIG_PATHS: [&str; 2] = ["perf-routes.toml", "./config/perf-routes.toml"];

/// 一个待测路由及其延迟阈值
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTarget {
    pub route: String,
    pub max_latency_ms: u64,
}

/// 探针运行参数
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub base_url: String,
    pub targets: Vec<RouteTarget>,
    pub commit: String,
    pub output: PathBuf,
}

/// 路由配置文件
///
/// ```toml
/// global_triggers = ["src/app/mod.rs", "Cargo.toml"]
///
/// [[routes]]
/// name = "Home"
/// url = "/"
/// max_latency_ms = 2500
/// trigger_files = ["src/app/pages", "src/views"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// 任一暂存文件命中即测试全部路由
    pub global_triggers: Vec<String>,
    pub routes: Vec<RouteSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteSpec {
    pub name: String,
    pub url: String,
    /// 缺省时使用命令行阈值
    #[serde(default)]
    pub max_latency_ms: Option<u64>,
    #[serde(default)]
    pub trigger_files: Vec<String>,
}

impl RouteSpec {
    pub fn target(&self, default_limit_ms: u64) -> RouteTarget {
        RouteTarget {
            route: self.url.clone(),
            max_latency_ms: self.max_latency_ms.unwrap_or(default_limit_ms),
        }
    }
}

impl RoutesConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProbeError> {
        let content = fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| ProbeError::RoutesConfig(e.to_string()))
    }
}

/// 路由选择结果
#[derive(Debug, Clone, PartialEq)]
pub enum RouteSelection {
    /// 没有路由配置或读不到暂存文件，按命令行的单一路由模式运行
    Fallback,
    /// 暂存文件没有命中任何触发器
    NoRelevantChanges,
    Routes(Vec<RouteSpec>),
}

/// 单个路由的一次度量结果，对应 CSV 的一行
#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub timestamp: String,
    pub commit_id: String,
    pub route: String,
    pub page_load_ms: f64,
    pub page_size_kb: f64,
    pub api_latency_ms: f64,
    pub items: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Passed,
    Regression {
        route: String,
        latency_ms: f64,
        limit_ms: u64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("已有性能测试在运行 (锁文件: {0})")]
    Locked(PathBuf),
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),
    #[error("页面请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("路由配置解析错误: {0}")]
    RoutesConfig(String),
}

/// 运行锁，离开作用域时删除锁文件
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, ProbeError> {
        let path = path.into();
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(ProbeError::Locked(path)),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("无法删除锁文件 {}: {}", self.path.display(), e);
        }
    }
}

/// 加载路由配置：显式路径必须存在；否则按默认路径查找，找不到返回 `None`
pub fn load_routes_config(explicit: Option<&Path>) -> Result<Option<RoutesConfig>, ProbeError> {
    if let Some(path) = explicit {
        return RoutesConfig::load_from_file(path).map(Some);
    }

    for path in ROUTES_CONFIG_PATHS {
        if Path::new(path).exists() {
            info!("从路由配置加载: {}", path);
            return RoutesConfig::load_from_file(path).map(Some);
        }
    }

    warn!("未找到路由配置文件，测试命令行指定的路由");
    Ok(None)
}

/// 读取暂存区改动的文件列表，不是 git 仓库或 git 出错时返回 `None`
pub fn staged_files(repo_dir: &Path) -> Option<Vec<String>> {
    let output = match Command::new("git")
        .current_dir(repo_dir)
        .args(["diff", "--name-only", "--cached"])
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            warn!("无法执行 git: {}，视为全部文件已改动", e);
            return None;
        }
    };

    if !output.status.success() {
        warn!("不是 git 仓库或 git 出错，视为全部文件已改动");
        return None;
    }

    Some(
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// 根据暂存文件挑选要测试的路由，触发器按子串匹配文件路径
pub fn select_routes(config: Option<&RoutesConfig>, changed: Option<&[String]>) -> RouteSelection {
    let (Some(config), Some(changed)) = (config, changed) else {
        return RouteSelection::Fallback;
    };

    for file in changed {
        if let Some(trigger) = config
            .global_triggers
            .iter()
            .find(|trigger| file.contains(trigger.as_str()))
        {
            info!("全局触发器 {} 命中: {}，测试全部路由", trigger, file);
            return RouteSelection::Routes(config.routes.clone());
        }
    }

    let selected: Vec<RouteSpec> = config
        .routes
        .iter()
        .filter(|route| {
            route
                .trigger_files
                .iter()
                .any(|trigger| changed.iter().any(|file| file.contains(trigger.as_str())))
        })
        .cloned()
        .collect();

    if selected.is_empty() {
        RouteSelection::NoRelevantChanges
    } else {
        RouteSelection::Routes(selected)
    }
}

/// 页面是否挂载了产品列表
fn has_feature_list(page: &[u8]) -> bool {
    let marker = format!(r#"id="{}""#, FEATURE_LIST_SLOT_ID);
    String::from_utf8_lossy(page).contains(&marker)
}

/// 度量单个路由
pub async fn measure_route(
    client: &Client,
    base_url: &str,
    route: &str,
    commit: &str,
) -> Result<Measurement, ProbeError> {
    let base = base_url.trim_end_matches('/');
    let url = format!("{}{}", base, route);

    let start = Instant::now();
    let page = client.get(&url).send().await?.error_for_status()?.bytes().await?;
    let page_load = start.elapsed();

    let (api_latency_ms, items) = if has_feature_list(&page) {
        let mut view = FeatureList::new(Arc::new(HttpProductSource::with_client(
            client.clone(),
            base,
        )));
        let start = Instant::now();
        view.attach();
        view.settled().await;
        let api_latency = start.elapsed();

        let items = match view.state() {
            ListState::Loaded(products) => products.len(),
            ListState::Loading => 0,
        };
        (round2(api_latency.as_secs_f64() * 1000.0), items)
    } else {
        info!("{} 没有产品列表，不请求接口", route);
        (0.0, 0)
    };

    Ok(Measurement {
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        commit_id: commit.to_string(),
        route: route.to_string(),
        page_load_ms: round2(page_load.as_secs_f64() * 1000.0),
        page_size_kb: round2(page.len() as f64 / 1024.0),
        api_latency_ms,
        items,
    })
}

/// 接口延迟超过阈值即为回归
pub fn evaluate(measurement: &Measurement, max_latency_ms: u64) -> Verdict {
    if measurement.api_latency_ms > max_latency_ms as f64 {
        Verdict::Regression {
            route: measurement.route.clone(),
            latency_ms: measurement.api_latency_ms,
            limit_ms: max_latency_ms,
        }
    } else {
        Verdict::Passed
    }
}

/// 追加一行度量结果，文件不存在或为空时先写表头
pub fn append_csv(path: &Path, measurement: &Measurement) -> Result<(), ProbeError> {
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer.serialize(measurement)?;
    writer.flush()?;

    Ok(())
}

/// 依次度量所有路由，遇到第一个回归立即停止
pub async fn run(options: &ProbeOptions) -> Result<Verdict, ProbeError> {
    let lock_path = options
        .output
        .parent()
        .map(|dir| dir.join(LOCK_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(LOCK_FILE_NAME));
    let _lock = RunLock::acquire(lock_path)?;

    let client = Client::new();

    for target in &options.targets {
        info!(
            "--- 测试路由: {} (最大延迟: {}ms) ---",
            target.route, target.max_latency_ms
        );

        let measurement =
            measure_route(&client, &options.base_url, &target.route, &options.commit).await?;
        info!("度量结果: {:?}", measurement);

        append_csv(&options.output, &measurement)?;
        info!("结果已写入 {}", options.output.display());

        let verdict = evaluate(&measurement, target.max_latency_ms);
        if let Verdict::Regression {
            route,
            latency_ms,
            limit_ms,
        } = &verdict
        {
            error!(
                "[FAILED] PERFORMANCE REGRESSION DETECTED! {} API Latency is {}ms (Limit: {}ms).",
                route, latency_ms, limit_ms
            );
            return Ok(verdict);
        }
    }

    info!("[SUCCESS] Performance check passed.");
    Ok(Verdict::Passed)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn measurement(latency: f64) -> Measurement {
        Measurement {
            timestamp: "2026-01-01 00:00:00".to_string(),
            commit_id: "abc123".to_string(),
            route: "/".to_string(),
            page_load_ms: 12.5,
            page_size_kb: 3.2,
            api_latency_ms: latency,
            items: 20,
        }
    }

    fn routes_config() -> RoutesConfig {
        toml::from_str(
            r#"
global_triggers = ["Cargo.toml"]

[[routes]]
name = "Home"
url = "/"
max_latency_ms = 2500
trigger_files = ["src/app/pages", "src/views"]

[[routes]]
name = "About"
url = "/about"
trigger_files = ["src/app/pages/layout.rs"]
"#,
        )
        .unwrap()
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_evaluate_threshold() {
        assert_eq!(evaluate(&measurement(150.0), 200), Verdict::Passed);
        assert_eq!(evaluate(&measurement(200.0), 200), Verdict::Passed);
        assert_eq!(
            evaluate(&measurement(2004.31), 200),
            Verdict::Regression {
                route: "/".to_string(),
                latency_ms: 2004.31,
                limit_ms: 200,
            }
        );
    }

    #[test]
    fn test_append_csv_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("performance_log.csv");

        append_csv(&path, &measurement(10.0)).unwrap();
        append_csv(&path, &measurement(20.0)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,commit_id,route,page_load_ms,page_size_kb,api_latency_ms,items"
        );
        assert!(lines[1].ends_with(",10.0,20"));
        assert!(lines[2].ends_with(",20.0,20"));
    }

    #[test]
    fn test_append_csv_writes_header_into_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("performance_log.csv");
        fs::write(&path, "").unwrap();

        append_csv(&path, &measurement(10.0)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("timestamp,commit_id,route"));
    }

    #[test]
    fn test_run_lock_is_exclusive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let lock = RunLock::acquire(&path).unwrap();
        assert!(matches!(RunLock::acquire(&path), Err(ProbeError::Locked(_))));

        drop(lock);
        assert!(!path.exists());
        assert!(RunLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(2000.005_1), 2000.01);
    }

    #[test]
    fn test_route_spec_threshold_defaults() {
        let config = routes_config();
        assert_eq!(
            config.routes[0].target(200),
            RouteTarget {
                route: "/".to_string(),
                max_latency_ms: 2500,
            }
        );
        assert_eq!(config.routes[1].target(200).max_latency_ms, 200);
    }

    #[test]
    fn test_select_routes_falls_back_without_config_or_changes() {
        let config = routes_config();
        let changed = files(&["src/views/heavy.rs"]);

        assert_eq!(select_routes(None, Some(changed.as_slice())), RouteSelection::Fallback);
        assert_eq!(select_routes(Some(&config), None), RouteSelection::Fallback);
    }

    #[test]
    fn test_select_routes_by_trigger_files() {
        let config = routes_config();

        let changed = files(&["src/views/heavy.rs"]);
        assert_eq!(
            select_routes(Some(&config), Some(changed.as_slice())),
            RouteSelection::Routes(vec![config.routes[0].clone()])
        );

        let changed = files(&["src/app/pages/layout.rs"]);
        assert_eq!(
            select_routes(Some(&config), Some(changed.as_slice())),
            RouteSelection::Routes(config.routes.clone())
        );
    }

    #[test]
    fn test_select_routes_global_trigger_selects_all() {
        let config = routes_config();
        let changed = files(&["README.md", "Cargo.toml"]);

        assert_eq!(
            select_routes(Some(&config), Some(changed.as_slice())),
            RouteSelection::Routes(config.routes.clone())
        );
    }

    #[test]
    fn test_select_routes_no_relevant_changes() {
        let config = routes_config();

        let changed = files(&["README.md"]);
        assert_eq!(
            select_routes(Some(&config), Some(changed.as_slice())),
            RouteSelection::NoRelevantChanges
        );
        assert_eq!(
            select_routes(Some(&config), Some(&Vec::<String>::new()[..])),
            RouteSelection::NoRelevantChanges
        );
    }

    #[test]
    fn test_load_routes_config_from_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        fs::write(&path, "[[routes]]\nname = \"Products\"\nurl = \"/products\"\n").unwrap();

        let config = load_routes_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].url, "/products");
        assert!(config.global_triggers.is_empty());

        fs::write(&path, "[[routes]\n").unwrap();
        assert!(matches!(
            load_routes_config(Some(&path)),
            Err(ProbeError::RoutesConfig(_))
        ));
    }

    #[test]
    fn test_staged_files_outside_repository() {
        let dir = tempdir().unwrap();
        assert_eq!(staged_files(dir.path()), None);
    }

    #[test]
    fn test_has_feature_list() {
        assert!(has_feature_list(br#"<section id="feature-list">"#));
        assert!(!has_feature_list(b"<div class=\"content\">Our Mission</div>"));
    }
}
