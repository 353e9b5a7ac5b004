//! 性能门禁探针
//! 度量页面与接口延迟，写入 CSV，超过阈值时以退出码 1 结束
//!
//! 有路由配置时只测试暂存区改动触发的路由，没有相关改动直接以 0 退出

use clap::Parser;
use perf_testbed::{
    config::LoggingConfig,
    infrastructure::Logger,
    probe::{self, ProbeOptions, RouteSelection, RouteTarget, Verdict},
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "probe", version, about = "Measure testbed performance")]
struct Cli {
    /// 目标服务地址
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    url: String,

    /// 没有路由配置时要测试的路由，可重复指定
    #[arg(long = "route", default_value = "/")]
    routes: Vec<String>,

    /// 路由配置文件，缺省时查找 perf-routes.toml 和 ./config/perf-routes.toml
    #[arg(long)]
    routes_config: Option<PathBuf>,

    /// 接口延迟阈值（毫秒），路由配置未指定阈值时也使用它
    #[arg(long, default_value_t = 200)]
    max_latency_ms: u64,

    /// 提交标识
    #[arg(long, default_value = "manual")]
    commit: String,

    /// CSV 输出路径
    #[arg(long, default_value = "performance_log.csv")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let _guard = Logger::init(&LoggingConfig {
        file_output: false,
        ..LoggingConfig::default()
    })?;

    let routes_config = probe::load_routes_config(cli.routes_config.as_deref())?;
    let changed = match routes_config {
        Some(_) => probe::staged_files(Path::new(".")),
        None => None,
    };

    let targets: Vec<RouteTarget> =
        match probe::select_routes(routes_config.as_ref(), changed.as_deref()) {
            RouteSelection::NoRelevantChanges => {
                info!("✅ No relevant changes detected. Skipping performance test.");
                return Ok(ExitCode::SUCCESS);
            }
            RouteSelection::Routes(routes) => routes
                .iter()
                .map(|route| route.target(cli.max_latency_ms))
                .collect(),
            RouteSelection::Fallback => cli
                .routes
                .into_iter()
                .map(|route| RouteTarget {
                    route,
                    max_latency_ms: cli.max_latency_ms,
                })
                .collect(),
        };

    let options = ProbeOptions {
        base_url: cli.url,
        targets,
        commit: cli.commit,
        output: cli.output,
    };

    match probe::run(&options).await? {
        Verdict::Passed => Ok(ExitCode::SUCCESS),
        Verdict::Regression { .. } => Ok(ExitCode::FAILURE),
    }
}
