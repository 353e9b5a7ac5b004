use clap::Parser;
use perf_testbed::{config, infrastructure::Logger, router, AppState};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;

/// 性能测试平台服务器
#[derive(Parser, Debug)]
#[command(name = "testbed", version)]
struct Cli {
    /// 配置文件路径（默认查找 config.toml、./config/config.toml）
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) = config::load_config(cli.config.as_deref())?;
    config.validate()?;

    let _guard = Logger::init(&config.logging)?;

    match source {
        Some(path) => info!("从配置文件加载: {}", path.display()),
        None => info!("未找到配置文件，使用默认配置"),
    }

    let addr = config.http.socket_addr()?;
    let app = router(AppState::from_config(&config), config.http.timeout());

    let listener = TcpListener::bind(addr).await?;

    info!("🚀 测试平台运行在 http://{}", addr);
    info!("📖 可用的路由:");
    info!("   GET  /              - 首页");
    info!("   GET  /products      - 产品页");
    info!("   GET  /about         - 静态对照页");
    info!("   GET  /api/products  - 模拟慢查询 ({}ms)", config.catalog.delay_ms);
    info!("   GET  /health        - 健康检查");
    if config.regression.blocking_delay {
        info!("⚠️ 已启用阻塞延迟回归 ({}ms)", config.regression.blocking_delay_ms);
    }
    if config.regression.bulk_render {
        info!("⚠️ 已启用批量渲染回归 ({} 条)", config.regression.bulk_item_count);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
