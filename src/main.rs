use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use generate_problem::{logger, App, Config};

#[derive(Parser, Debug)]
#[command(name = "generate-problem", version, about = "把题目提案转换成题目")]
struct Cli {
    /// TOML 配置文件，环境变量优先于文件
    #[arg(short, long, env = "GENERATE_PROBLEM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 处理所有待处理提案（默认）
    Run,
    /// 只下载一局的对局日志
    Download {
        table_id: String,

        /// 输出目录
        #[arg(short, long, default_value = "data")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref())?;

    let app = App::initialize(config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let report = app.run().await.map_err(|e| {
                error!("❌ 运行中止: {}", e);
                e
            })?;
            if !report.is_clean() {
                info!("部分提案处理失败，详见 warn 文件");
            }
        }
        Command::Download { table_id, out } => {
            let path = app.download(&table_id, &out).await?;
            info!("✓ 已下载: {}", path.display());
        }
    }

    Ok(())
}
