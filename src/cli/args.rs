use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "kepler",
    version,
    about = "pump.fun 代币发射器，多钱包买入打包为单个 bundle"
)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（默认 kepler.toml 或 config/kepler.toml）"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 创建代币，并在同一 bundle 中由所有配置钱包买入
    Launch(LaunchArgs),
    /// 查询已提交的 bundle
    Status(StatusArgs),
}

/// 这里给出的代币字段优先于密钥文件。
#[derive(Args, Debug, Default)]
pub struct LaunchArgs {
    #[arg(long, value_name = "FILE", help = "密钥文件路径（覆盖 keys.path）")]
    pub keys: Option<PathBuf>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub ticker: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub twitter: Option<String>,
    #[arg(long)]
    pub telegram: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long, value_name = "FILE", help = "代币图片（覆盖 token.image）")]
    pub image: Option<PathBuf>,
    #[arg(long, help = "以 JSON 形式向 stdout 输出部署结果")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    pub bundle_id: String,
    #[arg(
        long,
        default_value_t = 0u64,
        help = "最终查询前最多轮询 inflight 状态的毫秒数"
    )]
    pub wait_ms: u64,
}
