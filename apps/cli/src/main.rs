//! # AK CLI
//!
//! AK 系列关节电机命令行工具（One-shot 模式）。
//!
//! ```bash
//! # 使能、标零、发送一条指令
//! ak-cli --interface can0 --id 1 --model AK80_9_V2 enable
//! ak-cli --id 1 zero
//! ak-cli --id 1 move --pos 0.5 --kp 50 --kd 1
//!
//! # 离线查看指令帧
//! ak-cli --model AK80_9_V2 encode --pos 0 --kp 250
//! ```
//!
//! 日志输出到 stderr，级别由 `RUST_LOG` 控制。

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod session;
mod settings;

use commands::{EncodeCommand, MoveCommand};
use config::CliConfig;
use settings::{GlobalArgs, Settings};

const DEFAULT_LOG_FILTER: &str = "ak_cli=info,ak_driver=info,ak_can=warn";

/// AK CLI - 关节电机命令行工具
#[derive(Parser, Debug)]
#[command(name = "ak-cli")]
#[command(about = "Command-line interface for AK-series actuators over CAN", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 进入 MIT 模式
    Enable,

    /// 退出 MIT 模式
    Disable,

    /// 将当前位置设为零点
    Zero,

    /// 发送一条 MIT 指令
    Move {
        #[command(flatten)]
        args: MoveCommand,
    },

    /// 列出内置型号与自定义标定
    Profiles,

    /// 离线编码指令帧（十六进制输出）
    Encode {
        #[command(flatten)]
        args: EncodeCommand,
    },
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.global.config.as_deref())?;

    if let Commands::Profiles = cli.command {
        return commands::profiles::list(&config);
    }

    let settings = Settings::resolve(&cli.global, &config)?;
    match cli.command {
        Commands::Enable => commands::motor::enable(&settings),
        Commands::Disable => commands::motor::disable(&settings),
        Commands::Zero => commands::motor::zero(&settings),
        Commands::Move { args } => args.execute(&settings),
        Commands::Encode { args } => args.execute(&settings),
        Commands::Profiles => commands::profiles::list(&config),
    }
}
