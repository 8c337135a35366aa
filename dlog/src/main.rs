//! dlog 命令行工具
//!
//! 用法：
//!   dlog                                  # 默认自测（写入 30 条后全部读出，容量 20）
//!   dlog test -n 100                      # 写入 N 条生成的消息，再按顺序读出
//!   dlog put "msg1" "msg2"                # 写入消息
//!   dlog get [-n 3 | --all]               # 读出消息
//!   dlog stats                            # 显示统计
//!
//! 公共参数：-f 文件名 -s 容量 -c 配置文件(JSON) --no-overwrite --no-auto-clear

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dlog::store::resolve_log_path;
use dlog::{DLog, DlogConfig, DlogError};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "dlog")]
#[command(about = "Persistent fixed-capacity FIFO message log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 日志文件名（无 .log 扩展名时自动追加）
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// 容量（槽位数），仅在创建新文件时生效
    #[arg(short, long, global = true)]
    size: Option<u32>,

    /// JSON 配置文件
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 写满时拒绝写入而不是覆盖最旧的消息
    #[arg(long, global = true)]
    no_overwrite: bool,

    /// 写入后不清除槽位中的残留字符
    #[arg(long, global = true)]
    no_auto_clear: bool,

    /// 详细输出
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 写入 N 条生成的消息，再全部读出
    Test {
        /// 写入条数
        #[arg(short, long, default_value_t = DEFAULT_TEST_COUNT)]
        n: u32,
    },

    /// 写入消息
    Put {
        /// 消息内容
        #[arg(required = true)]
        messages: Vec<String>,
    },

    /// 读出消息
    Get {
        /// 读取条数
        #[arg(short, long, default_value_t = 1)]
        n: u32,

        /// 读出全部
        #[arg(short, long)]
        all: bool,
    },

    /// 显示统计信息（文件不存在时报错，不会创建）
    Stats,
}

// 默认参数
const DEFAULT_TEST_NAME: &str = "mylog";
const DEFAULT_TEST_COUNT: u32 = 30;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = build_config(&cli)?;

    match cli.command {
        // 无子命令时，默认执行自测
        None => cmd_test(&config, DEFAULT_TEST_COUNT),
        Some(Commands::Test { n }) => cmd_test(&config, n),
        Some(Commands::Put { ref messages }) => cmd_put(&config, messages),
        Some(Commands::Get { n, all }) => cmd_get(&config, if all { None } else { Some(n) }),
        Some(Commands::Stats) => cmd_stats(&config),
    }
}

/// 合并配置文件和命令行参数
fn build_config(cli: &Cli) -> Result<DlogConfig> {
    let mut config = match &cli.config {
        Some(path) => DlogConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DlogConfig {
            path: PathBuf::from(DEFAULT_TEST_NAME),
            ..DlogConfig::default()
        },
    };

    if let Some(file) = &cli.file {
        config.path = file.clone();
    }
    if let Some(size) = cli.size {
        config.capacity = size;
    }
    if cli.no_overwrite {
        config.overwrite = false;
    }
    if cli.no_auto_clear {
        config.auto_clear = false;
    }
    Ok(config)
}

fn open(config: &DlogConfig) -> Result<DLog> {
    let log = DLog::open_with(config).map_err(|e| {
        let status = e.status();
        anyhow::Error::new(e).context(format!("dlog_open failed ({})", status))
    })?;
    Ok(log)
}

/// 写入 N 条消息后全部读出
fn cmd_test(config: &DlogConfig, n: u32) -> Result<()> {
    let mut log = open(config)?;
    info!(
        "dlog: writing {} messages to {} (capacity {})",
        n,
        log.path().map(|p| p.display().to_string()).unwrap_or_default(),
        log.capacity()
    );

    let mut written = 0u32;
    for i in 1..=n {
        let msg = format!("Test message{}", i);
        match log.put(&msg) {
            Ok(()) => written += 1,
            Err(e) => {
                eprintln!("dlog_put FAILED: {} ({})", e, e.status());
                break;
            }
        }
    }

    let mut read = 0u32;
    loop {
        match log.get_message() {
            Ok(msg) => {
                println!("{}", msg);
                read += 1;
            }
            Err(DlogError::EmptyQueue) => break,
            Err(e) => {
                eprintln!("dlog_get FAILED: {} ({})", e, e.status());
                break;
            }
        }
    }

    info!("dlog: wrote {}, read back {}", written, read);
    log.close()?;
    Ok(())
}

fn cmd_put(config: &DlogConfig, messages: &[String]) -> Result<()> {
    let mut log = open(config)?;
    for msg in messages {
        log.put(msg)
            .map_err(|e| {
                let status = e.status();
                anyhow::Error::new(e).context(format!("dlog_put failed ({})", status))
            })?;
    }
    info!("dlog: {} / {} messages queued", log.len(), log.capacity());
    log.close()?;
    Ok(())
}

/// 读取 `limit` 条，`None` 表示全部
fn cmd_get(config: &DlogConfig, limit: Option<u32>) -> Result<()> {
    let mut log = open(config)?;
    let mut read = 0u32;
    while limit.map_or(true, |l| read < l) {
        match log.get_message() {
            Ok(msg) => {
                println!("{}", msg);
                read += 1;
            }
            Err(DlogError::EmptyQueue) => {
                if read == 0 {
                    eprintln!("dlog: queue is empty");
                }
                break;
            }
            Err(e) => {
                let status = e.status();
                return Err(anyhow::Error::new(e).context(format!("dlog_get failed ({})", status)));
            }
        }
    }
    log.close()?;
    Ok(())
}

/// 只读命令不创建新文件
fn require_existing(config: &DlogConfig) -> Result<()> {
    let path = resolve_log_path(&config.path);
    if !path.is_file() {
        bail!("log file {} does not exist", path.display());
    }
    Ok(())
}

fn cmd_stats(config: &DlogConfig) -> Result<()> {
    require_existing(config)?;
    let log = open(config)?;
    if let Some(path) = log.path() {
        println!("File: {}", path.display());
    }
    print!("{}", log.stats());
    log.close()?;
    Ok(())
}
