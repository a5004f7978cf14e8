//! # Lifecycle CLI
//!
//! 生命周期声明的 headless 宿主：校验声明，或按固定帧率模拟一次运行。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p lifecycle-cli -- check lifecycle-cli/decls/panel.json
//! cargo run -p lifecycle-cli -- simulate lifecycle-cli/decls/panel.json --fps 60 --until 1500 \
//!     --request 300:hidden --request 450:default
//! cargo run -p lifecycle-cli -- -vv simulate lifecycle-cli/decls/panel.json
//! ```
//!
//! `simulate` 每输出一帧打印一行 JSON：
//! `{"t":..,"state":..,"phase":..,"vector":{..}}`

mod simulate;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lifecycle_runtime::LifecycleDecl;
use tracing::{Level, info};

use simulate::{Request, SimulationPlan, simulate};

#[derive(Parser)]
#[command(name = "lifecycle")]
#[command(about = "动画生命周期声明工具 - 校验声明并模拟帧驱动的状态过渡")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 日志详细程度（-v info，-vv debug，-vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 校验声明并列出状态与过渡
    Check {
        /// 声明文件（JSON）
        decl: PathBuf,
    },

    /// 模拟一次运行，逐帧输出向量
    Simulate {
        /// 声明文件（JSON）
        decl: PathBuf,

        /// 帧率
        #[arg(long, default_value = "60")]
        fps: u32,

        /// 模拟结束时刻（毫秒）
        #[arg(long, default_value = "2000")]
        until: f64,

        /// 状态请求，格式 MS:STATE，可重复
        #[arg(short, long = "request")]
        requests: Vec<Request>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = real_main(cli) {
        eprintln!("❌ {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Check { decl } => check(&decl),
        Commands::Simulate {
            decl,
            fps,
            until,
            requests,
        } => {
            let plan = SimulationPlan {
                fps,
                until_ms: until,
                requests,
            };
            let samples = simulate(load(&decl)?, &plan)?;

            let mut out = io::stdout().lock();
            for sample in &samples {
                serde_json::to_writer(&mut out, sample)?;
                writeln!(out)?;
            }
            info!(frames = samples.len(), "模拟完成");
            Ok(())
        }
    }
}

fn load(path: &Path) -> anyhow::Result<LifecycleDecl> {
    LifecycleDecl::load(path).with_context(|| format!("无法加载声明 {}", path.display()))
}

/// 校验声明并打印摘要
fn check(path: &Path) -> anyhow::Result<()> {
    let lifecycle = load(path)?
        .into_builder()
        .build()
        .context("生命周期声明无效")?;

    let states = lifecycle.states();
    let (initial, _) = states.initial();
    println!("✅ {} 校验通过", path.display());
    println!("状态 ({}):", states.len());
    for (name, vector) in states.iter() {
        let marker = if name == initial { " (初始)" } else { "" };
        println!("  {name}{marker}: {vector}");
    }
    if states.animates_on_mount() {
        println!("挂载时自动过渡: mount -> default");
    }

    let engine = lifecycle.engine();
    println!("过渡 ({}):", lifecycle.transitions().len());
    for (from, spec) in lifecycle.transitions().iter() {
        let resolved = lifecycle.transitions().resolve(from, &spec.to, engine);
        println!(
            "  {from} -> {}: {}ms {}",
            spec.to, resolved.duration_ms, resolved.easing
        );
    }
    println!(
        "默认过渡: {}ms {}",
        engine.default_duration_ms, engine.default_easing
    );
    Ok(())
}
