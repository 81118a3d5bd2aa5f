mod logger;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;
use clap::Parser;
use crossbeam_channel::bounded;
use dotenv::dotenv;
use log::{error, info, warn};

use pumpjack_monitor::config::{AppConfig, ConfigManager};
use pumpjack_monitor::pipeline::{run_analysis_handler, video_id_for, AnalysisOutcome, AnalysisTask};

/// 分析检测文件，输出抽油机开关机状态和冲次
#[derive(Parser, Debug)]
#[command(name = "pumpjack-monitor", version, about)]
struct Cli {
    /// TOML 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 源视频帧率（覆盖配置和环境变量）
    #[arg(long)]
    fps: Option<f64>,

    /// 报告根目录
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// 无论开关机状态都计算冲次
    #[arg(long)]
    no_gate: bool,

    /// 不写报告文件
    #[arg(long)]
    no_export: bool,

    /// 把最终生效的配置写到该文件
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// 日志详细程度（-v, -vv）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// detections.txt 文件
    #[arg(required = true)]
    detections: Vec<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut manager = match &cli.config {
        Some(path) => ConfigManager::load_from_file(path)?,
        None => ConfigManager::new(),
    };
    if let Some(path) = manager.config_path() {
        info!("Configuration loaded from {}", path.display());
    }

    let config = manager.get_config_mut();
    config.apply_env_overrides()?;
    if let Some(fps) = cli.fps {
        config.analysis.fps = fps;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.display().to_string();
    }
    if cli.no_gate {
        config.analysis.gate_cycle_on_activity = false;
    }
    config.validate()?;

    Ok(manager.get_config().clone())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok(); // 加载 .env 文件
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);
    info!("pumpjack-monitor starting");

    let config = load_config(&cli)?;
    if let Some(path) = &cli.write_config {
        config.save_to_file(path)?;
        info!("Effective configuration written to {}", path.display());
    }
    info!(
        "fps={} bpm=[{}, {}] smooth_win={} gate={}",
        config.analysis.fps,
        config.analysis.cycle.bpm_min,
        config.analysis.cycle.bpm_max,
        config.analysis.cycle.smooth_win,
        config.analysis.gate_cycle_on_activity
    );

    let output_root = config.get_output_directory();
    let (task_sender, task_receiver) = bounded(cli.detections.len() + 1);
    let (outcome_sender, outcome_receiver) = bounded(cli.detections.len());
    let shutdown_signal = Arc::new(AtomicBool::new(false));

    let handler_config = config.clone();
    let handler_shutdown = Arc::clone(&shutdown_signal);
    let handle = thread::spawn(move || {
        run_analysis_handler(task_receiver, outcome_sender, handler_config, handler_shutdown)
    });

    for source in &cli.detections {
        let output_dir = (!cli.no_export).then(|| output_root.join(video_id_for(source)));
        task_sender.send(AnalysisTask::Analyze { source: source.clone(), output_dir })?;
    }
    task_sender.send(AnalysisTask::Shutdown)?;

    let mut failures = 0;
    for outcome in outcome_receiver.iter() {
        match outcome {
            AnalysisOutcome::Success { report, written } => {
                println!("{}", report.summary());
                for path in written {
                    info!("  - {}", path.display());
                }
            }
            AnalysisOutcome::Failure { source, reason } => {
                error!("{}: {}", source.display(), reason);
                failures += 1;
            }
        }
    }

    if handle.join().is_err() {
        error!("Analysis handler thread panicked");
        std::process::exit(1);
    }
    if failures > 0 {
        warn!("{} of {} files failed", failures, cli.detections.len());
        std::process::exit(1);
    }
    info!("Done: {} files analysed", cli.detections.len());
    Ok(())
}
