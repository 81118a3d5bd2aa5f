use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{info, error, warn};

use crate::config::AppConfig;
use crate::parser::load_points;
use crate::report::{write_report_json, write_signal_csv};
use super::analysis::{analyze_samples, AnalysisReport};

/// 分析线程任务
#[derive(Clone, Debug)]
pub enum AnalysisTask {
    Analyze {
        source: PathBuf,
        /// 报告输出目录，None 表示不写文件
        output_dir: Option<PathBuf>,
    },
    Shutdown,
}

/// 分析线程返回的结果
#[derive(Debug)]
pub enum AnalysisOutcome {
    Success {
        report: AnalysisReport,
        written: Vec<PathBuf>,
    },
    Failure {
        source: PathBuf,
        reason: String,
    },
}

/// 分析线程主循环：接收任务、分析、写报告、回传结果
///
/// 收到 `Shutdown`、关闭信号置位或所有发送端断开时退出。
pub fn run_analysis_handler(
    task_receiver: Receiver<AnalysisTask>,
    outcome_sender: Sender<AnalysisOutcome>,
    config: AppConfig,
    shutdown_signal: Arc<AtomicBool>,
) {
    info!("Analysis handler thread started");

    while !shutdown_signal.load(Ordering::Relaxed) {
        match task_receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(AnalysisTask::Analyze { source, output_dir }) => {
                let outcome = handle_analyze_task(&config, source, output_dir);
                if let Err(e) = outcome_sender.send(outcome) {
                    // 接收端已关闭，没有人再需要结果
                    warn!("Analysis handler: failed to send outcome: {}", e);
                    break;
                }
            }
            Ok(AnalysisTask::Shutdown) => {
                info!("Analysis handler received shutdown task");
                break;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                info!("Analysis task channel disconnected, handler exiting");
                break;
            }
        }
    }

    info!("Analysis handler thread stopped");
}

fn handle_analyze_task(config: &AppConfig, source: PathBuf, output_dir: Option<PathBuf>) -> AnalysisOutcome {
    let samples = load_points(&source);
    let report = analyze_samples(&source.display().to_string(), &samples, &config.analysis);
    info!("{}", report.summary());

    let Some(dir) = output_dir else {
        return AnalysisOutcome::Success { report, written: Vec::new() };
    };

    let mut written = Vec::new();
    if config.output.write_json {
        match write_report_json(&report, &dir) {
            Ok(path) => written.push(path),
            Err(e) => {
                error!("Failed to write report for {}: {}", source.display(), e);
                return AnalysisOutcome::Failure { source, reason: e.to_string() };
            }
        }
    }
    if config.output.write_signal_csv && !samples.is_empty() {
        match write_signal_csv(&samples, &config.analysis, &dir) {
            Ok(path) => written.push(path),
            Err(e) => {
                error!("Failed to write signal trace for {}: {}", source.display(), e);
                return AnalysisOutcome::Failure { source, reason: e.to_string() };
            }
        }
    }

    AnalysisOutcome::Success { report, written }
}
