use std::path::Path;
use chrono::Utc;
use log::info;
use serde::Serialize;

use crate::activity::classify_activity;
use crate::config::AnalysisConfig;
use crate::parser::load_points;
use crate::signal::bpm_cycle;
use crate::types::{ActivityClassification, CycleEstimate, Sample};

/// 单个检测文件的分析结果
#[derive(Serialize, Clone, Debug)]
pub struct AnalysisReport {
    pub source: String,
    pub run_id: String,
    pub analyzed_at: String,
    pub fps: f64,
    pub classification: ActivityClassification,
    /// 冲次被开关机判定门控跳过时为 None
    pub cycle: Option<CycleEstimate>,
}

impl AnalysisReport {
    pub fn bpm(&self) -> Option<f64> {
        self.cycle.as_ref().and_then(CycleEstimate::bpm)
    }

    /// 一行摘要，用于日志和终端输出
    pub fn summary(&self) -> String {
        let cycle = match &self.cycle {
            Some(CycleEstimate::Measured(m)) => {
                format!("{:.2} BPM ({} cycles, period {:.2}s)", m.bpm, m.period_count, m.median_period_seconds)
            }
            Some(CycleEstimate::Insufficient { reason, .. }) => format!("no BPM: {}", reason),
            None => "BPM skipped".to_string(),
        };
        format!(
            "{}: {} confidence={:.2} points={} | {}",
            self.source,
            self.classification.status,
            self.classification.confidence,
            self.classification.point_count,
            cycle
        )
    }
}

pub fn generate_run_id() -> String {
    format!("run_{}", Utc::now().format("%Y%m%d_%H%M%S"))
}

/// 视频标识：`<video_id>/detections.txt` 取目录名，否则取文件名主干
pub fn video_id_for(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unknown");
    if stem == "detections" {
        if let Some(parent) = path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
            return parent.to_string();
        }
    }
    stem.to_string()
}

/// 对一组采样执行开关机判定和冲次估计
///
/// 两个分支互不依赖；是否在非 ON 状态下跳过冲次由配置决定。
pub fn analyze_samples(source: &str, samples: &[Sample], config: &AnalysisConfig) -> AnalysisReport {
    let classification = classify_activity(&Sample::values(samples), &config.activity);

    let cycle = if samples.is_empty() {
        Some(CycleEstimate::insufficient("no samples to analyse", &[]))
    } else if config.gate_cycle_on_activity && !classification.is_on() {
        info!("{}: activity is {}, skipping cycle estimation", source, classification.status);
        None
    } else {
        Some(bpm_cycle(samples, &config.cycle, config.fps))
    };

    AnalysisReport {
        source: source.to_string(),
        run_id: generate_run_id(),
        analyzed_at: Utc::now().to_rfc3339(),
        fps: config.fps,
        classification,
        cycle,
    }
}

/// 读取检测文件并分析；文件缺失时得到 UNKNOWN 报告而不是错误
pub fn analyze_file<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> AnalysisReport {
    let path = path.as_ref();
    let samples = load_points(path);
    analyze_samples(&path.display().to_string(), &samples, config)
}
