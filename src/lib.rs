//! 抽油机冲次与开关机状态分析
//!
//! 输入是外部检测器逐帧输出的稀疏竖直坐标 `(frame, y)`，
//! 输出为开关机判定（ON/OFF/UNKNOWN）和冲次（BPM）估计。

pub mod types;
pub mod config;
pub mod parser;
pub mod signal;
pub mod activity;
pub mod pipeline;
pub mod report;

pub use types::{
    ActivityClassification, ActivityStatus, CycleEstimate, CycleMeasurement, Event, EventKind,
    MetricScores, MovementMetrics, Sample,
};
pub use config::{ActivityThresholds, AnalysisConfig, AppConfig, ConfigError, CycleConfig};
pub use signal::SignalError;
pub use activity::classify_activity;
pub use signal::bpm_cycle;
pub use pipeline::{analyze_file, analyze_samples, AnalysisReport};
