//! 冲程信号分析：重建 -> 平滑 -> 极值 -> 合并/交替 -> 周期

pub mod reconstruct;
pub mod smoothing;
pub mod extrema;
pub mod consolidate;
pub mod period;

pub use reconstruct::interpolate_signal;
pub use smoothing::smooth_moving_average;
pub use extrema::{find_extrema, Extrema};
pub use consolidate::{alternating_extrema, enforce_alternation, group_close, merge_distance};
pub use period::{bpm_cycle, estimate_period, median};

use crate::types::Event;

/// 信号分析错误类型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("Empty input: no samples to reconstruct")]
    EmptyInput,
    #[error("Frame range too large: {frames} frames from {samples} samples (limit {limit})")]
    FrameRangeTooLarge { frames: usize, samples: usize, limit: usize },
    #[error("Insufficient cycles: no complete same-kind period among {} events", .sample_events.len())]
    InsufficientCycles { sample_events: Vec<Event> },
}
