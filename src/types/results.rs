use std::fmt;
use serde::Serialize;

use super::Event;

/// 诊断信息中最多保留的事件数
pub const SAMPLE_EVENT_LIMIT: usize = 10;

/// 成功测得的冲程周期
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CycleMeasurement {
    pub bpm: f64,
    pub median_period_seconds: f64,
    pub sample_events: Vec<Event>,
    pub period_count: usize,
}

/// 冲次分支的结果：测得的冲次，或者测不出的原因
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleEstimate {
    Measured(CycleMeasurement),
    Insufficient {
        reason: String,
        sample_events: Vec<Event>,
    },
}

impl CycleEstimate {
    pub fn insufficient(reason: impl Into<String>, events: &[Event]) -> Self {
        Self::Insufficient {
            reason: reason.into(),
            sample_events: first_events(events),
        }
    }

    pub fn bpm(&self) -> Option<f64> {
        match self {
            CycleEstimate::Measured(m) => Some(m.bpm),
            CycleEstimate::Insufficient { .. } => None,
        }
    }

    pub fn sample_events(&self) -> &[Event] {
        match self {
            CycleEstimate::Measured(m) => &m.sample_events,
            CycleEstimate::Insufficient { sample_events, .. } => sample_events,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, CycleEstimate::Measured(_))
    }
}

pub(crate) fn first_events(events: &[Event]) -> Vec<Event> {
    events.iter().take(SAMPLE_EVENT_LIMIT).copied().collect()
}

/// 原始坐标序列上的运动统计量
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementMetrics {
    pub variance: f64,
    pub std_dev: f64,
    pub range: f64,
    pub mean_abs_change: f64,
    pub max_abs_change: f64,
    /// 线性拟合斜率的绝对值
    pub trend: f64,
}

/// 每个指标的二值得分（0.0 或 1.0）
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricScores {
    pub range: f64,
    pub std_dev: f64,
    pub mean_abs_change: f64,
    pub variance: f64,
    pub trend: f64,
}

impl MetricScores {
    pub fn as_array(&self) -> [f64; 5] {
        [self.range, self.std_dev, self.mean_abs_change, self.variance, self.trend]
    }

    pub fn active_count(&self) -> usize {
        self.as_array().iter().filter(|&&s| s > 0.0).count()
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityStatus {
    On,
    Off,
    Unknown,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityStatus::On => write!(f, "ON"),
            ActivityStatus::Off => write!(f, "OFF"),
            ActivityStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// 开关机判定结果
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ActivityClassification {
    pub status: ActivityStatus,
    pub confidence: f64,
    pub metrics: Option<MovementMetrics>,
    pub scores: Option<MetricScores>,
    pub reason: String,
    pub point_count: usize,
}

impl ActivityClassification {
    pub fn unknown(reason: String, point_count: usize) -> Self {
        Self {
            status: ActivityStatus::Unknown,
            confidence: 0.0,
            metrics: None,
            scores: None,
            reason,
            point_count,
        }
    }

    pub fn is_on(&self) -> bool {
        self.status == ActivityStatus::On
    }
}
