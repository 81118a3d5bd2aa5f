use log::{debug, info, warn};

use crate::config::CycleConfig;
use crate::types::results::first_events;
use crate::types::{CycleEstimate, CycleMeasurement, Event, Sample};
use super::{alternating_extrema, interpolate_signal, SignalError};

/// 中位数；偶数个时取中间两个的平均。空输入返回 None
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// 同类事件相隔两个位置即为一个完整周期（秒）
///
/// 事件应按索引升序排列；乱序输入不会 panic，倒序的一对记为 0 秒周期。
fn cycle_periods(events: &[Event], fps: f64) -> Vec<f64> {
    events
        .windows(3)
        .filter(|w| w[2].kind == w[0].kind)
        .map(|w| w[2].index.saturating_sub(w[0].index) as f64 / fps)
        .collect()
}

/// 从交替事件序列估计冲程周期，取所有周期的中位数
pub fn estimate_period(events: &[Event], fps: f64) -> Result<CycleMeasurement, SignalError> {
    let periods = cycle_periods(events, fps);
    let Some(median_period) = median(&periods) else {
        return Err(SignalError::InsufficientCycles {
            sample_events: first_events(events),
        });
    };

    debug!("Cycle periods (s): {:?}", periods);
    Ok(CycleMeasurement {
        bpm: 60.0 / median_period,
        median_period_seconds: median_period,
        sample_events: first_events(events),
        period_count: periods.len(),
    })
}

/// 完整的冲次计算：重建 -> 平滑 -> 极值 -> 合并/交替 -> 周期
pub fn bpm_cycle(samples: &[Sample], config: &CycleConfig, fps: f64) -> CycleEstimate {
    let signal = match interpolate_signal(samples) {
        Ok(signal) => signal,
        Err(SignalError::EmptyInput) => {
            warn!("Cycle estimation skipped: no samples");
            return CycleEstimate::insufficient("no samples to analyse", &[]);
        }
        Err(e) => {
            warn!("Cycle estimation skipped: {}", e);
            return CycleEstimate::insufficient(e.to_string(), &[]);
        }
    };

    let (events, _smoothed) = alternating_extrema(&signal, config, fps);
    match estimate_period(&events, fps) {
        Ok(measurement) => {
            info!(
                "Cycle estimate: {:.2} BPM (median period {:.2}s over {} cycles)",
                measurement.bpm, measurement.median_period_seconds, measurement.period_count
            );
            CycleEstimate::Measured(measurement)
        }
        Err(e) => {
            warn!("{}", e);
            CycleEstimate::insufficient("not enough complete cycles", &events)
        }
    }
}
