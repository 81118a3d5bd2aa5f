//! 抽油机开关机判定
//!
//! 直接作用于检测器输出的原始坐标值（不重建、不平滑），
//! 因为平滑会掩盖判定所依赖的真实抖动。

use log::{debug, info};

use crate::config::ActivityThresholds;
use crate::types::{ActivityClassification, ActivityStatus, MetricScores, MovementMetrics};

/// 判定所需的最少点数
pub const MIN_POINTS: usize = 5;
/// 判定为 ON 所需的最少活跃指标数
pub const MIN_ACTIVE_METRICS: usize = 3;
/// 判定为 ON 的加权得分下限
pub const MIN_CONFIDENCE: f64 = 0.6;

/// 计算运动统计量，少于 2 个点时全部为 0
pub fn movement_metrics(values: &[f64]) -> MovementMetrics {
    if values.len() < 2 {
        return MovementMetrics::default();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let changes: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let mean_abs_change = changes.iter().sum::<f64>() / changes.len() as f64;
    let max_abs_change = changes.iter().copied().fold(0.0, f64::max);

    MovementMetrics {
        variance,
        std_dev: variance.sqrt(),
        range: max - min,
        mean_abs_change,
        max_abs_change,
        trend: least_squares_slope(values, mean).abs(),
    }
}

/// 以采样序号为横轴的最小二乘斜率
fn least_squares_slope(values: &[f64], mean_y: f64) -> f64 {
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let (num, den) = values.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, &y)| {
        let dx = i as f64 - mean_x;
        (num + dx * (y - mean_y), den + dx * dx)
    });
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

fn score(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

/// 各指标与阈值比较，得到二值得分
pub fn score_metrics(metrics: &MovementMetrics, thresholds: &ActivityThresholds) -> MetricScores {
    MetricScores {
        range: score(metrics.range >= thresholds.min_range),
        std_dev: score(metrics.std_dev >= thresholds.min_std_dev),
        mean_abs_change: score(metrics.mean_abs_change >= thresholds.min_mean_change),
        variance: score(metrics.variance >= thresholds.min_variance),
        trend: score(metrics.trend > thresholds.min_trend),
    }
}

/// 加权得分，限制在 [0, 1]
pub fn weighted_confidence(scores: &MetricScores, thresholds: &ActivityThresholds) -> f64 {
    let w = &thresholds.weights;
    let total = scores.range * w.range
        + scores.std_dev * w.std_dev
        + scores.mean_abs_change * w.mean_change
        + scores.variance * w.variance
        + scores.trend * w.trend;
    total.clamp(0.0, 1.0)
}

/// 判定抽油机是否在运动
///
/// 至少 3 个指标达标，或加权得分不低于 0.6，任一成立即为 ON。
pub fn classify_activity(values: &[f64], thresholds: &ActivityThresholds) -> ActivityClassification {
    let point_count = values.len();
    if point_count == 0 {
        return ActivityClassification::unknown("No data found in detections".to_string(), 0);
    }
    if point_count < MIN_POINTS {
        return ActivityClassification::unknown(
            format!("Insufficient data: only {} points (minimum {})", point_count, MIN_POINTS),
            point_count,
        );
    }

    let metrics = movement_metrics(values);
    let scores = score_metrics(&metrics, thresholds);
    let confidence = weighted_confidence(&scores, thresholds);
    let active = scores.active_count();
    debug!("Movement metrics: {:?}, scores: {:?}", metrics, scores);

    let (status, reason) = if active >= MIN_ACTIVE_METRICS || confidence >= MIN_CONFIDENCE {
        (
            ActivityStatus::On,
            format!("Movement detected: {}/5 metrics active, score={:.2}", active, confidence),
        )
    } else {
        (
            ActivityStatus::Off,
            format!("No significant movement: {}/5 metrics active, score={:.2}", active, confidence),
        )
    };
    info!("Activity: {} ({})", status, reason);

    ActivityClassification {
        status,
        confidence,
        metrics: Some(metrics),
        scores: Some(scores),
        reason,
        point_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn metrics_of_known_sequence() {
        let m = movement_metrics(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(m.variance, 4.0);
        assert_relative_eq!(m.std_dev, 2.0);
        assert_relative_eq!(m.range, 7.0);
        assert_relative_eq!(m.mean_abs_change, 1.0);
        assert_relative_eq!(m.max_abs_change, 2.0);
    }

    #[test]
    fn slope_of_line_and_descending_trend() {
        let rising: Vec<f64> = (0..10).map(|i| 3.0 + 0.5 * i as f64).collect();
        assert_relative_eq!(movement_metrics(&rising).trend, 0.5, epsilon = 1e-12);

        let falling: Vec<f64> = (0..10).map(|i| 100.0 - 2.0 * i as f64).collect();
        assert_relative_eq!(movement_metrics(&falling).trend, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn too_few_values_give_zero_metrics() {
        assert_eq!(movement_metrics(&[]), MovementMetrics::default());
        assert_eq!(movement_metrics(&[42.0]), MovementMetrics::default());
    }

    #[test]
    fn no_points_and_few_points_are_distinct_unknowns() {
        let none = classify_activity(&[], &ActivityThresholds::default());
        assert_eq!(none.status, ActivityStatus::Unknown);
        assert!(none.reason.contains("No data"));

        let few = classify_activity(&[1.0, 2.0, 3.0], &ActivityThresholds::default());
        assert_eq!(few.status, ActivityStatus::Unknown);
        assert_eq!(few.point_count, 3);
        assert_eq!(few.confidence, 0.0);
        assert!(few.reason.to_lowercase().contains("insufficient data"));
        assert!(few.metrics.is_none());
    }

    #[test]
    fn range_threshold_is_inclusive() {
        let thresholds = ActivityThresholds::default();
        let at = movement_metrics(&[0.0, 10.0, 0.0, 10.0, 0.0]);
        assert_eq!(score_metrics(&at, &thresholds).range, 1.0);

        let below = movement_metrics(&[0.0, 9.99, 0.0, 9.99, 0.0]);
        assert_eq!(score_metrics(&below, &thresholds).range, 0.0);
    }

    #[test]
    fn either_condition_turns_on() {
        // 只有 range + std_dev + variance：3 个指标，得分 0.65
        let mut thresholds = ActivityThresholds::default();
        thresholds.min_mean_change = 1e9;
        thresholds.min_trend = 1e9;
        let values = [0.0, 20.0, 0.0, 20.0, 0.0, 20.0];
        let result = classify_activity(&values, &thresholds);
        assert_eq!(result.status, ActivityStatus::On);
        assert_eq!(result.scores.unwrap().active_count(), 3);

        // 只有 2 个指标，但加权得分 0.65 >= 0.6
        let mut thresholds = ActivityThresholds::default();
        thresholds.min_std_dev = 1e9;
        thresholds.min_variance = 1e9;
        thresholds.min_trend = 1e9;
        thresholds.weights.range = 0.40;
        let result = classify_activity(&values, &thresholds);
        assert_eq!(result.scores.unwrap().active_count(), 2);
        assert_relative_eq!(result.confidence, 0.65, epsilon = 1e-12);
        assert_eq!(result.status, ActivityStatus::On);
        assert!(result.reason.contains("2/5"));
        assert!(result.reason.contains("score=0.65"));
    }

    #[test]
    fn small_jitter_is_off() {
        let values = [100.0, 100.5, 100.0, 100.5, 100.0, 100.5, 100.0];
        let result = classify_activity(&values, &ActivityThresholds::default());
        assert_eq!(result.status, ActivityStatus::Off);
        assert!(result.reason.contains("0/5"));
    }
}
