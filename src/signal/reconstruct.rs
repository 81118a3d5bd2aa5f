use log::{debug, warn};

use crate::types::Sample;
use super::SignalError;

/// 稠密信号长度上限（30fps 下约 92 小时），防止噪声行中的超大帧号耗尽内存
pub const MAX_SIGNAL_FRAMES: usize = 10_000_000;

/// 将稀疏的 (帧, 值) 采样重建为逐帧稠密信号
///
/// 长度为 `max(frame) + 1`；观测到的帧原样拷贝，缺失帧在左右最近观测之间线性插值，
/// 首个观测之前的帧取首个观测值。
pub fn interpolate_signal(samples: &[Sample]) -> Result<Vec<f64>, SignalError> {
    let max_frame = Sample::max_frame(samples).ok_or(SignalError::EmptyInput)?;
    if max_frame >= MAX_SIGNAL_FRAMES {
        warn!(
            "Max frame {} exceeds limit {} ({} samples), refusing to reconstruct",
            max_frame,
            MAX_SIGNAL_FRAMES,
            samples.len()
        );
        return Err(SignalError::FrameRangeTooLarge {
            frames: max_frame.saturating_add(1),
            samples: samples.len(),
            limit: MAX_SIGNAL_FRAMES,
        });
    }
    let len = max_frame + 1;

    // 同一帧重复出现时以后出现的为准
    let mut observed: Vec<Option<f64>> = vec![None; len];
    for sample in samples {
        observed[sample.frame] = Some(sample.value);
    }

    let known: Vec<(usize, f64)> = observed
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|value| (i, value)))
        .collect();

    let mut signal = Vec::with_capacity(len);
    // known[cursor] 是第一个索引 >= i 的观测
    let mut cursor = 0;
    for i in 0..len {
        while known[cursor].0 < i {
            cursor += 1;
        }
        let (right_idx, right_val) = known[cursor];
        let value = if right_idx == i || cursor == 0 {
            right_val
        } else {
            let (left_idx, left_val) = known[cursor - 1];
            let t = (i - left_idx) as f64 / (right_idx - left_idx) as f64;
            left_val + t * (right_val - left_val)
        };
        signal.push(value);
    }

    debug!(
        "Reconstructed {} frames from {} observations ({} interpolated)",
        len,
        known.len(),
        len - known.len()
    );
    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn samples(points: &[(usize, f64)]) -> Vec<Sample> {
        points.iter().map(|&(f, v)| Sample::new(f, v)).collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(interpolate_signal(&[]), Err(SignalError::EmptyInput));
    }

    #[test]
    fn huge_frame_number_is_rejected() {
        let result = interpolate_signal(&samples(&[(0, 1.0), (99_999_999_999, 2.0)]));
        assert!(matches!(
            result,
            Err(SignalError::FrameRangeTooLarge { samples: 2, limit: MAX_SIGNAL_FRAMES, .. })
        ));
    }

    #[test]
    fn fills_gaps_linearly() {
        let signal = interpolate_signal(&samples(&[(0, 0.0), (10, 100.0), (20, 0.0), (30, 100.0)])).unwrap();
        assert_eq!(signal.len(), 31);
        assert_relative_eq!(signal[5], 50.0, epsilon = 1e-12);
        assert_relative_eq!(signal[13], 70.0, epsilon = 1e-12);
        assert_relative_eq!(signal[21], 10.0, epsilon = 1e-12);
        assert_eq!(signal[30], 100.0);
    }

    #[test]
    fn leading_frames_take_first_observation() {
        let signal = interpolate_signal(&samples(&[(3, 7.0), (5, 9.0)])).unwrap();
        assert_eq!(signal, vec![7.0, 7.0, 7.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn single_frame_fills_everything() {
        let signal = interpolate_signal(&samples(&[(4, 12.5)])).unwrap();
        assert_eq!(signal, vec![12.5; 5]);
    }

    #[test]
    fn unordered_input_and_duplicates() {
        let signal = interpolate_signal(&samples(&[(4, 4.0), (0, 0.0), (2, 1.0), (2, 2.0)])).unwrap();
        assert_eq!(signal, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }
}
