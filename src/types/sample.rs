use serde::{Deserialize, Serialize};

/// 检测器输出的单个采样点：帧号 + 竖直像素坐标
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub frame: usize,
    pub value: f64,
}

impl Sample {
    pub fn new(frame: usize, value: f64) -> Self {
        Self { frame, value }
    }

    /// 按原始顺序提取坐标值（活动分类器只看值，不看帧号）
    pub fn values(samples: &[Sample]) -> Vec<f64> {
        samples.iter().map(|s| s.value).collect()
    }

    /// 最大帧号，空集合返回 None
    pub fn max_frame(samples: &[Sample]) -> Option<usize> {
        samples.iter().map(|s| s.frame).max()
    }
}
