//! 检测文件解析
//!
//! 每行形如 `(42, 317.5)`；不匹配的行直接跳过，文件缺失或不可读时返回空集合。

use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use log::{info, warn};
use regex::Regex;

use crate::types::Sample;

/// `(帧号, 值)`，只锚定行首，行尾多余内容忽略
static POINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((\d+),\s*([0-9.]+)\)").expect("detection line pattern is valid")
});

/// 解析单行 `(帧号, 值)`，值只接受数字和小数点
pub fn parse_line(line: &str) -> Option<Sample> {
    let caps = POINT_PATTERN.captures(line.trim())?;
    let frame = caps[1].parse::<usize>().ok()?;
    let value = caps[2].parse::<f64>().ok()?;
    Some(Sample::new(frame, value))
}

/// 解析整段文本，跳过空行和噪声行
pub fn parse_points(content: &str) -> Vec<Sample> {
    content.lines().filter_map(parse_line).collect()
}

/// 读取检测文件；文件不存在或读取失败时返回空集合
pub fn load_points<P: AsRef<Path>>(path: P) -> Vec<Sample> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => {
            let samples = parse_points(&content);
            let total = content.lines().filter(|l| !l.trim().is_empty()).count();
            if samples.len() < total {
                warn!("{}: skipped {} malformed lines", path.display(), total - samples.len());
            }
            info!("Loaded {} samples from {}", samples.len(), path.display());
            samples
        }
        Err(e) => {
            warn!("Failed to read detections {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
