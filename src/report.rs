use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use log::info;

use crate::config::AnalysisConfig;
use crate::pipeline::AnalysisReport;
use crate::signal::{alternating_extrema, interpolate_signal, SignalError};
use crate::types::{EventKind, Sample};

pub const REPORT_FILE: &str = "analysis.json";
pub const SIGNAL_FILE: &str = "signal.csv";

/// 报告导出错误
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("No samples to export")]
    EmptySignal,
    #[error("Signal error: {0}")]
    SignalError(SignalError),
}

fn ensure_dir(dir: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// 写出 `analysis.json`
pub fn write_report_json(report: &AnalysisReport, dir: &Path) -> Result<PathBuf, ReportError> {
    ensure_dir(dir)?;
    let path = dir.join(REPORT_FILE);
    let content = serde_json::to_string_pretty(report)?;
    fs::write(&path, content)?;
    info!("Report written to {}", path.display());
    Ok(path)
}

/// 写出逐帧信号轨迹 `signal.csv`，供外部绘图使用
///
/// 列：frame, observed（未观测为空）, interpolated, smoothed, event（max/min/空）
pub fn write_signal_csv(samples: &[Sample], config: &AnalysisConfig, dir: &Path) -> Result<PathBuf, ReportError> {
    let signal = interpolate_signal(samples).map_err(|e| match e {
        SignalError::EmptyInput => ReportError::EmptySignal,
        other => ReportError::SignalError(other),
    })?;
    let (events, smoothed) = alternating_extrema(&signal, &config.cycle, config.fps);

    let mut observed: Vec<Option<f64>> = vec![None; signal.len()];
    for sample in samples {
        observed[sample.frame] = Some(sample.value);
    }
    let mut event_labels: Vec<&str> = vec![""; signal.len()];
    for event in &events {
        event_labels[event.index] = match event.kind {
            EventKind::Max => "max",
            EventKind::Min => "min",
        };
    }

    ensure_dir(dir)?;
    let path = dir.join(SIGNAL_FILE);
    let mut file = BufWriter::new(fs::File::create(&path)?);

    // 写入CSV头部
    writeln!(file, "frame,observed,interpolated,smoothed,event")?;
    for frame in 0..signal.len() {
        let raw = observed[frame].map(|v| v.to_string()).unwrap_or_default();
        writeln!(
            file,
            "{},{},{},{},{}",
            frame, raw, signal[frame], smoothed[frame], event_labels[frame]
        )?;
    }
    file.flush()?;

    info!(
        "Signal trace exported to {} ({} frames, {} events)",
        path.display(),
        signal.len(),
        events.len()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze_samples;

    fn sine_samples() -> Vec<Sample> {
        (0..240)
            .step_by(2)
            .map(|f| {
                let phase = 2.0 * std::f64::consts::PI * f as f64 / 60.0;
                Sample::new(f, 200.0 + 30.0 * phase.sin())
            })
            .collect()
    }

    #[test]
    fn json_report_round_trips_key_fields() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::default();
        let report = analyze_samples("well", &sine_samples(), &config);
        let path = write_report_json(&report, &dir.path().join("nested")).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["classification"]["status"], "ON");
        assert_eq!(value["cycle"]["outcome"], "measured");
        assert!(value["cycle"]["bpm"].as_f64().unwrap() > 0.0);
        assert_eq!(value["source"], "well");
    }

    #[test]
    fn signal_csv_marks_gaps_and_events() {
        let dir = tempfile::tempdir().unwrap();
        let samples = sine_samples();
        let path = write_signal_csv(&samples, &AnalysisConfig::default(), dir.path()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "frame,observed,interpolated,smoothed,event");
        // 239 帧 + 表头
        assert_eq!(lines.len(), 239 + 1);
        // 奇数帧未观测
        assert!(lines[2].starts_with("1,,"));
        assert!(lines.iter().any(|l| l.ends_with(",max")));
        assert!(lines.iter().any(|l| l.ends_with(",min")));
    }

    #[test]
    fn empty_samples_cannot_be_exported() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_signal_csv(&[], &AnalysisConfig::default(), dir.path());
        assert!(matches!(result, Err(ReportError::EmptySignal)));

        let noisy = vec![Sample::new(0, 1.0), Sample::new(99_999_999_999, 1.0)];
        let result = write_signal_csv(&noisy, &AnalysisConfig::default(), dir.path());
        assert!(matches!(result, Err(ReportError::SignalError(SignalError::FrameRangeTooLarge { .. }))));
    }
}
