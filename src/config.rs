use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// 应用配置管理模块
/// 集中管理所有配置项，提供默认值和配置验证。
/// 分析核心只接收显式传入的结构体，环境变量只在命令行入口处读取。

/// 主配置结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

/// 分析配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 源视频帧率
    pub fps: f64,
    pub cycle: CycleConfig,
    pub activity: ActivityThresholds,
    /// 只有判定为 ON 时才计算冲次
    pub gate_cycle_on_activity: bool,
}

/// 冲次估计配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub bpm_min: f64,
    /// 最快允许冲次，决定极值合并距离
    pub bpm_max: f64,
    pub smooth_win: usize,
}

/// 活动判定阈值与权重
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityThresholds {
    pub min_range: f64,
    pub min_std_dev: f64,
    pub min_mean_change: f64,
    pub min_variance: f64,
    /// 斜率绝对值需严格大于该值
    pub min_trend: f64,
    pub weights: ActivityWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityWeights {
    pub range: f64,
    pub std_dev: f64,
    pub mean_change: f64,
    pub variance: f64,
    pub trend: f64,
}

/// 输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 报告根目录，每个检测文件写入 `<dir>/<video_id>/`
    pub dir: String,
    pub write_json: bool,
    pub write_signal_csv: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            cycle: CycleConfig::default(),
            activity: ActivityThresholds::default(),
            gate_cycle_on_activity: true,
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            bpm_min: 2.0,
            bpm_max: 20.0,
            smooth_win: 11,
        }
    }
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self {
            min_range: 10.0,
            min_std_dev: 5.0,
            min_mean_change: 1.0,
            min_variance: 25.0,
            min_trend: 0.1,
            weights: ActivityWeights::default(),
        }
    }
}

impl Default for ActivityWeights {
    fn default() -> Self {
        Self {
            range: 0.30,
            std_dev: 0.25,
            mean_change: 0.25,
            variance: 0.10,
            trend: 0.10,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "outputs".to_string(),
            write_json: true,
            write_signal_csv: true,
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(ConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(ConfigError::ParseError)?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(ConfigError::SerializeError)?;

        std::fs::write(path, content)
            .map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// 用 `PUMPJACK_*` 环境变量覆盖配置（调用方负责先加载 .env）
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(fps) = read_env("PUMPJACK_FPS")? {
            self.analysis.fps = fps;
        }
        if let Some(bpm_min) = read_env("PUMPJACK_BPM_MIN")? {
            self.analysis.cycle.bpm_min = bpm_min;
        }
        if let Some(bpm_max) = read_env("PUMPJACK_BPM_MAX")? {
            self.analysis.cycle.bpm_max = bpm_max;
        }
        if let Some(win) = read_env("PUMPJACK_SMOOTH_WIN")? {
            self.analysis.cycle.smooth_win = win;
        }
        if let Ok(dir) = env::var("PUMPJACK_OUTPUT_DIR") {
            self.output.dir = dir;
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;

        if self.output.dir.trim().is_empty() {
            return Err(ConfigError::ValidationError("Output directory must not be empty".to_string()));
        }

        Ok(())
    }

    /// 获取报告根目录
    pub fn get_output_directory(&self) -> PathBuf {
        PathBuf::from(&self.output.dir)
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ConfigError::ValidationError("FPS must be positive".to_string()));
        }

        let cycle = &self.cycle;
        if !(cycle.bpm_min > 0.0 && cycle.bpm_max.is_finite() && cycle.bpm_min <= cycle.bpm_max) {
            return Err(ConfigError::ValidationError(format!(
                "BPM bounds must satisfy 0 < bpm_min <= bpm_max (got {} / {})",
                cycle.bpm_min, cycle.bpm_max
            )));
        }

        let w = &self.activity.weights;
        if [w.range, w.std_dev, w.mean_change, w.variance, w.trend]
            .iter()
            .any(|weight| !(weight.is_finite() && *weight >= 0.0))
        {
            return Err(ConfigError::ValidationError("Activity weights must be non-negative".to_string()));
        }

        Ok(())
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvError(key.to_string(), raw)),
        Err(_) => Ok(None),
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid value for {0}: {1:?}")]
    EnvError(String, String),
}

/// 配置管理器
pub struct ConfigManager {
    config: AppConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建配置管理器
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            config_path: None,
        }
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let config = AppConfig::load_from_file(&path)?;
        Ok(Self {
            config,
            config_path: Some(path.as_ref().to_path_buf()),
        })
    }

    /// 获取当前配置
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取可变配置
    pub fn get_config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn config_path(&self) -> Option<&std::path::Path> {
        self.config_path.as_deref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.cycle.smooth_win, 11);
        assert_eq!(config.analysis.activity.min_range, 10.0);
    }

    #[test]
    fn rejects_bad_fps_and_bounds() {
        let mut config = AppConfig::default();
        config.analysis.fps = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = AppConfig::default();
        config.analysis.cycle.bpm_min = 30.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.analysis.activity.weights.trend = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            "[analysis]\nfps = 25.0\n\n[analysis.cycle]\nbpm_max = 12.0\n",
        )
        .unwrap();
        assert_eq!(config.analysis.fps, 25.0);
        assert_eq!(config.analysis.cycle.bpm_max, 12.0);
        assert_eq!(config.analysis.cycle.smooth_win, 11);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn save_and_load_through_manager() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pumpjack.toml");

        let mut config = AppConfig::default();
        config.analysis.fps = 15.0;
        config.output.write_signal_csv = false;
        config.save_to_file(&path).unwrap();

        let manager = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(manager.get_config(), &config);
        assert_eq!(manager.config_path(), Some(path.as_path()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = AppConfig::load_from_file("/nonexistent/pumpjack.toml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
