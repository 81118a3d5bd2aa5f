pub mod analysis;
pub mod worker;

pub use analysis::{analyze_file, analyze_samples, generate_run_id, video_id_for, AnalysisReport};
pub use worker::{run_analysis_handler, AnalysisOutcome, AnalysisTask};
