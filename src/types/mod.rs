pub mod sample;
pub mod events;
pub mod results;

pub use sample::Sample;
pub use events::{Event, EventKind, is_alternating};
pub use results::{
    ActivityClassification, ActivityStatus, CycleEstimate, CycleMeasurement, MetricScores,
    MovementMetrics, SAMPLE_EVENT_LIMIT,
};
