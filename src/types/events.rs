use std::fmt;
use serde::Serialize;

/// 极值类型
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Max,
    Min,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Max => write!(f, "max"),
            EventKind::Min => write!(f, "min"),
        }
    }
}

/// 稠密信号上的一个转折点
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub index: usize,
    pub kind: EventKind,
}

impl Event {
    pub fn new(index: usize, kind: EventKind) -> Self {
        Self { index, kind }
    }

    pub fn max(index: usize) -> Self {
        Self::new(index, EventKind::Max)
    }

    pub fn min(index: usize) -> Self {
        Self::new(index, EventKind::Min)
    }
}

/// 检查相邻事件是否交替出现
pub fn is_alternating(events: &[Event]) -> bool {
    events.windows(2).all(|pair| pair[0].kind != pair[1].kind)
}
