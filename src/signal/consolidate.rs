use log::debug;

use crate::config::CycleConfig;
use crate::types::{Event, EventKind};
use super::{find_extrema, smooth_moving_average};

/// 合并距离占最快周期的比例
const MERGE_FRACTION: f64 = 0.15;

/// 由帧率和最高允许冲次计算同类极值的合并距离（帧）
pub fn merge_distance(fps: f64, bpm_max: f64) -> usize {
    let min_period = (fps * 60.0 / bpm_max) as usize;
    ((min_period as f64 * MERGE_FRACTION) as usize).max(1)
}

/// 单链聚类：与簇内最后一个成员相距不超过 `merge_dist` 的索引并入同一簇，
/// 每簇只保留最极端的一个（极大取最高、极小取最低，相等时取最早）。
pub fn group_close(indices: &[usize], signal: &[f64], merge_dist: usize, kind: EventKind) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();

    let more_extreme = |candidate: usize, current: usize| match kind {
        EventKind::Max => signal[candidate] > signal[current],
        EventKind::Min => signal[candidate] < signal[current],
    };

    let mut representatives = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return representatives;
    };

    let mut last_member = first;
    let mut best = first;
    for idx in iter {
        if idx - last_member <= merge_dist {
            if more_extreme(idx, best) {
                best = idx;
            }
        } else {
            representatives.push(best);
            best = idx;
        }
        last_member = idx;
    }
    representatives.push(best);
    representatives
}

/// 按索引合并两类极值并强制交替
///
/// 相邻同类事件只保留更极端的一个，不插入任何合成事件。
pub fn enforce_alternation(maxima: &[usize], minima: &[usize], signal: &[f64]) -> Vec<Event> {
    let mut events: Vec<Event> = maxima
        .iter()
        .map(|&i| Event::max(i))
        .chain(minima.iter().map(|&i| Event::min(i)))
        .collect();
    events.sort_by_key(|e| e.index);

    let mut cleaned: Vec<Event> = Vec::with_capacity(events.len());
    for event in events {
        match cleaned.last_mut() {
            Some(last) if last.kind == event.kind => {
                let replace = match event.kind {
                    EventKind::Max => signal[event.index] > signal[last.index],
                    EventKind::Min => signal[event.index] < signal[last.index],
                };
                if replace {
                    *last = event;
                }
            }
            _ => cleaned.push(event),
        }
    }
    cleaned
}

/// 平滑、检测、合并、交替，返回事件序列和平滑后的信号
pub fn alternating_extrema(signal: &[f64], config: &CycleConfig, fps: f64) -> (Vec<Event>, Vec<f64>) {
    let smoothed = smooth_moving_average(signal, config.smooth_win);
    let extrema = find_extrema(&smoothed);

    let merge_dist = merge_distance(fps, config.bpm_max);
    let maxima = group_close(&extrema.maxima, &smoothed, merge_dist, EventKind::Max);
    let minima = group_close(&extrema.minima, &smoothed, merge_dist, EventKind::Min);

    let events = enforce_alternation(&maxima, &minima, &smoothed);
    debug!(
        "Extrema: {} candidates, {} max / {} min after merge (dist={}), {} alternating events",
        extrema.len(),
        maxima.len(),
        minima.len(),
        merge_dist,
        events.len()
    );
    (events, smoothed)
}
