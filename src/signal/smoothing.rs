/// 居中滑动平均
///
/// 窗口覆盖 `[i - w/2, i + (w-1)/2]`，与 "same" 模式卷积的对齐方式一致；
/// 边界处只对落在信号内的部分求平均，不做零填充。
pub fn smooth_moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    if window == 1 || signal.is_empty() {
        return signal.to_vec();
    }

    let len = signal.len();
    let before = window / 2;
    let after = (window - 1) / 2;

    // 每个窗口单独求和，不用前缀和，避免舍入误差累积让平台段出现伪起伏；
    // 以窗口首值为基准求偏差均值，常数窗口的结果与输入完全相等
    (0..len)
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after).min(len - 1);
            let span = &signal[lo..=hi];
            let base = span[0];
            base + span.iter().map(|v| v - base).sum::<f64>() / span.len() as f64
        })
        .collect()
}
