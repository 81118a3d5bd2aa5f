/// 候选极值索引，尚未合并，也不保证交替
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extrema {
    pub maxima: Vec<usize>,
    pub minima: Vec<usize>,
}

impl Extrema {
    pub fn len(&self) -> usize {
        self.maxima.len() + self.minima.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maxima.is_empty() && self.minima.is_empty()
    }
}

/// 一阶差分的符号；零差分视为上升，平台段不会产生伪过零
fn slope_sign(d: f64) -> i8 {
    if d < 0.0 {
        -1
    } else {
        1
    }
}

/// 根据一阶差分符号变化寻找局部极大/极小值
pub fn find_extrema(signal: &[f64]) -> Extrema {
    let mut extrema = Extrema::default();
    if signal.len() < 3 {
        return extrema;
    }

    let signs: Vec<i8> = signal.windows(2).map(|w| slope_sign(w[1] - w[0])).collect();
    for (j, pair) in signs.windows(2).enumerate() {
        match (pair[0], pair[1]) {
            (1, -1) => extrema.maxima.push(j + 1),
            (-1, 1) => extrema.minima.push(j + 1),
            _ => {}
        }
    }
    extrema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_peak_and_valley() {
        let extrema = find_extrema(&[0.0, 2.0, 1.0, 0.0, 3.0]);
        assert_eq!(extrema.maxima, vec![1]);
        assert_eq!(extrema.minima, vec![3]);
    }

    #[test]
    fn plateau_counts_as_rising() {
        // 上升平台：极大值落在平台末端
        let extrema = find_extrema(&[0.0, 1.0, 1.0, 1.0, 0.0]);
        assert_eq!(extrema.maxima, vec![3]);
        assert!(extrema.minima.is_empty());

        // 下降后的平台：极小值落在平台起点
        let extrema = find_extrema(&[2.0, 1.0, 1.0, 1.0, 2.0]);
        assert_eq!(extrema.minima, vec![1]);
        assert!(extrema.maxima.is_empty());
    }

    #[test]
    fn flat_and_short_signals_have_no_extrema() {
        assert!(find_extrema(&[5.0; 50]).is_empty());
        assert!(find_extrema(&[1.0, 0.0]).is_empty());
        assert!(find_extrema(&[]).is_empty());
    }

    #[test]
    fn monotonic_signal_has_no_extrema() {
        let signal: Vec<f64> = (0..30).map(|i| (i as f64).powi(2)).collect();
        assert_eq!(find_extrema(&signal).len(), 0);
    }
}
