//! Cumulative VWAP (Volume Weighted Average Price)

/// Running `Σ(close·volume) / Σ(volume)` from the first bar of the series
#[derive(Debug, Clone, Default)]
pub struct VWAP {
    cumulative_pv: f64,
    cumulative_volume: u64,
    last_value: Option<f64>,
}

impl VWAP {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one bar; zero volume carries the last value forward
    pub fn update(&mut self, close: f64, volume: u64) -> Option<f64> {
        self.cumulative_pv += close * volume as f64;
        self.cumulative_volume += volume;
        if self.cumulative_volume > 0 {
            self.last_value = Some(self.cumulative_pv / self.cumulative_volume as f64);
        }
        self.last_value
    }

    pub fn value(&self) -> Option<f64> {
        self.last_value
    }

    pub fn cumulative_volume(&self) -> u64 {
        self.cumulative_volume
    }
}

/// Calculate VWAP for parallel close and volume series
pub fn calculate_vwap(closes: &[f64], volumes: &[u64]) -> Vec<Option<f64>> {
    let mut vwap = VWAP::new();
    closes
        .iter()
        .zip(volumes)
        .map(|(&close, &volume)| vwap.update(close, volume))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vwap_weighted() {
        let vwap = calculate_vwap(&[10.0, 20.0], &[100, 300]);
        assert_eq!(vwap[0], Some(10.0));
        assert_eq!(vwap[1], Some(17.5));
    }

    #[test]
    fn test_zero_volume_carries_forward() {
        let vwap = calculate_vwap(&[10.0, 12.0, 14.0, 20.0], &[0, 100, 0, 100]);
        assert_eq!(vwap[0], None);
        assert_eq!(vwap[1], Some(12.0));
        assert_eq!(vwap[2], Some(12.0));
        assert_eq!(vwap[3], Some(16.0));
    }

    #[test]
    fn test_vwap_within_close_range() {
        let closes = [101.0, 99.5, 103.2, 98.7, 100.1];
        let volumes = [500, 1200, 50, 900, 0];
        let vwap = calculate_vwap(&closes, &volumes);
        for (i, value) in vwap.iter().enumerate() {
            let window = &closes[..=i];
            let lo = window.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let v = value.unwrap();
            assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}
