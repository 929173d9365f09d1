//! Episode performance metrics

/// Calculate metrics from a per-step portfolio value curve
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Largest peak-to-trough decline as a fraction of the peak
    pub fn max_drawdown(values: &[f64]) -> f64 {
        let mut max_drawdown = 0.0;
        let mut peak = f64::MIN;
        for &value in values {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 {
                let drawdown = (peak - value) / peak;
                if drawdown > max_drawdown {
                    max_drawdown = drawdown;
                }
            }
        }
        max_drawdown
    }

    /// Step-to-step simple returns
    pub fn step_returns(values: &[f64]) -> Vec<f64> {
        values
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect()
    }

    /// Mean over standard deviation of step returns (not annualized)
    pub fn sharpe_ratio(values: &[f64]) -> f64 {
        let returns = Self::step_returns(values);
        if returns.len() < 2 {
            return 0.0;
        }
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance =
            returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
        let std_dev = variance.sqrt();
        if std_dev > 0.0 {
            mean / std_dev
        } else {
            0.0
        }
    }
}
