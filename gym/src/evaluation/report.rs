//! Evaluation report generation

use crate::evaluation::EvaluationResult;

/// Evaluation report
#[derive(Debug)]
pub struct EvaluationReport {
    result: EvaluationResult,
}

impl EvaluationReport {
    /// Create new report from result
    pub fn new(result: EvaluationResult) -> Self {
        Self { result }
    }

    /// Format report as string
    pub fn format(&self) -> String {
        let hours = self.result.real_world_minutes / 60;
        let minutes = self.result.real_world_minutes % 60;
        format!(
            r#"
Evaluation Results ({})
==================
Starting Value: ${:.2}
Ending Value: ${:.2}
Total Return: ${:.2} ({:.2}%)
Total Reward: {:.2}
Fills: {}
Steps: {} ({}h {:02}m of market time)
Maximum Drawdown: {:.2}%
Sharpe Ratio: {:.2}
"#,
            self.result.policy,
            self.result.start_value,
            self.result.end_value,
            self.result.total_return,
            self.result.total_return_percent,
            self.result.total_reward,
            self.result.num_fills,
            self.result.steps,
            hours,
            minutes,
            self.result.max_drawdown * 100.0,
            self.result.sharpe_ratio,
        )
    }

    /// Get result reference
    pub fn result(&self) -> &EvaluationResult {
        &self.result
    }
}
