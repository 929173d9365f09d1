//! Jobs a training session can run

use crate::config::EnvConfig;
use crate::data::FeatureStore;
use crate::env::TradingEnv;
use crate::evaluation::{policy_by_name, EvaluationReport, EvaluationRunner};
use anyhow::{bail, Context};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

/// Stderr lines kept for the failure message
pub const STDERR_TAIL_LINES: usize = 100;

/// Unit of work supervised by the session manager
///
/// Dropping the future returned by `run` must stop the work; the manager
/// cancels and times out sessions that way.
#[async_trait]
pub trait TrainingJob: Send {
    /// Short label reported in session listings
    fn kind(&self) -> &str;

    async fn run(self: Box<Self>) -> anyhow::Result<()>;
}

/// External trainer process
#[derive(Debug, Clone)]
pub struct CommandJob {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandJob {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl TrainingJob for CommandJob {
    fn kind(&self) -> &str {
        "training"
    }

    async fn run(self: Box<Self>) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program))?;
        info!("Started {} (pid {:?})", self.program, child.id());

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let stdout_lines = async move {
            if let Some(stdout) = stdout {
                let mut reader = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    info!(target: "trainer", "{}", line);
                }
            }
        };

        let stderr_tail = async move {
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
            if let Some(stderr) = stderr {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    warn!(target: "trainer", "{}", line);
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            tail
        };

        let ((), tail, status) = tokio::join!(stdout_lines, stderr_tail, child.wait());
        let status = status.context("failed to wait for trainer")?;

        if !status.success() {
            let tail: Vec<String> = tail.into_iter().collect();
            bail!("{} exited with {}: {}", self.program, status, tail.join("\n"));
        }
        info!("{} finished successfully", self.program);
        Ok(())
    }
}

/// Sets the flag when dropped; the evaluation thread checks it between steps
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Runs one evaluation episode on a blocking thread and writes its logs
pub struct EvaluationJob {
    pub store: Arc<FeatureStore>,
    pub config: EnvConfig,
    pub policy: String,
    pub trade_log: PathBuf,
    pub action_log: PathBuf,
}

#[async_trait]
impl TrainingJob for EvaluationJob {
    fn kind(&self) -> &str {
        "evaluation"
    }

    async fn run(self: Box<Self>) -> anyhow::Result<()> {
        let flag = Arc::new(AtomicBool::new(false));
        let _guard = CancelOnDrop(flag.clone());
        let job = *self;

        let result = tokio::task::spawn_blocking(move || {
            let mut env = TradingEnv::new(job.store, job.config)?;
            let mut policy = policy_by_name(&job.policy)?;
            EvaluationRunner::new().with_cancel(flag).run_and_log(
                &mut env,
                policy.as_mut(),
                &job.trade_log,
                &job.action_log,
            )
        })
        .await
        .context("evaluation task panicked")??;

        info!("{}", EvaluationReport::new(result).format());
        Ok(())
    }
}
