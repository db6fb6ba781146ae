// ABOUTME: Staged workflow run - emits timestamped progress logs per step, then records
// the execution in the workflow store. Logs are returned and optionally streamed live.

use crate::config::ExecutionConfig;
use crate::workflows::{StoreError, WorkflowStore};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Workflow not found. Please select a valid workflow.")]
    NotFound(String),

    #[error("Workflow has no steps to execute")]
    NoSteps,

    #[error("Failed to execute workflow: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ExecutionLog {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl ExecutionLog {
    fn new(level: LogLevel, message: String) -> Self {
        Self {
            at: Local::now(),
            level,
            message,
        }
    }

    pub fn format(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub logs: Vec<ExecutionLog>,
    pub completed: bool,
    pub error: Option<String>,
}

impl ExecutionReport {
    pub fn messages(&self) -> Vec<&str> {
        self.logs.iter().map(|l| l.message.as_str()).collect()
    }
}

/// Collects log lines and forwards each one to an optional live listener
struct LogSink {
    report: ExecutionReport,
    sender: Option<mpsc::UnboundedSender<ExecutionLog>>,
}

impl LogSink {
    fn push(&mut self, level: LogLevel, message: String) {
        let entry = ExecutionLog::new(level, message);
        if let Some(sender) = &self.sender {
            if sender.send(entry.clone()).is_err() {
                debug!("Execution log listener went away");
                self.sender = None;
            }
        }
        self.report.logs.push(entry);
    }
}

pub struct WorkflowRunner {
    store: Arc<WorkflowStore>,
    config: ExecutionConfig,
}

impl WorkflowRunner {
    pub fn new(store: Arc<WorkflowStore>, config: ExecutionConfig) -> Self {
        Self { store, config }
    }

    async fn pause(duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Refuses unknown or empty workflows before anything is logged.
    pub async fn run(
        &self,
        address: &str,
        workflow_id: &str,
        sender: Option<mpsc::UnboundedSender<ExecutionLog>>,
    ) -> Result<ExecutionReport, RunError> {
        let workflow = self
            .store
            .get(address, workflow_id)
            .await
            .ok_or_else(|| RunError::NotFound(workflow_id.to_string()))?;
        if workflow.steps.is_empty() {
            return Err(RunError::NoSteps);
        }

        info!("Starting staged run of workflow {} ({} steps)", workflow.id, workflow.steps.len());
        let mut sink = LogSink {
            report: ExecutionReport::default(),
            sender,
        };
        sink.push(LogLevel::Info, "Starting workflow execution...".to_string());

        for (index, step) in workflow.steps.iter().enumerate() {
            let position = index + 1;

            Self::pause(self.config.step_start_delay()).await;
            sink.push(LogLevel::Info, format!("Executing step {}: {}...", position, step.name));

            Self::pause(self.config.step_complete_delay()).await;
            sink.push(LogLevel::Success, format!("Step {position} completed successfully."));
        }

        match self.store.execute(address, workflow_id).await {
            Ok(_) => {
                Self::pause(self.config.finish_delay()).await;
                sink.push(
                    LogLevel::Success,
                    "Workflow execution completed successfully!".to_string(),
                );
                sink.report.completed = true;
            }
            Err(e) => {
                warn!("Staged run of {} failed: {}", workflow_id, e);
                sink.push(LogLevel::Error, format!("Error: {e}"));
                sink.report.error = Some(RunError::from(e).to_string());
            }
        }

        Ok(sink.report)
    }
}
