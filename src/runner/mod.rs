// ABOUTME: Workflow runner module - simulated staged execution and the rule-based optimizer

pub mod executor;
pub mod optimizer;

pub use executor::{ExecutionLog, ExecutionReport, LogLevel, RunError, WorkflowRunner};
pub use optimizer::{Optimization, OptimizationKind, WorkflowOptimizer};
