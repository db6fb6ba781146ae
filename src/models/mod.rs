// ABOUTME: Core data models for wallet accounts, workflows, steps and templates

pub mod account;
pub mod workflow;

pub use account::Account;
pub use workflow::{now_millis, Millis, NewStep, TemplateStep, Workflow, WorkflowStep, WorkflowTemplate};
