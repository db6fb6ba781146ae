// ABOUTME: Workflow data model - a named, ordered sequence of on-chain entry-function steps
// Field names serialize in camelCase so persisted records keep the wallet app's storage shape

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch, the timestamp unit used by persisted records.
pub type Millis = i64;

pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub id: String,
    pub name: String,
    pub module_address: String,
    pub module_name: String,
    pub function_name: String,
    pub args: Vec<String>, // Positional, opaque to the store
}

impl WorkflowStep {
    /// Fully qualified entry function, e.g. `0x1::dex_actions::swap_tokens`
    pub fn entry_function(&self) -> String {
        format!("{}::{}::{}", self.module_address, self.module_name, self.function_name)
    }
}

/// Step data supplied by a caller before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStep {
    pub name: String,
    pub module_address: String,
    pub module_name: String,
    pub function_name: String,
    pub args: Vec<String>,
}

impl NewStep {
    pub fn new(
        name: impl Into<String>,
        module_address: impl Into<String>,
        module_name: impl Into<String>,
        function_name: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            module_address: module_address.into(),
            module_name: module_name.into(),
            function_name: function_name.into(),
            args,
        }
    }

    /// Parse a comma separated argument list the way the step form does:
    /// split on commas, trim, drop empty entries.
    pub fn parse_args(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|arg| !arg.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    pub fn into_step(self, id: String) -> WorkflowStep {
        WorkflowStep {
            id,
            name: self.name,
            module_address: self.module_address,
            module_name: self.module_name,
            function_name: self.function_name,
            args: self.args,
        }
    }
}

impl From<WorkflowStep> for NewStep {
    fn from(step: WorkflowStep) -> Self {
        Self {
            name: step.name,
            module_address: step.module_address,
            module_name: step.module_name,
            function_name: step.function_name,
            args: step.args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub steps: Vec<WorkflowStep>,
    pub is_active: bool,
    pub created_at: Millis,
    pub last_executed: Millis, // 0 = never executed
}

impl Workflow {
    pub fn new(id: String, name: String, description: String) -> Self {
        Self {
            id,
            name,
            description,
            steps: Vec::new(),
            is_active: false,
            created_at: now_millis(),
            last_executed: 0,
        }
    }

    pub fn has_been_executed(&self) -> bool {
        self.last_executed != 0
    }

    pub fn mark_executed(&mut self) {
        self.last_executed = now_millis();
    }

    pub fn format_last_executed(&self) -> String {
        if !self.has_been_executed() {
            return "Never".to_string();
        }
        chrono::DateTime::from_timestamp_millis(self.last_executed).map_or_else(
            || "Never".to_string(),
            |ts| ts.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        )
    }
}

/// A step definition inside a template; has no id until copied into a workflow.
pub type TemplateStep = NewStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub name: String,
    pub description: String,
    pub steps: Vec<TemplateStep>,
}
