// ABOUTME: Rule-table workflow optimizer - classifies a workflow and appends canned steps

use crate::models::{NewStep, Workflow, WorkflowStep};
use crate::workflows::{StoreError, WorkflowStore};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationKind {
    DeFi,
    Staking,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimization {
    pub kind: OptimizationKind,
    pub description: String,
    pub optimized_steps: Vec<WorkflowStep>,
    original_len: usize,
}

impl Optimization {
    /// Steps added on top of the workflow's existing ones
    pub fn suggested_steps(&self) -> &[WorkflowStep] {
        &self.optimized_steps[self.original_len.min(self.optimized_steps.len())..]
    }

    pub fn has_suggestions(&self) -> bool {
        !self.suggested_steps().is_empty()
    }

    /// Append each suggestion through the store, which assigns fresh ids.
    pub async fn apply(
        &self,
        store: &WorkflowStore,
        address: &str,
        workflow_id: &str,
    ) -> Result<Vec<WorkflowStep>, StoreError> {
        let mut added = Vec::new();
        for step in self.suggested_steps() {
            added.push(store.append_step(address, workflow_id, NewStep::from(step.clone())).await?);
        }
        Ok(added)
    }
}

pub struct WorkflowOptimizer {
    analysis_delay: Duration,
}

impl WorkflowOptimizer {
    pub const fn new(analysis_delay: Duration) -> Self {
        Self { analysis_delay }
    }

    pub async fn analyze(&self, workflow: &Workflow) -> Optimization {
        if !self.analysis_delay.is_zero() {
            tokio::time::sleep(self.analysis_delay).await;
        }
        let optimization = Self::optimize(workflow);
        info!(
            "Optimizer classified {} as {:?} with {} suggestions",
            workflow.id,
            optimization.kind,
            optimization.suggested_steps().len()
        );
        optimization
    }

    pub fn classify(workflow: &Workflow) -> OptimizationKind {
        let uses_module = |module: &str| workflow.steps.iter().any(|s| s.module_name == module);

        if workflow.name.to_lowercase().contains("defi") || uses_module("dex_actions") {
            OptimizationKind::DeFi
        } else if uses_module("staking_actions") {
            OptimizationKind::Staking
        } else {
            OptimizationKind::General
        }
    }

    pub fn optimize(workflow: &Workflow) -> Optimization {
        let kind = Self::classify(workflow);
        let has_step_named = |needle: &str| workflow.steps.iter().any(|s| s.name.contains(needle));
        let mut suggestions = Vec::new();

        let description = match kind {
            OptimizationKind::DeFi => {
                let has_swap = workflow
                    .steps
                    .iter()
                    .any(|s| s.function_name == "swap_tokens" || s.function_name.contains("swap"));
                if has_swap && !has_step_named("Slippage") {
                    suggestions.push((1, "Set Slippage Protection", "dex_actions", "set_slippage_tolerance", "0.5"));
                }
                if !has_step_named("Gas") {
                    suggestions.push((2, "Optimize Gas Usage", "dex_actions", "set_gas_strategy", "adaptive"));
                }
                "AI analysis detected this is a DeFi workflow. Added slippage protection and gas \
                 optimization to improve execution efficiency and reduce costs."
            }
            OptimizationKind::Staking => {
                if !has_step_named("Compound") {
                    suggestions.push((1, "Auto-Compound Rewards", "staking_actions", "auto_compound", "true"));
                }
                "AI analysis detected this is a staking workflow. Added auto-compounding to maximize \
                 your yield over time."
            }
            OptimizationKind::General => {
                suggestions.push((1, "Monitor Execution", "workflow", "add_monitoring", "true"));
                "AI analysis completed. Added execution monitoring to help track this workflow's \
                 performance."
            }
        };

        let mut optimized_steps = workflow.steps.clone();
        // Ordinals are fixed per rule, not positional
        for (ordinal, name, module_name, function_name, arg) in suggestions {
            let step = NewStep::new(name, "0x1", module_name, function_name, vec![arg.to_string()]);
            optimized_steps.push(step.into_step(format!("{}-opt-{}", workflow.id, ordinal)));
        }

        Optimization {
            kind,
            description: description.to_string(),
            optimized_steps,
            original_len: workflow.steps.len(),
        }
    }
}

impl Default for WorkflowOptimizer {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}
