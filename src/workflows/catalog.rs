// ABOUTME: Read-only seed workflows and template catalog, built once per process

use crate::models::{now_millis, NewStep, Workflow, WorkflowStep, WorkflowTemplate};
use lazy_static::lazy_static;

const DAY_MS: i64 = 86_400_000;
const HOUR_MS: i64 = 3_600_000;

lazy_static! {
    static ref SEED_WORKFLOWS: Vec<Workflow> = build_seed(now_millis());
    static ref TEMPLATES: Vec<WorkflowTemplate> = build_templates();
}

fn step(id: &str, name: &str, module_name: &str, function_name: &str, args: &[&str]) -> WorkflowStep {
    template_step(name, module_name, function_name, args).into_step(id.to_string())
}

fn template_step(name: &str, module_name: &str, function_name: &str, args: &[&str]) -> NewStep {
    NewStep::new(
        name,
        "0x1",
        module_name,
        function_name,
        args.iter().map(ToString::to_string).collect(),
    )
}

fn build_seed(now: i64) -> Vec<Workflow> {
    vec![
        Workflow {
            id: "1".to_string(),
            name: "DeFi Morning Routine".to_string(),
            description: "Automated daily DeFi tasks".to_string(),
            steps: vec![
                step("1-1", "Claim Staking Rewards", "staking_actions", "claim_rewards", &[]),
                step("1-2", "Swap Rewards", "dex_actions", "swap_tokens", &["1000", "950"]),
            ],
            is_active: false,
            created_at: now - DAY_MS,
            last_executed: now - 12 * HOUR_MS,
        },
        Workflow {
            id: "2".to_string(),
            name: "Weekly Portfolio Rebalance".to_string(),
            description: "Rebalance portfolio assets weekly".to_string(),
            steps: vec![
                step("2-1", "Check Balance", "portfolio", "check_balance", &[]),
                step("2-2", "Swap if Needed", "dex_actions", "swap_tokens", &["500", "480"]),
            ],
            is_active: false,
            created_at: now - 7 * DAY_MS,
            last_executed: now - DAY_MS,
        },
    ]
}

fn build_templates() -> Vec<WorkflowTemplate> {
    vec![
        WorkflowTemplate {
            name: "Daily DeFi Optimizer".to_string(),
            description: "Claims rewards and reinvests them optimally".to_string(),
            steps: vec![
                template_step("Claim Staking Rewards", "staking_actions", "claim_rewards", &[]),
                template_step("Swap Half to Stable", "dex_actions", "swap_tokens", &["500", "480"]),
                template_step("Add Liquidity", "dex_actions", "add_liquidity", &["250", "250"]),
            ],
        },
        WorkflowTemplate {
            name: "Weekly Portfolio Rebalancer".to_string(),
            description: "Rebalances portfolio to target allocations".to_string(),
            steps: vec![
                template_step("Check Portfolio", "portfolio", "check_balance", &[]),
                template_step("Swap Tokens", "dex_actions", "swap_tokens", &["1000", "980"]),
            ],
        },
    ]
}

/// Demonstration workflows returned for an account with no durable record
pub fn seed_workflows() -> Vec<Workflow> {
    SEED_WORKFLOWS.clone()
}

pub fn templates() -> &'static [WorkflowTemplate] {
    &TEMPLATES
}

pub fn find_template(name: &str) -> Option<&'static WorkflowTemplate> {
    TEMPLATES.iter().find(|t| t.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_stable_across_calls() {
        let first = seed_workflows();
        let second = seed_workflows();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].name, "DeFi Morning Routine");
        assert_eq!(first[1].name, "Weekly Portfolio Rebalance");
    }

    #[test]
    fn templates_are_found_case_insensitively() {
        let template = find_template("daily defi optimizer").unwrap();
        assert_eq!(template.steps.len(), 3);
        assert!(find_template("nope").is_none());
    }
}
