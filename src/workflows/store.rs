// ABOUTME: Per-account workflow store - load, create, append-step and execute
// Every mutation submits its transaction first, then mutates and persists under one lock

use crate::chain::{EntryFunctionPayload, SubmitError, TransactionSubmitter};
use crate::models::{now_millis, NewStep, Workflow, WorkflowStep, WorkflowTemplate};
use crate::workflows::catalog;
use crate::workflows::error::StoreError;
use crate::workflows::persistence::{record_key, WorkflowStorage};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

type Collections = HashMap<String, Vec<Workflow>>;

/// Marks the store busy for as long as an operation is running
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct WorkflowStore {
    storage: Arc<dyn WorkflowStorage>,
    submitter: Arc<dyn TransactionSubmitter>,
    collections: tokio::sync::Mutex<Collections>,
    error: Mutex<Option<String>>,
    in_flight: AtomicUsize,
}

impl WorkflowStore {
    pub fn new(storage: Arc<dyn WorkflowStorage>, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        Self {
            storage,
            submitter,
            collections: tokio::sync::Mutex::new(HashMap::new()),
            error: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Message from the last failed operation, cleared when the next one starts
    pub fn error(&self) -> Option<String> {
        self.error.lock().ok().and_then(|e| e.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn set_error(&self, message: Option<String>) {
        if let Ok(mut error) = self.error.lock() {
            *error = message;
        }
    }

    fn record<T>(&self, operation: &str, result: Result<T, StoreError>) -> Result<T, StoreError> {
        if let Err(e) = &result {
            error!("Error {}: {}", operation, e);
            self.set_error(Some(e.to_string()));
        }
        result
    }

    /// Read an account's durable record, falling back to the seed set when the
    /// record is missing or unreadable.
    fn read_collection(&self, address: &str) -> Vec<Workflow> {
        let key = record_key(address);
        match self.storage.read(&key) {
            Ok(Some(content)) => match serde_json::from_str::<Vec<Workflow>>(&content) {
                Ok(workflows) => {
                    debug!("Loaded {} workflows for {}", workflows.len(), address);
                    workflows
                }
                Err(e) => {
                    warn!("Malformed workflow record for {}, using seed set: {}", address, e);
                    catalog::seed_workflows()
                }
            },
            Ok(None) => {
                debug!("No workflow record for {}, using seed set", address);
                catalog::seed_workflows()
            }
            Err(e) => {
                warn!("Error loading workflows for {}, using seed set: {}", address, e);
                catalog::seed_workflows()
            }
        }
    }

    fn ensure_loaded<'a>(&self, collections: &'a mut Collections, address: &str) -> &'a mut Vec<Workflow> {
        collections
            .entry(address.to_string())
            .or_insert_with(|| self.read_collection(address))
    }

    /// Write the full collection as it is right now. Callers hold the collections lock.
    fn persist(&self, address: &str, workflows: &[Workflow]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(workflows)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        self.storage
            .write(&record_key(address), &json)
            .map_err(|e| StoreError::Persistence(e.to_string()))
    }

    async fn submit(&self, address: &str, payload: EntryFunctionPayload) -> Result<(), StoreError> {
        let function = payload.function.clone();
        let receipt = self.submitter.submit(address, payload).await?;
        if !receipt.success {
            return Err(SubmitError::Failed(format!("{function} ({})", receipt.hash)).into());
        }
        debug!("Transaction {} accepted for {}", receipt.hash, function);
        Ok(())
    }

    fn require_address(address: &str) -> Result<(), StoreError> {
        if address.trim().is_empty() {
            return Err(StoreError::MissingAddress);
        }
        Ok(())
    }

    /// Re-read the account's workflows from its durable record.
    pub async fn load(&self, address: &str) -> Vec<Workflow> {
        if address.trim().is_empty() {
            return Vec::new();
        }
        let _busy = InFlight::start(&self.in_flight);
        self.set_error(None);

        let mut collections = self.collections.lock().await;
        let workflows = self.read_collection(address);
        collections.insert(address.to_string(), workflows.clone());
        workflows
    }

    /// In-memory collection for an account, read from its durable record on first use.
    pub async fn workflows(&self, address: &str) -> Vec<Workflow> {
        if address.trim().is_empty() {
            return Vec::new();
        }
        let mut collections = self.collections.lock().await;
        self.ensure_loaded(&mut collections, address).clone()
    }

    pub async fn get(&self, address: &str, workflow_id: &str) -> Option<Workflow> {
        if address.trim().is_empty() {
            return None;
        }
        let mut collections = self.collections.lock().await;
        self.ensure_loaded(&mut collections, address)
            .iter()
            .find(|w| w.id == workflow_id)
            .cloned()
    }

    pub async fn create(&self, address: &str, name: &str, description: &str) -> Result<Workflow, StoreError> {
        let _busy = InFlight::start(&self.in_flight);
        self.set_error(None);
        let result = self.create_inner(address, name, description).await;
        self.record("creating workflow", result)
    }

    async fn create_inner(&self, address: &str, name: &str, description: &str) -> Result<Workflow, StoreError> {
        Self::require_address(address)?;
        info!("Creating workflow {:?} for {}", name, address);

        let payload = EntryFunctionPayload::workflow_call(
            address,
            "create_workflow",
            vec![Value::from(name), Value::from(description)],
        );
        self.submit(address, payload).await?;

        let mut collections = self.collections.lock().await;
        let workflows = self.ensure_loaded(&mut collections, address);

        let id = loop {
            let candidate = generate_workflow_id();
            if !workflows.iter().any(|w| w.id == candidate) {
                break candidate;
            }
        };
        let workflow = Workflow::new(id, name.to_string(), description.to_string());
        workflows.push(workflow.clone());

        self.persist(address, workflows)?;
        info!("Workflow {} created for {}", workflow.id, address);
        Ok(workflow)
    }

    /// Only the template's name and description are used; its steps are not copied.
    pub async fn create_from_template(
        &self,
        address: &str,
        template: &WorkflowTemplate,
    ) -> Result<Workflow, StoreError> {
        debug!(
            "Template {:?} has {} steps that are not added to the new workflow",
            template.name,
            template.steps.len()
        );
        self.create(address, &template.name, &template.description).await
    }

    pub async fn append_step(
        &self,
        address: &str,
        workflow_id: &str,
        step: NewStep,
    ) -> Result<WorkflowStep, StoreError> {
        let _busy = InFlight::start(&self.in_flight);
        self.set_error(None);
        let result = self.append_step_inner(address, workflow_id, step).await;
        self.record("adding workflow step", result)
    }

    async fn append_step_inner(
        &self,
        address: &str,
        workflow_id: &str,
        step: NewStep,
    ) -> Result<WorkflowStep, StoreError> {
        Self::require_address(address)?;

        let workflow_name = self.workflow_name(address, workflow_id).await?;
        let args = step.args.iter().cloned().map(Value::from).collect::<Vec<_>>();
        let payload = EntryFunctionPayload::workflow_call(
            address,
            "add_workflow_step",
            vec![
                Value::from(workflow_name),
                Value::from(step.name.as_str()),
                Value::from(step.module_address.as_str()),
                Value::from(step.module_name.as_str()),
                Value::from(step.function_name.as_str()),
                Value::Array(args),
            ],
        );
        self.submit(address, payload).await?;

        let mut collections = self.collections.lock().await;
        let workflows = self.ensure_loaded(&mut collections, address);
        let workflow = workflows
            .iter_mut()
            .find(|w| w.id == workflow_id)
            .ok_or_else(|| StoreError::NotFound(workflow_id.to_string()))?;

        let step_id = generate_step_id(workflow);
        let new_step = step.into_step(step_id);
        workflow.steps.push(new_step.clone());

        self.persist(address, workflows)?;
        info!("Added step {} to workflow {}", new_step.id, workflow_id);
        Ok(new_step)
    }

    /// Record a successful run: only `last_executed` changes.
    pub async fn execute(&self, address: &str, workflow_id: &str) -> Result<Workflow, StoreError> {
        let _busy = InFlight::start(&self.in_flight);
        self.set_error(None);
        let result = self.execute_inner(address, workflow_id).await;
        self.record("executing workflow", result)
    }

    async fn execute_inner(&self, address: &str, workflow_id: &str) -> Result<Workflow, StoreError> {
        Self::require_address(address)?;

        let workflow_name = self.workflow_name(address, workflow_id).await?;
        let payload = EntryFunctionPayload::workflow_call(
            address,
            "execute_workflow",
            vec![Value::from(workflow_name)],
        );
        self.submit(address, payload).await?;

        let mut collections = self.collections.lock().await;
        let workflows = self.ensure_loaded(&mut collections, address);
        let workflow = workflows
            .iter_mut()
            .find(|w| w.id == workflow_id)
            .ok_or_else(|| StoreError::NotFound(workflow_id.to_string()))?;
        workflow.mark_executed();
        let updated = workflow.clone();

        self.persist(address, workflows)?;
        info!("Workflow {} executed at {}", workflow_id, updated.last_executed);
        Ok(updated)
    }

    async fn workflow_name(&self, address: &str, workflow_id: &str) -> Result<String, StoreError> {
        let mut collections = self.collections.lock().await;
        self.ensure_loaded(&mut collections, address)
            .iter()
            .find(|w| w.id == workflow_id)
            .map(|w| w.name.clone())
            .ok_or_else(|| StoreError::NotFound(workflow_id.to_string()))
    }
}

fn generate_workflow_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("custom-{}-{}", now_millis(), &suffix[..8])
}

/// `<workflow id>-<position>-<millis>`, suffixed if a sibling already has it
fn generate_step_id(workflow: &Workflow) -> String {
    let base = format!("{}-{}-{}", workflow.id, workflow.steps.len() + 1, now_millis());
    let taken = |id: &str| workflow.steps.iter().any(|s| s.id == id);

    if !taken(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}
