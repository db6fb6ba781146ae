// ABOUTME: Main entry point for the Aptos Flow command-line front end

use anyhow::{anyhow, bail, Context, Result};
use aptos_flow::chain::SimulatedSubmitter;
use aptos_flow::config::AppConfig;
use aptos_flow::models::{Account, NewStep, Workflow};
use aptos_flow::runner::{ExecutionLog, WorkflowOptimizer, WorkflowRunner};
use aptos_flow::wallet::{ConnectOptions, DemoWalletProvider, RuntimeContext, WalletProvider, WalletSession};
use aptos_flow::workflows::{self, FileStorage, WorkflowStore};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "aptos-flow", version, about = "Build and run on-chain workflows from your wallet")]
struct Cli {
    /// Wallet provider to connect through
    #[arg(long, value_enum, default_value_t = WalletKind::Demo, global = true)]
    wallet: WalletKind,

    /// Network requested from the wallet (overrides config)
    #[arg(long, global = true)]
    network: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WalletKind {
    /// Built-in demo wallet
    Demo,
    /// No wallet installed
    None,
}

#[derive(Subcommand)]
enum Command {
    /// Connect your wallet
    Connect,
    /// Disconnect your wallet
    Disconnect,
    /// Show the wallet session
    Status,
    /// List your workflows
    List,
    /// Show a workflow and its steps
    Show { id: String },
    /// Create a workflow, optionally prefilled from a template
    Create {
        name: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short)]
        template: Option<String>,
    },
    /// List workflow templates
    Templates,
    /// Append a step to a workflow
    AddStep {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        module_address: String,
        #[arg(long)]
        module_name: String,
        #[arg(long)]
        function: String,
        /// Comma separated arguments
        #[arg(long, default_value = "")]
        args: String,
    },
    /// Run a workflow with live progress logs
    Execute { id: String },
    /// Suggest extra steps for a workflow
    Optimize {
        id: String,
        #[arg(long)]
        apply: bool,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration to ~/.aptos-flow/config.toml
    Init,
}

struct FlowApp {
    config: AppConfig,
    session: WalletSession,
    store: Arc<WorkflowStore>,
}

impl FlowApp {
    async fn new(config: AppConfig, wallet: WalletKind) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let provider: Option<Arc<dyn WalletProvider>> = match wallet {
            WalletKind::Demo => {
                info!("Using demo wallet provider");
                Some(Arc::new(
                    DemoWalletProvider::new().with_state_file(data_dir.join("demo_wallet.json")),
                ))
            }
            WalletKind::None => None,
        };

        let session = WalletSession::new(
            provider,
            RuntimeContext::Interactive,
            ConnectOptions::prompt(config.network_name.clone()),
        );
        session.init().await;

        let storage = FileStorage::new(config.workflows_dir()?)
            .context("Failed to open workflow storage")?;
        let submitter = SimulatedSubmitter::with_node_url(config.node_url.clone());
        let store = Arc::new(WorkflowStore::new(Arc::new(storage), Arc::new(submitter)));

        Ok(Self { config, session, store })
    }

    fn require_account(&self) -> Result<Account> {
        self.session
            .account()
            .ok_or_else(|| anyhow!("Wallet not connected. Run `aptos-flow connect` first."))
    }

    async fn require_workflow(&self, address: &str, id: &str) -> Result<Workflow> {
        self.store.load(address).await;
        self.store
            .get(address, id)
            .await
            .ok_or_else(|| anyhow!("Workflow not found: {id}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(network) = cli.network.clone() {
        config.network_name = network;
    }

    if let Err(e) = setup_logging(&config) {
        eprintln!("Logging disabled: {e:#}");
    }

    let app = FlowApp::new(config, cli.wallet).await?;
    if let Err(e) = run(&app, cli.command).await {
        error!("Command failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(app: &FlowApp, command: Command) -> Result<()> {
    match command {
        Command::Connect => {
            if !app.session.is_provider_available() {
                bail!("No wallet provider is installed. Re-run with `--wallet demo`.");
            }
            let account = app.session.connect().await?;
            println!("Connected {} on {}", account.address, app.config.network_name);
        }
        Command::Disconnect => {
            app.session.disconnect().await;
            println!("Disconnected");
        }
        Command::Status => {
            let state = app.session.state();
            match state.account() {
                Some(account) => println!("{} Connected as {}", state.indicator(), account.address),
                None => println!("{} Not connected", state.indicator()),
            }
        }
        Command::List => {
            let account = app.require_account()?;
            let workflows = app.store.load(&account.address).await;
            if workflows.is_empty() {
                println!("No workflows yet. Create one with `aptos-flow create`.");
            }
            for workflow in workflows {
                println!(
                    "{:<32} {:<30} {} steps, last executed: {}",
                    workflow.id,
                    workflow.name,
                    workflow.steps.len(),
                    workflow.format_last_executed()
                );
            }
        }
        Command::Show { id } => {
            let account = app.require_account()?;
            let workflow = app.require_workflow(&account.address, &id).await?;
            print_workflow(&workflow);
        }
        Command::Create { name, description, template } => {
            let account = app.require_account()?;
            app.store.load(&account.address).await;

            let workflow = match template {
                Some(template_name) => {
                    let template = workflows::find_template(&template_name)
                        .ok_or_else(|| anyhow!("Unknown template: {template_name}"))?;
                    if name.is_none() && description.is_none() {
                        app.store.create_from_template(&account.address, template).await?
                    } else {
                        let name = name.unwrap_or_else(|| template.name.clone());
                        let description = description.unwrap_or_else(|| template.description.clone());
                        app.store.create(&account.address, &name, &description).await?
                    }
                }
                None => {
                    let name = name.filter(|n| !n.trim().is_empty()).context("A workflow name is required")?;
                    app.store
                        .create(&account.address, &name, &description.unwrap_or_default())
                        .await?
                }
            };
            println!("Created workflow {} ({})", workflow.name, workflow.id);
        }
        Command::Templates => {
            for template in workflows::templates() {
                println!("{} - {} ({} steps)", template.name, template.description, template.steps.len());
            }
        }
        Command::AddStep {
            id,
            name,
            module_address,
            module_name,
            function,
            args,
        } => {
            let account = app.require_account()?;
            app.require_workflow(&account.address, &id).await?;
            let step = NewStep::new(name, module_address, module_name, function, NewStep::parse_args(&args));
            let added = app.store.append_step(&account.address, &id, step).await?;
            println!("Added step {} ({})", added.name, added.id);
        }
        Command::Execute { id } => {
            let account = app.require_account()?;
            app.require_workflow(&account.address, &id).await?;
            let runner = WorkflowRunner::new(Arc::clone(&app.store), app.config.execution.clone());

            let (sender, mut receiver) = mpsc::unbounded_channel::<ExecutionLog>();
            let printer = tokio::spawn(async move {
                while let Some(log) = receiver.recv().await {
                    println!("{}", log.format());
                }
            });

            let report = runner.run(&account.address, &id, Some(sender)).await;
            printer.await.context("Log printer task failed")?;

            let report = report?;
            if let Some(error) = report.error {
                bail!(error);
            }
            println!("Workflow executed successfully!");
        }
        Command::Optimize { id, apply } => {
            let account = app.require_account()?;
            let workflow = app.require_workflow(&account.address, &id).await?;
            let optimizer = WorkflowOptimizer::new(app.config.optimizer.analysis_delay());

            println!("Analyzing workflow architecture...");
            let optimization = optimizer.analyze(&workflow).await;
            println!("{}", optimization.description);

            if !optimization.has_suggestions() {
                println!("No new steps needed, your workflow is already well optimized!");
                return Ok(());
            }
            for step in optimization.suggested_steps() {
                println!("  + {} ({}.{} {})", step.name, step.module_name, step.function_name, step.args.join(", "));
            }
            if apply {
                let added = optimization.apply(&app.store, &account.address, &id).await?;
                println!("Applied {} optimizations", added.len());
            }
        }
        Command::Config { action: ConfigAction::Init } => {
            let path = AppConfig::default().save()?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}

fn print_workflow(workflow: &Workflow) {
    println!("{}", workflow.name);
    println!("{}", workflow.description);
    println!("Last executed: {}", workflow.format_last_executed());
    if workflow.steps.is_empty() {
        println!("No steps yet. Add one with `aptos-flow add-step`.");
    }
    for (index, step) in workflow.steps.iter().enumerate() {
        println!(
            "{:>3}. {} - {}({})",
            index + 1,
            step.name,
            step.entry_function(),
            step.args.join(", ")
        );
    }
}

fn setup_logging(config: &AppConfig) -> Result<()> {
    use std::fs::OpenOptions;
    use tracing_subscriber::prelude::*;

    let log_dir = config.logs_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    // Create log file with timestamp
    let log_file = log_dir.join(format!(
        "aptos-flow-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to create log file: {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(file)
                .with_ansi(false), // No ANSI colors in log file
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aptos_flow=info".into()),
        )
        .init();

    Ok(())
}
