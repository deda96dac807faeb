//! Issue report for a JSON site fixture
//!
//! Prints the decorated issue list, the counts summary and the canonical
//! summary as one JSON document.
//!
//! Run with:
//! `cargo run --bin issue_report -- fixture.json [--site ID] [--actor ID] [--config engine.toml]
//!  [--side-effects] [--severity S] [--pillars P,..] [--action-keys K,..] [--scope T] [--asset TYPE:ID]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::json;
use tracing::info;

use storefront_issues_lib::application::{AutomationDispatcher, Collaborators, ComputeOptions, IssueEngine};
use storefront_issues_lib::domain::AssetType;
use storefront_issues_lib::infrastructure::{
    init_logging_with_config, EngineConfig, InMemoryStore, LoggingAutomationTrigger,
};
use storefront_issues_lib::IssueCountFilters;

#[derive(Debug, Default)]
struct Args {
    fixture: PathBuf,
    site_id: Option<String>,
    actor_id: Option<String>,
    config: Option<PathBuf>,
    side_effects: bool,
    severity: Option<String>,
    pillars: Option<String>,
    action_keys: Option<String>,
    scope: Option<String>,
    asset: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut fixture = None;
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| iter.next().ok_or_else(|| anyhow!("{} needs a value", name));
        match arg.as_str() {
            "--site" => args.site_id = Some(value("--site")?),
            "--actor" => args.actor_id = Some(value("--actor")?),
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            "--side-effects" => args.side_effects = true,
            "--severity" => args.severity = Some(value("--severity")?),
            "--pillars" => args.pillars = Some(value("--pillars")?),
            "--action-keys" => args.action_keys = Some(value("--action-keys")?),
            "--scope" => args.scope = Some(value("--scope")?),
            "--asset" => args.asset = Some(value("--asset")?),
            other if other.starts_with("--") => bail!("Unknown option {}", other),
            other => fixture = Some(PathBuf::from(other)),
        }
    }

    args.fixture = fixture.ok_or_else(|| anyhow!("Usage: issue_report <fixture.json> [options]"))?;
    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => EngineConfig::load(Some(path))?,
        None => EngineConfig::load_default()?,
    };
    init_logging_with_config(&config.logging)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(args, config))
}

async fn run(args: Args, config: EngineConfig) -> Result<()> {
    let store = Arc::new(InMemoryStore::from_path(&args.fixture)?);
    let site_id = match args.site_id.clone() {
        Some(id) => id,
        None => store
            .site_ids()
            .min()
            .map(str::to_string)
            .context("Fixture contains no sites")?,
    };
    let actor_id = args.actor_id.clone().unwrap_or_else(|| "owner".to_string());
    info!(site_id = %site_id, actor_id = %actor_id, fixture = %args.fixture.display(), "🚀 Building issue report");

    let mut engine = IssueEngine::new(Collaborators::from_store(store), &config);
    let mut worker = None;
    if config.automation.enabled && args.side_effects {
        let (dispatcher, handle) =
            AutomationDispatcher::spawn(Arc::new(LoggingAutomationTrigger::new()), &config.automation);
        engine = engine.with_automation(dispatcher);
        worker = Some(handle);
    }

    let filters = IssueCountFilters::parse(
        args.action_keys.as_deref(),
        args.scope.as_deref(),
        args.pillars.as_deref(),
        args.severity.as_deref(),
    )?;
    let options = if args.side_effects {
        ComputeOptions::with_side_effects()
    } else {
        ComputeOptions::read_only()
    };

    let issues = engine.compute_issues(&site_id, &actor_id, options).await?;
    let counts = engine.compute_counts_summary(&site_id, &actor_id).await?;
    let canonical = engine
        .compute_canonical_counts_summary(&site_id, &actor_id, Some(&filters))
        .await?;

    let asset = match &args.asset {
        Some(asset_arg) => {
            let (kind, id) = asset_arg
                .split_once(':')
                .ok_or_else(|| anyhow!("--asset expects TYPE:ID, got {}", asset_arg))?;
            let asset_type: AssetType = kind.parse()?;
            Some(
                engine
                    .compute_asset_issues(&site_id, &actor_id, asset_type, id, Some(&filters))
                    .await?,
            )
        }
        None => None,
    };

    let report = json!({
        "issues": issues,
        "countsSummary": counts,
        "canonicalSummary": canonical,
        "asset": asset,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    // Dropping the engine closes the queue so the worker can drain and exit
    drop(engine);
    if let Some(handle) = worker {
        handle.await?;
    }
    Ok(())
}
