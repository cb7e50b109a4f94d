use std::path::PathBuf;
use std::sync::Arc;

use anyhow::ensure;
use om_core::k8s::KubeResourceClient;
use om_core::logging;
use om_core::prelude::*;
use om_core::scenario::{
    Scenario,
    ScenarioReport,
    ScenarioRunner,
    session_namespace,
};
use tracing::*;

use crate::output::*;

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "directory of scenario files, named <prefix>_<apiversion>_<resource>.yml")]
    pub dir: PathBuf,

    #[arg(
        short,
        long,
        long_help = "run in this (existing) namespace instead of creating and deleting a throwaway one"
    )]
    pub namespace: Option<String>,

    #[arg(long, long_help = "server version to check scenario version limits against (default: ask the apiserver)")]
    pub server_version: Option<String>,

    #[arg(long, default_value = DEFAULT_LOG_FILE, long_help = "file that gets the detailed log of the run")]
    pub log_file: PathBuf,

    #[arg(long, default_value = "debug", long_help = "log filter for the run's log file")]
    pub log_level: String,

    #[arg(long, long_help = "append to the log file instead of truncating it")]
    pub append_log: bool,
}

pub(crate) async fn run_scenarios(
    args: &Args,
    client: &dyn ResourceClient,
    registry: &SchemaRegistry,
    server_version: Option<&str>,
) -> anyhow::Result<Vec<ScenarioReport>> {
    let scenarios = Scenario::load_dir(&args.dir)?;
    info!("loaded {} scenario(s) from {}", scenarios.len(), args.dir.display());

    let (namespace, owned) = match &args.namespace {
        Some(ns) => (ns.clone(), false),
        None => (session_namespace(), true),
    };

    let mut runner = ScenarioRunner::new(client, registry, &namespace);
    if let Some(version) = server_version {
        runner = runner.with_server_version(version);
    }

    if owned {
        runner.setup_namespace().await?;
    }
    let res = runner.run_all(&scenarios).await;
    if owned && let Err(err) = runner.teardown_namespace().await {
        warn!("could not delete namespace {namespace}: {err:#}");
    }
    res
}

pub async fn cmd(args: &Args, registry: SchemaRegistry, format: OutputFormat) -> EmptyResult {
    let client = kube::Client::try_default().await?;
    let server_version = match &args.server_version {
        Some(version) => version.clone(),
        None => client.apiserver_version().await?.git_version,
    };
    info!("running scenarios against server version {server_version}");

    let registry = Arc::new(registry);
    let resource_client = KubeResourceClient::new(client, registry.clone());
    let reports = {
        let _session = logging::session(&args.log_level, &args.log_file, !args.append_log)?;
        run_scenarios(args, &resource_client, &registry, Some(&server_version)).await?
    };

    print(&reports, format)?;
    let failed = reports.iter().filter(|r| !r.passed()).count();
    ensure!(
        failed == 0,
        "{failed} of {} scenario(s) failed; details are in {}",
        reports.len(),
        args.log_file.display()
    );
    Ok(())
}
