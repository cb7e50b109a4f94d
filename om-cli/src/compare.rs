use anyhow::ensure;
use om_core::prelude::*;

use crate::output::*;

#[derive(clap::Args)]
pub struct Args {
    #[arg(short, long, long_help = "resource kind of both objects (e.g. Service, pod_disruption_budget)")]
    pub kind: String,

    #[arg(long_help = "YAML or JSON file holding the expected object")]
    pub expected: String,

    #[arg(long_help = "YAML or JSON file holding the actual (usually server-side) object")]
    pub actual: String,
}

pub(crate) fn compare(args: &Args, registry: &SchemaRegistry) -> anyhow::Result<ComparisonResult> {
    let reconciler = Reconciler::new(registry);
    let expected = reconciler.decode(&args.kind, &read_value(&args.expected)?)?;
    let actual = reconciler.decode(&args.kind, &read_value(&args.actual)?)?;
    reconciler.objects_match(&expected, &actual)
}

pub fn cmd(args: &Args, registry: &SchemaRegistry, format: OutputFormat) -> EmptyResult {
    let res = compare(args, registry)?;
    print(&res, format)?;
    ensure!(res.is_match(), "{} and {} differ in {} field(s)", args.expected, args.actual, res.diff.len());
    Ok(())
}
