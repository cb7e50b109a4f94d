use om_core::prelude::*;
use tracing::*;

use crate::output::*;

#[derive(clap::Args)]
pub struct Args {
    #[arg(short, long, long_help = "resource kind to build a request body for")]
    pub kind: String,

    #[arg(short, long, long_help = "YAML or JSON file holding a flat map of parameters")]
    pub params: String,

    #[arg(
        long,
        long_help = "a previously-fetched object of the same kind; fields that are immutable after creation \
                     (e.g. a Service's clusterIP) are copied from it into the body, for use in a replace"
    )]
    pub carry_over_from: Option<String>,
}

pub(crate) fn body(args: &Args, registry: &SchemaRegistry) -> anyhow::Result<Value> {
    let kind = registry.kind(&args.kind)?;
    let builder = RequestBodyBuilder::new(registry);
    let mut body = builder.build_for(&read_params(&args.params)?, kind)?;

    if let Some(path) = &args.carry_over_from {
        let prior = Reconciler::new(registry).decode(&args.kind, &read_value(path)?)?;
        let carried = builder.carry_over_immutable(&mut body, kind, &prior)?;
        info!("carried over {} field(s) from {path}: {carried:?}", carried.len());
    }
    Ok(body)
}

pub fn cmd(args: &Args, registry: &SchemaRegistry, format: OutputFormat) -> EmptyResult {
    print(&body(args, registry)?, format)
}
