use om_core::prelude::*;
use tracing::*;

use crate::output::*;

#[derive(clap::Args)]
pub struct Args {
    #[arg(short, long, long_help = "resource kind of the target object")]
    pub kind: String,

    #[arg(short, long, long_help = "YAML or JSON file holding a flat map of parameters")]
    pub params: String,

    #[arg(long_help = "YAML or JSON file holding the object to apply the parameters to; starts from an empty object if omitted")]
    pub target: Option<String>,
}

// Applies the parameters to (a copy of) the target and returns the result in wire format
pub(crate) fn apply(args: &Args, registry: &SchemaRegistry) -> anyhow::Result<Value> {
    let reconciler = Reconciler::new(registry);
    let mut obj = match &args.target {
        Some(path) => reconciler.decode(&args.kind, &read_value(path)?)?,
        None => reconciler.new_object(&args.kind)?,
    };

    let params = read_params(&args.params)?;
    debug!("applying {} parameters to {}", params.len(), obj.type_name());
    reconciler.object_from_params(&params, &mut obj)?;
    reconciler.encode(&obj)
}

pub fn cmd(args: &Args, registry: &SchemaRegistry, format: OutputFormat) -> EmptyResult {
    print(&apply(args, registry)?, format)
}
