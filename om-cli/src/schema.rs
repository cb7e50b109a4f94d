use std::collections::BTreeSet;

use om_core::config::SchemaConfig;
use om_core::prelude::*;

use crate::output::*;

#[derive(clap::Args)]
pub struct Args {
    #[arg(
        short,
        long,
        long_help = "only print this kind and the types reachable from its root type (default: the whole registry)"
    )]
    pub kind: Option<String>,
}

// The output is itself a valid schema config file, so it can be edited and fed back in with
// --schema-config
pub(crate) fn schema(args: &Args, registry: &SchemaRegistry) -> anyhow::Result<SchemaConfig> {
    let Some(kind_name) = &args.kind else {
        return Ok(SchemaConfig::from_registry(registry));
    };

    let kind = registry.kind(kind_name)?;
    let mut seen = BTreeSet::new();
    let mut pending = vec![kind.root_type.as_str()];
    let mut types = vec![];
    while let Some(type_name) = pending.pop() {
        if !seen.insert(type_name) {
            continue;
        }
        let schema = registry.type_schema(type_name)?;
        pending.extend(schema.fields.iter().rev().filter_map(|f| f.kind.type_ref()));
        types.push(schema.clone());
    }

    Ok(SchemaConfig { types, kinds: vec![kind.clone()] })
}

pub fn cmd(args: &Args, registry: &SchemaRegistry, format: OutputFormat) -> EmptyResult {
    print(&schema(args, registry)?, format)
}
