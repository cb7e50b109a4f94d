mod apply;
mod body;
mod compare;
mod output;
mod scenarios;
mod schema;

use clap::{
    Parser,
    Subcommand,
    crate_version,
};
use om_core::config::load_registry;
use om_core::errors::*;
use om_core::logging;
use tracing::*;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    about = "command-line app for building, applying and comparing Kubernetes/OpenShift objects",
    version,
    propagate_version = true
)]
struct OmCommandRoot {
    #[command(subcommand)]
    subcommand: OmSubcommand,

    #[arg(short, long, global = true, default_value = "warn")]
    verbosity: String,

    #[arg(long, global = true, long_help = "YAML file with extra types and kinds to merge into the built-in schema")]
    schema_config: Option<String>,

    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum OmSubcommand {
    #[command(about = "apply a parameter file to an object", visible_alias = "a")]
    Apply(apply::Args),

    #[command(about = "build a create/replace request body from a parameter file", visible_alias = "b")]
    Body(body::Args),

    #[command(about = "compare an expected object against an actual one", visible_aliases = &["c", "cmp"])]
    Compare(compare::Args),

    #[command(about = "run a directory of scenarios against the current cluster", visible_alias = "run")]
    Scenarios(scenarios::Args),

    #[command(about = "print the schema registry")]
    Schema(schema::Args),

    #[command(about = "objmatch version")]
    Version,
}

async fn run(args: OmCommandRoot) -> EmptyResult {
    // Version shouldn't fail just because the schema config is broken
    if let OmSubcommand::Version = &args.subcommand {
        println!("omctl {}", crate_version!());
        return Ok(());
    }

    let registry = load_registry(args.schema_config.as_deref())?;
    match &args.subcommand {
        OmSubcommand::Apply(a) => apply::cmd(a, &registry, args.output),
        OmSubcommand::Body(a) => body::cmd(a, &registry, args.output),
        OmSubcommand::Compare(a) => compare::cmd(a, &registry, args.output),
        OmSubcommand::Scenarios(a) => scenarios::cmd(a, registry, args.output).await,
        OmSubcommand::Schema(a) => schema::cmd(a, &registry, args.output),
        OmSubcommand::Version => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let args = OmCommandRoot::parse();
    logging::setup_for_cli(&args.verbosity);

    if let Err(err) = run(args).await {
        omerr!(err, "omctl failed");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests;
