use std::fs::File;

use clap::ValueEnum;
use om_core::prelude::*;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

pub(crate) fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
    })
}

pub(crate) fn print<T: Serialize>(value: &T, format: OutputFormat) -> EmptyResult {
    print!("{}", render(value, format)?);
    Ok(())
}

// JSON is a subset of YAML, so one reader covers both kinds of input file
pub(crate) fn read_value(path: &str) -> anyhow::Result<Value> {
    Ok(serde_yaml::from_reader(File::open(path)?)?)
}

pub(crate) fn read_params(path: &str) -> anyhow::Result<ParameterSet> {
    Ok(serde_yaml::from_reader(File::open(path)?)?)
}
