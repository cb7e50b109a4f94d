mod runner;

use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::path::Path;

pub use runner::*;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::*;

use crate::errors::*;
use crate::mapper::ParameterSet;

const SCENARIO_EXTENSIONS: &[&str] = &["yml", "yaml"];
const LATEST_VERSION: &str = "latest";

err_impl! {pub ScenarioError,
    #[error("invalid scenario file name: {0}")]
    InvalidFileName(String),

    #[error("scenario task has no action: {0}")]
    MissingAction(String),
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Create,
    Get,
    Patch,
    Replace,
    Remove,
}

impl Phase {
    // Phases run in this order; each one works on its own freshly created objects
    pub const ALL: &'static [Phase] = &[Phase::Create, Phase::Get, Phase::Patch, Phase::Replace, Phase::Remove];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Create => "create",
            Phase::Get => "get",
            Phase::Patch => "patch",
            Phase::Replace => "replace",
            Phase::Remove => "remove",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

// One entry in a scenario file, e.g.
//
// - create:
//     name: myservice
//     namespace: k8s-project
//     selector:
//       app: django
//   seq: 1
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Task {
    #[serde(default)]
    pub seq: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<ParameterSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<ParameterSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<ParameterSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<ParameterSet>,
}

impl Task {
    pub fn params_for(&self, phase: Phase) -> Option<&ParameterSet> {
        match phase {
            Phase::Create => self.create.as_ref(),
            Phase::Patch => self.patch.as_ref(),
            Phase::Replace => self.replace.as_ref(),
            Phase::Remove => self.remove.as_ref(),
            Phase::Get => None,
        }
    }

    fn has_action(&self) -> bool {
        self.create.is_some() || self.patch.is_some() || self.replace.is_some() || self.remove.is_some()
    }
}

// Server versions a scenario applies to; "latest" is a version of its own, and is excluded only
// when `latest` is set
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionLimits {
    pub min: Option<String>,
    pub max: Option<String>,

    #[serde(default)]
    pub latest: bool,
}

impl VersionLimits {
    pub fn allows(&self, server_version: &str) -> bool {
        if server_version == LATEST_VERSION {
            return !self.latest;
        }

        let too_low = self
            .min
            .as_ref()
            .is_some_and(|min| compare_versions(min, server_version) == Ordering::Greater);
        let too_high = self
            .max
            .as_ref()
            .is_some_and(|max| compare_versions(max, server_version) == Ordering::Less);
        !(too_low || too_high)
    }
}

// Compares dotted versions ("3.6", "v3.10.1") numerically, component by component; missing
// components count as zero and non-numeric suffixes are ignored
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim_start_matches('v')
            .split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    };

    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        match a.get(i).unwrap_or(&0).cmp(b.get(i).unwrap_or(&0)) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

// Scenario files are either a bare list of tasks, or a map with the tasks and version limits
#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioConfig {
    Tasks(Vec<Task>),

    #[serde(rename_all = "camelCase")]
    Full {
        tasks: Vec<Task>,

        #[serde(default)]
        version_limits: Option<VersionLimits>,
    },
}

// A scenario exercises one resource type through create/get/patch/replace/remove.  Scenario files
// are named `<prefix>_<apiversion>_<resource>.yml`, e.g. `example_v1_service.yml`.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub api_version: String,
    pub resource: String,
    pub tasks: Vec<Task>,
    pub version_limits: Option<VersionLimits>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Scenario> {
        let file_name = path.file_name().and_then(|f| f.to_str()).unwrap_or_default();
        let (api_version, resource) = parse_file_name(file_name)?;
        let config: ScenarioConfig = serde_yaml::from_reader(File::open(path)?)?;
        Scenario::from_config(file_name, &api_version, &resource, config)
    }

    pub fn from_yaml(file_name: &str, contents: &str) -> anyhow::Result<Scenario> {
        let (api_version, resource) = parse_file_name(file_name)?;
        Scenario::from_config(file_name, &api_version, &resource, serde_yaml::from_str(contents)?)
    }

    // Loads every scenario file in `dir`, sorted by file name; other files are skipped
    pub fn load_dir(dir: &Path) -> anyhow::Result<Vec<Scenario>> {
        let mut paths = vec![];
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SCENARIO_EXTENSIONS.contains(&e))
            {
                paths.push(path);
            } else {
                debug!("skipping non-scenario file {}", path.display());
            }
        }
        paths.sort();
        paths.iter().map(|p| Scenario::load(p)).collect()
    }

    fn from_config(file_name: &str, api_version: &str, resource: &str, config: ScenarioConfig) -> anyhow::Result<Scenario> {
        let (mut tasks, version_limits) = match config {
            ScenarioConfig::Tasks(tasks) => (tasks, None),
            ScenarioConfig::Full { tasks, version_limits } => (tasks, version_limits),
        };

        if let Some(task) = tasks.iter().find(|t| !t.has_action()) {
            bail!(ScenarioError::missing_action(&format!("{file_name} seq {}", task.seq)));
        }
        tasks.sort_by_key(|t| t.seq);

        Ok(Scenario {
            name: file_name.into(),
            api_version: api_version.into(),
            resource: resource.into(),
            tasks,
            version_limits,
        })
    }

    pub fn params_for(&self, phase: Phase) -> impl Iterator<Item = (u32, &ParameterSet)> {
        self.tasks.iter().filter_map(move |t| Some((t.seq, t.params_for(phase)?)))
    }
}

fn parse_file_name(file_name: &str) -> anyhow::Result<(String, String)> {
    let stem = SCENARIO_EXTENSIONS
        .iter()
        .find_map(|ext| file_name.strip_suffix(&format!(".{ext}")))
        .ok_or_else(|| ScenarioError::invalid_file_name(file_name))?;

    match stem.splitn(3, '_').collect::<Vec<_>>()[..] {
        [_, api_version, resource] if !api_version.is_empty() && !resource.is_empty() => {
            Ok((api_version.into(), resource.into()))
        },
        _ => bail!(ScenarioError::invalid_file_name(file_name)),
    }
}

#[cfg(test)]
mod tests;
