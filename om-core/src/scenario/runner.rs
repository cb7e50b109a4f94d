use serde::Serialize;
use serde_json::Value;
use tracing::*;
use uuid::Uuid;

use super::*;
use crate::body::RequestBodyBuilder;
use crate::compare::DiffEntry;
use crate::constants::*;
use crate::k8s::ResourceClient;
use crate::object::TypedObject;
use crate::reconcile::Reconciler;
use crate::schema::{
    ResourceKind,
    SchemaRegistry,
};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub phase: Phase,
    pub seq: u32,
    pub object_name: String,
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diff: Vec<DiffEntry>,
}

impl TaskReport {
    fn new(phase: Phase, seq: u32, object_name: &str, res: anyhow::Result<Vec<DiffEntry>>) -> TaskReport {
        let (passed, error, diff) = match res {
            Ok(diff) => (diff.is_empty(), None, diff),
            Err(err) => (false, Some(format!("{err:#}")), vec![]),
        };

        if passed {
            info!("{phase} {object_name} (seq {seq}): ok");
        } else {
            warn!("{phase} {object_name} (seq {seq}): FAILED");
        }
        TaskReport { phase, seq, object_name: object_name.into(), passed, error, diff }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub scenario: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,

    pub tasks: Vec<TaskReport>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.tasks.iter().all(|t| t.passed)
    }
}

// Object names look like "<phase>-<uuid>", cut down to a length every resource type accepts
pub fn object_name(phase: Phase) -> String {
    let name = format!("{phase}-{}", Uuid::new_v4());
    name[..MAX_GENERATED_NAME_LEN.min(name.len())].trim_matches('-').into()
}

pub fn session_namespace() -> String {
    format!("{DEFAULT_SCENARIO_NAMESPACE_PREFIX}-{}", Uuid::new_v4())
}

// An object created for a phase, along with where it lives
struct Created {
    name: String,
    namespace: Option<String>,
    obj: TypedObject,
}

// Runs scenarios against a ResourceClient.  Every phase creates its own objects from the
// scenario's create tasks (named after the phase), runs its checks, and deletes them again, so a
// failure in one phase doesn't leak into the next.  Calls are made one at a time and never
// retried.
pub struct ScenarioRunner<'a> {
    client: &'a dyn ResourceClient,
    reconciler: Reconciler<'a>,
    namespace: String,
    server_version: Option<String>,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(client: &'a dyn ResourceClient, registry: &'a SchemaRegistry, namespace: &str) -> ScenarioRunner<'a> {
        ScenarioRunner {
            client,
            reconciler: Reconciler::new(registry),
            namespace: namespace.into(),
            server_version: None,
        }
    }

    pub fn with_server_version(mut self, version: &str) -> ScenarioRunner<'a> {
        self.server_version = Some(version.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn setup_namespace(&self) -> EmptyResult {
        let kind = self.reconciler.registry().kind(NAMESPACE_KIND)?;
        let body = RequestBodyBuilder::new(self.reconciler.registry())
            .build_for(&ParameterSet::from([(NAME_PARAM.into(), Value::from(self.namespace.as_str()))]), kind)?;
        info!("creating session namespace {}", self.namespace);
        self.client.create(kind, None, &body).await?;
        Ok(())
    }

    pub async fn teardown_namespace(&self) -> EmptyResult {
        let kind = self.reconciler.registry().kind(NAMESPACE_KIND)?;
        info!("deleting session namespace {}", self.namespace);
        self.client.delete_idempotent(kind, &self.namespace, None).await
    }

    pub async fn run_all(&self, scenarios: &[Scenario]) -> anyhow::Result<Vec<ScenarioReport>> {
        let mut reports = vec![];
        for scenario in scenarios {
            reports.push(self.run(scenario).await?);
        }
        Ok(reports)
    }

    pub async fn run(&self, scenario: &Scenario) -> anyhow::Result<ScenarioReport> {
        let mut report = ScenarioReport { scenario: scenario.name.clone(), ..Default::default() };

        if let (Some(limits), Some(version)) = (&scenario.version_limits, &self.server_version)
            && !limits.allows(version)
        {
            info!("skipping {}: not supported on server version {version}", scenario.name);
            report.skipped = Some(format!("not supported on server version {version}"));
            return Ok(report);
        }

        let kind = self.reconciler.registry().kind(&scenario.resource)?;
        if kind.gvk.version != scenario.api_version {
            warn!(
                "scenario {} is for {}, but the registry has {}; using the registry's version",
                scenario.name,
                scenario.api_version,
                kind.api_version()
            );
        }

        info!("running scenario {}", scenario.name);
        for phase in Phase::ALL {
            self.run_phase(scenario, kind, *phase, &mut report).await;
        }
        Ok(report)
    }

    async fn run_phase(&self, scenario: &Scenario, kind: &ResourceKind, phase: Phase, report: &mut ScenarioReport) {
        let name = object_name(phase);
        let created = self.create_resources(scenario, kind, phase, &name, report).await;

        match phase {
            Phase::Create => (),
            Phase::Get => {
                for c in &created {
                    let res = self.check_exists(kind, c).await;
                    report.tasks.push(TaskReport::new(phase, 0, &c.name, res));
                }
            },
            Phase::Patch => {
                if let Some(c) = created.first() {
                    for (seq, params) in scenario.params_for(phase) {
                        let params = self.substitute(kind, params, &name);
                        let res = self.patch(kind, c, &params).await;
                        report.tasks.push(TaskReport::new(phase, seq, &c.name, res));
                    }
                }
            },
            Phase::Replace => {
                if let Some(c) = created.first() {
                    for (seq, params) in scenario.params_for(phase) {
                        let params = self.substitute(kind, params, &name);
                        let res = self.replace(kind, c, &params).await;
                        report.tasks.push(TaskReport::new(phase, seq, &c.name, res));
                    }
                }
            },
            Phase::Remove => {
                for c in &created {
                    let res = self.remove(kind, c).await;
                    report.tasks.push(TaskReport::new(phase, 0, &c.name, res));
                }
            },
        }

        for c in &created {
            if let Err(err) = self.client.delete_idempotent(kind, &c.name, c.namespace.as_deref()).await {
                warn!("could not clean up {} {}: {err:#}", kind.kind(), c.name);
            }
        }
    }

    // Creates one object per create task (the first gets the phase's name, the rest a numbered
    // variant of it).  Only the create phase reports on and verifies the creates; the other
    // phases just need the objects to exist.
    async fn create_resources(
        &self,
        scenario: &Scenario,
        kind: &ResourceKind,
        phase: Phase,
        name: &str,
        report: &mut ScenarioReport,
    ) -> Vec<Created> {
        let mut created = vec![];
        for (i, (seq, params)) in scenario.params_for(Phase::Create).enumerate() {
            let name = if i == 0 { name.to_string() } else { format!("{name}-{i}") };
            let params = self.substitute(kind, params, &name);
            let namespace = kind.namespaced.then(|| self.namespace.clone());
            let res = async {
                let body = self.reconciler.request_body_from_params(&params, kind.kind())?;
                let obj = self.client.create(kind, namespace.as_deref(), &body).await?;
                let diff = if phase == Phase::Create {
                    self.reconciler.verify_params(&obj, &params)?.diff
                } else {
                    vec![]
                };
                anyhow::Ok((obj, diff))
            }
            .await;

            match res {
                Ok((obj, diff)) => {
                    if phase == Phase::Create {
                        report.tasks.push(TaskReport::new(phase, seq, &name, Ok(diff)));
                    }
                    created.push(Created { name, namespace, obj });
                },
                Err(err) => report.tasks.push(TaskReport::new(phase, seq, &name, Err(err))),
            }
        }
        created
    }

    async fn check_exists(&self, kind: &ResourceKind, c: &Created) -> anyhow::Result<Vec<DiffEntry>> {
        match self.client.get(kind, &c.name, c.namespace.as_deref()).await? {
            Some(_) => Ok(vec![]),
            None => bail!("{} {} not found", kind.kind(), c.name),
        }
    }

    // The patch parameters have to actually change something, otherwise the check after the
    // patch call proves nothing
    async fn patch(&self, kind: &ResourceKind, c: &Created, params: &ParameterSet) -> anyhow::Result<Vec<DiffEntry>> {
        let mut updated = c.obj.clone();
        self.reconciler.object_from_params(params, &mut updated)?;
        ensure!(
            !self.reconciler.objects_match(&c.obj, &updated)?.is_match(),
            "patch parameters don't change {} {}",
            kind.kind(),
            c.name
        );

        let body = self.reconciler.encode(&updated)?;
        let patched = self.client.patch(kind, &c.name, c.namespace.as_deref(), &body).await?;
        Ok(self.reconciler.verify_params(&patched, params)?.diff)
    }

    async fn replace(&self, kind: &ResourceKind, c: &Created, params: &ParameterSet) -> anyhow::Result<Vec<DiffEntry>> {
        let builder = RequestBodyBuilder::new(self.reconciler.registry());
        let mut body = builder.build_for(params, kind)?;
        for path in builder.carry_over_immutable(&mut body, kind, &c.obj)? {
            debug!("kept immutable field {path} for replace");
        }

        let replaced = self.client.replace(kind, &c.name, c.namespace.as_deref(), &body).await?;
        Ok(self.reconciler.verify_params(&replaced, params)?.diff)
    }

    async fn remove(&self, kind: &ResourceKind, c: &Created) -> anyhow::Result<Vec<DiffEntry>> {
        self.client.delete_idempotent(kind, &c.name, c.namespace.as_deref()).await?;
        match self.client.get(kind, &c.name, c.namespace.as_deref()).await? {
            None => Ok(vec![]),
            Some(_) => bail!("{} {} still exists after delete", kind.kind(), c.name),
        }
    }

    // Scenario files carry placeholder names and namespaces; every object gets the phase's name,
    // and namespaced kinds go in the session namespace
    fn substitute(&self, kind: &ResourceKind, params: &ParameterSet, name: &str) -> ParameterSet {
        let mut params = params.clone();
        params.insert(NAME_PARAM.into(), Value::from(name));
        if kind.namespaced {
            params.insert(NAMESPACE_PARAM.into(), Value::from(self.namespace.as_str()));
        } else {
            params.remove(NAMESPACE_PARAM);
        }
        params
    }
}
