use crate::columns::Columns;
use crate::config::Config;
use crate::definition::{bind_task, ProcedureDefinition, TaskDefinition};
use crate::duration::Duration;
use crate::error::{MaestroError, Result};
use crate::ipv::IpvFields;
use crate::paths;
use crate::sync::{self, Endpoint, Endpoints};
use crate::task::{RoleBinding, Task, TaskId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// A loaded, fully scheduled procedure.
///
/// A `Procedure` only exists in the synchronized state: construction builds
/// the task arena, chains and synchronizes it, and hands back the result.
/// There are no mutating methods afterwards; a changed task list means
/// loading again.
#[derive(Debug, Clone, Serialize)]
pub struct Procedure {
    pub name: String,
    /// File-safe form of `name`.
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv_fields: Option<IpvFields>,
    columns: Columns,
    tasks: Vec<Task>,
    endpoints: Endpoints,
    #[serde(skip)]
    definition: ProcedureDefinition,
    #[serde(skip)]
    task_definitions: BTreeMap<String, TaskDefinition>,
}

impl Procedure {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Build from in-memory definitions. `task_defs` maps each task file name,
    /// as referenced by the procedure, to its definition.
    pub fn from_definitions(
        def: ProcedureDefinition,
        task_defs: &HashMap<String, TaskDefinition>,
    ) -> Result<Self> {
        let mut tasks = Vec::with_capacity(def.tasks.len());
        let mut task_definitions = BTreeMap::new();
        for (i, reference) in def.tasks.iter().enumerate() {
            let task_def = task_defs
                .get(&reference.file)
                .ok_or_else(|| MaestroError::TaskNotFound(reference.file.clone()))?;
            tasks.push(bind_task(TaskId(i), reference, task_def)?);
            task_definitions
                .entry(reference.file.clone())
                .or_insert_with(|| task_def.clone());
        }
        let definition = def.clone();

        let endpoints = sync::schedule(&mut tasks)?;

        let actors = lead_actors(&tasks);
        let columns = if def.columns.is_empty() {
            Columns::one_per_actor(&actors)
        } else {
            let columns = Columns::new(def.columns);
            if let Some(actor) = actors.iter().find(|a| columns.column_index(a).is_none()) {
                return Err(MaestroError::Configuration(format!(
                    "actor '{actor}' does not appear in any column and there is no '*' column"
                )));
            }
            columns
        };

        let mut procedure = Self {
            name: String::new(),
            filename: String::new(),
            number: def.procedure_number,
            ipv_fields: def.ipv_fields,
            columns,
            tasks,
            endpoints,
            definition,
            task_definitions,
        };
        procedure.set_name(&def.procedure_name);

        info!(
            procedure = %procedure.name,
            tasks = procedure.tasks.len(),
            actors = procedure.endpoints.len(),
            "scheduled procedure"
        );
        Ok(procedure)
    }

    /// Read a procedure file and the task files it references from the
    /// configured tasks directory, then schedule it.
    pub fn load(procedure_file: &Path, config: &Config) -> Result<Self> {
        if !procedure_file.is_file() {
            return Err(MaestroError::ProcedureNotFound(
                procedure_file.display().to_string(),
            ));
        }

        let def: ProcedureDefinition = read_yaml(procedure_file)?;

        let mut task_defs = HashMap::new();
        for reference in &def.tasks {
            if task_defs.contains_key(&reference.file) {
                continue;
            }
            let path = paths::translate_path(procedure_file, &config.tasks_dir, &reference.file)?;
            let task_def: TaskDefinition = read_yaml(&path)?;
            task_defs.insert(reference.file.clone(), task_def);
        }

        Self::from_definitions(def, &task_defs)
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.filename = paths::filename_for(name);
    }

    // -----------------------------------------------------------------------
    // Definitions
    // -----------------------------------------------------------------------

    /// The procedure definition this was built from.
    pub fn definition(&self) -> &ProcedureDefinition {
        &self.definition
    }

    /// Definitions of the task files the procedure references, by file name.
    pub fn task_definitions(&self) -> &BTreeMap<String, TaskDefinition> {
        &self.task_definitions
    }

    /// Re-emit the procedure definition as YAML.
    pub fn definition_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.definition)?)
    }

    /// Re-emit one referenced task file as YAML.
    pub fn task_definition_yaml(&self, file: &str) -> Result<String> {
        let def = self
            .task_definitions
            .get(file)
            .ok_or_else(|| MaestroError::TaskNotFound(file.to_string()))?;
        Ok(serde_yaml::to_string(def)?)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.index())
    }

    /// First task placed from `file`.
    pub fn task_by_file(&self, file: &str) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.file == file)
            .ok_or_else(|| MaestroError::TaskNotFound(file.to_string()))
    }

    /// Tasks in which `actor` fills a role, in declared order.
    pub fn tasks_for_actor<'a>(&'a self, actor: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| t.has_actor(actor))
    }

    /// `actor`'s chain, walked through the `next` links from its first task.
    pub fn chain<'a>(&'a self, actor: &'a str) -> Chain<'a> {
        Chain {
            procedure: self,
            actor,
            next: self.endpoints.get(actor).map(|e| e.first),
        }
    }

    // -----------------------------------------------------------------------
    // Actors
    // -----------------------------------------------------------------------

    /// Every actor filling a role anywhere, in order of first appearance.
    pub fn actors_in_lead_roles(&self) -> Vec<&str> {
        lead_actors(&self.tasks)
    }

    pub fn endpoints_by_actor(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn endpoint(&self, actor: &str) -> Option<Endpoint> {
        self.endpoints.get(actor).copied()
    }

    /// When `actor` finishes its last task.
    pub fn actor_duration(&self, actor: &str) -> Option<Duration> {
        let endpoint = self.endpoints.get(actor)?;
        self.tasks[endpoint.last.index()]
            .binding(actor)
            .and_then(|b| b.end)
    }

    /// The end of the latest-finishing actor's last task. This can differ
    /// from any intended duration the procedure was planned around.
    pub fn actual_duration(&self) -> Result<Duration> {
        self.endpoints
            .keys()
            .filter_map(|actor| self.actor_duration(actor))
            .max()
            .ok_or(MaestroError::EmptyProcedure)
    }

    // -----------------------------------------------------------------------
    // Columns
    // -----------------------------------------------------------------------

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Actors filling roles, grouped by the column they display under. With
    /// `include_empty`, columns no actor lands in are kept as empty groups so
    /// indices line up with [`Procedure::columns`].
    pub fn columns_of_actors_filling_roles(&self, include_empty: bool) -> Vec<Vec<&str>> {
        let mut grouped: Vec<Vec<&str>> = vec![Vec::new(); self.columns.len()];
        for actor in self.actors_in_lead_roles() {
            if let Some(index) = self.columns.column_index(actor) {
                grouped[index].push(actor);
            }
        }
        if !include_empty {
            grouped.retain(|g| !g.is_empty());
        }
        grouped
    }
}

fn lead_actors(tasks: &[Task]) -> Vec<&str> {
    let mut seen = HashSet::new();
    tasks
        .iter()
        .flat_map(|t| t.actors())
        .filter(|a| seen.insert(*a))
        .collect()
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&data).map_err(|source| MaestroError::Parse {
        path: path.display().to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Chain iterator
// ---------------------------------------------------------------------------

/// Iterator over one actor's tasks, yielding each task with that actor's
/// binding.
pub struct Chain<'a> {
    procedure: &'a Procedure,
    actor: &'a str,
    next: Option<TaskId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (&'a Task, &'a RoleBinding);

    fn next(&mut self) -> Option<Self::Item> {
        let task = self.procedure.task(self.next?)?;
        let binding = task.binding(self.actor)?;
        self.next = binding.next;
        Some((task, binding))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn task_def(title: &str, roles: &[(&str, u64)]) -> TaskDefinition {
        let roles_yaml: String = roles
            .iter()
            .map(|(name, minutes)| {
                format!("  - name: {name}\n    duration:\n      minutes: {minutes}\n")
            })
            .collect();
        let yaml = if roles.is_empty() {
            format!("title: {title}\n")
        } else {
            format!("title: {title}\nroles:\n{roles_yaml}")
        };
        TaskDefinition::from_yaml(&yaml).unwrap()
    }

    /// A: 20 min {EV1, EV2}; B: 10 min {EV1}; C: 15 min {EV1, EV2}.
    fn scenario() -> Procedure {
        let def = ProcedureDefinition::from_yaml(
            r#"
procedure_name: Scenario EVA
tasks:
  - file: a.yml
    roles: { crewA: EV1, crewB: EV2 }
  - file: b.yml
    roles: { crewA: EV1 }
  - file: c.yml
    roles: { crewA: EV1, crewB: EV2 }
"#,
        )
        .unwrap();
        let mut defs = HashMap::new();
        defs.insert("a.yml".to_string(), task_def("A", &[("crewA", 20), ("crewB", 20)]));
        defs.insert("b.yml".to_string(), task_def("B", &[("crewA", 10)]));
        defs.insert("c.yml".to_string(), task_def("C", &[("crewA", 15), ("crewB", 15)]));
        Procedure::from_definitions(def, &defs).unwrap()
    }

    fn span(task: &Task, actor: &str) -> (String, String) {
        let b = task.binding(actor).unwrap();
        (b.start.unwrap().to_string(), b.end.unwrap().to_string())
    }

    #[test]
    fn scenario_timestamps() {
        let p = scenario();
        let t = p.tasks();
        assert_eq!(span(&t[0], "EV1"), ("0:00:00".into(), "0:20:00".into()));
        assert_eq!(span(&t[0], "EV2"), ("0:00:00".into(), "0:20:00".into()));
        assert_eq!(span(&t[1], "EV1"), ("0:20:00".into(), "0:30:00".into()));
        assert_eq!(span(&t[2], "EV1"), ("0:30:00".into(), "0:45:00".into()));
        assert_eq!(span(&t[2], "EV2"), ("0:30:00".into(), "0:45:00".into()));
        assert_eq!(p.actual_duration().unwrap().to_string(), "0:45:00");
    }

    #[test]
    fn names_and_filename() {
        let p = scenario();
        assert_eq!(p.name, "Scenario EVA");
        assert_eq!(p.filename, "Scenario_EVA");
    }

    #[test]
    fn actor_queries() {
        let p = scenario();
        assert_eq!(p.actors_in_lead_roles(), vec!["EV1", "EV2"]);

        let ev2: Vec<_> = p.tasks_for_actor("EV2").map(|t| t.title.as_str()).collect();
        assert_eq!(ev2, vec!["A", "C"]);

        let ev1_chain: Vec<_> = p.chain("EV1").map(|(t, _)| t.id).collect();
        assert_eq!(ev1_chain, vec![TaskId(0), TaskId(1), TaskId(2)]);
        assert_eq!(p.chain("nobody").count(), 0);

        assert_eq!(p.endpoint("EV1").unwrap().last, TaskId(2));
        assert_eq!(p.actor_duration("EV2"), Some(Duration::from_minutes(45)));
        assert_eq!(p.task_by_file("b.yml").unwrap().title, "B");
        assert!(p.task_by_file("zzz.yml").is_err());
    }

    #[test]
    fn definitions_reemit_to_an_equivalent_procedure() {
        let p = scenario();
        assert_eq!(p.task_definitions().len(), 3);
        assert_eq!(p.definition().tasks[2].roles["crewB"], "EV2");

        let def = ProcedureDefinition::from_yaml(&p.definition_yaml().unwrap()).unwrap();
        let mut defs = HashMap::new();
        for file in p.task_definitions().keys() {
            let yaml = p.task_definition_yaml(file).unwrap();
            defs.insert(file.clone(), TaskDefinition::from_yaml(&yaml).unwrap());
        }
        let again = Procedure::from_definitions(def, &defs).unwrap();

        assert_eq!(again.name, p.name);
        assert_eq!(again.actual_duration().unwrap(), p.actual_duration().unwrap());
        for (a, b) in p.tasks().iter().zip(again.tasks()) {
            assert_eq!(a.bindings, b.bindings);
        }
        assert!(p.task_definition_yaml("zzz.yml").is_err());
    }

    #[test]
    fn default_columns_follow_actor_appearance() {
        let p = scenario();
        let keys: Vec<_> = p.columns().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["EV1", "EV2"]);
        assert_eq!(
            p.columns_of_actors_filling_roles(true),
            vec![vec!["EV1"], vec!["EV2"]]
        );
    }

    #[test]
    fn declared_columns_group_actors() {
        let def = ProcedureDefinition::from_yaml(
            r#"
procedure_name: Columns
columns:
  - key: IV
    actors: [IV, SSRMS]
  - key: EV1
    actors: EV1
  - key: EV2
    actors: EV2
tasks:
  - file: a.yml
    roles: { crewA: EV1, crewB: SSRMS }
"#,
        )
        .unwrap();
        let mut defs = HashMap::new();
        defs.insert("a.yml".to_string(), task_def("A", &[("crewA", 5), ("crewB", 5)]));
        let p = Procedure::from_definitions(def, &defs).unwrap();

        assert_eq!(
            p.columns_of_actors_filling_roles(true),
            vec![vec!["SSRMS"], vec!["EV1"], vec![]]
        );
        assert_eq!(
            p.columns_of_actors_filling_roles(false),
            vec![vec!["SSRMS"], vec!["EV1"]]
        );
    }

    #[test]
    fn actor_without_column_is_rejected() {
        let def = ProcedureDefinition::from_yaml(
            r#"
procedure_name: Columns
columns:
  - key: EV1
    actors: EV1
tasks:
  - file: a.yml
    roles: { crewA: EV1, crewB: EV2 }
"#,
        )
        .unwrap();
        let mut defs = HashMap::new();
        defs.insert("a.yml".to_string(), task_def("A", &[("crewA", 5), ("crewB", 5)]));
        let err = Procedure::from_definitions(def, &defs).unwrap_err();
        assert!(matches!(err, MaestroError::Configuration(ref m) if m.contains("EV2")));
    }

    #[test]
    fn procedure_without_bindings_has_no_duration() {
        let def = ProcedureDefinition::from_yaml(
            "procedure_name: Empty\ntasks:\n  - file: notes.yml\n",
        )
        .unwrap();
        let mut defs = HashMap::new();
        defs.insert("notes.yml".to_string(), task_def("Notes", &[]));
        let p = Procedure::from_definitions(def, &defs).unwrap();
        assert!(matches!(p.actual_duration(), Err(MaestroError::EmptyProcedure)));
        assert!(p.actors_in_lead_roles().is_empty());
    }

    #[test]
    fn duplicate_actor_aborts_load() {
        let def = ProcedureDefinition::from_yaml(
            "procedure_name: Dup\ntasks:\n  - file: a.yml\n    roles: { crewA: EV1, crewB: EV1 }\n",
        )
        .unwrap();
        let mut defs = HashMap::new();
        defs.insert("a.yml".to_string(), task_def("A", &[("crewA", 5), ("crewB", 5)]));
        let err = Procedure::from_definitions(def, &defs).unwrap_err();
        assert!(matches!(err, MaestroError::DuplicateRole { .. }));
    }

    #[test]
    fn missing_task_definition_aborts_load() {
        let def =
            ProcedureDefinition::from_yaml("procedure_name: X\ntasks:\n  - file: gone.yml\n")
                .unwrap();
        let err = Procedure::from_definitions(def, &HashMap::new()).unwrap_err();
        assert!(matches!(err, MaestroError::TaskNotFound(ref f) if f == "gone.yml"));
    }

    #[test]
    fn load_reads_sister_tasks_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("procedures")).unwrap();
        std::fs::create_dir_all(dir.path().join("tasks")).unwrap();
        std::fs::write(
            dir.path().join("procedures/eva.yml"),
            "procedure_name: Loaded EVA\ntasks:\n  - file: a.yml\n    roles: { crewA: EV1 }\n  - file: a.yml\n    roles: { crewA: EV1 }\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("tasks/a.yml"),
            "title: A\nroles:\n  - name: crewA\n    duration: { hours: 1, minutes: 5 }\n",
        )
        .unwrap();

        let p = Procedure::load(&dir.path().join("procedures/eva.yml"), &Config::default())
            .unwrap();
        assert_eq!(p.tasks().len(), 2);
        assert_eq!(p.actual_duration().unwrap().to_string(), "2:10:00");
    }

    #[test]
    fn load_reports_missing_task_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("procedures")).unwrap();
        std::fs::write(
            dir.path().join("procedures/eva.yml"),
            "procedure_name: EVA\ntasks:\n  - file: nope.yml\n",
        )
        .unwrap();
        let err = Procedure::load(&dir.path().join("procedures/eva.yml"), &Config::default())
            .unwrap_err();
        assert!(matches!(err, MaestroError::TaskFileNotFound(_)));
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("procedures")).unwrap();
        std::fs::write(dir.path().join("procedures/eva.yml"), "tasks: 12\n").unwrap();
        let err = Procedure::load(&dir.path().join("procedures/eva.yml"), &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("eva.yml"));
    }
}
