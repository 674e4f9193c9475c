use crate::procedure::Procedure;
use serde::Serialize;

/// Flattened, read-only view of a scheduled procedure for output: one entry
/// per (task, actor) plus a summary per actor.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineReport {
    pub procedure: String,
    pub filename: String,
    /// `None` when nothing in the procedure is scheduled.
    pub actual_duration: Option<String>,
    pub actors: Vec<ActorSummary>,
    pub entries: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActorSummary {
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub tasks: usize,
    pub first_task: String,
    pub last_task: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    /// 1-based position in the procedure.
    pub task: usize,
    pub file: String,
    pub title: String,
    pub actor: String,
    pub role: String,
    pub duration: String,
    pub start: String,
    pub end: String,
    pub start_seconds: u64,
    pub end_seconds: u64,
}

impl TimelineReport {
    /// Build the report, optionally restricted to a single actor.
    pub fn new(procedure: &Procedure, actor: Option<&str>) -> Self {
        let wanted = |a: &str| actor.map_or(true, |only| only == a);

        let mut entries = Vec::new();
        for task in procedure.tasks() {
            for binding in task.bindings.iter().filter(|b| wanted(b.actor.as_str())) {
                let (Some(start), Some(end)) = (binding.start, binding.end) else {
                    continue;
                };
                entries.push(TimelineEntry {
                    task: task.id.index() + 1,
                    file: task.file.clone(),
                    title: task.title.clone(),
                    actor: binding.actor.clone(),
                    role: binding.role.clone(),
                    duration: binding.duration.to_string(),
                    start: start.to_string(),
                    end: end.to_string(),
                    start_seconds: start.total_seconds(),
                    end_seconds: end.total_seconds(),
                });
            }
        }

        let actors = procedure
            .actors_in_lead_roles()
            .into_iter()
            .filter(|&a| wanted(a))
            .filter_map(|a| {
                let endpoint = procedure.endpoint(a)?;
                let first = procedure.task(endpoint.first)?;
                let last = procedure.task(endpoint.last)?;
                Some(ActorSummary {
                    actor: a.to_string(),
                    column: procedure
                        .columns()
                        .column_index(a)
                        .and_then(|i| procedure.columns().iter().nth(i))
                        .map(|c| c.display_name().to_string()),
                    tasks: procedure.tasks_for_actor(a).count(),
                    first_task: first.title.clone(),
                    last_task: last.title.clone(),
                    end: procedure.actor_duration(a)?.to_string(),
                })
            })
            .collect();

        Self {
            procedure: procedure.name.clone(),
            filename: procedure.filename.clone(),
            actual_duration: procedure.actual_duration().ok().map(|d| d.to_string()),
            actors,
            entries,
        }
    }
}
