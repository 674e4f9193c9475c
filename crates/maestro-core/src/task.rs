use crate::duration::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TaskId
// ---------------------------------------------------------------------------

/// Position of a task in its procedure's declared order. Doubles as the index
/// into the procedure's task arena; chain links are stored as `TaskId`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 + 1)
    }
}

// ---------------------------------------------------------------------------
// RoleBinding
// ---------------------------------------------------------------------------

/// One actor filling one role within a task.
///
/// `start`, `end`, `prev` and `next` are empty until the procedure is
/// scheduled, and are only ever written by the chain builder and the
/// synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleBinding {
    pub actor: String,
    pub role: String,
    pub duration: Duration,
    pub start: Option<Duration>,
    pub end: Option<Duration>,
    pub prev: Option<TaskId>,
    pub next: Option<TaskId>,
}

impl RoleBinding {
    pub fn new(actor: impl Into<String>, role: impl Into<String>, duration: Duration) -> Self {
        Self {
            actor: actor.into(),
            role: role.into(),
            duration,
            start: None,
            end: None,
            prev: None,
            next: None,
        }
    }

    pub(crate) fn clear_schedule(&mut self) {
        self.start = None;
        self.end = None;
        self.prev = None;
        self.next = None;
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: TaskId,
    /// Task file as referenced from the procedure, e.g. `egress.yml`.
    pub file: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub bindings: Vec<RoleBinding>,
}

impl Task {
    pub fn new(id: TaskId, file: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            file: file.into(),
            title: title.into(),
            color: None,
            bindings: Vec::new(),
        }
    }

    pub fn with_binding(
        mut self,
        actor: impl Into<String>,
        role: impl Into<String>,
        duration: Duration,
    ) -> Self {
        self.bindings.push(RoleBinding::new(actor, role, duration));
        self
    }

    pub fn binding(&self, actor: &str) -> Option<&RoleBinding> {
        self.bindings.iter().find(|b| b.actor == actor)
    }

    pub(crate) fn binding_mut(&mut self, actor: &str) -> Option<&mut RoleBinding> {
        self.bindings.iter_mut().find(|b| b.actor == actor)
    }

    pub fn has_actor(&self, actor: &str) -> bool {
        self.binding(actor).is_some()
    }

    pub fn actors(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.actor.as_str())
    }

    /// Performed by more than one actor, so subject to the shared-start barrier.
    pub fn is_joint(&self) -> bool {
        self.bindings.len() > 1
    }

    /// Shared start of the task once scheduled.
    pub fn start(&self) -> Option<Duration> {
        self.bindings.first().and_then(|b| b.start)
    }

    /// Latest end among the participating actors once scheduled.
    pub fn end(&self) -> Option<Duration> {
        self.bindings.iter().filter_map(|b| b.end).max()
    }

    pub(crate) fn clear_schedule(&mut self) {
        for binding in &mut self.bindings {
            binding.clear_schedule();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_lookup_by_actor() {
        let task = Task::new(TaskId(0), "egress.yml", "Egress")
            .with_binding("EV1", "crewA", Duration::from_minutes(20))
            .with_binding("EV2", "crewB", Duration::from_minutes(25));

        assert!(task.is_joint());
        assert_eq!(task.binding("EV2").unwrap().role, "crewB");
        assert!(task.binding("IV").is_none());
        assert_eq!(task.actors().collect::<Vec<_>>(), vec!["EV1", "EV2"]);
    }

    #[test]
    fn unscheduled_task_has_no_times() {
        let task = Task::new(TaskId(3), "x.yml", "X").with_binding("EV1", "r", Duration::ZERO);
        assert_eq!(task.start(), None);
        assert_eq!(task.end(), None);
        assert_eq!(task.id.to_string(), "#4");
    }
}
