//! Per-actor chain construction.
//!
//! One pass over the tasks in declared order threads every actor's tasks
//! into a linked chain (`prev`/`next` on each [`RoleBinding`]) and gives each
//! binding a provisional start and end taken from that actor's own history.
//! Joint tasks are not reconciled here; see [`crate::sync`].
//!
//! [`RoleBinding`]: crate::task::RoleBinding

use crate::duration::Duration;
use crate::error::{MaestroError, Result};
use crate::sync::{self, Endpoints};
use crate::task::{Task, TaskId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Tasks whose chains are linked but whose joint tasks have not yet been
/// synchronized. The only way out of this state is [`Chained::synchronize`].
#[derive(Debug)]
pub struct Chained<'a> {
    tasks: &'a mut [Task],
}

impl<'a> Chained<'a> {
    /// Provisional view of the tasks, before barriers are applied.
    pub fn tasks(&self) -> &[Task] {
        &*self.tasks
    }

    pub fn synchronize(self) -> Result<Endpoints> {
        sync::synchronize(self.tasks)
    }
}

/// Link each actor's tasks in declared order and assign provisional times.
///
/// The whole slice is validated before anything is written, so on error the
/// tasks are left exactly as they were passed in. Otherwise any timing or
/// links left over from an earlier run are cleared first, so rebuilding an
/// unchanged task list reproduces the same result. Each task's `id` is reset
/// to its position, which is what the links refer to.
pub fn build_chains(tasks: &mut [Task]) -> Result<Chained<'_>> {
    let horizon = validate(tasks)?;
    debug!(tasks = tasks.len(), horizon = %horizon, "validated tasks");

    for (i, task) in tasks.iter_mut().enumerate() {
        task.id = TaskId(i);
        task.clear_schedule();
    }

    // Most recent task each actor appeared in
    let mut latest: HashMap<String, TaskId> = HashMap::new();

    for i in 0..tasks.len() {
        let id = TaskId(i);

        for b in 0..tasks[i].bindings.len() {
            let actor = tasks[i].bindings[b].actor.clone();

            let start = match latest.get(&actor).copied() {
                Some(prev) => {
                    let prev_end = tasks[prev.index()]
                        .binding_mut(&actor)
                        .and_then(|prev_binding| {
                            prev_binding.next = Some(id);
                            prev_binding.end
                        })
                        .unwrap_or(Duration::ZERO);
                    tasks[i].bindings[b].prev = Some(prev);
                    prev_end
                }
                None => Duration::ZERO,
            };

            let binding = &mut tasks[i].bindings[b];
            binding.start = Some(start);
            binding.end = Some(Duration::sum(start, binding.duration)?);
            latest.insert(actor, id);
        }

        debug!(
            task = %tasks[i].file,
            actors = tasks[i].bindings.len(),
            "chained task"
        );
    }

    debug!(actors = latest.len(), "built actor chains");
    Ok(Chained { tasks })
}

/// Reject an actor bound twice within a task, and a task list whose
/// timeline could not be represented.
///
/// No end can lie past the sum of each task's longest binding: every task
/// starts no later than the latest end among the tasks before it. Returns
/// that bound.
fn validate(tasks: &[Task]) -> Result<Duration> {
    let mut horizon = Duration::ZERO;
    for task in tasks {
        check_duplicate_actors(task)?;
        let longest = task
            .bindings
            .iter()
            .map(|b| b.duration)
            .max()
            .unwrap_or(Duration::ZERO);
        horizon = Duration::sum(horizon, longest)?;
    }
    Ok(horizon)
}

fn check_duplicate_actors(task: &Task) -> Result<()> {
    let mut seen = HashSet::new();
    for actor in task.actors() {
        if !seen.insert(actor) {
            return Err(MaestroError::DuplicateRole {
                task: task.file.clone(),
                actor: actor.to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(m: u64) -> Duration {
        Duration::from_minutes(m)
    }

    fn scenario() -> Vec<Task> {
        vec![
            Task::new(TaskId(0), "a.yml", "A")
                .with_binding("EV1", "crewA", minutes(20))
                .with_binding("EV2", "crewB", minutes(20)),
            Task::new(TaskId(1), "b.yml", "B").with_binding("EV1", "crewA", minutes(10)),
            Task::new(TaskId(2), "c.yml", "C")
                .with_binding("EV1", "crewA", minutes(15))
                .with_binding("EV2", "crewB", minutes(15)),
        ]
    }

    #[test]
    fn links_follow_declared_order_per_actor() {
        let mut tasks = scenario();
        let chained = build_chains(&mut tasks).unwrap();
        let tasks = chained.tasks();

        let ev1_a = tasks[0].binding("EV1").unwrap();
        assert_eq!(ev1_a.prev, None);
        assert_eq!(ev1_a.next, Some(TaskId(1)));

        let ev1_b = tasks[1].binding("EV1").unwrap();
        assert_eq!(ev1_b.prev, Some(TaskId(0)));
        assert_eq!(ev1_b.next, Some(TaskId(2)));

        // EV2 skips task B entirely
        let ev2_a = tasks[0].binding("EV2").unwrap();
        assert_eq!(ev2_a.next, Some(TaskId(2)));
        let ev2_c = tasks[2].binding("EV2").unwrap();
        assert_eq!(ev2_c.prev, Some(TaskId(0)));
        assert_eq!(ev2_c.next, None);
    }

    #[test]
    fn provisional_times_ignore_other_actors() {
        let mut tasks = scenario();
        let chained = build_chains(&mut tasks).unwrap();
        let c = &chained.tasks()[2];

        // Not yet reconciled: each actor starts C from its own history
        assert_eq!(c.binding("EV1").unwrap().start, Some(minutes(30)));
        assert_eq!(c.binding("EV2").unwrap().start, Some(minutes(20)));
        assert_eq!(c.binding("EV2").unwrap().end, Some(minutes(35)));
    }

    #[test]
    fn task_without_bindings_is_skipped() {
        let mut tasks = vec![
            Task::new(TaskId(0), "a.yml", "A").with_binding("EV1", "crewA", minutes(5)),
            Task::new(TaskId(1), "notes.yml", "Notes"),
            Task::new(TaskId(2), "b.yml", "B").with_binding("EV1", "crewA", minutes(5)),
        ];
        let chained = build_chains(&mut tasks).unwrap();
        let b = chained.tasks()[2].binding("EV1").unwrap();
        assert_eq!(b.prev, Some(TaskId(0)));
        assert_eq!(b.start, Some(minutes(5)));
    }

    #[test]
    fn failed_validation_leaves_tasks_untouched() {
        let mut tasks = vec![
            Task::new(TaskId(0), "a.yml", "A").with_binding("EV1", "crewA", minutes(5)),
            Task::new(TaskId(1), "b.yml", "B")
                .with_binding("EV2", "crewA", minutes(5))
                .with_binding("EV2", "crewB", minutes(5)),
        ];
        let before = tasks.clone();

        assert!(matches!(
            build_chains(&mut tasks),
            Err(MaestroError::DuplicateRole { .. })
        ));
        for (a, b) in before.iter().zip(&tasks) {
            assert_eq!(a.bindings, b.bindings);
        }
        assert_eq!(tasks[0].start(), None);
    }

    #[test]
    fn timeline_past_the_representable_range_fails() {
        let huge = Duration::from_parts(5_000_000_000_000_000, 0, 0).unwrap();
        let mut tasks = vec![
            Task::new(TaskId(0), "a.yml", "A").with_binding("EV1", "crewA", huge),
            Task::new(TaskId(1), "b.yml", "B").with_binding("EV1", "crewA", huge),
        ];

        let err = build_chains(&mut tasks).unwrap_err();
        assert!(matches!(err, MaestroError::InvalidDuration(_)));
        assert!(tasks.iter().all(|t| t.start().is_none()));
    }

    #[test]
    fn ids_are_reset_to_position() {
        let mut tasks = vec![
            Task::new(TaskId(7), "a.yml", "A").with_binding("EV1", "crewA", minutes(5)),
            Task::new(TaskId(3), "b.yml", "B").with_binding("EV1", "crewA", minutes(5)),
        ];
        let chained = build_chains(&mut tasks).unwrap();
        let tasks = chained.tasks();

        assert_eq!(tasks[0].id, TaskId(0));
        assert_eq!(tasks[1].id, TaskId(1));
        assert_eq!(tasks[0].binding("EV1").unwrap().next, Some(tasks[1].id));
    }

    #[test]
    fn duplicate_actor_in_one_task_fails() {
        let mut tasks = vec![Task::new(TaskId(0), "a.yml", "A")
            .with_binding("EV1", "crewA", minutes(5))
            .with_binding("EV1", "crewB", minutes(5))];
        let err = build_chains(&mut tasks).unwrap_err();
        match err {
            MaestroError::DuplicateRole { task, actor } => {
                assert_eq!(task, "a.yml");
                assert_eq!(actor, "EV1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
