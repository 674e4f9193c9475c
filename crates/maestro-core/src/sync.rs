//! Cross-actor synchronization of chained tasks.
//!
//! After [`crate::chain::build_chains`] every actor's tasks are linked, but a
//! task shared by several actors may have a different provisional start for
//! each of them. The sweep here walks the tasks once in declared order and
//! starts every joint task at the latest of its actors' provisional starts.
//! Because a chain link only ever points at an earlier-declared task, an
//! actor's `prev` task has already been corrected by the time it is read,
//! so delays propagate down each chain without iterating to a fixed point.

use crate::chain::build_chains;
use crate::duration::Duration;
use crate::error::Result;
use crate::task::{RoleBinding, Task, TaskId};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// First and last task of one actor's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub first: TaskId,
    pub last: TaskId,
}

pub type Endpoints = BTreeMap<String, Endpoint>;

/// Build chains and synchronize them in one go. On error the tasks are left
/// as they were passed in.
pub fn schedule(tasks: &mut [Task]) -> Result<Endpoints> {
    build_chains(tasks)?.synchronize()
}

/// Only reached through [`crate::chain::Chained`], whose tasks have been
/// validated, so the checked sums here cannot fail part way through.
pub(crate) fn synchronize(tasks: &mut [Task]) -> Result<Endpoints> {
    let mut endpoints = Endpoints::new();

    for i in 0..tasks.len() {
        if tasks[i].bindings.is_empty() {
            continue;
        }

        let id = TaskId(i);
        let barrier = {
            let view: &[Task] = tasks;
            view[i]
                .bindings
                .iter()
                .map(|binding| provisional_start(view, binding))
                .max()
                .unwrap_or(Duration::ZERO)
        };

        for binding in &mut tasks[i].bindings {
            binding.start = Some(barrier);
            binding.end = Some(Duration::sum(barrier, binding.duration)?);

            endpoints
                .entry(binding.actor.clone())
                .and_modify(|e: &mut Endpoint| e.last = id)
                .or_insert(Endpoint { first: id, last: id });
        }

        debug!(task = %tasks[i].file, start = %barrier, "synchronized task");
    }

    Ok(endpoints)
}

/// Where `binding`'s actor is free to start: the (already corrected) end of
/// its previous task, or zero at the head of its chain.
fn provisional_start(tasks: &[Task], binding: &RoleBinding) -> Duration {
    binding
        .prev
        .and_then(|prev| tasks[prev.index()].binding(&binding.actor))
        .and_then(|prev| prev.end)
        .unwrap_or(Duration::ZERO)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
