//! Ordering and timing of steps
//!
//! Substeps of a step run in parallel with each other and must all be done
//! before the step itself starts, so the step is gated by its slowest
//! substep chain (the critical path). The engine linearizes the tree for
//! display and assigns every step an absolute start time by walking forward
//! from a single anchor, back-dating shorter siblings so they finish
//! together with the longest one.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::models::{Step, StepId};
use crate::tree::RecipeTree;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("step {0} is not part of this recipe's schedule")]
    StepNotScheduled(StepId),
}

/// Time for a step and its longest-running substep chain to complete.
/// A step without substeps takes exactly its own duration.
pub fn duration_with_substeps(tree: &RecipeTree, step_id: StepId) -> f64 {
    let Some(step) = tree.step(step_id) else {
        return 0.0;
    };
    let longest = tree
        .direct_substeps(step_id)
        .iter()
        .map(|s| duration_with_substeps(tree, s.id))
        .fold(0.0, f64::max);
    step.duration_s + longest
}

/// Total elapsed time of the recipe: critical-path durations of the
/// top-level steps, in sequence.
pub fn total_duration(tree: &RecipeTree) -> f64 {
    tree.top_level_steps()
        .iter()
        .map(|s| duration_with_substeps(tree, s.id))
        .sum()
}

/// Flatten the step tree into one duplicate-free sequence in execution
/// order: every substep before its parent, longer critical paths before
/// shorter ones among siblings, top-level steps in their own order.
pub fn reorder_steps(tree: &RecipeTree) -> Vec<&Step> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for step in tree.top_level_steps() {
        push_depth_first(tree, step, &mut seen, &mut out);
    }
    out
}

fn push_depth_first<'t>(
    tree: &'t RecipeTree,
    step: &'t Step,
    seen: &mut HashSet<StepId>,
    out: &mut Vec<&'t Step>,
) {
    if !seen.insert(step.id) {
        return;
    }
    for substep in substeps_longest_first(tree, step.id) {
        push_depth_first(tree, substep, seen, out);
    }
    out.push(step);
}

/// Direct substeps ordered by critical-path duration, longest first.
fn substeps_longest_first(tree: &RecipeTree, step_id: StepId) -> Vec<&Step> {
    let mut substeps = tree.direct_substeps(step_id);
    substeps.sort_by(|a, b| {
        duration_with_substeps(tree, b.id).total_cmp(&duration_with_substeps(tree, a.id))
    });
    substeps
}

/// Absolute start times for every step of a recipe.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub start: DateTime<Utc>,
    pub finish: DateTime<Utc>,
    starts: HashMap<StepId, DateTime<Utc>>,
}

impl Schedule {
    /// Start time of one step; an id outside the recipe's tree is an
    /// explicit error, never a default timestamp.
    pub fn start_of(&self, step_id: StepId) -> Result<DateTime<Utc>, ScheduleError> {
        self.starts
            .get(&step_id)
            .copied()
            .ok_or(ScheduleError::StepNotScheduled(step_id))
    }
}

/// Compute start times for the whole tree, anchored at the recipe date.
/// An inverted recipe anchors its finish instead, so the walk begins at
/// anchor minus total duration.
pub fn compute_schedule(tree: &RecipeTree) -> Schedule {
    let total = total_duration(tree);
    let recipe = tree.recipe();
    let start = if recipe.inverted {
        recipe.anchor - seconds(total)
    } else {
        recipe.anchor
    };

    let mut offsets = HashMap::new();
    let mut cursor = 0.0;
    for step in tree.top_level_steps() {
        place(tree, step, cursor, &mut offsets);
        cursor += duration_with_substeps(tree, step.id);
    }

    let starts = offsets
        .into_iter()
        .map(|(id, offset)| (id, start + seconds(offset)))
        .collect();
    Schedule {
        start,
        finish: start + seconds(total),
        starts,
    }
}

/// Place `step` so that its whole critical path occupies
/// `[at, at + duration_with_substeps)`. The longest substep starts
/// immediately at `at`; once it is down, every shorter sibling is
/// back-dated from the moment they all must be finished, which is when the
/// step itself begins.
fn place(tree: &RecipeTree, step: &Step, at: f64, out: &mut HashMap<StepId, f64>) {
    let substeps = substeps_longest_first(tree, step.id);

    let mut begin = at;
    if let Some((longest, rest)) = substeps.split_first() {
        place(tree, longest, at, out);
        begin = at + duration_with_substeps(tree, longest.id);
        for substep in rest {
            place(
                tree,
                substep,
                begin - duration_with_substeps(tree, substep.id),
                out,
            );
        }
    }
    out.insert(step.id, begin);
}

/// Resolved start time of one step, convenience over [`compute_schedule`].
pub fn step_start_date(tree: &RecipeTree, step_id: StepId) -> Result<DateTime<Utc>, ScheduleError> {
    compute_schedule(tree).start_of(step_id)
}

fn seconds(s: f64) -> Duration {
    Duration::milliseconds((s * 1000.0).round() as i64)
}
