//! bakeplan: baking schedule and dough temperature calculator
//!
//! Recipes are trees of steps and ingredients. Substeps of a step (a levain
//! build, a soaker) run in parallel and must all finish before the step
//! starts. The engine loads a recipe snapshot from the SQLite store once,
//! then computes mass aggregates, the water temperature needed to hit a
//! step's target dough temperature, and a timed schedule anchored to the
//! recipe's start or finish date.

pub mod db;
pub mod export;
pub mod mass;
pub mod models;
pub mod schedule;
pub mod thermal;
pub mod tree;

pub use export::{RecipeSummary, dough_yield, export_text, summarize};
pub use models::{
    DEFAULT_KNEADING_HEAT_GAIN_C, DEFAULT_ROOM_TEMP_C, HeatStyle, Ingredient, Recipe, RecipeId,
    Step, StepId, Temperature,
};
pub use schedule::{
    Schedule, ScheduleError, compute_schedule, duration_with_substeps, reorder_steps,
    step_start_date, total_duration,
};
pub use thermal::{blended_heat_coefficient, required_bulk_liquid_temperature};
pub use tree::{RecipeReader, RecipeTree, TreeError};
