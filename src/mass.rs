//! Recursive mass aggregation over a step tree
//!
//! Every function here is a pure fold over the snapshot: a step's mass is
//! its direct ingredients plus, transitively, everything its substeps bring
//! in. Starter ingredients split across the flour and water buckets
//! according to their hydration fractions.

use crate::models::{HeatStyle, StepId};
use crate::tree::RecipeTree;

/// Total mass of a step: direct ingredients plus all substeps, recursively.
pub fn total_mass(tree: &RecipeTree, step_id: StepId) -> f64 {
    let own: f64 = tree
        .direct_ingredients(step_id)
        .iter()
        .map(|i| i.mass_g)
        .sum();
    let nested: f64 = tree
        .direct_substeps(step_id)
        .iter()
        .map(|s| total_mass(tree, s.id))
        .sum();
    own + nested
}

/// Mass of ingredients of exactly `style` in a step and its substeps.
pub fn style_mass(tree: &RecipeTree, step_id: StepId, style: HeatStyle) -> f64 {
    let own: f64 = tree
        .direct_ingredients(step_id)
        .iter()
        .filter(|i| i.style == style)
        .map(|i| i.mass_g)
        .sum();
    let nested: f64 = tree
        .direct_substeps(step_id)
        .iter()
        .map(|s| style_mass(tree, s.id, style))
        .sum();
    own + nested
}

/// Flour mass including the flour share of starter ingredients.
pub fn flour_mass(tree: &RecipeTree, step_id: StepId) -> f64 {
    HeatStyle::ALL
        .iter()
        .map(|&s| style_mass(tree, step_id, s) * s.flour_fraction())
        .sum()
}

/// Water mass including the water share of starter ingredients.
pub fn water_mass(tree: &RecipeTree, step_id: StepId) -> f64 {
    HeatStyle::ALL
        .iter()
        .map(|&s| style_mass(tree, step_id, s) * s.water_fraction())
        .sum()
}

/// Mass that is neither flour nor water (salt, seeds, fats, ...).
pub fn other_mass(tree: &RecipeTree, step_id: StepId) -> f64 {
    style_mass(tree, step_id, HeatStyle::Plain)
}

/// Total mass of the whole recipe. Each nested step belongs to exactly one
/// parent, so summing the top level counts everything once.
pub fn recipe_total_mass(tree: &RecipeTree) -> f64 {
    tree.top_level_steps()
        .iter()
        .map(|s| total_mass(tree, s.id))
        .sum()
}

pub fn recipe_flour_mass(tree: &RecipeTree) -> f64 {
    tree.top_level_steps()
        .iter()
        .map(|s| flour_mass(tree, s.id))
        .sum()
}

pub fn recipe_water_mass(tree: &RecipeTree) -> f64 {
    tree.top_level_steps()
        .iter()
        .map(|s| water_mass(tree, s.id))
        .sum()
}
