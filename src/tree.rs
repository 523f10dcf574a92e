//! Read collaborator interface and the in-memory recipe snapshot
//!
//! The engine never talks to storage while computing. `RecipeTree::load`
//! pulls a recipe's full step/ingredient tree through a [`RecipeReader`]
//! once, and every computation in `mass`, `thermal`, `schedule` and `export`
//! then runs purely over the arena.

use std::collections::HashMap;

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use crate::models::{Ingredient, Recipe, RecipeId, Step, StepId};

/// Substep nesting deeper than this is treated as a broken graph. Real
/// recipes stay in single digits.
pub const MAX_SUBSTEP_DEPTH: usize = 16;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("recipe {0} not found")]
    RecipeNotFound(RecipeId),
    #[error("substep nesting too deep under step {step} - possible cycle in substep graph")]
    DepthExceeded { step: StepId },
}

/// Read-only view of the recipe store.
///
/// Ordering contracts: ingredients ascending by ordering number, substeps
/// descending by duration, top-level steps ascending by ordering number.
pub trait RecipeReader {
    fn recipe(&self, id: RecipeId) -> Result<Option<Recipe>>;
    fn step(&self, id: StepId) -> Result<Option<Step>>;
    fn top_level_steps(&self, recipe_id: RecipeId) -> Result<Vec<Step>>;
    fn direct_substeps(&self, step_id: StepId) -> Result<Vec<Step>>;
    fn direct_ingredients(&self, step_id: StepId) -> Result<Vec<Ingredient>>;
}

/// Immutable snapshot of one recipe's step/ingredient tree, indexed by id.
#[derive(Debug, Clone)]
pub struct RecipeTree {
    recipe: Recipe,
    steps: HashMap<StepId, Step>,
    /// Direct substep ids per parent, sorted descending by duration.
    substeps: HashMap<StepId, Vec<StepId>>,
    /// Direct ingredients per step, sorted ascending by ordering number.
    ingredients: HashMap<StepId, Vec<Ingredient>>,
    /// Top-level step ids in ordering-number order.
    top_level: Vec<StepId>,
}

impl RecipeTree {
    /// Load the complete tree for `recipe_id` in one pass over the reader.
    ///
    /// The traversal is depth-bounded so a cyclic substep graph surfaces as
    /// [`TreeError::DepthExceeded`] instead of recursing forever.
    pub fn load(reader: &impl RecipeReader, recipe_id: RecipeId) -> Result<Self> {
        let recipe = reader
            .recipe(recipe_id)?
            .ok_or(TreeError::RecipeNotFound(recipe_id))?;

        let mut steps = Vec::new();
        let mut pending: Vec<(Step, usize)> = reader
            .top_level_steps(recipe_id)?
            .into_iter()
            .map(|s| (s, 0))
            .collect();

        while let Some((step, depth)) = pending.pop() {
            if depth >= MAX_SUBSTEP_DEPTH {
                return Err(TreeError::DepthExceeded { step: step.id }.into());
            }
            for sub in reader.direct_substeps(step.id)? {
                pending.push((sub, depth + 1));
            }
            steps.push(step);
        }

        let mut ingredients = Vec::new();
        for step in &steps {
            ingredients.extend(reader.direct_ingredients(step.id)?);
        }

        debug!(
            recipe_id,
            steps = steps.len(),
            ingredients = ingredients.len(),
            "loaded recipe snapshot"
        );
        Ok(Self::from_parts(recipe, steps, ingredients))
    }

    /// Build a snapshot directly from already-loaded rows. Indexing and the
    /// ordering contracts are applied here, so callers may pass rows in any
    /// order.
    pub fn from_parts(recipe: Recipe, steps: Vec<Step>, ingredients: Vec<Ingredient>) -> Self {
        let mut top_level: Vec<StepId> = Vec::new();
        let mut substeps: HashMap<StepId, Vec<StepId>> = HashMap::new();
        let mut by_id: HashMap<StepId, Step> = HashMap::new();

        for step in steps {
            match step.parent_step_id {
                Some(parent) => substeps.entry(parent).or_default().push(step.id),
                None => top_level.push(step.id),
            }
            by_id.insert(step.id, step);
        }

        top_level.sort_by_key(|id| (by_id[id].number, *id));
        for children in substeps.values_mut() {
            children.sort_by(|a, b| {
                by_id[b]
                    .duration_s
                    .total_cmp(&by_id[a].duration_s)
                    .then(by_id[a].number.cmp(&by_id[b].number))
            });
        }

        let mut by_step: HashMap<StepId, Vec<Ingredient>> = HashMap::new();
        for ingredient in ingredients {
            by_step.entry(ingredient.step_id).or_default().push(ingredient);
        }
        for list in by_step.values_mut() {
            list.sort_by_key(|i| (i.number, i.id));
        }

        Self {
            recipe,
            steps: by_id,
            substeps,
            ingredients: by_step,
            top_level,
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.get(&id)
    }

    /// Steps with no parent, in ordering-number order.
    pub fn top_level_steps(&self) -> Vec<&Step> {
        self.top_level.iter().map(|id| &self.steps[id]).collect()
    }

    /// Direct substeps of `id`, sorted descending by their own duration.
    pub fn direct_substeps(&self, id: StepId) -> Vec<&Step> {
        self.substeps
            .get(&id)
            .into_iter()
            .flatten()
            .map(|sid| &self.steps[sid])
            .collect()
    }

    pub fn direct_ingredients(&self, id: StepId) -> &[Ingredient] {
        self.ingredients.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every step in the tree, top-level and nested alike.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.values().map(Vec::len).sum()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{ingredient, recipe, step};
    use super::*;
    use crate::models::HeatStyle;

    /// Reader over plain vectors, standing in for the persistence layer.
    struct MemReader {
        recipes: Vec<Recipe>,
        steps: Vec<Step>,
        ingredients: Vec<Ingredient>,
    }

    impl RecipeReader for MemReader {
        fn recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
            Ok(self.recipes.iter().find(|r| r.id == id).cloned())
        }

        fn step(&self, id: StepId) -> Result<Option<Step>> {
            Ok(self.steps.iter().find(|s| s.id == id).cloned())
        }

        fn top_level_steps(&self, recipe_id: RecipeId) -> Result<Vec<Step>> {
            let mut out: Vec<Step> = self
                .steps
                .iter()
                .filter(|s| s.recipe_id == recipe_id && s.parent_step_id.is_none())
                .cloned()
                .collect();
            out.sort_by_key(|s| s.number);
            Ok(out)
        }

        fn direct_substeps(&self, step_id: StepId) -> Result<Vec<Step>> {
            let mut out: Vec<Step> = self
                .steps
                .iter()
                .filter(|s| s.parent_step_id == Some(step_id))
                .cloned()
                .collect();
            out.sort_by(|a, b| b.duration_s.total_cmp(&a.duration_s));
            Ok(out)
        }

        fn direct_ingredients(&self, step_id: StepId) -> Result<Vec<Ingredient>> {
            let mut out: Vec<Ingredient> = self
                .ingredients
                .iter()
                .filter(|i| i.step_id == step_id)
                .cloned()
                .collect();
            out.sort_by_key(|i| i.number);
            Ok(out)
        }
    }

    #[test]
    fn from_parts_indexes_and_sorts() {
        let steps = vec![
            step(2, None, 600.0),
            step(1, None, 900.0),
            step(3, Some(1), 300.0),
            step(4, Some(1), 1200.0),
        ];
        let ingredients = vec![
            ingredient(2, 1, 50.0, HeatStyle::Plain),
            ingredient(1, 1, 400.0, HeatStyle::Flour),
        ];
        let tree = RecipeTree::from_parts(recipe(1), steps, ingredients);

        let top: Vec<_> = tree.top_level_steps().iter().map(|s| s.id).collect();
        assert_eq!(top, vec![1, 2]);

        // Substeps come back longest own-duration first.
        let subs: Vec<_> = tree.direct_substeps(1).iter().map(|s| s.id).collect();
        assert_eq!(subs, vec![4, 3]);

        // Ingredients come back in ordering-number order.
        let ids: Vec<_> = tree.direct_ingredients(1).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(tree.direct_ingredients(99).is_empty());

        assert_eq!(tree.step_count(), 4);
        assert_eq!(tree.ingredient_count(), 2);
    }

    #[test]
    fn load_pulls_full_tree_through_reader() {
        let reader = MemReader {
            recipes: vec![recipe(1)],
            steps: vec![
                step(1, None, 900.0),
                step(2, Some(1), 36000.0),
                step(3, Some(2), 600.0),
                step(4, None, 10800.0),
            ],
            ingredients: vec![ingredient(1, 2, 100.0, HeatStyle::Flour)],
        };

        let tree = RecipeTree::load(&reader, 1).unwrap();
        assert_eq!(tree.step_count(), 4);
        assert_eq!(tree.ingredient_count(), 1);
        assert_eq!(tree.direct_substeps(1).len(), 1);
        assert_eq!(tree.direct_substeps(2)[0].id, 3);
    }

    #[test]
    fn load_missing_recipe_is_explicit_error() {
        let reader = MemReader {
            recipes: vec![],
            steps: vec![],
            ingredients: vec![],
        };
        let err = RecipeTree::load(&reader, 7).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TreeError>(),
            Some(TreeError::RecipeNotFound(7))
        ));
    }

    #[test]
    fn cyclic_substep_graph_is_reported_not_looped() {
        // 2 and 3 claim each other as parent; reachable from top-level 1.
        let reader = MemReader {
            recipes: vec![recipe(1)],
            steps: vec![
                step(1, None, 600.0),
                step(2, Some(1), 600.0),
                step(3, Some(2), 600.0),
                step(2, Some(3), 600.0),
            ],
            ingredients: vec![],
        };
        let err = RecipeTree::load(&reader, 1).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TreeError>(),
            Some(TreeError::DepthExceeded { .. })
        ));
    }
}
