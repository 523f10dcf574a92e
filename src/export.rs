//! Recipe-level aggregates and the export transcript

use std::fmt;

use chrono::{DateTime, Utc};

use crate::mass;
use crate::models::{HeatStyle, Temperature};
use crate::schedule::{self, ScheduleError};
use crate::thermal;
use crate::tree::RecipeTree;

/// Headline numbers for one recipe.
#[derive(Debug, Clone)]
pub struct RecipeSummary {
    pub name: String,
    pub times: f64,
    pub step_count: usize,
    pub ingredient_count: usize,
    pub total_duration_s: f64,
    pub total_mass_g: f64,
    pub flour_mass_g: f64,
    pub water_mass_g: f64,
    pub dough_yield: f64,
}

/// Dough yield (Teigausbeute): 100 plus water mass per 100 of flour mass.
/// A flourless recipe has no meaningful yield and reports 0.
pub fn dough_yield(tree: &RecipeTree) -> f64 {
    let flour = mass::recipe_flour_mass(tree);
    if flour == 0.0 {
        return 0.0;
    }
    100.0 + 100.0 * mass::recipe_water_mass(tree) / flour
}

pub fn summarize(tree: &RecipeTree) -> RecipeSummary {
    let recipe = tree.recipe();
    RecipeSummary {
        name: recipe.name.clone(),
        times: recipe.times,
        step_count: tree.step_count(),
        ingredient_count: tree.ingredient_count(),
        total_duration_s: schedule::total_duration(tree),
        total_mass_g: mass::recipe_total_mass(tree) * recipe.times,
        flour_mass_g: mass::recipe_flour_mass(tree) * recipe.times,
        water_mass_g: mass::recipe_water_mass(tree) * recipe.times,
        dough_yield: dough_yield(tree),
    }
}

impl fmt::Display for RecipeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Recipe Summary ===")?;
        writeln!(f, "Name: {} (x{})", self.name, self.times)?;
        writeln!(f, "Steps: {}", self.step_count)?;
        writeln!(f, "Ingredients: {}", self.ingredient_count)?;
        writeln!(f, "Total duration: {}", format_duration(self.total_duration_s))?;
        writeln!(
            f,
            "Mass: {:.0} g total ({:.0} g flour, {:.0} g water)",
            self.total_mass_g, self.flour_mass_g, self.water_mass_g
        )?;
        if self.dough_yield > 0.0 {
            writeln!(f, "Dough yield (TA): {:.0}", self.dough_yield)?;
        }
        Ok(())
    }
}

/// Full baking transcript: every step in execution order with its resolved
/// start time, scaled ingredient masses, the solved bulk-liquid temperature
/// where one applies, substep summary lines and notes, closed by the finish
/// timestamp.
pub fn export_text(
    tree: &RecipeTree,
    room_c: f64,
    kneading_gain_c: f64,
) -> Result<String, ScheduleError> {
    let recipe = tree.recipe();
    let timetable = schedule::compute_schedule(tree);
    let scale = recipe.times;

    let mut out = String::new();
    out.push_str(&format!("{}\n", recipe.name));
    if scale != 1.0 {
        out.push_str(&format!("Quantity: x{scale}\n"));
    }
    out.push_str(&format!("Start: {}\n\n", format_timestamp(timetable.start)));

    for step in schedule::reorder_steps(tree) {
        let start = timetable.start_of(step.id)?;
        out.push_str(&format!(
            "== {} ({}, starts {})\n",
            step.name,
            format_duration(step.duration_s),
            format_timestamp(start)
        ));

        let ingredients = tree.direct_ingredients(step.id);
        let has_bulk = ingredients
            .iter()
            .any(|i| i.style == HeatStyle::BulkLiquid);
        let bulk_temp = if has_bulk {
            Some(thermal::required_bulk_liquid_temperature(
                tree,
                step,
                room_c,
                kneading_gain_c,
            ))
        } else {
            None
        };

        for ingredient in ingredients {
            match (ingredient.style, bulk_temp, ingredient.temperature) {
                (HeatStyle::BulkLiquid, Some(t), _) => out.push_str(&format!(
                    "   {:.0} g {} at {:.1} C\n",
                    ingredient.mass_g * scale,
                    ingredient.name,
                    t
                )),
                (_, _, Temperature::Fixed(t)) => out.push_str(&format!(
                    "   {:.0} g {} at {:.1} C\n",
                    ingredient.mass_g * scale,
                    ingredient.name,
                    t
                )),
                _ => out.push_str(&format!(
                    "   {:.0} g {}\n",
                    ingredient.mass_g * scale,
                    ingredient.name
                )),
            }
        }

        for substep in tree.direct_substeps(step.id) {
            out.push_str(&format!(
                "   uses: {} ({:.0} g, started {})\n",
                substep.name,
                mass::total_mass(tree, substep.id) * scale,
                format_timestamp(timetable.start_of(substep.id)?)
            ));
        }

        if !step.notes.is_empty() {
            out.push_str(&format!("   note: {}\n", step.notes));
        }
        out.push('\n');
    }

    out.push_str(&format!("Finish: {}\n", format_timestamp(timetable.finish)));
    Ok(out)
}

pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_duration(secs: f64) -> String {
    let total_min = (secs / 60.0).round() as i64;
    let days = total_min / (24 * 60);
    let hours = (total_min % (24 * 60)) / 60;
    let minutes = total_min % 60;
    if days > 0 {
        format!("{days} d {hours} h {minutes} min")
    } else if hours > 0 {
        format!("{hours} h {minutes} min")
    } else {
        format!("{minutes} min")
    }
}
