//! Energy-balance solver for bulk-liquid temperature
//!
//! To land a dough at its target temperature the baker adjusts the one
//! component whose temperature is free: the water. The solver balances
//! mass × specific heat × temperature over a step's ingredients and
//! substeps and reports the water temperature that closes the equation.

use crate::mass;
use crate::models::{HeatStyle, Step, StepId};
use crate::tree::RecipeTree;

/// Mass-weighted average specific-heat coefficient of a step's whole
/// composition, used when the step is consumed as a composite ingredient
/// in its parent's balance. Zero for an empty step (its balance terms
/// vanish anyway).
pub fn blended_heat_coefficient(tree: &RecipeTree, step_id: StepId) -> f64 {
    let total = mass::total_mass(tree, step_id);
    if total == 0.0 {
        return 0.0;
    }
    let weighted: f64 = HeatStyle::ALL
        .iter()
        .map(|&s| mass::style_mass(tree, step_id, s) * s.heat_coefficient())
        .sum();
    weighted / total
}

/// Temperature the step aims for while it runs: its fixed target or the
/// room, lowered by the kneading heat gain when the step kneads.
pub fn effective_target_c(step: &Step, room_c: f64, kneading_gain_c: f64) -> f64 {
    let target = step.temperature.resolve(room_c);
    if step.is_kneading {
        target - kneading_gain_c
    } else {
        target
    }
}

/// Required temperature of the step's bulk-liquid ingredient(s) so the
/// mixed mass comes out at the step's effective target.
///
/// All bulk-liquid ingredients of the step share the one solved
/// temperature. A step with no bulk liquid has nothing to solve for and
/// reports the room temperature.
pub fn required_bulk_liquid_temperature(
    tree: &RecipeTree,
    step: &Step,
    room_c: f64,
    kneading_gain_c: f64,
) -> f64 {
    let target = effective_target_c(step, room_c, kneading_gain_c);

    let mut sum_mass_heat = 0.0;
    let mut known_mass_heat_temp = 0.0;
    let mut bulk_mass_heat = 0.0;

    for ingredient in tree.direct_ingredients(step.id) {
        let mass_heat = ingredient.mass_g * ingredient.style.heat_coefficient();
        sum_mass_heat += mass_heat;
        if ingredient.style == HeatStyle::BulkLiquid {
            bulk_mass_heat += mass_heat;
        } else {
            known_mass_heat_temp += mass_heat * ingredient.temperature.resolve(room_c);
        }
    }

    for substep in tree.direct_substeps(step.id) {
        let mass_heat =
            mass::total_mass(tree, substep.id) * blended_heat_coefficient(tree, substep.id);
        sum_mass_heat += mass_heat;
        // A substep arrives at its declared end temperature, else at its own
        // target, else it is assumed to match the parent's target.
        let temp = substep
            .end_temperature_c
            .unwrap_or_else(|| substep.temperature.as_option().unwrap_or(target));
        known_mass_heat_temp += mass_heat * temp;
    }

    if bulk_mass_heat == 0.0 {
        return room_c;
    }
    (sum_mass_heat * target - known_mass_heat_temp) / bulk_mass_heat
}
