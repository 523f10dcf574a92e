//! Data models for recipes, steps and ingredients

use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub type RecipeId = i64;
pub type StepId = i64;
pub type IngredientId = i64;

/// Room temperature assumed wherever no explicit temperature is set, in °C.
pub const DEFAULT_ROOM_TEMP_C: f64 = 20.0;

/// Heat a kneading machine works into the dough, in °C.
pub const DEFAULT_KNEADING_HEAT_GAIN_C: f64 = 2.0;

const HEAT_WATER: f64 = 4.187; // J/(g·K)
const HEAT_FLOUR: f64 = 1.465;
const HEAT_PLAIN: f64 = 1.0;

/// Specific-heat classification of an ingredient.
///
/// Starter styles are pre-fermented flour/water mixes at a fixed hydration:
/// a 50% starter is 2/3 flour and 1/3 water by mass, a 100% starter is half
/// and half. Bulk liquid (usually water) is the one component whose
/// temperature the thermal solver computes rather than reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeatStyle {
    Plain,
    Flour,
    Starter50,
    Starter100,
    BulkLiquid,
}

impl HeatStyle {
    pub const ALL: [HeatStyle; 5] = [
        HeatStyle::Plain,
        HeatStyle::Flour,
        HeatStyle::Starter50,
        HeatStyle::Starter100,
        HeatStyle::BulkLiquid,
    ];

    /// Specific-heat coefficient used to weight this style's mass in the
    /// energy balance. Starter coefficients are the hydration-weighted blend
    /// of the flour and water constants.
    pub fn heat_coefficient(self) -> f64 {
        match self {
            HeatStyle::Plain => HEAT_PLAIN,
            HeatStyle::Flour => HEAT_FLOUR,
            HeatStyle::Starter50 => (2.0 * HEAT_FLOUR + HEAT_WATER) / 3.0,
            HeatStyle::Starter100 => (HEAT_FLOUR + HEAT_WATER) / 2.0,
            HeatStyle::BulkLiquid => HEAT_WATER,
        }
    }

    /// Share of this style's mass that counts as flour.
    pub fn flour_fraction(self) -> f64 {
        match self {
            HeatStyle::Flour => 1.0,
            HeatStyle::Starter50 => 2.0 / 3.0,
            HeatStyle::Starter100 => 0.5,
            HeatStyle::Plain | HeatStyle::BulkLiquid => 0.0,
        }
    }

    /// Share of this style's mass that counts as water.
    pub fn water_fraction(self) -> f64 {
        match self {
            HeatStyle::BulkLiquid => 1.0,
            HeatStyle::Starter50 => 1.0 / 3.0,
            HeatStyle::Starter100 => 0.5,
            HeatStyle::Plain | HeatStyle::Flour => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeatStyle::Plain => "plain",
            HeatStyle::Flour => "flour",
            HeatStyle::Starter50 => "starter50",
            HeatStyle::Starter100 => "starter100",
            HeatStyle::BulkLiquid => "bulk_liquid",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown heat style '{0}'")]
pub struct ParseHeatStyleError(String);

impl FromStr for HeatStyle {
    type Err = ParseHeatStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(HeatStyle::Plain),
            "flour" => Ok(HeatStyle::Flour),
            "starter50" => Ok(HeatStyle::Starter50),
            "starter100" => Ok(HeatStyle::Starter100),
            "bulk_liquid" => Ok(HeatStyle::BulkLiquid),
            other => Err(ParseHeatStyleError(other.to_string())),
        }
    }
}

/// A temperature that is either pinned to a value or follows the room.
///
/// Resolved to a concrete number once per node before the thermal solver
/// runs, so the solver itself never branches on missing values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temperature {
    Fixed(f64),
    Ambient,
}

impl Temperature {
    pub fn resolve(self, ambient_c: f64) -> f64 {
        match self {
            Temperature::Fixed(t) => t,
            Temperature::Ambient => ambient_c,
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(t) => Temperature::Fixed(t),
            None => Temperature::Ambient,
        }
    }

    pub fn as_option(self) -> Option<f64> {
        match self {
            Temperature::Fixed(t) => Some(t),
            Temperature::Ambient => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ingredient {
    pub id: IngredientId,
    pub step_id: StepId,
    pub name: String,
    pub mass_g: f64,
    /// Fixed only when the ingredient is deliberately not at room
    /// temperature (fridge-cold butter, scalded milk).
    pub temperature: Temperature,
    pub style: HeatStyle,
    pub number: i64,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub id: StepId,
    pub recipe_id: RecipeId,
    /// Non-null means this step is a substep and is excluded from the
    /// recipe's top-level list.
    pub parent_step_id: Option<StepId>,
    pub name: String,
    pub duration_s: f64,
    /// Target temperature while the step itself runs.
    pub temperature: Temperature,
    /// Temperature this step reports when consumed as a substep of another
    /// step, overriding its own target.
    pub end_temperature_c: Option<f64>,
    /// Kneading works heat into the dough, lowering the effective target.
    pub is_kneading: bool,
    pub notes: String,
    pub number: i64,
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    /// Single anchor for the whole schedule: start time, or finish time
    /// when `inverted` is set.
    pub anchor: DateTime<Utc>,
    pub inverted: bool,
    /// How many multiples of the base quantities to produce.
    pub times: f64,
    pub favorite: bool,
    pub difficulty: i64,
    pub image: Option<Vec<u8>>,
    pub number: i64,
}
