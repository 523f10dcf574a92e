//! SQLite schema and operations

use anyhow::Result;
use chrono::DateTime;
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;

use crate::models::{HeatStyle, Ingredient, IngredientId, Recipe, RecipeId, Step, StepId, Temperature};
use crate::tree::RecipeReader;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            anchor_utc INTEGER NOT NULL,
            inverted INTEGER NOT NULL DEFAULT 0,
            times REAL NOT NULL DEFAULT 1.0,
            favorite INTEGER NOT NULL DEFAULT 0,
            difficulty INTEGER NOT NULL DEFAULT 0,
            image BLOB,
            number INTEGER NOT NULL DEFAULT 0
        );

        -- Steps, self-referential: a non-null parent_step_id makes the row
        -- a substep and keeps it out of the recipe's top-level list.
        CREATE TABLE IF NOT EXISTS steps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL,
            parent_step_id INTEGER,
            name TEXT NOT NULL,
            duration_s REAL NOT NULL,
            temperature_c REAL,
            end_temperature_c REAL,
            is_kneading INTEGER NOT NULL DEFAULT 0,
            notes TEXT NOT NULL DEFAULT '',
            number INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            step_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            mass_g REAL NOT NULL,
            temperature_c REAL,
            style TEXT NOT NULL,
            number INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_steps_recipe ON steps(recipe_id);
        CREATE INDEX IF NOT EXISTS idx_steps_parent ON steps(parent_step_id);
        CREATE INDEX IF NOT EXISTS idx_ingredients_step ON ingredients(step_id);
        "#,
    )?;
    debug!("database schema ready");
    Ok(())
}

/// Insert a recipe, ignoring the id field; returns the new row id.
pub fn insert_recipe(conn: &Connection, recipe: &Recipe) -> Result<RecipeId> {
    conn.execute(
        "INSERT INTO recipes (name, anchor_utc, inverted, times, favorite, difficulty, image, number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            &recipe.name,
            recipe.anchor.timestamp(),
            recipe.inverted,
            recipe.times,
            recipe.favorite,
            recipe.difficulty,
            &recipe.image,
            recipe.number,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a step, ignoring the id field; returns the new row id.
pub fn insert_step(conn: &Connection, step: &Step) -> Result<StepId> {
    conn.execute(
        "INSERT INTO steps (recipe_id, parent_step_id, name, duration_s, temperature_c, end_temperature_c, is_kneading, notes, number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            step.recipe_id,
            step.parent_step_id,
            &step.name,
            step.duration_s,
            step.temperature.as_option(),
            step.end_temperature_c,
            step.is_kneading,
            &step.notes,
            step.number,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert an ingredient, ignoring the id field; returns the new row id.
pub fn insert_ingredient(conn: &Connection, ingredient: &Ingredient) -> Result<IngredientId> {
    conn.execute(
        "INSERT INTO ingredients (step_id, name, mass_g, temperature_c, style, number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            ingredient.step_id,
            &ingredient.name,
            ingredient.mass_g,
            ingredient.temperature.as_option(),
            ingredient.style.as_str(),
            ingredient.number,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

/// Clear all recipe data (for re-seeding)
pub fn clear_all_data(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM ingredients;
        DELETE FROM steps;
        DELETE FROM recipes;
        "#,
    )?;
    Ok(())
}

fn recipe_from_row(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    let anchor_utc: i64 = row.get(2)?;
    Ok(Recipe {
        id: row.get(0)?,
        name: row.get(1)?,
        anchor: DateTime::from_timestamp(anchor_utc, 0).unwrap_or(DateTime::UNIX_EPOCH),
        inverted: row.get(3)?,
        times: row.get(4)?,
        favorite: row.get(5)?,
        difficulty: row.get(6)?,
        image: row.get(7)?,
        number: row.get(8)?,
    })
}

fn step_from_row(row: &Row<'_>) -> rusqlite::Result<Step> {
    Ok(Step {
        id: row.get(0)?,
        recipe_id: row.get(1)?,
        parent_step_id: row.get(2)?,
        name: row.get(3)?,
        duration_s: row.get(4)?,
        temperature: Temperature::from_option(row.get(5)?),
        end_temperature_c: row.get(6)?,
        is_kneading: row.get(7)?,
        notes: row.get(8)?,
        number: row.get(9)?,
    })
}

fn ingredient_from_row(row: &Row<'_>) -> rusqlite::Result<Ingredient> {
    let style: String = row.get(5)?;
    let style = style.parse::<HeatStyle>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Ingredient {
        id: row.get(0)?,
        step_id: row.get(1)?,
        name: row.get(2)?,
        mass_g: row.get(3)?,
        temperature: Temperature::from_option(row.get(4)?),
        style,
        number: row.get(6)?,
    })
}

const RECIPE_COLS: &str = "id, name, anchor_utc, inverted, times, favorite, difficulty, image, number";
const STEP_COLS: &str = "id, recipe_id, parent_step_id, name, duration_s, temperature_c, end_temperature_c, is_kneading, notes, number";
const INGREDIENT_COLS: &str = "id, step_id, name, mass_g, temperature_c, style, number";

pub fn get_recipe(conn: &Connection, id: RecipeId) -> Result<Option<Recipe>> {
    let recipe = conn
        .query_row(
            &format!("SELECT {RECIPE_COLS} FROM recipes WHERE id = ?1"),
            [id],
            recipe_from_row,
        )
        .optional()?;
    Ok(recipe)
}

/// List all recipes, in ordering-number order
pub fn list_recipes(conn: &Connection) -> Result<Vec<Recipe>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {RECIPE_COLS} FROM recipes ORDER BY number, id"))?;
    let rows = stmt.query_map([], recipe_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

pub fn get_step(conn: &Connection, id: StepId) -> Result<Option<Step>> {
    let step = conn
        .query_row(
            &format!("SELECT {STEP_COLS} FROM steps WHERE id = ?1"),
            [id],
            step_from_row,
        )
        .optional()?;
    Ok(step)
}

/// Steps with no parent, in ordering-number order
pub fn top_level_steps(conn: &Connection, recipe_id: RecipeId) -> Result<Vec<Step>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STEP_COLS} FROM steps
         WHERE recipe_id = ?1 AND parent_step_id IS NULL
         ORDER BY number, id"
    ))?;
    let rows = stmt.query_map([recipe_id], step_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Direct substeps of a step, longest duration first
pub fn direct_substeps(conn: &Connection, step_id: StepId) -> Result<Vec<Step>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STEP_COLS} FROM steps
         WHERE parent_step_id = ?1
         ORDER BY duration_s DESC, number, id"
    ))?;
    let rows = stmt.query_map([step_id], step_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Direct ingredients of a step, in ordering-number order
pub fn direct_ingredients(conn: &Connection, step_id: StepId) -> Result<Vec<Ingredient>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INGREDIENT_COLS} FROM ingredients
         WHERE step_id = ?1
         ORDER BY number, id"
    ))?;
    let rows = stmt.query_map([step_id], ingredient_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

impl RecipeReader for Connection {
    fn recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        get_recipe(self, id)
    }

    fn step(&self, id: StepId) -> Result<Option<Step>> {
        get_step(self, id)
    }

    fn top_level_steps(&self, recipe_id: RecipeId) -> Result<Vec<Step>> {
        top_level_steps(self, recipe_id)
    }

    fn direct_substeps(&self, step_id: StepId) -> Result<Vec<Step>> {
        direct_substeps(self, step_id)
    }

    fn direct_ingredients(&self, step_id: StepId) -> Result<Vec<Ingredient>> {
        direct_ingredients(self, step_id)
    }
}
