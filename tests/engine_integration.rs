//! End-to-end run over an in-memory SQLite store: seed a recipe, load the
//! snapshot through the reader, then schedule and export it.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use rusqlite::Connection;

use bakeplan::models::{HeatStyle, Ingredient, Recipe, Step, StepId, Temperature};
use bakeplan::tree::{RecipeReader, RecipeTree};
use bakeplan::{db, export, mass, schedule, thermal};

fn step(recipe_id: i64, parent: Option<StepId>, name: &str, duration_s: f64, number: i64) -> Step {
    Step {
        id: 0,
        recipe_id,
        parent_step_id: parent,
        name: name.to_string(),
        duration_s,
        temperature: Temperature::Ambient,
        end_temperature_c: None,
        is_kneading: false,
        notes: String::new(),
        number,
    }
}

fn ingredient(step_id: StepId, name: &str, mass_g: f64, style: HeatStyle, number: i64) -> Ingredient {
    Ingredient {
        id: 0,
        step_id,
        name: name.to_string(),
        mass_g,
        temperature: Temperature::Ambient,
        style,
        number,
    }
}

/// Inverted sourdough: anchor is the finish, the mix step owns a long
/// levain build and a shorter soaker running in parallel.
fn seed(conn: &Connection) -> Result<i64> {
    db::init_schema(conn)?;

    let recipe_id = db::insert_recipe(
        conn,
        &Recipe {
            id: 0,
            name: "Integration loaf".to_string(),
            anchor: Utc.with_ymd_and_hms(2026, 3, 7, 18, 0, 0).unwrap(),
            inverted: true,
            times: 1.0,
            favorite: false,
            difficulty: 1,
            image: None,
            number: 1,
        },
    )?;

    let mut mix = step(recipe_id, None, "Mix", 900.0, 1);
    mix.temperature = Temperature::Fixed(26.0);
    mix.is_kneading = true;
    let mix_id = db::insert_step(conn, &mix)?;

    let mut levain = step(recipe_id, Some(mix_id), "Levain", 36_000.0, 1);
    levain.end_temperature_c = Some(26.0);
    let levain_id = db::insert_step(conn, &levain)?;
    db::insert_ingredient(conn, &ingredient(levain_id, "Starter", 20.0, HeatStyle::Starter100, 1))?;
    db::insert_ingredient(conn, &ingredient(levain_id, "Rye flour", 80.0, HeatStyle::Flour, 2))?;
    db::insert_ingredient(conn, &ingredient(levain_id, "Water", 80.0, HeatStyle::BulkLiquid, 3))?;

    let soaker_id = db::insert_step(conn, &step(recipe_id, Some(mix_id), "Soaker", 14_400.0, 2))?;
    db::insert_ingredient(conn, &ingredient(soaker_id, "Cracked rye", 60.0, HeatStyle::Plain, 1))?;
    db::insert_ingredient(conn, &ingredient(soaker_id, "Water", 100.0, HeatStyle::BulkLiquid, 2))?;

    db::insert_ingredient(conn, &ingredient(mix_id, "Bread flour", 420.0, HeatStyle::Flour, 1))?;
    db::insert_ingredient(conn, &ingredient(mix_id, "Water", 250.0, HeatStyle::BulkLiquid, 2))?;
    db::insert_ingredient(conn, &ingredient(mix_id, "Salt", 11.0, HeatStyle::Plain, 3))?;

    db::insert_step(conn, &step(recipe_id, None, "Bulk ferment", 10_800.0, 2))?;
    db::insert_step(conn, &step(recipe_id, None, "Bake", 2_700.0, 3))?;

    Ok(recipe_id)
}

#[test]
fn reader_honors_ordering_contracts() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    let recipe_id = seed(&conn)?;

    let top = RecipeReader::top_level_steps(&conn, recipe_id)?;
    let names: Vec<_> = top.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Mix", "Bulk ferment", "Bake"]);

    // Substeps come back longest own-duration first.
    let subs = RecipeReader::direct_substeps(&conn, top[0].id)?;
    let names: Vec<_> = subs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Levain", "Soaker"]);

    // Ingredients come back in ordering-number order.
    let mix_ingredients = RecipeReader::direct_ingredients(&conn, top[0].id)?;
    let names: Vec<_> = mix_ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Bread flour", "Water", "Salt"]);

    Ok(())
}

#[test]
fn snapshot_roundtrips_models_through_sqlite() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    let recipe_id = seed(&conn)?;
    let tree = RecipeTree::load(&conn, recipe_id)?;

    assert_eq!(tree.step_count(), 5);
    assert_eq!(tree.ingredient_count(), 8);
    assert!(tree.recipe().inverted);

    let mix = tree.top_level_steps()[0];
    assert_eq!(mix.temperature, Temperature::Fixed(26.0));
    assert!(mix.is_kneading);
    let levain = tree.direct_substeps(mix.id)[0];
    assert_eq!(levain.end_temperature_c, Some(26.0));
    assert_eq!(
        tree.direct_ingredients(levain.id)[0].style,
        HeatStyle::Starter100
    );

    Ok(())
}

#[test]
fn missing_recipe_fails_to_load() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    db::init_schema(&conn)?;
    assert!(RecipeTree::load(&conn, 42).is_err());
    Ok(())
}

#[test]
fn schedule_ends_at_the_inverted_anchor() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    let recipe_id = seed(&conn)?;
    let tree = RecipeTree::load(&conn, recipe_id)?;

    // Mix critical path 36000 + 900, bulk 10800, bake 2700.
    let total = schedule::total_duration(&tree);
    assert!((total - 50_400.0).abs() < 1e-9);

    let timetable = schedule::compute_schedule(&tree);
    assert_eq!(timetable.finish, tree.recipe().anchor);
    assert_eq!(
        timetable.finish - timetable.start,
        chrono::Duration::seconds(50_400)
    );

    // The levain is the bottleneck and starts the whole plan; the soaker is
    // back-dated to finish when mixing begins.
    let mix = tree.top_level_steps()[0];
    let levain = tree.direct_substeps(mix.id)[0];
    let soaker = tree.direct_substeps(mix.id)[1];
    assert_eq!(timetable.start_of(levain.id)?, timetable.start);
    assert_eq!(
        timetable.start_of(soaker.id)?,
        timetable.start_of(mix.id)? - chrono::Duration::seconds(14_400)
    );

    Ok(())
}

#[test]
fn masses_and_water_temperature_agree_with_the_snapshot() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    let recipe_id = seed(&conn)?;
    let tree = RecipeTree::load(&conn, recipe_id)?;

    let mix = tree.top_level_steps()[0];
    // 681 direct + 180 levain + 160 soaker.
    assert!((mass::total_mass(&tree, mix.id) - 1021.0).abs() < 1e-9);
    // Flour: 420 + 80 + half the starter.
    assert!((mass::flour_mass(&tree, mix.id) - 510.0).abs() < 1e-9);

    let water_temp = thermal::required_bulk_liquid_temperature(&tree, mix, 20.0, 2.0);
    assert!(water_temp.is_finite());
    // Cold room and a 26 degree target want water above the room.
    assert!(water_temp > 20.0);

    Ok(())
}

#[test]
fn export_covers_every_step_and_finishes_at_the_anchor() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    let recipe_id = seed(&conn)?;
    let tree = RecipeTree::load(&conn, recipe_id)?;

    let text = export::export_text(&tree, 20.0, 2.0)?;
    for name in ["Levain", "Soaker", "Mix", "Bulk ferment", "Bake"] {
        assert!(text.contains(&format!("== {name}")), "missing step {name}");
    }
    let levain = text.find("== Levain").unwrap();
    let mix = text.find("== Mix").unwrap();
    assert!(levain < mix, "substeps must precede their parent");
    assert!(text.trim_end().ends_with("Finish: 2026-03-07 18:00"));

    Ok(())
}
