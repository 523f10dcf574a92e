//! bakeplan CLI
//!
//! Baking schedule and dough temperature calculator over a local SQLite
//! recipe store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use bakeplan::models::{
    DEFAULT_KNEADING_HEAT_GAIN_C, DEFAULT_ROOM_TEMP_C, HeatStyle, Ingredient, Recipe, Step,
    StepId, Temperature,
};
use bakeplan::tree::RecipeTree;
use bakeplan::{db, export, schedule, thermal};

#[derive(Parser)]
#[command(name = "bakeplan")]
#[command(about = "Baking schedule and dough temperature calculator")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "bakeplan.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Load a sample sourdough recipe for trying the tool without data
    LoadSample,

    /// List all recipes in the database
    ListRecipes,

    /// Show summary numbers for a recipe
    Show {
        /// Recipe ID
        recipe_id: i64,
    },

    /// Print the timed schedule for a recipe
    Schedule {
        /// Recipe ID
        recipe_id: i64,

        /// Also list each step's ingredients
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the full baking transcript for a recipe
    Export {
        /// Recipe ID
        recipe_id: i64,

        /// Room temperature in °C
        #[arg(long, default_value_t = DEFAULT_ROOM_TEMP_C)]
        room: f64,

        /// Heat worked into the dough by kneading, in °C
        #[arg(long, default_value_t = DEFAULT_KNEADING_HEAT_GAIN_C)]
        kneading_gain: f64,
    },

    /// Compute the required water temperature for one step
    WaterTemp {
        /// Step ID
        step_id: i64,

        /// Room temperature in °C
        #[arg(long, default_value_t = DEFAULT_ROOM_TEMP_C)]
        room: f64,

        /// Heat worked into the dough by kneading, in °C
        #[arg(long, default_value_t = DEFAULT_KNEADING_HEAT_GAIN_C)]
        kneading_gain: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let recipe_id = load_sample_data(&conn)?;
            println!("Sample recipe loaded with id {recipe_id}");
        }

        Commands::ListRecipes => {
            let recipes = db::list_recipes(&conn)?;
            if recipes.is_empty() {
                println!("No recipes in database. Run 'load-sample' first.");
            } else {
                println!("{:<5} {:<30} {:<17} {}", "ID", "Name", "Anchor (UTC)", "Anchor means");
                println!("{}", "-".repeat(70));
                for r in recipes {
                    println!(
                        "{:<5} {:<30} {:<17} {}",
                        r.id,
                        r.name,
                        export::format_timestamp(r.anchor),
                        if r.inverted { "finish" } else { "start" }
                    );
                }
            }
        }

        Commands::Show { recipe_id } => {
            let tree = RecipeTree::load(&conn, recipe_id)?;
            print!("{}", export::summarize(&tree));
            let timetable = schedule::compute_schedule(&tree);
            println!("Start:  {}", export::format_timestamp(timetable.start));
            println!("Finish: {}", export::format_timestamp(timetable.finish));
        }

        Commands::Schedule { recipe_id, verbose } => {
            let tree = RecipeTree::load(&conn, recipe_id)?;
            let timetable = schedule::compute_schedule(&tree);

            println!("Schedule for '{}':\n", tree.recipe().name);
            for step in schedule::reorder_steps(&tree) {
                let start = timetable.start_of(step.id)?;
                println!(
                    "{}  {:<28} {}",
                    export::format_timestamp(start),
                    step.name,
                    export::format_duration(step.duration_s)
                );
                if verbose {
                    for ingredient in tree.direct_ingredients(step.id) {
                        println!(
                            "{:17} {:.0} g {}",
                            "",
                            ingredient.mass_g * tree.recipe().times,
                            ingredient.name
                        );
                    }
                }
            }
            println!("\nFinish: {}", export::format_timestamp(timetable.finish));
        }

        Commands::Export {
            recipe_id,
            room,
            kneading_gain,
        } => {
            let tree = RecipeTree::load(&conn, recipe_id)?;
            print!("{}", export::export_text(&tree, room, kneading_gain)?);
        }

        Commands::WaterTemp {
            step_id,
            room,
            kneading_gain,
        } => {
            let step = db::get_step(&conn, step_id)?
                .with_context(|| format!("step {step_id} not found"))?;
            let tree = RecipeTree::load(&conn, step.recipe_id)?;
            let step = tree
                .step(step_id)
                .with_context(|| format!("step {step_id} is not reachable in recipe {}", step.recipe_id))?;
            let temp = thermal::required_bulk_liquid_temperature(&tree, step, room, kneading_gain);
            println!("Required water temperature for '{}': {:.1} C", step.name, temp);
        }
    }

    Ok(())
}

/// Seed a weekend sourdough: an inverted recipe (the anchor is when bread
/// should come out of the oven) whose mixing step pulls in a levain build
/// and a soaker as parallel substeps.
fn load_sample_data(conn: &Connection) -> Result<i64> {
    db::clear_all_data(conn)?;

    let recipe_id = db::insert_recipe(
        conn,
        &Recipe {
            id: 0,
            name: "Weekend sourdough".to_string(),
            anchor: Utc.with_ymd_and_hms(2026, 3, 7, 18, 0, 0).unwrap(),
            inverted: true,
            times: 1.0,
            favorite: true,
            difficulty: 1,
            image: None,
            number: 1,
        },
    )?;

    let mix = new_step(recipe_id, None, "Mix final dough", 900.0, 1);
    let mix_id = db::insert_step(
        conn,
        &Step {
            temperature: Temperature::Fixed(26.0),
            is_kneading: true,
            notes: "Mix to medium gluten development.".to_string(),
            ..mix
        },
    )?;

    let levain = new_step(recipe_id, Some(mix_id), "Build levain", 36_000.0, 1);
    let levain_id = db::insert_step(
        conn,
        &Step {
            end_temperature_c: Some(26.0),
            ..levain
        },
    )?;
    db::insert_ingredient(conn, &new_ingredient(levain_id, "Rye starter", 20.0, HeatStyle::Starter100, 1))?;
    db::insert_ingredient(conn, &new_ingredient(levain_id, "Whole rye flour", 80.0, HeatStyle::Flour, 2))?;
    db::insert_ingredient(conn, &new_ingredient(levain_id, "Water", 80.0, HeatStyle::BulkLiquid, 3))?;

    let soaker_id = db::insert_step(conn, &new_step(recipe_id, Some(mix_id), "Soaker", 14_400.0, 2))?;
    db::insert_ingredient(conn, &new_ingredient(soaker_id, "Cracked rye", 60.0, HeatStyle::Plain, 1))?;
    db::insert_ingredient(conn, &new_ingredient(soaker_id, "Water", 100.0, HeatStyle::BulkLiquid, 2))?;

    db::insert_ingredient(conn, &new_ingredient(mix_id, "Bread flour", 420.0, HeatStyle::Flour, 1))?;
    db::insert_ingredient(conn, &new_ingredient(mix_id, "Water", 250.0, HeatStyle::BulkLiquid, 2))?;
    db::insert_ingredient(conn, &new_ingredient(mix_id, "Salt", 11.0, HeatStyle::Plain, 3))?;

    let bulk = new_step(recipe_id, None, "Bulk ferment", 10_800.0, 2);
    db::insert_step(
        conn,
        &Step {
            temperature: Temperature::Fixed(26.0),
            notes: "Fold every 45 minutes.".to_string(),
            ..bulk
        },
    )?;

    db::insert_step(conn, &new_step(recipe_id, None, "Shape", 1_200.0, 3))?;

    let proof = new_step(recipe_id, None, "Final proof", 7_200.0, 4);
    db::insert_step(
        conn,
        &Step {
            temperature: Temperature::Fixed(24.0),
            ..proof
        },
    )?;

    let bake = new_step(recipe_id, None, "Bake", 2_700.0, 5);
    db::insert_step(
        conn,
        &Step {
            temperature: Temperature::Fixed(250.0),
            notes: "Preheat to 250 C, steam for the first 15 minutes.".to_string(),
            ..bake
        },
    )?;

    Ok(recipe_id)
}

fn new_step(recipe_id: i64, parent: Option<StepId>, name: &str, duration_s: f64, number: i64) -> Step {
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

fn new_ingredient(step_id: StepId, name: &str, mass_g: f64, style: HeatStyle, number: i64) -> Ingredient {
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
