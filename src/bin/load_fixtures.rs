//! Loads ingredient and tag reference data into Postgres.
//!
//! ```bash
//! recipebox-load-fixtures --ingredients data/ingredients.json --tags data/tags.json
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use recipebox::{
    config::Settings,
    database::{
        actions::PgStore,
        repository::{IngredientRepository, TagRepository},
        schema::{NewIngredient, NewTag},
    },
};
use serde::de::DeserializeOwned;

#[derive(Parser)]
#[command(name = "recipebox-load-fixtures", about = "Load ingredient and tag fixtures")]
struct FixtureArgs {
    /// JSON array of {name, measurement_unit}
    #[arg(long)]
    ingredients: PathBuf,

    /// JSON array of {name, color, slug}
    #[arg(long)]
    tags: Option<PathBuf>,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

async fn read_fixture<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = FixtureArgs::parse();

    let mut settings = Settings::from_lookup(|key| match key {
        // fixtures are never signed, so the secret is irrelevant here
        "JWT_SECRET" => Some(std::env::var(key).unwrap_or_else(|_| String::from("unused"))),
        _ => std::env::var(key).ok(),
    })?;
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }

    let store = PgStore::connect(&settings).await?;
    store.migrate().await?;

    let ingredients: Vec<NewIngredient> = read_fixture(&args.ingredients).await?;
    for ingredient in &ingredients {
        store.create_ingredient(ingredient).await?;
    }
    log::info!("Loaded {} ingredients", ingredients.len());

    if let Some(path) = args.tags {
        let tags: Vec<NewTag> = read_fixture(&path).await?;
        let mut loaded = 0;
        for tag in &tags {
            match store.create_tag(tag).await {
                Ok(_) => loaded += 1,
                Err(e) if e.is_unique_violation() => {
                    log::warn!("Skipping tag {}: {e}", tag.slug);
                }
                Err(e) => return Err(e.into()),
            }
        }
        log::info!("Loaded {loaded} of {} tags", tags.len());
    }

    Ok(())
}
