//! Runs the repository contract against a live Postgres. Needs `DATABASE_URL`:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/recipebox_test cargo test -- --ignored
//! ```

use pretty_assertions::assert_eq;
use recipebox::{
    config::Settings,
    database::{
        actions::PgStore,
        error::QueryErrorKind,
        filter::RecipeFilter,
        pagination::PageRequest,
        repository::{
            CartRepository, FavoriteRepository, FollowRepository, IngredientRepository, RecipeRepository,
            TagRepository, UserRepository,
        },
        schema::{IngredientAmount, NewIngredient, NewTag, NewUser, RecipeData},
    },
    Id,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn store() -> Result<PgStore, Box<dyn std::error::Error>> {
    let settings = Settings {
        database_url: std::env::var("DATABASE_URL")?,
        ..Settings::default()
    };
    let store = PgStore::connect(&settings).await?;
    store.migrate().await?;
    Ok(store)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}{}", uuid::Uuid::new_v4().simple())
}

async fn user(store: &PgStore) -> Result<Id, Box<dyn std::error::Error>> {
    let name = unique("u");
    Ok(store
        .create_user(&NewUser {
            email: format!("{name}@example.com"),
            username: name.clone(),
            first_name: String::from("Test"),
            last_name: name,
            password: String::from("hash"),
        })
        .await?)
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn recipe_round_trip_and_cascade() -> TestResult {
    let store = store().await?;
    let author = user(&store).await?;
    let fan = user(&store).await?;
    let sugar = store
        .create_ingredient(&NewIngredient {
            name: unique("Sugar "),
            measurement_unit: String::from("g"),
        })
        .await?;
    let slug = unique("t");
    let tag = store
        .create_tag(&NewTag {
            name: slug.clone(),
            color: String::from("#AA0000"),
            slug: slug.clone(),
        })
        .await?;

    let data = RecipeData {
        name: String::from("Cake"),
        text: String::from("Bake."),
        cooking_time: 30,
        ingredients: vec![IngredientAmount {
            ingredient_id: sugar,
            amount: 100,
        }],
        tags: vec![tag],
    };
    let recipe = store.create_recipe(author, "recipes/cake.png", &data).await?;

    assert!(store.add_favorite(fan, recipe).await?);
    assert!(!store.add_favorite(fan, recipe).await?);
    assert!(store.add_to_cart(fan, recipe).await?);
    assert_eq!(store.list_cart_ingredients(fan).await?.len(), 1);

    let filter = RecipeFilter {
        tags: vec![slug],
        is_favorited: true,
        ..RecipeFilter::default()
    };
    let page = store.fetch_recipes(&filter, Some(fan), &PageRequest::default()).await?;
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].id, recipe);

    assert!(store.delete_recipe(recipe).await?);
    assert!(!store.is_favorite(fan, recipe).await?);
    assert!(store.list_cart_ingredients(fan).await?.is_empty());
    assert!(store.list_recipe_ingredients(recipe).await?.is_empty());
    Ok(())
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn constraints_map_to_error_kinds() -> TestResult {
    let store = store().await?;
    let author = user(&store).await?;

    let self_follow = store.follow(author, author).await;
    assert_eq!(self_follow.map_err(|e| e.kind()), Err(QueryErrorKind::CheckViolation));

    let missing_ingredient = RecipeData {
        name: String::from("Air"),
        text: String::from("Nothing."),
        cooking_time: 1,
        ingredients: vec![IngredientAmount {
            ingredient_id: Id::MAX,
            amount: 1,
        }],
        tags: vec![],
    };
    let result = store.create_recipe(author, "recipes/air.png", &missing_ingredient).await;
    assert_eq!(result.map_err(|e| e.kind()), Err(QueryErrorKind::ForeignKeyViolation));
    assert_eq!(store.count_author_recipes(author).await?, 0);
    Ok(())
}
