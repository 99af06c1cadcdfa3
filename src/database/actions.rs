//! Postgres backend. Queries live in one module per entity; `PgStore` wires them to the
//! repository traits.

pub mod carts;
pub mod favorites;
pub mod follows;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use super::{
    error::{QueryError, QueryErrorKind},
    filter::RecipeFilter,
    pagination::{Page, PageRequest},
    repository::{
        CartRepository, FavoriteRepository, FollowRepository, IngredientRepository,
        RecipeRepository, TagRepository, UserRepository,
    },
    schema::{Id, Ingredient, NewIngredient, NewTag, NewUser, Recipe, RecipeData, RecipePart, Tag, User},
};
use crate::config::Settings;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn connect(settings: &Settings) -> Result<Self, QueryError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .connect(&settings.database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), QueryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| QueryError::new(QueryErrorKind::Other, format!("Migration failed: {e}")))
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: &NewUser) -> Result<Id, QueryError> {
        users::insert_user(user, &self.pool).await
    }

    async fn get_user(&self, id: Id) -> Result<Option<User>, QueryError> {
        users::get_user_by_id(id, &self.pool).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, QueryError> {
        users::get_user_by_email(email, &self.pool).await
    }

    async fn fetch_users(&self, page: &PageRequest) -> Result<Page<User>, QueryError> {
        users::fetch_users(page, &self.pool).await
    }

    async fn delete_user(&self, id: Id) -> Result<bool, QueryError> {
        users::delete_user(id, &self.pool).await
    }
}

#[async_trait]
impl IngredientRepository for PgStore {
    async fn create_ingredient(&self, ingredient: &NewIngredient) -> Result<Id, QueryError> {
        ingredients::insert_ingredient(ingredient, &self.pool).await
    }

    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, QueryError> {
        ingredients::get_ingredient(id, &self.pool).await
    }

    async fn search_ingredients(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, QueryError> {
        ingredients::search_ingredients(prefix, &self.pool).await
    }

    async fn get_ingredients(&self, ids: &[Id]) -> Result<Vec<Ingredient>, QueryError> {
        ingredients::get_ingredients(ids, &self.pool).await
    }

    async fn delete_ingredient(&self, id: Id) -> Result<bool, QueryError> {
        ingredients::delete_ingredient(id, &self.pool).await
    }
}

#[async_trait]
impl TagRepository for PgStore {
    async fn create_tag(&self, tag: &NewTag) -> Result<Id, QueryError> {
        tags::insert_tag(tag, &self.pool).await
    }

    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, QueryError> {
        tags::get_tag(id, &self.pool).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, QueryError> {
        tags::list_tags(&self.pool).await
    }

    async fn get_tags(&self, ids: &[Id]) -> Result<Vec<Tag>, QueryError> {
        tags::get_tags(ids, &self.pool).await
    }

    async fn delete_tag(&self, id: Id) -> Result<bool, QueryError> {
        tags::delete_tag(id, &self.pool).await
    }
}

#[async_trait]
impl RecipeRepository for PgStore {
    async fn create_recipe(&self, author_id: Id, image: &str, data: &RecipeData) -> Result<Id, QueryError> {
        recipes::insert_recipe(author_id, image, data, &self.pool).await
    }

    async fn update_recipe(&self, id: Id, image: Option<&str>, data: &RecipeData) -> Result<bool, QueryError> {
        recipes::update_recipe(id, image, data, &self.pool).await
    }

    async fn delete_recipe(&self, id: Id) -> Result<bool, QueryError> {
        recipes::delete_recipe(id, &self.pool).await
    }

    async fn get_recipe(&self, id: Id) -> Result<Option<Recipe>, QueryError> {
        recipes::get_recipe(id, &self.pool).await
    }

    async fn fetch_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Id>,
        page: &PageRequest,
    ) -> Result<Page<Recipe>, QueryError> {
        recipes::fetch_recipes(filter, viewer, page, &self.pool).await
    }

    async fn list_recipe_ingredients(&self, recipe_id: Id) -> Result<Vec<RecipePart>, QueryError> {
        recipes::list_recipe_ingredients(recipe_id, &self.pool).await
    }

    async fn list_recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, QueryError> {
        tags::list_recipe_tags(recipe_id, &self.pool).await
    }

    async fn list_author_recipes(&self, author_id: Id, limit: Option<i64>) -> Result<Vec<Recipe>, QueryError> {
        recipes::list_author_recipes(author_id, limit, &self.pool).await
    }

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, QueryError> {
        recipes::count_author_recipes(author_id, &self.pool).await
    }
}

#[async_trait]
impl FavoriteRepository for PgStore {
    async fn add_favorite(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        favorites::add_to_favorites(user_id, recipe_id, &self.pool).await
    }

    async fn remove_favorite(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        favorites::remove_from_favorites(user_id, recipe_id, &self.pool).await
    }

    async fn is_favorite(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        favorites::is_favorite(user_id, recipe_id, &self.pool).await
    }
}

#[async_trait]
impl CartRepository for PgStore {
    async fn add_to_cart(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        carts::add_to_cart(user_id, recipe_id, &self.pool).await
    }

    async fn remove_from_cart(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        carts::remove_from_cart(user_id, recipe_id, &self.pool).await
    }

    async fn is_in_cart(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        carts::is_in_cart(user_id, recipe_id, &self.pool).await
    }

    async fn list_cart_ingredients(&self, user_id: Id) -> Result<Vec<RecipePart>, QueryError> {
        carts::list_cart_ingredients(user_id, &self.pool).await
    }
}

#[async_trait]
impl FollowRepository for PgStore {
    async fn follow(&self, user_id: Id, author_id: Id) -> Result<bool, QueryError> {
        follows::follow(user_id, author_id, &self.pool).await
    }

    async fn unfollow(&self, user_id: Id, author_id: Id) -> Result<bool, QueryError> {
        follows::unfollow(user_id, author_id, &self.pool).await
    }

    async fn is_following(&self, user_id: Id, author_id: Id) -> Result<bool, QueryError> {
        follows::is_following(user_id, author_id, &self.pool).await
    }

    async fn fetch_subscriptions(&self, user_id: Id, page: &PageRequest) -> Result<Page<User>, QueryError> {
        follows::fetch_subscriptions(user_id, page, &self.pool).await
    }
}
