//! Storage seams. Each entity gets its own trait exposing only the query shapes the
//! handlers need, so the Postgres store and the in-memory store are interchangeable.

use async_trait::async_trait;

use super::{
    error::QueryError,
    filter::RecipeFilter,
    pagination::{Page, PageRequest},
    schema::{Id, Ingredient, NewIngredient, NewTag, NewUser, Recipe, RecipeData, RecipePart, Tag, User},
};

#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<Id, QueryError>;
    async fn get_user(&self, id: Id) -> Result<Option<User>, QueryError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, QueryError>;
    /// Ordered by username.
    async fn fetch_users(&self, page: &PageRequest) -> Result<Page<User>, QueryError>;
    async fn delete_user(&self, id: Id) -> Result<bool, QueryError>;
}

#[async_trait]
pub trait IngredientRepository {
    async fn create_ingredient(&self, ingredient: &NewIngredient) -> Result<Id, QueryError>;
    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, QueryError>;
    /// Case-insensitive prefix match on the name, ordered by name.
    async fn search_ingredients(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, QueryError>;
    async fn get_ingredients(&self, ids: &[Id]) -> Result<Vec<Ingredient>, QueryError>;
    async fn delete_ingredient(&self, id: Id) -> Result<bool, QueryError>;
}

#[async_trait]
pub trait TagRepository {
    async fn create_tag(&self, tag: &NewTag) -> Result<Id, QueryError>;
    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, QueryError>;
    async fn list_tags(&self) -> Result<Vec<Tag>, QueryError>;
    async fn get_tags(&self, ids: &[Id]) -> Result<Vec<Tag>, QueryError>;
    async fn delete_tag(&self, id: Id) -> Result<bool, QueryError>;
}

#[async_trait]
pub trait RecipeRepository {
    /// Inserts the recipe and all of its associations atomically.
    async fn create_recipe(&self, author_id: Id, image: &str, data: &RecipeData) -> Result<Id, QueryError>;
    /// Replaces every field and association atomically. `image: None` keeps the stored one.
    /// Returns false when the recipe does not exist.
    async fn update_recipe(&self, id: Id, image: Option<&str>, data: &RecipeData) -> Result<bool, QueryError>;
    async fn delete_recipe(&self, id: Id) -> Result<bool, QueryError>;
    async fn get_recipe(&self, id: Id) -> Result<Option<Recipe>, QueryError>;
    /// Newest first.
    async fn fetch_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Id>,
        page: &PageRequest,
    ) -> Result<Page<Recipe>, QueryError>;
    async fn list_recipe_ingredients(&self, recipe_id: Id) -> Result<Vec<RecipePart>, QueryError>;
    async fn list_recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, QueryError>;
    /// Newest first, optionally capped.
    async fn list_author_recipes(&self, author_id: Id, limit: Option<i64>) -> Result<Vec<Recipe>, QueryError>;
    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, QueryError>;
}

/// Insert-or-delete relation between a user and a recipe.
#[async_trait]
pub trait FavoriteRepository {
    /// Returns false when the pair already exists.
    async fn add_favorite(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError>;
    /// Returns false when there was nothing to delete.
    async fn remove_favorite(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError>;
    async fn is_favorite(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError>;
}

#[async_trait]
pub trait CartRepository {
    async fn add_to_cart(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError>;
    async fn remove_from_cart(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError>;
    async fn is_in_cart(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError>;
    /// Every ingredient line of every recipe in the user's cart.
    async fn list_cart_ingredients(&self, user_id: Id) -> Result<Vec<RecipePart>, QueryError>;
}

#[async_trait]
pub trait FollowRepository {
    async fn follow(&self, user_id: Id, author_id: Id) -> Result<bool, QueryError>;
    async fn unfollow(&self, user_id: Id, author_id: Id) -> Result<bool, QueryError>;
    async fn is_following(&self, user_id: Id, author_id: Id) -> Result<bool, QueryError>;
    /// Authors the user follows, ordered by username.
    async fn fetch_subscriptions(&self, user_id: Id, page: &PageRequest) -> Result<Page<User>, QueryError>;
}

/// Everything the API layer needs from a backend.
pub trait Store:
    UserRepository
    + IngredientRepository
    + TagRepository
    + RecipeRepository
    + FavoriteRepository
    + CartRepository
    + FollowRepository
    + Send
    + Sync
{
}

impl<T> Store for T where
    T: UserRepository
        + IngredientRepository
        + TagRepository
        + RecipeRepository
        + FavoriteRepository
        + CartRepository
        + FollowRepository
        + Send
        + Sync
{
}
