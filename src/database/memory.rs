//! In-process store with the same constraint and cascade rules as the Postgres schema.
//! Every mutation takes the single write lock, so a recipe rewrite is never observed half done.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

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
use crate::constants::{
    CHECK_NO_SELF_FOLLOW, CHECK_RECIPE_COOKING_TIME, CHECK_RECIPE_INGREDIENT_AMOUNT, UNIQUE_RECIPE_INGREDIENT,
    UNIQUE_RECIPE_TAG, UNIQUE_TAG_COLOR, UNIQUE_TAG_NAME, UNIQUE_TAG_SLUG, UNIQUE_USER_EMAIL,
    UNIQUE_USER_USERNAME,
};

#[derive(Debug, Default)]
struct Tables {
    sequence: Id,
    users: BTreeMap<Id, User>,
    ingredients: BTreeMap<Id, Ingredient>,
    tags: BTreeMap<Id, Tag>,
    recipes: BTreeMap<Id, Recipe>,
    /// (recipe, ingredient) -> amount
    recipe_ingredients: BTreeMap<(Id, Id), i32>,
    /// (recipe, tag)
    recipe_tags: BTreeSet<(Id, Id)>,
    /// (user, recipe)
    favorites: BTreeSet<(Id, Id)>,
    carts: BTreeSet<(Id, Id)>,
    /// (user, author)
    follows: BTreeSet<(Id, Id)>,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.sequence += 1;
        self.sequence
    }

    fn check_recipe(&self, author_id: Id, data: &RecipeData) -> Result<(), QueryError> {
        if !self.users.contains_key(&author_id) {
            return Err(foreign_key("recipes_author_id_fkey"));
        }
        if data.cooking_time < 1 {
            return Err(QueryError::constraint_violation(
                QueryErrorKind::CheckViolation,
                CHECK_RECIPE_COOKING_TIME,
            ));
        }

        let mut ingredients = BTreeSet::new();
        for part in &data.ingredients {
            if !self.ingredients.contains_key(&part.ingredient_id) {
                return Err(foreign_key("recipe_ingredients_ingredient_id_fkey"));
            }
            if part.amount < 1 {
                return Err(QueryError::constraint_violation(
                    QueryErrorKind::CheckViolation,
                    CHECK_RECIPE_INGREDIENT_AMOUNT,
                ));
            }
            if !ingredients.insert(part.ingredient_id) {
                return Err(unique(UNIQUE_RECIPE_INGREDIENT));
            }
        }

        let mut tags = BTreeSet::new();
        for tag in &data.tags {
            if !self.tags.contains_key(tag) {
                return Err(foreign_key("recipe_tags_tag_id_fkey"));
            }
            if !tags.insert(*tag) {
                return Err(unique(UNIQUE_RECIPE_TAG));
            }
        }

        Ok(())
    }

    fn write_associations(&mut self, recipe_id: Id, data: &RecipeData) {
        self.recipe_ingredients.retain(|(recipe, _), _| *recipe != recipe_id);
        self.recipe_tags.retain(|(recipe, _)| *recipe != recipe_id);

        for part in &data.ingredients {
            self.recipe_ingredients
                .insert((recipe_id, part.ingredient_id), part.amount);
        }
        for tag in &data.tags {
            self.recipe_tags.insert((recipe_id, *tag));
        }
    }

    fn recipe_parts(&self, recipe_id: Id) -> Vec<RecipePart> {
        self.recipe_ingredients
            .range((recipe_id, Id::MIN)..=(recipe_id, Id::MAX))
            .filter_map(|((recipe_id, ingredient_id), amount)| {
                self.ingredients.get(ingredient_id).map(|ingredient| RecipePart {
                    recipe_id: *recipe_id,
                    ingredient_id: *ingredient_id,
                    name: ingredient.name.clone(),
                    measurement_unit: ingredient.measurement_unit.clone(),
                    amount: *amount,
                })
            })
            .collect()
    }

    fn remove_recipe(&mut self, recipe_id: Id) -> bool {
        if self.recipes.remove(&recipe_id).is_none() {
            return false;
        }
        self.recipe_ingredients.retain(|(recipe, _), _| *recipe != recipe_id);
        self.recipe_tags.retain(|(recipe, _)| *recipe != recipe_id);
        self.favorites.retain(|(_, recipe)| *recipe != recipe_id);
        self.carts.retain(|(_, recipe)| *recipe != recipe_id);
        true
    }

    fn relation_target_exists(&self, user_id: Id, recipe_id: Id) -> Result<(), QueryError> {
        if !self.users.contains_key(&user_id) {
            return Err(foreign_key("user_id_fkey"));
        }
        if !self.recipes.contains_key(&recipe_id) {
            return Err(foreign_key("recipe_id_fkey"));
        }
        Ok(())
    }
}

fn unique(constraint: &str) -> QueryError {
    QueryError::constraint_violation(QueryErrorKind::UniqueViolation, constraint)
}

fn foreign_key(constraint: &str) -> QueryError {
    QueryError::constraint_violation(QueryErrorKind::ForeignKeyViolation, constraint)
}

fn page_of<T: Clone>(rows: Vec<T>, page: &PageRequest) -> Page<T> {
    let count = rows.len() as i64;
    let results = rows
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
        .collect();
    Page::from_rows(results, count, page)
}

/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<Id, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(unique(UNIQUE_USER_EMAIL));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(unique(UNIQUE_USER_USERNAME));
        }

        let id = tables.next_id();
        tables.users.insert(
            id,
            User {
                id,
                email: user.email.clone(),
                username: user.username.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                password: user.password.clone(),
            },
        );
        Ok(id)
    }

    async fn get_user(&self, id: Id) -> Result<Option<User>, QueryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn fetch_users(&self, page: &PageRequest) -> Result<Page<User>, QueryError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(page_of(users, page))
    }

    async fn delete_user(&self, id: Id) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        let owned: Vec<Id> = tables
            .recipes
            .values()
            .filter(|r| r.author_id == id)
            .map(|r| r.id)
            .collect();
        for recipe_id in owned {
            tables.remove_recipe(recipe_id);
        }
        tables.favorites.retain(|(user, _)| *user != id);
        tables.carts.retain(|(user, _)| *user != id);
        tables
            .follows
            .retain(|(user, author)| *user != id && *author != id);
        Ok(true)
    }
}

#[async_trait]
impl IngredientRepository for MemoryStore {
    async fn create_ingredient(&self, ingredient: &NewIngredient) -> Result<Id, QueryError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.ingredients.insert(
            id,
            Ingredient {
                id,
                name: ingredient.name.clone(),
                measurement_unit: ingredient.measurement_unit.clone(),
            },
        );
        Ok(id)
    }

    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, QueryError> {
        Ok(self.tables.read().await.ingredients.get(&id).cloned())
    }

    async fn search_ingredients(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, QueryError> {
        let prefix = prefix.map(str::to_lowercase);
        let tables = self.tables.read().await;
        let mut found: Vec<Ingredient> = tables
            .ingredients
            .values()
            .filter(|i| match &prefix {
                Some(prefix) => i.name.to_lowercase().starts_with(prefix.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn get_ingredients(&self, ids: &[Id]) -> Result<Vec<Ingredient>, QueryError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.ingredients.get(id).cloned())
            .collect())
    }

    async fn delete_ingredient(&self, id: Id) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.ingredients.remove(&id).is_none() {
            return Ok(false);
        }
        tables
            .recipe_ingredients
            .retain(|(_, ingredient), _| *ingredient != id);
        Ok(true)
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn create_tag(&self, tag: &NewTag) -> Result<Id, QueryError> {
        let mut tables = self.tables.write().await;
        for existing in tables.tags.values() {
            if existing.name == tag.name {
                return Err(unique(UNIQUE_TAG_NAME));
            }
            if existing.color == tag.color {
                return Err(unique(UNIQUE_TAG_COLOR));
            }
            if existing.slug == tag.slug {
                return Err(unique(UNIQUE_TAG_SLUG));
            }
        }

        let id = tables.next_id();
        tables.tags.insert(
            id,
            Tag {
                id,
                name: tag.name.clone(),
                color: tag.color.clone(),
                slug: tag.slug.clone(),
            },
        );
        Ok(id)
    }

    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, QueryError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, QueryError> {
        Ok(self.tables.read().await.tags.values().cloned().collect())
    }

    async fn get_tags(&self, ids: &[Id]) -> Result<Vec<Tag>, QueryError> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.tags.get(id).cloned()).collect())
    }

    async fn delete_tag(&self, id: Id) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        if tables.tags.remove(&id).is_none() {
            return Ok(false);
        }
        tables.recipe_tags.retain(|(_, tag)| *tag != id);
        Ok(true)
    }
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn create_recipe(&self, author_id: Id, image: &str, data: &RecipeData) -> Result<Id, QueryError> {
        let mut tables = self.tables.write().await;
        tables.check_recipe(author_id, data)?;

        let id = tables.next_id();
        tables.recipes.insert(
            id,
            Recipe {
                id,
                author_id,
                name: data.name.clone(),
                image: image.to_string(),
                text: data.text.clone(),
                cooking_time: data.cooking_time,
                created: Utc::now(),
            },
        );
        tables.write_associations(id, data);
        Ok(id)
    }

    async fn update_recipe(&self, id: Id, image: Option<&str>, data: &RecipeData) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        let author_id = match tables.recipes.get(&id) {
            Some(recipe) => recipe.author_id,
            None => return Ok(false),
        };
        tables.check_recipe(author_id, data)?;

        if let Some(recipe) = tables.recipes.get_mut(&id) {
            recipe.name = data.name.clone();
            recipe.text = data.text.clone();
            recipe.cooking_time = data.cooking_time;
            if let Some(image) = image {
                recipe.image = image.to_string();
            }
        }
        tables.write_associations(id, data);
        Ok(true)
    }

    async fn delete_recipe(&self, id: Id) -> Result<bool, QueryError> {
        Ok(self.tables.write().await.remove_recipe(id))
    }

    async fn get_recipe(&self, id: Id) -> Result<Option<Recipe>, QueryError> {
        Ok(self.tables.read().await.recipes.get(&id).cloned())
    }

    async fn fetch_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Id>,
        page: &PageRequest,
    ) -> Result<Page<Recipe>, QueryError> {
        let tables = self.tables.read().await;
        let favorited_by = filter.favorited_by(viewer);
        let in_cart_of = filter.in_cart_of(viewer);

        let tag_ids: BTreeSet<Id> = tables
            .tags
            .values()
            .filter(|t| filter.tags.contains(&t.slug))
            .map(|t| t.id)
            .collect();

        let matching: Vec<Recipe> = tables
            .recipes
            .values()
            .rev()
            .filter(|r| filter.author.map_or(true, |author| r.author_id == author))
            .filter(|r| {
                filter.tags.is_empty()
                    || tag_ids
                        .iter()
                        .any(|tag| tables.recipe_tags.contains(&(r.id, *tag)))
            })
            .filter(|r| favorited_by.map_or(true, |user| tables.favorites.contains(&(user, r.id))))
            .filter(|r| in_cart_of.map_or(true, |user| tables.carts.contains(&(user, r.id))))
            .cloned()
            .collect();

        Ok(page_of(matching, page))
    }

    async fn list_recipe_ingredients(&self, recipe_id: Id) -> Result<Vec<RecipePart>, QueryError> {
        Ok(self.tables.read().await.recipe_parts(recipe_id))
    }

    async fn list_recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipe_tags
            .range((recipe_id, Id::MIN)..=(recipe_id, Id::MAX))
            .filter_map(|(_, tag)| tables.tags.get(tag).cloned())
            .collect())
    }

    async fn list_author_recipes(&self, author_id: Id, limit: Option<i64>) -> Result<Vec<Recipe>, QueryError> {
        let tables = self.tables.read().await;
        let recipes = tables
            .recipes
            .values()
            .rev()
            .filter(|r| r.author_id == author_id)
            .cloned();
        Ok(match limit {
            Some(limit) => recipes.take(limit.max(0) as usize).collect(),
            None => recipes.collect(),
        })
    }

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .values()
            .filter(|r| r.author_id == author_id)
            .count() as i64)
    }
}

#[async_trait]
impl FavoriteRepository for MemoryStore {
    async fn add_favorite(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        tables.relation_target_exists(user_id, recipe_id)?;
        Ok(tables.favorites.insert((user_id, recipe_id)))
    }

    async fn remove_favorite(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        Ok(self.tables.write().await.favorites.remove(&(user_id, recipe_id)))
    }

    async fn is_favorite(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        Ok(self.tables.read().await.favorites.contains(&(user_id, recipe_id)))
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn add_to_cart(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        tables.relation_target_exists(user_id, recipe_id)?;
        Ok(tables.carts.insert((user_id, recipe_id)))
    }

    async fn remove_from_cart(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        Ok(self.tables.write().await.carts.remove(&(user_id, recipe_id)))
    }

    async fn is_in_cart(&self, user_id: Id, recipe_id: Id) -> Result<bool, QueryError> {
        Ok(self.tables.read().await.carts.contains(&(user_id, recipe_id)))
    }

    async fn list_cart_ingredients(&self, user_id: Id) -> Result<Vec<RecipePart>, QueryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .carts
            .range((user_id, Id::MIN)..=(user_id, Id::MAX))
            .flat_map(|(_, recipe_id)| tables.recipe_parts(*recipe_id))
            .collect())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn follow(&self, user_id: Id, author_id: Id) -> Result<bool, QueryError> {
        let mut tables = self.tables.write().await;
        if user_id == author_id {
            return Err(QueryError::constraint_violation(
                QueryErrorKind::CheckViolation,
                CHECK_NO_SELF_FOLLOW,
            ));
        }
        if !tables.users.contains_key(&user_id) || !tables.users.contains_key(&author_id) {
            return Err(foreign_key("follows_user_fkey"));
        }
        Ok(tables.follows.insert((user_id, author_id)))
    }

    async fn unfollow(&self, user_id: Id, author_id: Id) -> Result<bool, QueryError> {
        Ok(self.tables.write().await.follows.remove(&(user_id, author_id)))
    }

    async fn is_following(&self, user_id: Id, author_id: Id) -> Result<bool, QueryError> {
        Ok(self.tables.read().await.follows.contains(&(user_id, author_id)))
    }

    async fn fetch_subscriptions(&self, user_id: Id, page: &PageRequest) -> Result<Page<User>, QueryError> {
        let tables = self.tables.read().await;
        let mut authors: Vec<User> = tables
            .follows
            .range((user_id, Id::MIN)..=(user_id, Id::MAX))
            .filter_map(|(_, author)| tables.users.get(author).cloned())
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(page_of(authors, page))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::database::schema::IngredientAmount;

    async fn seed() -> Result<(MemoryStore, Id, Id, Id), QueryError> {
        let store = MemoryStore::new();
        let author = store
            .create_user(&NewUser {
                email: String::from("chef@example.com"),
                username: String::from("chef"),
                first_name: String::from("Jo"),
                last_name: String::from("Chef"),
                password: String::new(),
            })
            .await?;
        let sugar = store
            .create_ingredient(&NewIngredient {
                name: String::from("Sugar"),
                measurement_unit: String::from("g"),
            })
            .await?;
        let tag = store
            .create_tag(&NewTag {
                name: String::from("Breakfast"),
                color: String::from("#E26C2D"),
                slug: String::from("breakfast"),
            })
            .await?;
        Ok((store, author, sugar, tag))
    }

    fn data(ingredients: Vec<IngredientAmount>, tags: Vec<Id>) -> RecipeData {
        RecipeData {
            name: String::from("Porridge"),
            text: String::from("Boil."),
            cooking_time: 10,
            ingredients,
            tags,
        }
    }

    #[tokio::test]
    async fn duplicate_ingredient_aborts_whole_write() -> Result<(), QueryError> {
        let (store, author, sugar, tag) = seed().await?;
        let part = IngredientAmount { ingredient_id: sugar, amount: 5 };

        let error = store
            .create_recipe(author, "recipes/a.png", &data(vec![part, part], vec![tag]))
            .await
            .unwrap_err();

        assert!(error.is_unique_violation());
        assert_eq!(store.count_author_recipes(author).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_keeps_previous_associations() -> Result<(), QueryError> {
        let (store, author, sugar, tag) = seed().await?;
        let part = IngredientAmount { ingredient_id: sugar, amount: 5 };
        let id = store
            .create_recipe(author, "recipes/a.png", &data(vec![part], vec![tag]))
            .await?;

        let missing = IngredientAmount { ingredient_id: 999, amount: 1 };
        let result = store.update_recipe(id, None, &data(vec![missing], vec![])).await;

        assert_eq!(result.unwrap_err().kind(), QueryErrorKind::ForeignKeyViolation);
        assert_eq!(store.list_recipe_ingredients(id).await?.len(), 1);
        assert_eq!(store.list_recipe_tags(id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn second_favorite_insert_reports_existing_pair() -> Result<(), QueryError> {
        let (store, author, sugar, tag) = seed().await?;
        let part = IngredientAmount { ingredient_id: sugar, amount: 5 };
        let id = store
            .create_recipe(author, "recipes/a.png", &data(vec![part], vec![tag]))
            .await?;

        assert!(store.add_favorite(author, id).await?);
        assert!(!store.add_favorite(author, id).await?);
        assert!(store.remove_favorite(author, id).await?);
        assert!(!store.remove_favorite(author, id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn self_follow_is_a_check_violation() -> Result<(), QueryError> {
        let (store, author, _, _) = seed().await?;

        let error = store.follow(author, author).await.unwrap_err();

        assert_eq!(error.kind(), QueryErrorKind::CheckViolation);
        assert!(!store.is_following(author, author).await?);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_recipes_and_relations() -> Result<(), QueryError> {
        let (store, author, sugar, tag) = seed().await?;
        let part = IngredientAmount { ingredient_id: sugar, amount: 5 };
        let id = store
            .create_recipe(author, "recipes/a.png", &data(vec![part], vec![tag]))
            .await?;
        store.add_to_cart(author, id).await?;

        assert!(store.delete_user(author).await?);

        assert_eq!(store.get_recipe(id).await?, None);
        assert!(store.list_recipe_ingredients(id).await?.is_empty());
        assert!(store.list_cart_ingredients(author).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn deleting_catalog_entries_detaches_them_from_recipes() -> Result<(), QueryError> {
        let (store, author, sugar, tag) = seed().await?;
        let part = IngredientAmount { ingredient_id: sugar, amount: 5 };
        let id = store
            .create_recipe(author, "recipes/a.png", &data(vec![part], vec![tag]))
            .await?;

        assert!(store.delete_ingredient(sugar).await?);
        assert!(store.delete_tag(tag).await?);
        assert!(!store.delete_tag(tag).await?);

        assert!(store.get_recipe(id).await?.is_some());
        assert!(store.list_recipe_ingredients(id).await?.is_empty());
        assert!(store.list_recipe_tags(id).await?.is_empty());
        Ok(())
    }
}
