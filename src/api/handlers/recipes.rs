use std::collections::HashSet;

use crate::{
    api::{
        handlers::users::user_view,
        state::AppState,
        views::{RecipeParts, RecipeView},
    },
    authentication::jwt::SessionData,
    database::{
        error::FieldErrors,
        filter::RecipeFilter,
        form::RecipeForm,
        pagination::Page,
        repository::{
            CartRepository, FavoriteRepository, IngredientRepository, RecipeRepository, TagRepository,
            UserRepository,
        },
        schema::{Id, Recipe, RecipeData},
    },
    error::ApiError,
    media::{remove_image, save_image},
};

/// Loads everything a `RecipeView` shows for the given viewer.
pub async fn recipe_view(state: &AppState, viewer: Option<&SessionData>, recipe: Recipe) -> Result<RecipeView, ApiError> {
    let author = state
        .store
        .get_user(recipe.author_id)
        .await?
        .ok_or_else(ApiError::not_found)?;
    let author = user_view(state, viewer, &author).await?;
    let tags = state.store.list_recipe_tags(recipe.id).await?;
    let ingredients = state.store.list_recipe_ingredients(recipe.id).await?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(session) => (
            state.store.is_favorite(session.user_id, recipe.id).await?,
            state.store.is_in_cart(session.user_id, recipe.id).await?,
        ),
        None => (false, false),
    };

    Ok(RecipeView::new(
        RecipeParts {
            recipe,
            author,
            tags,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
        },
        &state.settings,
    ))
}

/// Unknown ingredient or tag ids are a validation error, not a missing resource.
async fn check_references(state: &AppState, data: &RecipeData) -> Result<(), ApiError> {
    let mut errors = FieldErrors::default();

    let ids: Vec<Id> = data.ingredients.iter().map(|part| part.ingredient_id).collect();
    let found: HashSet<Id> = state
        .store
        .get_ingredients(&ids)
        .await?
        .into_iter()
        .map(|ingredient| ingredient.id)
        .collect();
    for id in ids.iter().filter(|id| !found.contains(id)) {
        errors.add("ingredients", &format!("Ingredient {id} does not exist."));
    }

    let found: HashSet<Id> = state
        .store
        .get_tags(&data.tags)
        .await?
        .into_iter()
        .map(|tag| tag.id)
        .collect();
    for id in data.tags.iter().filter(|id| !found.contains(id)) {
        errors.add("tags", &format!("Tag {id} does not exist."));
    }

    Ok(errors.into_result()?)
}

async fn editable_recipe(state: &AppState, session: &SessionData, id: Id) -> Result<Recipe, ApiError> {
    let recipe = state.store.get_recipe(id).await?.ok_or_else(ApiError::not_found)?;
    session.ensure_author(recipe.author_id)?;
    Ok(recipe)
}

pub async fn list_recipes(
    state: &AppState,
    session: Option<SessionData>,
    raw_query: &str,
) -> Result<Page<RecipeView>, ApiError> {
    let (filter, request) = RecipeFilter::from_query(raw_query, state.settings.page_size)?;
    let viewer = session.as_ref().map(|s| s.user_id);

    let page = state.store.fetch_recipes(&filter, viewer, &request).await?;

    let mut results = Vec::with_capacity(page.results.len());
    for recipe in page.results {
        results.push(recipe_view(state, session.as_ref(), recipe).await?);
    }

    Ok(Page {
        count: page.count,
        next: page.next,
        previous: page.previous,
        results,
    })
}

pub async fn get_recipe(state: &AppState, session: Option<SessionData>, id: Id) -> Result<RecipeView, ApiError> {
    let recipe = state.store.get_recipe(id).await?.ok_or_else(ApiError::not_found)?;
    recipe_view(state, session.as_ref(), recipe).await
}

pub async fn create_recipe(
    state: &AppState,
    session: Option<SessionData>,
    form: RecipeForm,
) -> Result<RecipeView, ApiError> {
    let session = SessionData::require(session)?;

    let data = form.validate(&state.settings, true)?;
    check_references(state, &data).await?;

    let image = match form.image.as_deref() {
        Some(image) => save_image(&state.settings.media_root, image).await?,
        None => return Err(ApiError::invalid_field("image", "This field is required.")),
    };

    let id = match state.store.create_recipe(session.user_id, &image, &data).await {
        Ok(id) => id,
        Err(e) => {
            remove_image(&state.settings.media_root, &image).await;
            return Err(e.into());
        }
    };

    let recipe = state.store.get_recipe(id).await?.ok_or_else(ApiError::not_found)?;
    recipe_view(state, Some(&session), recipe).await
}

pub async fn update_recipe(
    state: &AppState,
    session: Option<SessionData>,
    id: Id,
    form: RecipeForm,
) -> Result<RecipeView, ApiError> {
    let session = SessionData::require(session)?;
    let existing = editable_recipe(state, &session, id).await?;

    let data = form.validate(&state.settings, false)?;
    check_references(state, &data).await?;

    let image = match form.image.as_deref() {
        Some(image) => Some(save_image(&state.settings.media_root, image).await?),
        None => None,
    };

    let updated = match state.store.update_recipe(id, image.as_deref(), &data).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(image) = &image {
                remove_image(&state.settings.media_root, image).await;
            }
            return Err(e.into());
        }
    };
    if !updated {
        return Err(ApiError::not_found());
    }
    if image.is_some() {
        remove_image(&state.settings.media_root, &existing.image).await;
    }

    let recipe = state.store.get_recipe(id).await?.ok_or_else(ApiError::not_found)?;
    recipe_view(state, Some(&session), recipe).await
}

pub async fn delete_recipe(state: &AppState, session: Option<SessionData>, id: Id) -> Result<(), ApiError> {
    let session = SessionData::require(session)?;
    let recipe = editable_recipe(state, &session, id).await?;

    if !state.store.delete_recipe(id).await? {
        return Err(ApiError::not_found());
    }
    remove_image(&state.settings.media_root, &recipe.image).await;
    log::info!("User {} deleted recipe {id}", session.user_id);

    Ok(())
}
