use crate::{
    api::{state::AppState, views::RecipeShortView},
    authentication::jwt::SessionData,
    database::{
        repository::{FavoriteRepository, RecipeRepository},
        schema::Id,
    },
    error::ApiError,
};

pub async fn add_favorite(
    state: &AppState,
    session: Option<SessionData>,
    recipe_id: Id,
) -> Result<RecipeShortView, ApiError> {
    let session = SessionData::require(session)?;

    let recipe = state
        .store
        .get_recipe(recipe_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    if !state.store.add_favorite(session.user_id, recipe.id).await? {
        return Err(ApiError::Conflict(String::from(
            "Recipe is already in favorites.",
        )));
    }
    log::info!("User {} favorited recipe {recipe_id}", session.user_id);

    Ok(RecipeShortView::new(&recipe, &state.settings))
}

pub async fn remove_favorite(state: &AppState, session: Option<SessionData>, recipe_id: Id) -> Result<(), ApiError> {
    let session = SessionData::require(session)?;

    if !state.store.remove_favorite(session.user_id, recipe_id).await? {
        return Err(ApiError::BadRequest(String::from(
            "Recipe is not in favorites.",
        )));
    }
    log::info!("User {} unfavorited recipe {recipe_id}", session.user_id);

    Ok(())
}
