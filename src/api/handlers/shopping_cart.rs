use crate::{
    api::{state::AppState, views::RecipeShortView},
    authentication::jwt::SessionData,
    database::{
        repository::{CartRepository, RecipeRepository},
        schema::Id,
    },
    error::ApiError,
    shopping::{aggregate::compute_shopping_list, render::render},
};

/// A rendered shopping list ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ShoppingListDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub async fn add_to_cart(
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

    if !state.store.add_to_cart(session.user_id, recipe.id).await? {
        return Err(ApiError::Conflict(String::from(
            "Recipe is already in the shopping cart.",
        )));
    }
    log::info!("User {} added recipe {recipe_id} to cart", session.user_id);

    Ok(RecipeShortView::new(&recipe, &state.settings))
}

pub async fn remove_from_cart(state: &AppState, session: Option<SessionData>, recipe_id: Id) -> Result<(), ApiError> {
    let session = SessionData::require(session)?;

    if !state.store.remove_from_cart(session.user_id, recipe_id).await? {
        return Err(ApiError::BadRequest(String::from(
            "Recipe is not in the shopping cart.",
        )));
    }
    log::info!("User {} removed recipe {recipe_id} from cart", session.user_id);

    Ok(())
}

pub async fn download_shopping_cart(
    state: &AppState,
    session: Option<SessionData>,
) -> Result<ShoppingListDocument, ApiError> {
    let session = SessionData::require(session)?;

    let items = compute_shopping_list(state.store.as_ref(), session.user_id).await?;
    let renderer = state.renderer.clone();
    let content_type = renderer.content_type();

    let bytes = tokio::task::spawn_blocking(move || render(&items, renderer.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("Render task failed: {e}")))?
        .map_err(|e| {
            log::error!("Could not render shopping list: {e}");
            ApiError::Internal(e.to_string())
        })?;

    Ok(ShoppingListDocument {
        filename: state.settings.shopping_list_filename.clone(),
        content_type,
        bytes,
    })
}
