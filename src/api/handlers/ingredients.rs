use serde::Deserialize;

use crate::{
    api::{state::AppState, views::IngredientView},
    database::{repository::IngredientRepository, schema::Id},
    error::ApiError,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

pub async fn list_ingredients(state: &AppState, query: IngredientQuery) -> Result<Vec<IngredientView>, ApiError> {
    let prefix = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let ingredients = state.store.search_ingredients(prefix).await?;
    Ok(ingredients.into_iter().map(IngredientView::from).collect())
}

pub async fn get_ingredient(state: &AppState, id: Id) -> Result<IngredientView, ApiError> {
    state
        .store
        .get_ingredient(id)
        .await?
        .map(IngredientView::from)
        .ok_or_else(ApiError::not_found)
}
