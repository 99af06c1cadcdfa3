use crate::{
    api::{state::AppState, views::TagView},
    database::{repository::TagRepository, schema::Id},
    error::ApiError,
};

pub async fn list_tags(state: &AppState) -> Result<Vec<TagView>, ApiError> {
    let tags = state.store.list_tags().await?;
    Ok(tags.into_iter().map(TagView::from).collect())
}

pub async fn get_tag(state: &AppState, id: Id) -> Result<TagView, ApiError> {
    state
        .store
        .get_tag(id)
        .await?
        .map(TagView::from)
        .ok_or_else(ApiError::not_found)
}
