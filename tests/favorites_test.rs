mod common;

use common::{create_ingredient, create_tag, create_user, recipe_form, test_state, TestResult};
use pretty_assertions::assert_eq;
use recipebox::{
    api::handlers::{favorites, recipes},
    database::repository::FavoriteRepository,
    error::ApiError,
};

#[tokio::test]
async fn second_favorite_is_rejected_and_one_row_remains() -> TestResult {
    let (state, _media) = test_state();
    let cook = create_user(&state, "cook").await;
    let fan = create_user(&state, "fan").await;
    let oats = create_ingredient(&state, "Oats", "g").await;
    let tag = create_tag(&state, "breakfast", "#E26C2D").await;
    let recipe = recipes::create_recipe(&state, Some(cook), recipe_form("Porridge", &[(oats, 80)], &[tag])).await?;

    let short = favorites::add_favorite(&state, Some(fan.clone()), recipe.id).await?;
    assert_eq!(short.id, recipe.id);
    assert_eq!(short.image, recipe.image);

    let again = favorites::add_favorite(&state, Some(fan.clone()), recipe.id).await;
    assert!(matches!(again, Err(ApiError::Conflict(_))));

    // a single delete clears the relation, so exactly one row existed
    favorites::remove_favorite(&state, Some(fan.clone()), recipe.id).await?;
    assert!(!state.store.is_favorite(fan.user_id, recipe.id).await?);
    Ok(())
}

#[tokio::test]
async fn favorite_shows_up_in_recipe_view() -> TestResult {
    let (state, _media) = test_state();
    let cook = create_user(&state, "cook").await;
    let fan = create_user(&state, "fan").await;
    let oats = create_ingredient(&state, "Oats", "g").await;
    let tag = create_tag(&state, "breakfast", "#E26C2D").await;
    let recipe = recipes::create_recipe(&state, Some(cook), recipe_form("Porridge", &[(oats, 80)], &[tag])).await?;

    favorites::add_favorite(&state, Some(fan.clone()), recipe.id).await?;

    assert!(recipes::get_recipe(&state, Some(fan), recipe.id).await?.is_favorited);
    assert!(!recipes::get_recipe(&state, None, recipe.id).await?.is_favorited);
    Ok(())
}

#[tokio::test]
async fn removing_absent_favorite_is_bad_request() -> TestResult {
    let (state, _media) = test_state();
    let fan = create_user(&state, "fan").await;

    let result = favorites::remove_favorite(&state, Some(fan), 7).await;

    match result {
        Err(e @ ApiError::BadRequest(_)) => assert!(e.body().get("errors").is_some()),
        other => panic!("expected bad request, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn favoriting_unknown_recipe_is_not_found() -> TestResult {
    let (state, _media) = test_state();
    let fan = create_user(&state, "fan").await;

    let result = favorites::add_favorite(&state, Some(fan.clone()), 404).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert!(!state.store.is_favorite(fan.user_id, 404).await?);
    Ok(())
}

#[tokio::test]
async fn anonymous_favorite_is_unauthorized() -> TestResult {
    let (state, _media) = test_state();

    let result = favorites::add_favorite(&state, None, 1).await;

    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    Ok(())
}
