mod common;

use common::{create_ingredient, create_tag, create_user, recipe_form, test_state, TestResult};
use pretty_assertions::assert_eq;
use recipebox::{
    api::handlers::{
        recipes,
        users::{self, SubscriptionQuery},
    },
    database::repository::FollowRepository,
    error::ApiError,
};

#[tokio::test]
async fn self_subscription_is_validation_error() -> TestResult {
    let (state, _media) = test_state();
    let cook = create_user(&state, "cook").await;

    let result = users::subscribe(&state, Some(cook.clone()), cook.user_id, None).await;

    match result {
        Err(ApiError::Validation(errors)) => assert!(errors.contains("errors")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(!state.store.is_following(cook.user_id, cook.user_id).await?);
    Ok(())
}

#[tokio::test]
async fn duplicate_subscription_is_rejected() -> TestResult {
    let (state, _media) = test_state();
    let reader = create_user(&state, "reader").await;
    let author = create_user(&state, "author").await;

    let view = users::subscribe(&state, Some(reader.clone()), author.user_id, None).await?;
    assert!(view.user.is_subscribed);
    assert_eq!(view.recipes_count, 0);

    let again = users::subscribe(&state, Some(reader.clone()), author.user_id, None).await;
    assert!(matches!(again, Err(ApiError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn unsubscribing_when_not_subscribed_is_bad_request() -> TestResult {
    let (state, _media) = test_state();
    let reader = create_user(&state, "reader").await;
    let author = create_user(&state, "author").await;

    let result = users::unsubscribe(&state, Some(reader.clone()), author.user_id).await;
    assert!(matches!(result, Err(ApiError::BadRequest(_))));

    users::subscribe(&state, Some(reader.clone()), author.user_id, None).await?;
    users::unsubscribe(&state, Some(reader.clone()), author.user_id).await?;
    assert!(!state.store.is_following(reader.user_id, author.user_id).await?);
    Ok(())
}

#[tokio::test]
async fn subscribing_to_unknown_author_is_not_found() -> TestResult {
    let (state, _media) = test_state();
    let reader = create_user(&state, "reader").await;

    let result = users::subscribe(&state, Some(reader), 999, None).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn recipes_limit_caps_embedded_recipes_but_not_count() -> TestResult {
    let (state, _media) = test_state();
    let reader = create_user(&state, "reader").await;
    let author = create_user(&state, "author").await;
    let oats = create_ingredient(&state, "Oats", "g").await;
    let tag = create_tag(&state, "breakfast", "#E26C2D").await;
    for name in ["A", "B", "C"] {
        recipes::create_recipe(&state, Some(author.clone()), recipe_form(name, &[(oats, 1)], &[tag])).await?;
    }

    let view = users::subscribe(&state, Some(reader.clone()), author.user_id, Some(2)).await?;
    assert_eq!(view.recipes.len(), 2);
    assert_eq!(view.recipes_count, 3);

    let negative = users::subscriptions(
        &state,
        Some(reader.clone()),
        SubscriptionQuery {
            recipes_limit: Some(-1),
            ..SubscriptionQuery::default()
        },
    )
    .await;
    assert!(matches!(negative, Err(ApiError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn subscriptions_page_lists_followed_authors() -> TestResult {
    let (state, _media) = test_state();
    let reader = create_user(&state, "reader").await;
    let first = create_user(&state, "first").await;
    let second = create_user(&state, "second").await;
    create_user(&state, "stranger").await;

    users::subscribe(&state, Some(reader.clone()), first.user_id, None).await?;
    users::subscribe(&state, Some(reader.clone()), second.user_id, None).await?;

    let page = users::subscriptions(&state, Some(reader), SubscriptionQuery::default()).await?;

    assert_eq!(page.count, 2);
    let mut names: Vec<_> = page.results.iter().map(|s| s.user.username.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["first", "second"]);
    assert!(page.results.iter().all(|s| s.user.is_subscribed));
    Ok(())
}

#[tokio::test]
async fn user_view_reflects_viewer_subscription() -> TestResult {
    let (state, _media) = test_state();
    let reader = create_user(&state, "reader").await;
    let author = create_user(&state, "author").await;
    users::subscribe(&state, Some(reader.clone()), author.user_id, None).await?;

    assert!(users::get_user(&state, Some(reader), author.user_id).await?.is_subscribed);
    assert!(!users::get_user(&state, None, author.user_id).await?.is_subscribed);
    Ok(())
}
