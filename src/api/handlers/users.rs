use serde::Deserialize;

use crate::{
    api::{
        state::AppState,
        views::{RecipeShortView, SubscriptionView, UserView},
    },
    authentication::{cryptography::hash_password, jwt::SessionData},
    constants::{UNIQUE_USER_EMAIL, UNIQUE_USER_USERNAME},
    database::{
        error::QueryErrorKind,
        form::UserForm,
        pagination::{Page, PageRequest},
        repository::{FollowRepository, RecipeRepository, UserRepository},
        schema::{Id, User},
    },
    error::ApiError,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page_request(&self, state: &AppState) -> Result<PageRequest, ApiError> {
        Ok(PageRequest::new(self.page, self.limit, state.settings.page_size)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub recipes_limit: Option<i64>,
}

fn recipes_limit(value: Option<i64>) -> Result<Option<i64>, ApiError> {
    match value {
        Some(n) if n < 0 => Err(ApiError::invalid_field(
            "recipes_limit",
            "Ensure this value is greater than or equal to 0.",
        )),
        other => Ok(other),
    }
}

/// `is_subscribed` is false for anonymous callers.
pub async fn user_view(state: &AppState, viewer: Option<&SessionData>, user: &User) -> Result<UserView, ApiError> {
    let is_subscribed = match viewer {
        Some(session) => state.store.is_following(session.user_id, user.id).await?,
        None => false,
    };
    Ok(UserView::new(user, is_subscribed))
}

pub async fn subscription_view(
    state: &AppState,
    viewer: &SessionData,
    author: &User,
    limit: Option<i64>,
) -> Result<SubscriptionView, ApiError> {
    let recipes = state.store.list_author_recipes(author.id, limit).await?;
    let recipes_count = state.store.count_author_recipes(author.id).await?;

    Ok(SubscriptionView {
        user: user_view(state, Some(viewer), author).await?,
        recipes: recipes
            .iter()
            .map(|recipe| RecipeShortView::new(recipe, &state.settings))
            .collect(),
        recipes_count,
    })
}

pub async fn register(state: &AppState, form: UserForm) -> Result<UserView, ApiError> {
    let mut user = form.validate()?;
    user.password = hash_password(&user.password).map_err(|e| {
        log::error!("Could not hash password: {e}");
        ApiError::Internal(e.to_string())
    })?;

    let id = match state.store.create_user(&user).await {
        Ok(id) => id,
        Err(e) if e.kind() == QueryErrorKind::UniqueViolation => {
            return Err(match e.constraint() {
                Some(UNIQUE_USER_EMAIL) => {
                    ApiError::invalid_field("email", "A user with that email already exists.")
                }
                Some(UNIQUE_USER_USERNAME) => {
                    ApiError::invalid_field("username", "A user with that username already exists.")
                }
                _ => e.into(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let created = state.store.get_user(id).await?.ok_or_else(ApiError::not_found)?;
    Ok(UserView::new(&created, false))
}

pub async fn list_users(
    state: &AppState,
    session: Option<SessionData>,
    query: PageQuery,
) -> Result<Page<UserView>, ApiError> {
    let request = query.page_request(state)?;
    let page = state.store.fetch_users(&request).await?;

    let mut results = Vec::with_capacity(page.results.len());
    for user in &page.results {
        results.push(user_view(state, session.as_ref(), user).await?);
    }

    Ok(Page {
        count: page.count,
        next: page.next,
        previous: page.previous,
        results,
    })
}

pub async fn get_user(state: &AppState, session: Option<SessionData>, id: Id) -> Result<UserView, ApiError> {
    let user = state.store.get_user(id).await?.ok_or_else(ApiError::not_found)?;
    user_view(state, session.as_ref(), &user).await
}

pub async fn me(state: &AppState, session: Option<SessionData>) -> Result<UserView, ApiError> {
    let session = SessionData::require(session)?;
    let user = state
        .store
        .get_user(session.user_id)
        .await?
        .ok_or_else(ApiError::credentials_missing)?;
    Ok(UserView::new(&user, false))
}

pub async fn subscribe(
    state: &AppState,
    session: Option<SessionData>,
    author_id: Id,
    recipes_limit_param: Option<i64>,
) -> Result<SubscriptionView, ApiError> {
    let session = SessionData::require(session)?;
    let limit = recipes_limit(recipes_limit_param)?;

    let author = state
        .store
        .get_user(author_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    if author.id == session.user_id {
        return Err(ApiError::invalid_field(
            "errors",
            "You cannot subscribe to yourself.",
        ));
    }

    if !state.store.follow(session.user_id, author.id).await? {
        return Err(ApiError::Conflict(String::from(
            "You are already subscribed to this author.",
        )));
    }
    log::info!("User {} subscribed to {}", session.user_id, author.id);

    subscription_view(state, &session, &author, limit).await
}

pub async fn unsubscribe(state: &AppState, session: Option<SessionData>, author_id: Id) -> Result<(), ApiError> {
    let session = SessionData::require(session)?;

    if !state.store.unfollow(session.user_id, author_id).await? {
        return Err(ApiError::BadRequest(String::from(
            "You are not subscribed to this author.",
        )));
    }
    log::info!("User {} unsubscribed from {author_id}", session.user_id);

    Ok(())
}

pub async fn subscriptions(
    state: &AppState,
    session: Option<SessionData>,
    query: SubscriptionQuery,
) -> Result<Page<SubscriptionView>, ApiError> {
    let session = SessionData::require(session)?;
    let limit = recipes_limit(query.recipes_limit)?;
    let request = PageRequest::new(query.page, query.limit, state.settings.page_size)?;

    let page = state.store.fetch_subscriptions(session.user_id, &request).await?;

    let mut results = Vec::with_capacity(page.results.len());
    for author in &page.results {
        results.push(subscription_view(state, &session, author, limit).await?);
    }

    Ok(Page {
        count: page.count,
        next: page.next,
        previous: page.previous,
        results,
    })
}
