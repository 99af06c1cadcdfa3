//! The warp filter tree. Every route parses its typed input, calls one handler and turns
//! the handler's result into a response; errors become rejections and end up in
//! `handle_rejection`.

use serde::{de::DeserializeOwned, Serialize};
use warp::{
    filters::BoxedFilter,
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    hyper::Body,
    reject,
    reply::Response,
    Filter, Rejection, Reply,
};

use super::{
    handlers::{
        auth, favorites, ingredients,
        ingredients::IngredientQuery,
        recipes, shopping_cart,
        shopping_cart::ShoppingListDocument,
        tags, users,
        users::{PageQuery, SubscriptionQuery},
    },
    rejection::handle_rejection,
    state::AppState,
};
use crate::{
    authentication::{jwt::SessionData, middleware::with_possible_session},
    constants::MAX_BODY_BYTES,
    database::{
        form::{LoginForm, RecipeForm, UserForm},
        schema::Id,
    },
    error::ApiError,
};

fn with_state(state: AppState) -> BoxedFilter<(AppState,)> {
    warp::any().map(move || state.clone()).boxed()
}

fn with_session(state: &AppState) -> BoxedFilter<(Option<SessionData>,)> {
    with_possible_session(state.settings.clone()).boxed()
}

fn json_body<T>() -> BoxedFilter<(T,)>
where
    T: DeserializeOwned + Send + 'static,
{
    warp::body::content_length_limit(MAX_BODY_BYTES)
        .and(warp::body::json())
        .boxed()
}

/// The raw query string, empty when the request has none.
fn raw_query() -> BoxedFilter<(String,)> {
    warp::query::raw()
        .or(warp::any().map(String::new))
        .unify()
        .boxed()
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct RecipesLimitQuery {
    recipes_limit: Option<i64>,
}

fn reply<T: Serialize>(result: Result<T, ApiError>, status: StatusCode) -> Result<Response, Rejection> {
    match result {
        Ok(value) => Ok(warp::reply::with_status(warp::reply::json(&value), status).into_response()),
        Err(e) => Err(reject::custom(e)),
    }
}

fn no_content(result: Result<(), ApiError>) -> Result<Response, Rejection> {
    match result {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Err(reject::custom(e)),
    }
}

fn attachment(result: Result<ShoppingListDocument, ApiError>) -> Result<Response, Rejection> {
    let document = result.map_err(reject::custom)?;
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", document.filename))
        .map_err(|e| reject::custom(ApiError::Internal(format!("Invalid file name: {e}"))))?;

    let mut response = Response::new(Body::from(document.bytes));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(document.content_type));
    headers.insert(CONTENT_DISPOSITION, disposition);
    Ok(response)
}

fn ingredient_routes(state: &AppState) -> BoxedFilter<(Response,)> {
    let list = warp::path!("ingredients")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(warp::query::<IngredientQuery>())
        .and_then(|state: AppState, query: IngredientQuery| async move {
            reply(ingredients::list_ingredients(&state, query).await, StatusCode::OK)
        });

    let detail = warp::path!("ingredients" / Id)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(|id: Id, state: AppState| async move {
            reply(ingredients::get_ingredient(&state, id).await, StatusCode::OK)
        });

    list.or(detail).unify().boxed()
}

fn tag_routes(state: &AppState) -> BoxedFilter<(Response,)> {
    let list = warp::path!("tags")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(|state: AppState| async move { reply(tags::list_tags(&state).await, StatusCode::OK) });

    let detail = warp::path!("tags" / Id)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(|id: Id, state: AppState| async move {
            reply(tags::get_tag(&state, id).await, StatusCode::OK)
        });

    list.or(detail).unify().boxed()
}

fn recipe_routes(state: &AppState) -> BoxedFilter<(Response,)> {
    let download = warp::path!("recipes" / "download_shopping_cart")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|state: AppState, session: Option<SessionData>| async move {
            attachment(shopping_cart::download_shopping_cart(&state, session).await)
        });

    let list = warp::path!("recipes")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and(raw_query())
        .and_then(|state: AppState, session: Option<SessionData>, query: String| async move {
            reply(recipes::list_recipes(&state, session, &query).await, StatusCode::OK)
        });

    let create = warp::path!("recipes")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and(json_body::<RecipeForm>())
        .and_then(|state: AppState, session: Option<SessionData>, form: RecipeForm| async move {
            reply(recipes::create_recipe(&state, session, form).await, StatusCode::CREATED)
        });

    let detail = warp::path!("recipes" / Id)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|id: Id, state: AppState, session: Option<SessionData>| async move {
            reply(recipes::get_recipe(&state, session, id).await, StatusCode::OK)
        });

    let update = warp::path!("recipes" / Id)
        .and(warp::patch())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and(json_body::<RecipeForm>())
        .and_then(
            |id: Id, state: AppState, session: Option<SessionData>, form: RecipeForm| async move {
                reply(recipes::update_recipe(&state, session, id, form).await, StatusCode::OK)
            },
        );

    let delete = warp::path!("recipes" / Id)
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|id: Id, state: AppState, session: Option<SessionData>| async move {
            no_content(recipes::delete_recipe(&state, session, id).await)
        });

    let favorite = warp::path!("recipes" / Id / "favorite")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|id: Id, state: AppState, session: Option<SessionData>| async move {
            reply(favorites::add_favorite(&state, session, id).await, StatusCode::CREATED)
        });

    let unfavorite = warp::path!("recipes" / Id / "favorite")
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|id: Id, state: AppState, session: Option<SessionData>| async move {
            no_content(favorites::remove_favorite(&state, session, id).await)
        });

    let add_to_cart = warp::path!("recipes" / Id / "shopping_cart")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|id: Id, state: AppState, session: Option<SessionData>| async move {
            reply(shopping_cart::add_to_cart(&state, session, id).await, StatusCode::CREATED)
        });

    let remove_from_cart = warp::path!("recipes" / Id / "shopping_cart")
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|id: Id, state: AppState, session: Option<SessionData>| async move {
            no_content(shopping_cart::remove_from_cart(&state, session, id).await)
        });

    download
        .or(list)
        .unify()
        .or(create)
        .unify()
        .or(detail)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(favorite)
        .unify()
        .or(unfavorite)
        .unify()
        .or(add_to_cart)
        .unify()
        .or(remove_from_cart)
        .unify()
        .boxed()
}

fn user_routes(state: &AppState) -> BoxedFilter<(Response,)> {
    let register = warp::path!("users")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body::<UserForm>())
        .and_then(|state: AppState, form: UserForm| async move {
            reply(users::register(&state, form).await, StatusCode::CREATED)
        });

    let list = warp::path!("users")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and(warp::query::<PageQuery>())
        .and_then(|state: AppState, session: Option<SessionData>, query: PageQuery| async move {
            reply(users::list_users(&state, session, query).await, StatusCode::OK)
        });

    let me = warp::path!("users" / "me")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|state: AppState, session: Option<SessionData>| async move {
            reply(users::me(&state, session).await, StatusCode::OK)
        });

    let subscriptions = warp::path!("users" / "subscriptions")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and(warp::query::<SubscriptionQuery>())
        .and_then(
            |state: AppState, session: Option<SessionData>, query: SubscriptionQuery| async move {
                reply(users::subscriptions(&state, session, query).await, StatusCode::OK)
            },
        );

    let detail = warp::path!("users" / Id)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|id: Id, state: AppState, session: Option<SessionData>| async move {
            reply(users::get_user(&state, session, id).await, StatusCode::OK)
        });

    let subscribe = warp::path!("users" / Id / "subscribe")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and(warp::query::<RecipesLimitQuery>())
        .and_then(
            |id: Id, state: AppState, session: Option<SessionData>, query: RecipesLimitQuery| async move {
                reply(
                    users::subscribe(&state, session, id, query.recipes_limit).await,
                    StatusCode::CREATED,
                )
            },
        );

    let unsubscribe = warp::path!("users" / Id / "subscribe")
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and(with_session(state))
        .and_then(|id: Id, state: AppState, session: Option<SessionData>| async move {
            no_content(users::unsubscribe(&state, session, id).await)
        });

    register
        .or(list)
        .unify()
        .or(me)
        .unify()
        .or(subscriptions)
        .unify()
        .or(detail)
        .unify()
        .or(subscribe)
        .unify()
        .or(unsubscribe)
        .unify()
        .boxed()
}

fn auth_routes(state: &AppState) -> BoxedFilter<(Response,)> {
    let login = warp::path!("auth" / "token" / "login")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body::<LoginForm>())
        .and_then(|state: AppState, form: LoginForm| async move {
            reply(auth::login(&state, form).await, StatusCode::OK)
        });

    let logout = warp::path!("auth" / "token" / "logout")
        .and(warp::post())
        .and(with_session(state))
        .and_then(|session: Option<SessionData>| async move { no_content(auth::logout(session).await) });

    login.or(logout).unify().boxed()
}

/// Every `/api` route plus the media directory, with rejection handling and request logging.
pub fn routes(state: AppState) -> BoxedFilter<(impl Reply,)> {
    let api = warp::path("api").and(
        ingredient_routes(&state)
            .or(tag_routes(&state))
            .unify()
            .or(recipe_routes(&state))
            .unify()
            .or(user_routes(&state))
            .unify()
            .or(auth_routes(&state))
            .unify(),
    );

    let media = warp::path("media")
        .and(warp::fs::dir(state.settings.media_root.clone()))
        .map(|file: warp::fs::File| file.into_response());

    api.or(media)
        .unify()
        .recover(handle_rejection)
        .unify()
        .with(warp::log("recipebox::api"))
        .boxed()
}
