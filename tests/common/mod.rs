#![allow(dead_code)]

use recipebox::{
    api::state::AppState,
    authentication::jwt::{generate_jwt_session, SessionData},
    config::Settings,
    database::{
        form::{IngredientAmountForm, RecipeForm},
        memory::MemoryStore,
        repository::{IngredientRepository, TagRepository, UserRepository},
        schema::{NewIngredient, NewTag, NewUser},
    },
    Id,
};
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

// 1x1 transparent PNG
pub const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Application state over a fresh in-memory store. Keep the `TempDir` alive for the
/// duration of the test; it holds the media root.
pub fn test_state() -> (AppState, TempDir) {
    let media = tempfile::tempdir().expect("tempdir");
    let settings = Settings {
        jwt_secret: String::from("test-secret"),
        media_root: media.path().to_path_buf(),
        ..Settings::default()
    };
    (AppState::new(MemoryStore::new(), settings), media)
}

pub async fn create_user(state: &AppState, username: &str) -> SessionData {
    let id = state
        .store
        .create_user(&NewUser {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            first_name: String::from("Test"),
            last_name: username.to_string(),
            password: String::from("not-a-real-hash"),
        })
        .await
        .expect("create user");

    SessionData {
        user_id: id,
        username: username.to_string(),
    }
}

pub async fn token_for(state: &AppState, session: &SessionData) -> String {
    let user = state
        .store
        .get_user(session.user_id)
        .await
        .expect("get user")
        .expect("user exists");
    generate_jwt_session(&user, &state.settings).expect("sign token")
}

pub async fn create_ingredient(state: &AppState, name: &str, unit: &str) -> Id {
    state
        .store
        .create_ingredient(&NewIngredient {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        })
        .await
        .expect("create ingredient")
}

pub async fn create_tag(state: &AppState, slug: &str, color: &str) -> Id {
    state
        .store
        .create_tag(&NewTag {
            name: slug.to_uppercase(),
            color: color.to_string(),
            slug: slug.to_string(),
        })
        .await
        .expect("create tag")
}

pub fn recipe_form(name: &str, ingredients: &[(Id, i32)], tags: &[Id]) -> RecipeForm {
    RecipeForm {
        ingredients: ingredients
            .iter()
            .map(|(id, amount)| IngredientAmountForm {
                id: *id,
                amount: *amount,
            })
            .collect(),
        tags: tags.to_vec(),
        image: Some(PIXEL.to_string()),
        name: name.to_string(),
        text: String::from("Mix everything."),
        cooking_time: 15,
    }
}
