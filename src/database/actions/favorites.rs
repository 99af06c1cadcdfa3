use sqlx::{Pool, Postgres};

use crate::database::{error::QueryError, schema::Id};

/// Returns false when the recipe was already a favorite.
pub async fn add_to_favorites(user_id: Id, recipe_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("INSERT INTO favorites (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING;")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn remove_from_favorites(user_id: Id, recipe_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_favorite(user_id: Id, recipe_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND recipe_id = $2)")
            .bind(user_id)
            .bind(recipe_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}
