use sqlx::{Pool, Postgres};

use crate::database::{
    error::QueryError,
    schema::{Id, RecipePart},
};

/// Returns false when the recipe was already in the cart.
pub async fn add_to_cart(user_id: Id, recipe_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("INSERT INTO carts (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING;")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn remove_from_cart(user_id: Id, recipe_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("DELETE FROM carts WHERE user_id = $1 AND recipe_id = $2")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_in_cart(user_id: Id, recipe_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM carts WHERE user_id = $1 AND recipe_id = $2)")
            .bind(user_id)
            .bind(recipe_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Every ingredient row of every recipe in the cart. The cart pair is unique, so each
/// recipe contributes its rows once.
pub async fn list_cart_ingredients(user_id: Id, pool: &Pool<Postgres>) -> Result<Vec<RecipePart>, QueryError> {
    let rows: Vec<RecipePart> = sqlx::query_as(
        "
        SELECT ri.recipe_id, ri.ingredient_id, i.name, i.measurement_unit, ri.amount
        FROM carts c
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE c.user_id = $1
        ORDER BY ri.recipe_id, ri.ingredient_id;
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
