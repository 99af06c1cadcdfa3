use sqlx::{Pool, Postgres};

use crate::database::{
    error::QueryError,
    schema::{Id, Ingredient, NewIngredient},
};

pub async fn insert_ingredient(ingredient: &NewIngredient, pool: &Pool<Postgres>) -> Result<Id, QueryError> {
    let row: (Id,) =
        sqlx::query_as("INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING id")
            .bind(&ingredient.name)
            .bind(&ingredient.measurement_unit)
            .fetch_one(pool)
            .await?;

    Ok(row.0)
}

pub async fn get_ingredient(id: Id, pool: &Pool<Postgres>) -> Result<Option<Ingredient>, QueryError> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn search_ingredients(prefix: Option<&str>, pool: &Pool<Postgres>) -> Result<Vec<Ingredient>, QueryError> {
    let rows: Vec<Ingredient> = match prefix {
        Some(prefix) => {
            sqlx::query_as(
                "SELECT * FROM ingredients WHERE LOWER(name) LIKE $1 ESCAPE '\\' ORDER BY name, id",
            )
            .bind(format!("{}%", escape_like(&prefix.to_lowercase())))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM ingredients ORDER BY name, id")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows)
}

pub async fn get_ingredients(ids: &[Id], pool: &Pool<Postgres>) -> Result<Vec<Ingredient>, QueryError> {
    let rows: Vec<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn delete_ingredient(id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Escapes LIKE wildcards so a user supplied prefix matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("flour"), "flour");
    }
}
