use sqlx::{Pool, Postgres};

use crate::database::{
    error::QueryError,
    schema::{Id, NewTag, Tag},
};

pub async fn insert_tag(tag: &NewTag, pool: &Pool<Postgres>) -> Result<Id, QueryError> {
    let row: (Id,) = sqlx::query_as("INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) RETURNING id")
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(&tag.slug)
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

pub async fn get_tag(id: Id, pool: &Pool<Postgres>) -> Result<Option<Tag>, QueryError> {
    let row: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn list_tags(pool: &Pool<Postgres>) -> Result<Vec<Tag>, QueryError> {
    let rows: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn get_tags(ids: &[Id], pool: &Pool<Postgres>) -> Result<Vec<Tag>, QueryError> {
    let rows: Vec<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = ANY($1) ORDER BY id")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn list_recipe_tags(recipe_id: Id, pool: &Pool<Postgres>) -> Result<Vec<Tag>, QueryError> {
    let rows: Vec<Tag> = sqlx::query_as(
        "SELECT t.* FROM tags t INNER JOIN recipe_tags rt ON rt.tag_id = t.id WHERE rt.recipe_id = $1 ORDER BY t.id",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn delete_tag(id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
