use sqlx::{Pool, Postgres};

use crate::database::{
    error::QueryError,
    pagination::{Page, PageRequest},
    schema::{Id, NewUser, User, UserRow},
};

/// Stores a user whose `password` is already hashed.
pub async fn insert_user(user: &NewUser, pool: &Pool<Postgres>) -> Result<Id, QueryError> {
    let row: (Id,) = sqlx::query_as(
        "
        INSERT INTO users (email, username, first_name, last_name, password)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id;
    ",
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password)
    .fetch_one(pool)
    .await?;

    log::info!("Registered user {} ({})", row.0, user.username);
    Ok(row.0)
}

pub async fn get_user_by_id(user_id: Id, pool: &Pool<Postgres>) -> Result<Option<User>, QueryError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_email(email: &str, pool: &Pool<Postgres>) -> Result<Option<User>, QueryError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn fetch_users(page: &PageRequest, pool: &Pool<Postgres>) -> Result<Page<User>, QueryError> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "SELECT u.*, COUNT(*) OVER() AS count FROM users u ORDER BY u.username LIMIT $1 OFFSET $2",
    )
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let count = match rows.first() {
        Some(row) => row.count,
        None if page.offset() > 0 => {
            sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await?
        }
        None => 0,
    };

    Ok(Page::from_rows(
        rows.into_iter().map(|row| row.user).collect(),
        count,
        page,
    ))
}

pub async fn delete_user(user_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
