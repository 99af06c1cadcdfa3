use sqlx::{Pool, Postgres};

use crate::database::{
    error::QueryError,
    pagination::{Page, PageRequest},
    schema::{Id, User, UserRow},
};

/// Returns false when the follow already existed. Self-follow fails on the check constraint.
pub async fn follow(user_id: Id, author_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("INSERT INTO follows (user_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING;")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn unfollow(user_id: Id, author_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_following(user_id: Id, author_id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)")
            .bind(user_id)
            .bind(author_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

pub async fn fetch_subscriptions(
    user_id: Id,
    page: &PageRequest,
    pool: &Pool<Postgres>,
) -> Result<Page<User>, QueryError> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "
        SELECT u.*, COUNT(*) OVER() AS count
        FROM follows f
        INNER JOIN users u ON u.id = f.author_id
        WHERE f.user_id = $1
        ORDER BY u.username
        LIMIT $2 OFFSET $3;
    ",
    )
    .bind(user_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let count = match rows.first() {
        Some(row) => row.count,
        None if page.offset() > 0 => {
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = $1")
                .bind(user_id)
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
