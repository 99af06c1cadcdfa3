use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use crate::database::{
    error::QueryError,
    filter::RecipeFilter,
    pagination::{Page, PageRequest},
    schema::{Id, Recipe, RecipeData, RecipePart, RecipeRow},
};

pub async fn insert_recipe(
    author_id: Id,
    image: &str,
    data: &RecipeData,
    pool: &Pool<Postgres>,
) -> Result<Id, QueryError> {
    let mut tr = pool.begin().await?;

    let row: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, image, text, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id;
    ",
    )
    .bind(author_id)
    .bind(&data.name)
    .bind(image)
    .bind(&data.text)
    .bind(data.cooking_time)
    .fetch_one(&mut *tr)
    .await?;

    write_associations(row.0, data, &mut tr).await?;
    tr.commit().await?;

    log::info!("User {author_id} created recipe {}", row.0);
    Ok(row.0)
}

pub async fn update_recipe(
    id: Id,
    image: Option<&str>,
    data: &RecipeData,
    pool: &Pool<Postgres>,
) -> Result<bool, QueryError> {
    let mut tr = pool.begin().await?;

    let result = sqlx::query(
        "
        UPDATE recipes
        SET name = $1, text = $2, cooking_time = $3, image = COALESCE($4, image)
        WHERE id = $5;
    ",
    )
    .bind(&data.name)
    .bind(&data.text)
    .bind(data.cooking_time)
    .bind(image)
    .bind(id)
    .execute(&mut *tr)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    write_associations(id, data, &mut tr).await?;
    tr.commit().await?;

    log::info!("Recipe {id} updated");
    Ok(true)
}

/// Clears and rewrites the ingredient and tag rows of a recipe on the given connection.
/// Callers run it inside a transaction so readers never see a partial set.
async fn write_associations(recipe_id: Id, data: &RecipeData, conn: &mut PgConnection) -> Result<(), QueryError> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    if !data.ingredients.is_empty() {
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");

        query_builder.push_values(data.ingredients.iter(), |mut b, part| {
            b.push_bind(recipe_id)
                .push_bind(part.ingredient_id)
                .push_bind(part.amount);
        });

        query_builder.build().execute(&mut *conn).await?;
    }

    if !data.tags.is_empty() {
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");

        query_builder.push_values(data.tags.iter(), |mut b, tag_id| {
            b.push_bind(recipe_id).push_bind(*tag_id);
        });

        query_builder.build().execute(&mut *conn).await?;
    }

    Ok(())
}

pub async fn delete_recipe(id: Id, pool: &Pool<Postgres>) -> Result<bool, QueryError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_recipe(id: Id, pool: &Pool<Postgres>) -> Result<Option<Recipe>, QueryError> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

fn push_conditions(query: &mut QueryBuilder<Postgres>, filter: &RecipeFilter, viewer: Option<Id>) {
    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author);
    }

    if !filter.tags.is_empty() {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.recipe_id = r.id AND t.slug = ANY(",
            )
            .push_bind(filter.tags.clone())
            .push("))");
    }

    if let Some(user_id) = filter.favorited_by(viewer) {
        query
            .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
            .push_bind(user_id)
            .push(")");
    }

    if let Some(user_id) = filter.in_cart_of(viewer) {
        query
            .push(" AND EXISTS (SELECT 1 FROM carts c WHERE c.recipe_id = r.id AND c.user_id = ")
            .push_bind(user_id)
            .push(")");
    }
}

pub async fn fetch_recipes(
    filter: &RecipeFilter,
    viewer: Option<Id>,
    page: &PageRequest,
    pool: &Pool<Postgres>,
) -> Result<Page<Recipe>, QueryError> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT r.*, COUNT(*) OVER() AS count FROM recipes r WHERE TRUE");
    push_conditions(&mut query, filter, viewer);
    query
        .push(" ORDER BY r.id DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

    log::debug!("Fetching recipes: {}", query.sql());
    let rows: Vec<RecipeRow> = query.build_query_as().fetch_all(pool).await?;

    let count = match rows.first() {
        Some(row) => row.count,
        None if page.offset() > 0 => {
            let mut query: QueryBuilder<Postgres> =
                QueryBuilder::new("SELECT COUNT(*) FROM recipes r WHERE TRUE");
            push_conditions(&mut query, filter, viewer);
            query.build_query_scalar().fetch_one(pool).await?
        }
        None => 0,
    };

    Ok(Page::from_rows(
        rows.into_iter().map(|row| row.recipe).collect(),
        count,
        page,
    ))
}

pub async fn list_recipe_ingredients(recipe_id: Id, pool: &Pool<Postgres>) -> Result<Vec<RecipePart>, QueryError> {
    let rows: Vec<RecipePart> = sqlx::query_as(
        "
        SELECT ri.recipe_id, ri.ingredient_id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY ri.ingredient_id;
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// `limit: None` binds NULL, which Postgres treats as no limit.
pub async fn list_author_recipes(
    author_id: Id,
    limit: Option<i64>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, QueryError> {
    let rows: Vec<Recipe> =
        sqlx::query_as("SELECT * FROM recipes WHERE author_id = $1 ORDER BY id DESC LIMIT $2")
            .bind(author_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

    Ok(rows)
}

pub async fn count_author_recipes(author_id: Id, pool: &Pool<Postgres>) -> Result<i64, QueryError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
