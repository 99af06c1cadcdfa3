use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::database::{
    error::QueryError,
    repository::CartRepository,
    schema::{Id, RecipePart},
};

/// One line of the shopping list: an ingredient and its amount summed over the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Groups rows by (name, unit) and sums amounts. Output is ordered by name, then unit,
/// comparing bytes so the order does not depend on locale. A (recipe, ingredient) pair is
/// counted once even if the rows contain it more than once.
pub fn aggregate<I>(rows: I) -> Vec<ShoppingListItem>
where
    I: IntoIterator<Item = RecipePart>,
{
    let mut seen: HashSet<(Id, Id)> = HashSet::new();
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for row in rows {
        if !seen.insert((row.recipe_id, row.ingredient_id)) {
            continue;
        }
        *totals.entry((row.name, row.measurement_unit)).or_insert(0) += i64::from(row.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListItem {
            name,
            measurement_unit,
            total_amount,
        })
        .collect()
}

pub async fn compute_shopping_list<S>(store: &S, user_id: Id) -> Result<Vec<ShoppingListItem>, QueryError>
where
    S: CartRepository + Sync + ?Sized,
{
    let rows = store.list_cart_ingredients(user_id).await?;
    log::debug!("Aggregating {} cart rows for user {user_id}", rows.len());
    Ok(aggregate(rows))
}
