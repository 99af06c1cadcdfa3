//! Read views returned by the API and the pure functions that build them from rows.

use serde::{Deserialize, Serialize};

use crate::{
    config::Settings,
    database::schema::{Id, Ingredient, Recipe, RecipePart, Tag, User},
    media::image_url,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub email: String,
    pub id: Id,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserView {
    pub fn new(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// A followed author together with their recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<RecipeShortView>,
    pub recipes_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientView {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientView {
    fn from(value: Ingredient) -> Self {
        Self {
            id: value.id,
            name: value.name,
            measurement_unit: value.measurement_unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagView {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<Tag> for TagView {
    fn from(value: Tag) -> Self {
        Self {
            id: value.id,
            name: value.name,
            color: value.color,
            slug: value.slug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientView {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipePart> for RecipeIngredientView {
    fn from(value: RecipePart) -> Self {
        Self {
            id: value.ingredient_id,
            name: value.name,
            measurement_unit: value.measurement_unit,
            amount: value.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeView {
    pub id: Id,
    pub tags: Vec<TagView>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Everything a `RecipeView` is assembled from.
#[derive(Debug, Clone)]
pub struct RecipeParts {
    pub recipe: Recipe,
    pub author: UserView,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipePart>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeView {
    pub fn new(parts: RecipeParts, settings: &Settings) -> Self {
        Self {
            id: parts.recipe.id,
            tags: parts.tags.into_iter().map(TagView::from).collect(),
            author: parts.author,
            ingredients: parts
                .ingredients
                .into_iter()
                .map(RecipeIngredientView::from)
                .collect(),
            is_favorited: parts.is_favorited,
            is_in_shopping_cart: parts.is_in_shopping_cart,
            image: image_url(settings, &parts.recipe.image),
            name: parts.recipe.name,
            text: parts.recipe.text,
            cooking_time: parts.recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeShortView {
    pub id: Id,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeShortView {
    pub fn new(recipe: &Recipe, settings: &Settings) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: image_url(settings, &recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenView {
    pub auth_token: String,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn user() -> User {
        User {
            id: 3,
            email: String::from("cook@example.com"),
            username: String::from("cook"),
            first_name: String::from("Ann"),
            last_name: String::from("Cook"),
            password: String::from("hash"),
        }
    }

    #[test]
    fn recipe_view_maps_parts_and_image_url() {
        let recipe = Recipe {
            id: 10,
            author_id: 3,
            name: String::from("Porridge"),
            image: String::from("recipes/p.png"),
            text: String::from("Boil."),
            cooking_time: 10,
            created: Utc::now(),
        };
        let parts = RecipeParts {
            recipe,
            author: UserView::new(&user(), false),
            tags: vec![Tag {
                id: 1,
                name: String::from("Breakfast"),
                color: String::from("#E26C2D"),
                slug: String::from("breakfast"),
            }],
            ingredients: vec![RecipePart {
                recipe_id: 10,
                ingredient_id: 5,
                name: String::from("Oats"),
                measurement_unit: String::from("g"),
                amount: 80,
            }],
            is_favorited: true,
            is_in_shopping_cart: false,
        };

        let view = RecipeView::new(parts, &Settings::default());

        assert_eq!(view.image, "/media/recipes/p.png");
        assert_eq!(
            view.ingredients,
            vec![RecipeIngredientView {
                id: 5,
                name: String::from("Oats"),
                measurement_unit: String::from("g"),
                amount: 80,
            }]
        );
        assert!(view.is_favorited);
        assert!(!view.is_in_shopping_cart);
    }

    #[test]
    fn subscription_view_flattens_user_fields() {
        let view = SubscriptionView {
            user: UserView::new(&user(), true),
            recipes: vec![],
            recipes_count: 0,
        };

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["username"], json!("cook"));
        assert_eq!(value["is_subscribed"], json!(true));
        assert_eq!(value["recipes_count"], json!(0));
        assert!(value.get("password").is_none());
    }
}
