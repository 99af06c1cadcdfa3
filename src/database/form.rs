use std::collections::HashSet;

use serde::Deserialize;

use super::{
    error::FieldErrors,
    schema::{Id, IngredientAmount, NewUser, RecipeData},
};
use crate::{
    config::Settings,
    constants::{EMAIL_MAX_LENGTH, PASSWORD_MIN_LENGTH, RECIPE_NAME_MAX_LENGTH, USER_FIELD_MAX_LENGTH},
};

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmountForm {
    pub id: Id,
    pub amount: i32,
}

/// Write input for `POST /recipes` and `PATCH /recipes/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeForm {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmountForm>,
    #[serde(default)]
    pub tags: Vec<Id>,
    /// `data:image/<ext>;base64,...`; optional on update.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub cooking_time: i32,
}

impl RecipeForm {
    pub fn validate(&self, settings: &Settings, image_required: bool) -> Result<RecipeData, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "This field may not be blank.");
        } else if name.chars().count() > RECIPE_NAME_MAX_LENGTH {
            errors.add(
                "name",
                &format!("Ensure this field has no more than {RECIPE_NAME_MAX_LENGTH} characters."),
            );
        }

        if self.text.trim().is_empty() {
            errors.add("text", "This field may not be blank.");
        }

        if self.cooking_time < settings.min_cooking_time {
            errors.add(
                "cooking_time",
                &format!("Cooking time must be at least {}.", settings.min_cooking_time),
            );
        }

        match &self.image {
            Some(image) if image.trim().is_empty() => {
                errors.add("image", "This field may not be blank.");
            }
            None if image_required => errors.add("image", "This field is required."),
            _ => {}
        }

        if self.ingredients.is_empty() {
            errors.add("ingredients", "A recipe needs at least one ingredient.");
        }
        let mut seen = HashSet::new();
        for part in &self.ingredients {
            if !seen.insert(part.id) {
                errors.add(
                    "ingredients",
                    &format!("Ingredient {} is listed more than once.", part.id),
                );
            }
            if part.amount < settings.min_ingredient_amount {
                errors.add(
                    "ingredients",
                    &format!(
                        "Amount of ingredient {} must be at least {}.",
                        part.id, settings.min_ingredient_amount
                    ),
                );
            }
        }

        if self.tags.is_empty() {
            errors.add("tags", "A recipe needs at least one tag.");
        }
        let mut seen = HashSet::new();
        for tag in &self.tags {
            if !seen.insert(*tag) {
                errors.add("tags", &format!("Tag {tag} is listed more than once."));
            }
        }

        errors.into_result()?;

        Ok(RecipeData {
            name: name.to_string(),
            text: self.text.clone(),
            cooking_time: self.cooking_time,
            ingredients: self
                .ingredients
                .iter()
                .map(|part| IngredientAmount {
                    ingredient_id: part.id,
                    amount: part.amount,
                })
                .collect(),
            tags: self.tags.clone(),
        })
    }
}

/// Write input for `POST /users`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

impl UserForm {
    /// Returns the user to insert; `password` still holds the plain text at this point.
    pub fn validate(&self) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::default();

        let email = self.email.trim();
        if email.is_empty() {
            errors.add("email", "This field may not be blank.");
        } else if email.len() > EMAIL_MAX_LENGTH {
            errors.add(
                "email",
                &format!("Ensure this field has no more than {EMAIL_MAX_LENGTH} characters."),
            );
        } else if !is_email(email) {
            errors.add("email", "Enter a valid email address.");
        }

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", "This field may not be blank.");
        } else if !username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
        {
            errors.add(
                "username",
                "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        for (field, value) in [
            ("username", username),
            ("first_name", self.first_name.trim()),
            ("last_name", self.last_name.trim()),
        ] {
            if field != "username" && value.is_empty() {
                errors.add(field, "This field may not be blank.");
            }
            if value.chars().count() > USER_FIELD_MAX_LENGTH {
                errors.add(
                    field,
                    &format!("Ensure this field has no more than {USER_FIELD_MAX_LENGTH} characters."),
                );
            }
        }

        if self.password.chars().count() < PASSWORD_MIN_LENGTH {
            errors.add(
                "password",
                &format!("Password must contain at least {PASSWORD_MIN_LENGTH} characters."),
            );
        }

        errors.into_result()?;

        Ok(NewUser {
            email: email.to_lowercase(),
            username: username.to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}
