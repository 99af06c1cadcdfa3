use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    CheckViolation,
    NotFound,
    Other,
}

/// A storage failure, classified so callers can tell constraint violations apart.
#[derive(Debug, Clone)]
pub struct QueryError {
    kind: QueryErrorKind,
    constraint: Option<String>,
    info: String,
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, info: String) -> Self {
        Self {
            kind,
            constraint: None,
            info,
        }
    }

    pub fn constraint_violation(kind: QueryErrorKind, constraint: &str) -> Self {
        Self {
            kind,
            constraint: Some(constraint.to_string()),
            info: format!("violates constraint \"{constraint}\""),
        }
    }

    pub fn kind(&self) -> QueryErrorKind {
        self.kind
    }

    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn is_unique_violation(&self) -> bool {
        self.kind == QueryErrorKind::UniqueViolation
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) => {
                let kind = if e.is_unique_violation() {
                    QueryErrorKind::UniqueViolation
                } else if e.is_foreign_key_violation() {
                    QueryErrorKind::ForeignKeyViolation
                } else if e.is_check_violation() {
                    QueryErrorKind::CheckViolation
                } else {
                    QueryErrorKind::Other
                };

                Self {
                    kind,
                    constraint: e.constraint().map(str::to_string),
                    info: format!("{e}"),
                }
            }
            sqlx::Error::RowNotFound => Self::new(QueryErrorKind::NotFound, String::from("RowNotFound")),
            sqlx::Error::PoolTimedOut => Self::new(QueryErrorKind::Other, String::from("Pool timed out")),
            sqlx::Error::PoolClosed => Self::new(QueryErrorKind::Other, String::from("Pool closed")),
            sqlx::Error::WorkerCrashed => Self::new(QueryErrorKind::Other, String::from("Worker crashed")),
            sqlx::Error::ColumnDecode { index, source } => Self::new(
                QueryErrorKind::Other,
                format!("Column decode {index} ({source})"),
            ),
            e => Self::new(QueryErrorKind::Other, format!("{e}")),
        }
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.info)
    }
}

impl std::error::Error for QueryError {}

/// A single invalid field in a request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub field: String,
    pub message: String,
}

impl TypeError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for TypeError {}

/// Field name to messages, serialized the way clients expect validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn push(&mut self, error: TypeError) {
        self.0.entry(error.field).or_default().push(error.message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<TypeError> for FieldErrors {
    fn from(value: TypeError) -> Self {
        let mut errors = Self::default();
        errors.push(value);
        errors
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join("; ")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_group_messages_by_field() {
        let mut errors = FieldErrors::default();
        errors.add("ingredients", "Ingredients must be unique");
        errors.push(TypeError::new("ingredients", "Amount must be at least 1"));
        errors.add("cooking_time", "Cooking time must be at least 1");

        assert_eq!(errors.messages("ingredients").len(), 2);
        assert!(errors.contains("cooking_time"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn field_errors_serialize_as_plain_object() {
        let errors = FieldErrors::single("name", "This field may not be blank.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"name": ["This field may not be blank."]}));
    }

    #[test]
    fn constraint_violation_keeps_constraint_name() {
        let error = QueryError::constraint_violation(QueryErrorKind::UniqueViolation, "favorites_unique");
        assert!(error.is_unique_violation());
        assert_eq!(error.constraint(), Some("favorites_unique"));
    }
}
