use super::{error::FieldErrors, pagination::PageRequest, schema::Id};

/// Recipe search parameters accepted by `GET /recipes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<Id>,
    /// Tag slugs, OR-combined. Empty means no tag restriction.
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeFilter {
    /// Parses a raw query string. `tags` may repeat; unknown keys are ignored.
    pub fn from_query(raw: &str, default_limit: i64) -> Result<(Self, PageRequest), FieldErrors> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
            .map_err(|_| FieldErrors::single("non_field_errors", "Malformed query string."))?;

        let mut errors = FieldErrors::default();
        let mut filter = Self::default();
        let mut page = None;
        let mut limit = None;

        for (key, value) in pairs {
            match key.as_str() {
                "author" => match value.parse::<Id>() {
                    Ok(id) => filter.author = Some(id),
                    Err(_) => errors.add("author", "A valid integer is required."),
                },
                "tags" => {
                    let slug = value.trim();
                    if !slug.is_empty() && !filter.tags.iter().any(|t| t == slug) {
                        filter.tags.push(slug.to_string());
                    }
                }
                "is_favorited" => match parse_flag(&value) {
                    Some(flag) => filter.is_favorited = flag,
                    None => errors.add("is_favorited", "Must be a valid boolean."),
                },
                "is_in_shopping_cart" => match parse_flag(&value) {
                    Some(flag) => filter.is_in_shopping_cart = flag,
                    None => errors.add("is_in_shopping_cart", "Must be a valid boolean."),
                },
                "page" => match value.parse::<i64>() {
                    Ok(n) => page = Some(n),
                    Err(_) => errors.add("page", "A valid integer is required."),
                },
                "limit" => match value.parse::<i64>() {
                    Ok(n) => limit = Some(n),
                    Err(_) => errors.add("limit", "A valid integer is required."),
                },
                _ => {}
            }
        }

        errors.into_result()?;
        let request = PageRequest::new(page, limit, default_limit)?;
        Ok((filter, request))
    }

    /// The user whose favorites restrict the result; anonymous callers get no restriction.
    pub fn favorited_by(&self, viewer: Option<Id>) -> Option<Id> {
        viewer.filter(|_| self.is_favorited)
    }

    pub fn in_cart_of(&self, viewer: Option<Id>) -> Option<Id> {
        viewer.filter(|_| self.is_in_shopping_cart)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn repeated_tags_are_collected() {
        let (filter, _) =
            RecipeFilter::from_query("tags=breakfast&tags=vegan&tags=breakfast", 6).unwrap();
        assert_eq!(filter.tags, vec!["breakfast", "vegan"]);
    }

    #[test]
    fn flags_and_paging_are_parsed() {
        let (filter, page) =
            RecipeFilter::from_query("author=3&is_favorited=1&is_in_shopping_cart=false&page=2&limit=10", 6)
                .unwrap();

        assert_eq!(
            filter,
            RecipeFilter {
                author: Some(3),
                tags: vec![],
                is_favorited: true,
                is_in_shopping_cart: false,
            }
        );
        assert_eq!(page, PageRequest { page: 2, limit: 10 });
    }

    #[test]
    fn empty_query_uses_defaults() {
        let (filter, page) = RecipeFilter::from_query("", 6).unwrap();
        assert_eq!(filter, RecipeFilter::default());
        assert_eq!(page, PageRequest { page: 1, limit: 6 });
    }

    #[test]
    fn bad_values_are_field_errors() {
        let errors = RecipeFilter::from_query("author=me&is_favorited=maybe", 6).unwrap_err();
        assert!(errors.contains("author"));
        assert!(errors.contains("is_favorited"));
    }

    #[test]
    fn anonymous_viewer_disables_relation_filters() {
        let filter = RecipeFilter {
            is_favorited: true,
            is_in_shopping_cart: true,
            ..RecipeFilter::default()
        };

        assert_eq!(filter.favorited_by(None), None);
        assert_eq!(filter.in_cart_of(None), None);
        assert_eq!(filter.favorited_by(Some(4)), Some(4));
        assert_eq!(RecipeFilter::default().in_cart_of(Some(4)), None);
    }
}
