use super::jwt::SessionData;
use crate::database::schema::Id;

/// Actions restricted to a particular user. Anything a logged in user may do to their own
/// favorites, cart or subscriptions needs only `SessionData::require`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    ManageRecipe { author_id: Id },
}

impl ActionType {
    pub fn authenticate(self, session: &SessionData) -> bool {
        match self {
            ActionType::ManageRecipe { author_id } => author_id == session.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_management_is_author_only() {
        let session = SessionData {
            user_id: 1,
            username: String::from("a"),
        };

        assert!(ActionType::ManageRecipe { author_id: 1 }.authenticate(&session));
        assert!(!ActionType::ManageRecipe { author_id: 2 }.authenticate(&session));
    }
}
