pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

pub const RECIPE_NAME_MAX_LENGTH: usize = 200;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const USER_FIELD_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

pub const MAX_JWT_LIFETIME_HOURS: i64 = 24 * 365;

/// Upper bound for JSON request bodies, base64 images included.
pub const MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
pub const RECIPE_IMAGE_DIR: &str = "recipes";

// Shopping list page geometry, millimetres unless noted.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const PAGE_LEFT_MARGIN_MM: f32 = 20.0;
pub const PAGE_TOP_MARGIN_MM: f32 = 277.0;
pub const PAGE_BOTTOM_MARGIN_MM: f32 = 20.0;
pub const PAGE_LINE_HEIGHT_MM: f32 = 8.0;
pub const PAGE_FONT_SIZE_PT: f32 = 14.0;
pub const SHOPPING_LIST_HEADING: &str = "Shopping list";

pub const UNIQUE_USER_EMAIL: &str = "users_email_unique";
pub const UNIQUE_USER_USERNAME: &str = "users_username_unique";
pub const UNIQUE_TAG_NAME: &str = "tags_name_unique";
pub const UNIQUE_TAG_COLOR: &str = "tags_color_unique";
pub const UNIQUE_TAG_SLUG: &str = "tags_slug_unique";
pub const UNIQUE_RECIPE_INGREDIENT: &str = "recipe_ingredients_unique";
pub const UNIQUE_RECIPE_TAG: &str = "recipe_tags_unique";
pub const CHECK_NO_SELF_FOLLOW: &str = "follows_no_self_follow";
pub const CHECK_RECIPE_COOKING_TIME: &str = "recipes_cooking_time_positive";
pub const CHECK_RECIPE_INGREDIENT_AMOUNT: &str = "recipe_ingredients_amount_positive";
