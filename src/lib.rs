pub mod database {
    pub mod actions;
    pub mod error;
    pub mod filter;
    pub mod form;
    pub mod memory;
    pub mod pagination;
    pub mod repository;
    pub mod schema;
}
pub mod authentication {
    pub mod cryptography;
    pub mod jwt;
    pub mod middleware;
    pub mod permissions;
}
pub mod shopping {
    pub mod aggregate;
    pub mod render;
}
pub mod api {
    pub mod handlers {
        pub mod auth;
        pub mod favorites;
        pub mod ingredients;
        pub mod recipes;
        pub mod shopping_cart;
        pub mod tags;
        pub mod users;
    }
    pub mod rejection;
    pub mod routes;
    pub mod state;
    pub mod views;
}
pub mod config;
pub mod constants;
pub mod error;
pub mod media;

pub use constants::*;
pub use database::schema::Id;
