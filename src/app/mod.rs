pub mod accounts;
pub mod auth;
pub mod error;
pub mod images;
pub mod links;
pub mod tiers;
