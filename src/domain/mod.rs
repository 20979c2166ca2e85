pub mod account;
pub mod image;
pub mod tier;
pub mod user;
