pub mod account;
pub mod auth;
pub mod intro;
pub mod upgrade;
