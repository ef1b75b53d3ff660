pub mod auth;
pub mod chat;
pub mod news;
pub mod tasks;
pub mod weather;
