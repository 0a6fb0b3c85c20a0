pub mod auth;
pub mod history;
pub mod lines;
pub mod log;
pub mod tensions;
pub mod token;
pub mod users;
