pub mod answer;
pub mod app;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod message;
pub mod model_selection;
pub mod preferences;
pub mod upload;
