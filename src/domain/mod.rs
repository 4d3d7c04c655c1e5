pub mod language;
pub mod models;
