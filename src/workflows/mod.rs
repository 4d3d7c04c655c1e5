pub mod batch;
pub mod download;
pub mod query;
pub mod search;
