pub mod access;
pub mod api;
pub mod clients;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod models;
pub mod protocol;
pub mod restore;
pub mod retention;
pub mod schema;
pub mod store;
pub mod types;
pub mod versions;

#[cfg(test)]
mod testing;
