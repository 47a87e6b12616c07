pub mod activities;
pub mod apply;
pub mod categories;
pub mod config;
pub mod related;
pub mod session;
