pub mod api;
pub mod app;
pub mod config;
pub mod session;
pub mod state;
pub mod tools;
pub mod types;
pub mod ui;
pub mod util;

#[cfg(test)]
pub mod test_support;
