pub mod analytics;
pub mod bus;
pub mod config;
pub mod dom;
pub mod fragments;
pub mod host;
pub mod lifecycle;
pub mod logging;
pub mod mvi;
pub mod platform;
pub mod scheduler;
pub mod util;
