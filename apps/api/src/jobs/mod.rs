pub mod handlers;
pub mod lifecycle;
pub mod service;
pub mod store;
