pub mod app;
pub mod deserializers;
pub mod error_handlers;
pub mod routes;
