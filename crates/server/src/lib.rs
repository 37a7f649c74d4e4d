//! gRPC transport for the auth core: wire types, the auth layer, handlers,
//! server wiring and the login client.

pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod mapping;
pub mod middleware;
pub mod pb;
pub mod validate;
