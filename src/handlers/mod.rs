// handlers/mod.rs - HTTP handlers, one module per resource
//
// Public routes take no identity; protected routes take an `AuthUser`
// argument, which the extractor fills from the JWT middleware or rejects
// with 401.
pub mod products;
