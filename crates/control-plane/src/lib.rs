// Modelgate Control Plane Library
// Decision: Shared library for binaries (API server, reseal and export tools)

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Environment configuration
pub mod config;

// Explicit application context
pub mod context;

// Services layer
pub mod services;

// OpenAPI spec generation
pub mod openapi;

// Router assembly
pub mod router;

pub use config::AppConfig;
pub use context::AppContext;
pub use router::build_router;
