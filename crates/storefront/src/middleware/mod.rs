//! HTTP middleware stack for the fixture API server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (any origin, as a local mock backend)
//! 4. Request ID (add unique ID to each request)
//! 5. Latency (API routes only)

pub mod bearer;
pub mod latency;
pub mod request_id;

pub use bearer::BearerToken;
pub use latency::latency_middleware;
pub use request_id::request_id_middleware;
