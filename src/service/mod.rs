//! Service layer
//! - cache.rs: TTL cache of computed responses
//! - updates.rs: project lookup, artifact fan-out and aggregation
//! - handler.rs: routing, loader selection and cache headers

pub mod cache;
pub mod handler;
pub mod updates;

pub use cache::{CachedResponse, ResponseCache};
pub use handler::{Request, Response, UpdateHandler};
pub use updates::UpdateService;
