pub mod builder;
pub mod config;
pub mod error;
pub mod locks;
pub mod router;

pub use builder::CompletionRouterBuilder;
pub use config::RouterConfig;
pub use error::{CompletionError, Result};
pub use locks::{SessionGuard, SessionLocks};
pub use router::{CompletionRouter, NO_RESPONSE_SENTINEL};
