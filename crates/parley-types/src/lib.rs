pub mod message;
pub mod provider;

pub use message::{Message, Role};
pub use provider::{Provider, UnknownProvider};
