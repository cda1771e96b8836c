//! Starlight core: session model, credential store, and shared utilities

pub mod error;
pub mod storage;
pub mod store;
pub mod tracing;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::CredentialStore;
pub use types::{Customer, Envelope, JsonMap, Session, User, UserUpdate};
pub use validation::{Validate, ValidationError};
