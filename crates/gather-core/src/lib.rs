//! # gather-core
//!
//! Domain layer containing entities, value objects, ports, and domain errors.
//! This crate has zero dependencies on infrastructure (database, messaging
//! transport, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Event, EventSignup, MirrorLink, PaymentPolicy, SignupStatus};
pub use error::DomainError;
pub use traits::{
    EditPayload, EventPatch, EventRepository, Messenger, MirrorRepository, RepoResult, SendError,
    SendOptions, SignupRepository, StatusTransition,
};
pub use value_objects::{ChatId, EventId, MessageId, UserId};
