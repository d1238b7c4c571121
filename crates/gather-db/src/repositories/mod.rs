//! PostgreSQL repository implementations

mod error;
mod event;
mod mirror_link;
mod signup;

pub use event::PgEventRepository;
pub use mirror_link::PgMirrorRepository;
pub use signup::PgSignupRepository;
