//! Database models with SQLx FromRow derives

mod event;
mod mirror_link;
mod signup;

pub use event::EventModel;
pub use mirror_link::MirrorLinkModel;
pub use signup::SignupModel;
