//! Ports - interfaces the domain needs from the outside world

mod messenger;
mod repositories;

pub use messenger::{EditPayload, Messenger, SendError, SendOptions, SendResult};
pub use repositories::{
    EventPatch, EventRepository, MirrorRepository, RepoResult, SignupRepository, StatusTransition,
};
