//! Service context - dependency container for services
//!
//! Holds the repository ports and the outbound messenger needed by services.

use std::sync::Arc;

use gather_core::traits::{EventRepository, Messenger, MirrorRepository, SignupRepository};

/// Service context containing all dependencies
///
/// This is the dependency container that gets passed to all services. It
/// provides access to:
/// - The three repository ports (events, signups, mirror links)
/// - The outbound messaging transport
#[derive(Clone)]
pub struct ServiceContext {
    event_repo: Arc<dyn EventRepository>,
    signup_repo: Arc<dyn SignupRepository>,
    mirror_repo: Arc<dyn MirrorRepository>,
    messenger: Arc<dyn Messenger>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        signup_repo: Arc<dyn SignupRepository>,
        mirror_repo: Arc<dyn MirrorRepository>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            event_repo,
            signup_repo,
            mirror_repo,
            messenger,
        }
    }

    /// Get the event repository
    pub fn event_repo(&self) -> &dyn EventRepository {
        self.event_repo.as_ref()
    }

    /// Get the signup repository
    pub fn signup_repo(&self) -> &dyn SignupRepository {
        self.signup_repo.as_ref()
    }

    /// Get the mirror link repository
    pub fn mirror_repo(&self) -> &dyn MirrorRepository {
        self.mirror_repo.as_ref()
    }

    /// Get the outbound messenger
    pub fn messenger(&self) -> &dyn Messenger {
        self.messenger.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("messenger", &"...")
            .finish()
    }
}

/// Builder for creating ServiceContext
pub struct ServiceContextBuilder {
    event_repo: Option<Arc<dyn EventRepository>>,
    signup_repo: Option<Arc<dyn SignupRepository>>,
    mirror_repo: Option<Arc<dyn MirrorRepository>>,
    messenger: Option<Arc<dyn Messenger>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            event_repo: None,
            signup_repo: None,
            mirror_repo: None,
            messenger: None,
        }
    }

    pub fn event_repo(mut self, repo: Arc<dyn EventRepository>) -> Self {
        self.event_repo = Some(repo);
        self
    }

    pub fn signup_repo(mut self, repo: Arc<dyn SignupRepository>) -> Self {
        self.signup_repo = Some(repo);
        self
    }

    pub fn mirror_repo(mut self, repo: Arc<dyn MirrorRepository>) -> Self {
        self.mirror_repo = Some(repo);
        self
    }

    pub fn messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.event_repo
                .ok_or_else(|| super::error::ServiceError::validation("event_repo is required"))?,
            self.signup_repo
                .ok_or_else(|| super::error::ServiceError::validation("signup_repo is required"))?,
            self.mirror_repo
                .ok_or_else(|| super::error::ServiceError::validation("mirror_repo is required"))?,
            self.messenger
                .ok_or_else(|| super::error::ServiceError::validation("messenger is required"))?,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
