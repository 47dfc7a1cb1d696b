use uuid::Uuid;

use crate::errors::CoreError;

/// Caller identity for backup operations.
///
/// `user_id` is `None` for anonymous callers; the system actor has no user id
/// but bypasses access checks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub user_id: Option<Uuid>,
    is_system: bool,
}

impl Actor {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            is_system: false,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            is_system: false,
        }
    }

    pub fn system() -> Self {
        Self {
            user_id: None,
            is_system: true,
        }
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_system || self.user_id.is_some()
    }

    /// User id of an authenticated, non-system caller.
    pub fn require_user(&self) -> Result<Uuid, CoreError> {
        self.user_id
            .ok_or_else(|| CoreError::unauthorized("Authentication required"))
    }
}

pub struct SystemActor;

impl SystemActor {
    pub fn internal() -> Actor {
        Actor::system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn anonymous_actor_is_rejected() {
        let actor = Actor::anonymous();
        assert!(!actor.is_authenticated());
        let err = actor.require_user().unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Unauthorized);
    }

    #[test]
    fn system_actor_is_authenticated_without_user() {
        let actor = SystemActor::internal();
        assert!(actor.is_system());
        assert!(actor.is_authenticated());
        assert!(actor.require_user().is_err());
    }
}
