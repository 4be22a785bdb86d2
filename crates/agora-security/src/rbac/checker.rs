//! Role and ownership checks on verified claims.

use crate::Claims;
use agora_core::{AgoraError, AgoraResult, UserId, UserRole};

/// Extension trait for Claims to check permissions.
pub trait ClaimsExt {
    /// Requires at least the given role.
    fn require_role(&self, role: UserRole) -> AgoraResult<()>;

    /// Checks if the caller owns a resource.
    fn is_owner(&self, resource_owner_id: &UserId) -> bool;

    /// Requires ownership of the resource or at least the given role.
    fn require_owner_or_role(&self, resource_owner_id: &UserId, role: UserRole) -> AgoraResult<()>;
}

impl ClaimsExt for Claims {
    fn require_role(&self, role: UserRole) -> AgoraResult<()> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AgoraError::forbidden(format!(
                "Required role: {}, your role: {}",
                role, self.role
            )))
        }
    }

    fn is_owner(&self, resource_owner_id: &UserId) -> bool {
        self.sub == resource_owner_id.as_str()
    }

    fn require_owner_or_role(&self, resource_owner_id: &UserId, role: UserRole) -> AgoraResult<()> {
        if self.is_owner(resource_owner_id) || self.has_role(role) {
            Ok(())
        } else {
            Err(AgoraError::forbidden(
                "You don't have permission to modify this resource",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TokenSubject, TokenType};
    use chrono::{Duration, Utc};

    fn claims_for(uid: &str, role: UserRole) -> Claims {
        let uid = UserId::new(uid);
        Claims::new(
            &TokenSubject {
                uid: &uid,
                email: "x@example.com",
                email_verified: true,
                role,
                generation: 0,
            },
            TokenType::Id,
            "agora".to_string(),
            "agora-api".to_string(),
            Utc::now() + Duration::minutes(5),
        )
    }

    #[test]
    fn test_require_role() {
        let moderator = claims_for("m1", UserRole::Moderator);
        assert!(moderator.require_role(UserRole::Moderator).is_ok());
        let err = moderator.require_role(UserRole::Admin).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_owner_or_role() {
        let owner = claims_for("u1", UserRole::User);
        let stranger = claims_for("u2", UserRole::User);
        let admin = claims_for("a1", UserRole::Admin);
        let resource_owner = UserId::new("u1");

        assert!(owner.require_owner_or_role(&resource_owner, UserRole::Moderator).is_ok());
        assert!(stranger.require_owner_or_role(&resource_owner, UserRole::Moderator).is_err());
        assert!(admin.require_owner_or_role(&resource_owner, UserRole::Moderator).is_ok());
    }
}
