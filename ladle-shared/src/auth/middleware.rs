/// Authentication context for request handlers
///
/// The API server's auth middleware validates the Bearer token and inserts
/// an [`AuthContext`] into request extensions; protected handlers extract
/// it from there. Anonymous callers never reach a protected handler, so an
/// `AuthContext` in hand is proof of authentication.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// The resolved caller, added to request extensions after authentication
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Whether the caller holds the administrator role
    pub is_admin: bool,
}

impl AuthContext {
    /// Creates an auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            is_admin: claims.is_admin,
        }
    }

    /// Checks whether the caller may modify a resource owned by `owner_id`
    ///
    /// Owners and administrators may; everyone else is read-only.
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenType;

    #[test]
    fn test_auth_context_from_claims() {
        let claims = Claims::new(Uuid::new_v4(), true, TokenType::Access);
        let ctx = AuthContext::from_claims(&claims);

        assert_eq!(ctx.user_id, claims.sub);
        assert!(ctx.is_admin);
    }

    #[test]
    fn test_can_modify_owner_and_admin() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let as_owner = AuthContext { user_id: owner, is_admin: false };
        let as_other = AuthContext { user_id: other, is_admin: false };
        let as_admin = AuthContext { user_id: other, is_admin: true };

        assert!(as_owner.can_modify(owner));
        assert!(!as_other.can_modify(owner));
        assert!(as_admin.can_modify(owner));
    }
}
