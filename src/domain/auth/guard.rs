//! Role-based access guard

use super::error::AuthError;
use super::identity::Identity;
use crate::domain::user::{Role, RoleSet};

/// Decide whether verified roles grant an operation requiring `required`.
///
/// Access is allowed only when the two sets share a role. Either set being
/// empty denies.
pub fn authorize(verified: &RoleSet, required: &RoleSet) -> Result<(), AuthError> {
    if required.is_empty() {
        return Err(AuthError::access_denied("Operation declares no permitted roles"));
    }

    if verified.is_empty() {
        return Err(AuthError::access_denied("Identity carries no roles"));
    }

    if verified.intersects(required) {
        Ok(())
    } else {
        Err(AuthError::access_denied(format!(
            "Requires one of {}",
            required
        )))
    }
}

/// Named access policy for an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuard {
    required: RoleSet,
}

impl RoleGuard {
    pub fn new(required: impl IntoIterator<Item = Role>) -> Self {
        Self {
            required: required.into_iter().collect(),
        }
    }

    pub fn admin_only() -> Self {
        Self::new([Role::Admin])
    }

    pub fn required(&self) -> &RoleSet {
        &self.required
    }

    pub fn check(&self, identity: &Identity) -> Result<(), AuthError> {
        authorize(identity.roles(), &self.required)
    }

    pub fn allows(&self, identity: &Identity) -> bool {
        self.check(identity).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(roles: RoleSet) -> Identity {
        Identity::new("USR-000001", "user@hiringgo.id", roles)
    }

    #[test]
    fn test_allows_on_intersection() {
        let verified = RoleSet::from([Role::Admin, Role::Dosen]);
        let required = RoleSet::from([Role::Dosen, Role::Mahasiswa]);

        assert!(authorize(&verified, &required).is_ok());
    }

    #[test]
    fn test_denies_disjoint_sets() {
        let verified = RoleSet::single(Role::Mahasiswa);
        let required = RoleSet::single(Role::Admin);

        let err = authorize(&verified, &required).unwrap_err();
        assert!(matches!(err, AuthError::AccessDenied { .. }));
        assert!(err.to_string().contains("{admin}"));
    }

    #[test]
    fn test_fails_closed_on_empty_sets() {
        let roles = RoleSet::single(Role::Admin);

        assert!(authorize(&roles, &RoleSet::new()).is_err());
        assert!(authorize(&RoleSet::new(), &roles).is_err());
        assert!(authorize(&RoleSet::new(), &RoleSet::new()).is_err());
    }

    #[test]
    fn test_every_pair_follows_intersection_rule() {
        let subsets: Vec<RoleSet> = (0u8..8)
            .map(|mask| {
                Role::ALL
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, r)| r)
                    .collect()
            })
            .collect();

        for verified in &subsets {
            for required in &subsets {
                let expected = verified.iter().any(|r| required.contains(r));
                assert_eq!(authorize(verified, required).is_ok(), expected);
            }
        }
    }

    #[test]
    fn test_guard_admin_only() {
        let guard = RoleGuard::admin_only();

        assert!(guard.allows(&identity(RoleSet::single(Role::Admin))));
        assert!(!guard.allows(&identity(RoleSet::single(Role::Dosen))));
        assert!(!guard.allows(&identity(RoleSet::new())));
        assert_eq!(guard.required(), &RoleSet::single(Role::Admin));
    }

    #[test]
    fn test_empty_guard_denies_everyone() {
        let guard = RoleGuard::new([]);
        let everyone = identity(Role::ALL.into_iter().collect());

        assert!(!guard.allows(&everyone));
    }
}
