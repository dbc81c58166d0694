//! Per-request caller identity.
//!
//! A [`SecurityContext`] is built for each request (by the HTTP auth
//! middleware or by a test) and passed explicitly to the services that need
//! it. There is no process-wide current user.

use std::collections::HashSet;

use crate::models::Role;

/// Authenticated caller: an employee id and the roles it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: i32,
    pub roles: HashSet<Role>,
}

impl Caller {
    pub fn new(id: i32, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    caller: Option<Caller>,
}

impl SecurityContext {
    /// Context with no authenticated caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_caller(caller: Caller) -> Self {
        Self {
            caller: Some(caller),
        }
    }

    pub fn current_caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }

    pub fn set_current_caller(&mut self, caller: Option<Caller>) {
        self.caller = caller;
    }

    /// Returns true when a caller is present and holds `role`.
    pub fn caller_has_role(&self, role: Role) -> bool {
        self.caller.as_ref().is_some_and(|c| c.has_role(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_context_has_no_roles() {
        let ctx = SecurityContext::anonymous();
        assert!(ctx.current_caller().is_none());
        assert!(!ctx.caller_has_role(Role::Administrator));
    }

    #[test]
    fn set_and_clear_caller() {
        let mut ctx = SecurityContext::anonymous();
        ctx.set_current_caller(Some(Caller::new(4, [Role::Manager, Role::Staff])));
        assert_eq!(ctx.current_caller().map(|c| c.id), Some(4));
        assert!(ctx.caller_has_role(Role::Manager));
        assert!(!ctx.caller_has_role(Role::Administrator));

        ctx.set_current_caller(None);
        assert!(ctx.current_caller().is_none());
    }
}
