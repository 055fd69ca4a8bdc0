//! Actors, roles and the capabilities they carry
//!
//! The engine does not care how the host application represents roles; it
//! only asks the [`AccessPolicy`] whether an actor holds a capability.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use core_kernel::EmployeeId;

/// Organisational role supplied by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    Hr,
    Finance,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Hr => "hr",
            Role::Finance => "finance",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            "hr" => Ok(Role::Hr),
            "finance" => Ok(Role::Finance),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// What a role is allowed to do to other people's claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Start review, approve and reject
    ReviewClaims,
    /// Mark approved claims as paid
    DisburseClaims,
    /// See claims of all employees
    ViewAllClaims,
}

/// The acting user of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identity recorded in `reviewed_by`
    pub user_id: String,
    /// Employee record linked to the user, if any
    pub employee_id: Option<EmployeeId>,
    pub roles: BTreeSet<Role>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, employee_id: Option<EmployeeId>, roles: BTreeSet<Role>) -> Self {
        Self {
            user_id: user_id.into(),
            employee_id,
            roles,
        }
    }

    /// An employee acting on their own claims
    pub fn employee(user_id: impl Into<String>, employee_id: EmployeeId) -> Self {
        Self::new(user_id, Some(employee_id), BTreeSet::from([Role::Employee]))
    }

    /// A staff member with a single role and no linked employee record
    pub fn staff(user_id: impl Into<String>, role: Role) -> Self {
        Self::new(user_id, None, BTreeSet::from([role]))
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// True when the actor is the employee the claim belongs to
    pub fn owns(&self, employee_id: EmployeeId) -> bool {
        self.employee_id == Some(employee_id)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_id)
    }
}

/// Maps roles to capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    grants: BTreeMap<Role, BTreeSet<Capability>>,
}

impl Default for AccessPolicy {
    /// Admin, HR and finance review, disburse and see every claim
    fn default() -> Self {
        let staff = BTreeSet::from([
            Capability::ReviewClaims,
            Capability::DisburseClaims,
            Capability::ViewAllClaims,
        ]);
        Self {
            grants: BTreeMap::from([
                (Role::Admin, staff.clone()),
                (Role::Hr, staff.clone()),
                (Role::Finance, staff),
            ]),
        }
    }
}

impl AccessPolicy {
    /// A policy with no grants at all
    pub fn empty() -> Self {
        Self {
            grants: BTreeMap::new(),
        }
    }

    pub fn grant(mut self, role: Role, capability: Capability) -> Self {
        self.grants.entry(role).or_default().insert(capability);
        self
    }

    pub fn allows(&self, actor: &Actor, capability: Capability) -> bool {
        actor.roles.iter().any(|role| {
            self.grants
                .get(role)
                .is_some_and(|caps| caps.contains(&capability))
        })
    }

    /// Roles that hold a capability
    pub fn roles_with(&self, capability: Capability) -> Vec<Role> {
        self.grants
            .iter()
            .filter(|(_, caps)| caps.contains(&capability))
            .map(|(role, _)| *role)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reviewers() {
        let policy = AccessPolicy::default();
        assert_eq!(
            policy.roles_with(Capability::ReviewClaims),
            vec![Role::Hr, Role::Finance, Role::Admin]
        );
    }

    #[test]
    fn test_employee_cannot_review() {
        let policy = AccessPolicy::default();
        let actor = Actor::employee("u-1", EmployeeId::new());
        assert!(!policy.allows(&actor, Capability::ReviewClaims));
    }

    #[test]
    fn test_any_role_grants() {
        let policy = AccessPolicy::default();
        let actor = Actor::employee("u-2", EmployeeId::new()).with_role(Role::Finance);
        assert!(policy.allows(&actor, Capability::DisburseClaims));
    }

    #[test]
    fn test_custom_grant() {
        let policy = AccessPolicy::empty().grant(Role::Manager, Capability::ReviewClaims);
        let manager = Actor::staff("m-1", Role::Manager);
        assert!(policy.allows(&manager, Capability::ReviewClaims));
        assert!(!policy.allows(&manager, Capability::DisburseClaims));
        assert!(!policy.allows(&Actor::staff("a-1", Role::Admin), Capability::ReviewClaims));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("HR".parse::<Role>().unwrap(), Role::Hr);
        assert!("ceo".parse::<Role>().is_err());
    }

    #[test]
    fn test_ownership() {
        let id = EmployeeId::new();
        assert!(Actor::employee("u", id).owns(id));
        assert!(!Actor::staff("hr", Role::Hr).owns(id));
    }
}
