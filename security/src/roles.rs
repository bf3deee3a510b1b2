// security/src/roles.rs
use anyhow::Result;
use models::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Things a signed-in user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManagePatients,
    ManageIncidents,
    ViewAllRecords,
    ViewOwnRecords,
    ViewCalendar,
    /// Grants everything.
    Superuser,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Permission::ManagePatients => "manage_patients",
            Permission::ManageIncidents => "manage_incidents",
            Permission::ViewAllRecords => "view_all_records",
            Permission::ViewOwnRecords => "view_own_records",
            Permission::ViewCalendar => "view_calendar",
            Permission::Superuser => "superuser",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RoleConfig {
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RolesConfig {
    pub roles: HashMap<Role, RoleConfig>,
}

impl Default for RolesConfig {
    /// Admins run the clinic; patients only see their own records.
    fn default() -> Self {
        let mut roles = HashMap::new();
        roles.insert(
            Role::Admin,
            RoleConfig {
                permissions: vec![
                    Permission::ManagePatients,
                    Permission::ManageIncidents,
                    Permission::ViewAllRecords,
                    Permission::ViewCalendar,
                ],
            },
        );
        roles.insert(
            Role::Patient,
            RoleConfig {
                permissions: vec![Permission::ViewOwnRecords, Permission::ViewCalendar],
            },
        );
        RolesConfig { roles }
    }
}

impl RolesConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn get_role_config(&self, role: Role) -> Option<&RoleConfig> {
        self.roles.get(&role)
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.get_role_config(role).is_some_and(|role_cfg| {
            role_cfg.permissions.contains(&permission) || role_cfg.permissions.contains(&Permission::Superuser)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_split_admin_and_patient() {
        let roles = RolesConfig::default();
        assert!(roles.has_permission(Role::Admin, Permission::ManagePatients));
        assert!(roles.has_permission(Role::Admin, Permission::ManageIncidents));
        assert!(!roles.has_permission(Role::Admin, Permission::ViewOwnRecords));
        assert!(roles.has_permission(Role::Patient, Permission::ViewOwnRecords));
        assert!(!roles.has_permission(Role::Patient, Permission::ManageIncidents));
    }

    #[test]
    fn yaml_override_and_superuser() {
        let roles = RolesConfig::from_yaml_str(
            r#"
roles:
  Admin:
    permissions: [superuser]
  Patient:
    permissions: [view_own_records]
"#,
        )
        .unwrap();
        assert!(roles.has_permission(Role::Admin, Permission::ViewOwnRecords));
        assert!(!roles.has_permission(Role::Patient, Permission::ViewCalendar));
    }
}
