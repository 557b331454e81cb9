//! Menu × role access grant models

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::de;

/// Role entry of an access-info response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRole {
    #[serde(deserialize_with = "de::i64_lenient")]
    pub id: i64,
    #[serde(default)]
    pub child_role: Option<String>,
    #[serde(default)]
    pub nama: Option<String>,
}

impl AccessRole {
    pub fn display_name(&self) -> String {
        super::role::display_name(self.id, self.child_role.as_deref(), self.nama.as_deref())
    }
}

/// Roles currently allowed to see one menu node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessInfo {
    #[serde(default)]
    pub accessible_roles: Vec<AccessRole>,
    #[serde(default)]
    pub total_roles_with_access: u64,
}

impl AccessInfo {
    /// Unnamed grants for exactly these role ids
    pub fn from_role_ids(role_ids: &[i64]) -> Self {
        Self {
            accessible_roles: role_ids
                .iter()
                .map(|id| AccessRole {
                    id: *id,
                    child_role: None,
                    nama: None,
                })
                .collect(),
            total_roles_with_access: role_ids.len() as u64,
        }
    }

    pub fn role_ids(&self) -> BTreeSet<i64> {
        self.accessible_roles.iter().map(|role| role.id).collect()
    }
}

/// Body of `<resource>/sync-access`: the complete desired role set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncAccessRequest {
    pub pid: String,
    pub role_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_access_info_role_ids() {
        let info: AccessInfo = serde_json::from_value(json!({
            "accessible_roles": [{"id": 2}, {"id": "1", "child_role": "Admin"}],
            "total_roles_with_access": 2
        }))
        .unwrap();

        assert_eq!(info.role_ids().into_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(info.accessible_roles[1].display_name(), "Admin");
    }

    #[test]
    fn test_access_info_tolerates_missing_fields() {
        let info: AccessInfo = serde_json::from_value(json!({})).unwrap();
        assert!(info.role_ids().is_empty());
    }
}
