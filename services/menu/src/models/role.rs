//! Role model

use serde::{Deserialize, Serialize};

use super::de;

/// Access-control subject from the canonical role list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "de::i64_lenient")]
    pub id: i64,
    #[serde(default)]
    pub child_role: Option<String>,
    #[serde(default)]
    pub nama: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Organizational label, informational only
    #[serde(default)]
    pub parent_role: Option<String>,
}

impl Role {
    pub fn display_name(&self) -> String {
        display_name(self.id, self.child_role.as_deref(), self.nama.as_deref())
    }
}

/// First non-blank name, else a synthesized label
pub(crate) fn display_name(id: i64, child_role: Option<&str>, nama: Option<&str>) -> String {
    child_role
        .into_iter()
        .chain(nama)
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Role #{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_fallbacks() {
        let role: Role =
            serde_json::from_value(json!({"id": 3, "child_role": "Admin Gudang"})).unwrap();
        assert_eq!(role.display_name(), "Admin Gudang");

        let role: Role = serde_json::from_value(json!({"id": "4", "nama": "Kasir"})).unwrap();
        assert_eq!(role.display_name(), "Kasir");

        let role: Role = serde_json::from_value(json!({"id": 5, "child_role": " "})).unwrap();
        assert_eq!(role.display_name(), "Role #5");
    }
}
