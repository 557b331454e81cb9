//! Menu model and related payloads

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;

/// Url of a node that only groups children
pub const SENTINEL_URL: &str = "#";

/// `parent_name` the server reports for root nodes
pub const ROOT_PARENT_NAME: &str = "-";

fn default_url() -> String {
    SENTINEL_URL.to_string()
}

fn default_parent_name() -> String {
    ROOT_PARENT_NAME.to_string()
}

/// Blank urls become the sentinel, everything else is trimmed
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        SENTINEL_URL.to_string()
    } else {
        url.to_string()
    }
}

/// Menu entry as returned by the list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    #[serde(deserialize_with = "de::i64_lenient")]
    pub id: i64,
    /// Public identifier used by every mutating call
    #[serde(default, deserialize_with = "de::string_lenient")]
    pub pid: String,
    pub nama: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_url", deserialize_with = "de::url_or_sentinel")]
    pub url: String,
    #[serde(default, deserialize_with = "de::i32_lenient")]
    pub sequence_order: i32,
    #[serde(default, deserialize_with = "de::opt_i64_lenient")]
    pub parent_id: Option<i64>,
    #[serde(
        default = "default_parent_name",
        deserialize_with = "de::parent_name_or_root"
    )]
    pub parent_name: String,
    #[serde(default, deserialize_with = "de::bool_lenient")]
    pub has_children: bool,
    #[serde(default)]
    pub depth: usize,
}

impl MenuNode {
    /// Whether the node is a root according to the server's listing
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none() && is_root_name(&self.parent_name)
    }

    /// Whether the node only groups children
    pub fn is_group(&self) -> bool {
        self.url == SENTINEL_URL
    }
}

pub(crate) fn is_root_name(parent_name: &str) -> bool {
    let name = parent_name.trim();
    name.is_empty() || name == ROOT_PARENT_NAME
}

/// Node of the hierarchical view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuTreeNode {
    #[serde(flatten)]
    pub node: MenuNode,
    pub children: Vec<MenuTreeNode>,
}

impl MenuTreeNode {
    pub fn id(&self) -> i64 {
        self.node.id
    }

    pub fn depth(&self) -> usize {
        self.node.depth
    }
}

/// Entry of the parent-selection dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    #[serde(deserialize_with = "de::i64_lenient")]
    pub id: i64,
    pub label: String,
}

/// Aggregate counts computed by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuStatistics {
    #[serde(default)]
    pub total_menus: u64,
    #[serde(default)]
    pub root_menus: u64,
    #[serde(default)]
    pub max_depth: u64,
    /// Any additional counters the server reports
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Pagination metadata of the flat list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl Pagination {
    pub fn new(current_page: u32, per_page: u32, total_items: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page as u64) as u32;
        Self {
            current_page: current_page.max(1),
            per_page,
            total_pages,
            total_items,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 10, 0)
    }
}

/// Body of `<resource>/store`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuPayload {
    pub nama: String,
    pub icon: Option<String>,
    pub url: String,
    pub sequence_order: i32,
    pub parent_id: Option<i64>,
}

/// Body of `<resource>/update`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateMenuPayload {
    pub pid: String,
    #[serde(flatten)]
    pub fields: MenuPayload,
}

/// Body of `<resource>/hapus`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PidRequest {
    pub pid: String,
}

/// Body of `<resource>/reorder`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReorderRequest {
    pub menu_ids: Vec<i64>,
    pub parent_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_menu_node_defaults_and_lenient_fields() {
        let node: MenuNode = serde_json::from_value(json!({
            "id": "7",
            "pid": 123,
            "nama": "Laporan",
            "url": "",
            "sequence_order": "3",
            "parent_id": "",
            "parent_name": null,
            "has_children": 1
        }))
        .unwrap();

        assert_eq!(node.id, 7);
        assert_eq!(node.pid, "123");
        assert_eq!(node.url, SENTINEL_URL);
        assert_eq!(node.sequence_order, 3);
        assert_eq!(node.parent_id, None);
        assert_eq!(node.parent_name, ROOT_PARENT_NAME);
        assert!(node.has_children);
        assert!(node.is_root());
        assert!(node.is_group());
    }

    #[test]
    fn test_menu_node_missing_optional_fields() {
        let node: MenuNode =
            serde_json::from_value(json!({"id": 1, "nama": "Dashboard"})).unwrap();
        assert_eq!(node.url, "#");
        assert_eq!(node.parent_name, "-");
        assert_eq!(node.depth, 0);
        assert_eq!(node.icon, None);
    }

    #[test]
    fn test_pagination_rounds_up() {
        let page = Pagination::new(2, 10, 21);
        assert_eq!(page.total_pages, 3);
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn test_update_payload_is_flat() {
        let payload = UpdateMenuPayload {
            pid: "abc".to_string(),
            fields: MenuPayload {
                nama: "Menu".to_string(),
                icon: None,
                url: "#".to_string(),
                sequence_order: 0,
                parent_id: Some(4),
            },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["pid"], "abc");
        assert_eq!(value["parent_id"], 4);
        assert_eq!(value["url"], "#");
    }

    #[test]
    fn test_statistics_keep_extra_counters() {
        let stats: MenuStatistics = serde_json::from_value(json!({
            "total_menus": 12, "root_menus": 3, "max_depth": 2, "leaf_menus": 8
        }))
        .unwrap();
        assert_eq!(stats.total_menus, 12);
        assert_eq!(stats.extra.get("leaf_menus"), Some(&json!(8)));
    }
}
