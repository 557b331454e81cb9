//! Client-side filtering of the flat menu list

use std::collections::HashMap;

use crate::models::MenuNode;
use crate::tree;

/// Parent constraint of the filter bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentFilter {
    #[default]
    All,
    /// Only nodes without a parent
    Root,
    /// Only direct children of this id
    Parent(i64),
}

/// Free-text search plus parent constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    pub search: String,
    pub parent: ParentFilter,
}

impl MenuFilter {
    pub fn new(search: impl Into<String>, parent: ParentFilter) -> Self {
        Self {
            search: search.into(),
            parent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.parent == ParentFilter::All
    }

    /// Nodes passing the filter, in input order
    ///
    /// Parents are resolved with the same rules as the tree, so listings
    /// that only carry `parent_name` still filter by parent.
    pub fn apply<'a>(&self, nodes: &'a [MenuNode]) -> Vec<&'a MenuNode> {
        let parents = match self.parent {
            ParentFilter::Parent(_) => tree::parent_map(nodes),
            _ => HashMap::new(),
        };
        nodes
            .iter()
            .filter(|node| self.matches_search(node) && self.matches_parent(node, &parents))
            .collect()
    }

    fn matches_search(&self, node: &MenuNode) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&node.nama, &node.url, &node.parent_name]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_parent(&self, node: &MenuNode, parents: &HashMap<i64, Option<i64>>) -> bool {
        match self.parent {
            ParentFilter::All => true,
            ParentFilter::Root => node.is_root(),
            ParentFilter::Parent(id) => {
                node.parent_id == Some(id) || parents.get(&node.id) == Some(&Some(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, nama: &str, url: &str, parent: Option<(i64, &str)>) -> MenuNode {
        MenuNode {
            id,
            pid: String::new(),
            nama: nama.to_string(),
            icon: None,
            url: url.to_string(),
            sequence_order: 0,
            parent_id: parent.map(|(id, _)| id),
            parent_name: parent.map_or("-", |(_, name)| name).to_string(),
            has_children: false,
            depth: 0,
        }
    }

    fn sample() -> Vec<MenuNode> {
        vec![
            node(1, "Master Data", "#", None),
            node(2, "Jenis Hewan", "/master/hewan", Some((1, "Master Data"))),
            node(3, "Supplier", "/master/supplier", Some((1, "Master Data"))),
            node(4, "Penjualan", "/operasional/penjualan", None),
        ]
    }

    fn ids(found: Vec<&MenuNode>) -> Vec<i64> {
        found.into_iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_url_parent() {
        let nodes = sample();
        assert_eq!(ids(MenuFilter::new("HEWAN", ParentFilter::All).apply(&nodes)), vec![2]);
        assert_eq!(ids(MenuFilter::new("/master", ParentFilter::All).apply(&nodes)), vec![2, 3]);
        assert_eq!(
            ids(MenuFilter::new("master data", ParentFilter::All).apply(&nodes)),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_parent_filter() {
        let nodes = sample();
        assert_eq!(ids(MenuFilter::new("", ParentFilter::Root).apply(&nodes)), vec![1, 4]);
        assert_eq!(ids(MenuFilter::new("", ParentFilter::Parent(1)).apply(&nodes)), vec![2, 3]);
        assert_eq!(
            ids(MenuFilter::new("supp", ParentFilter::Parent(1)).apply(&nodes)),
            vec![3]
        );
    }

    #[test]
    fn test_parent_filter_resolves_parent_name() {
        let nodes = vec![
            node(1, "A", "-", None),
            MenuNode {
                parent_name: "A".to_string(),
                ..node(2, "B", "#", None)
            },
            node(3, "C", "#", None),
        ];

        assert_eq!(ids(MenuFilter::new("", ParentFilter::Parent(1)).apply(&nodes)), vec![2]);
        assert_eq!(ids(MenuFilter::new("", ParentFilter::Root).apply(&nodes)), vec![1, 3]);
    }

    #[test]
    fn test_parent_filter_keeps_children_of_parent_outside_page() {
        // parent 9 is on another page
        let nodes = vec![node(5, "Child", "/child", Some((9, "Induk")))];
        assert_eq!(ids(MenuFilter::new("", ParentFilter::Parent(9)).apply(&nodes)), vec![5]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let nodes = sample();
        let filter = MenuFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&nodes).len(), nodes.len());
    }
}
