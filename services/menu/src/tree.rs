//! Menu hierarchy: flat records to forest and back, plus cycle checks
//!
//! Records are linked by `parent_id` → `id`. Listings that only carry a
//! `parent_name` fall back to matching it against `nama`, which is ambiguous
//! when names repeat; the first record with that name wins.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::models::{MenuNode, MenuOption, MenuTreeNode, menu::is_root_name};

/// Resolved parent index of every record, by position
fn resolve_parents(records: &[MenuNode]) -> Vec<Option<usize>> {
    let mut by_id: HashMap<i64, usize> = HashMap::with_capacity(records.len());
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        by_id.entry(record.id).or_insert(idx);
        by_name.entry(record.nama.trim()).or_default().push(idx);
    }

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            if let Some(parent_id) = record.parent_id {
                match by_id.get(&parent_id) {
                    Some(&parent) if parent != idx => return Some(parent),
                    Some(_) => {
                        warn!(id = record.id, "Menu references itself as parent");
                        return None;
                    }
                    None => {}
                }
            }

            if is_root_name(&record.parent_name) {
                if let Some(parent_id) = record.parent_id {
                    warn!(id = record.id, parent_id, "Parent menu not found, treating as root");
                }
                return None;
            }

            let candidates: Vec<usize> = by_name
                .get(record.parent_name.trim())
                .map(|found| found.iter().copied().filter(|&p| p != idx).collect())
                .unwrap_or_default();

            match candidates.as_slice() {
                [] => {
                    warn!(
                        id = record.id,
                        parent_name = %record.parent_name,
                        "Parent menu not found, treating as root"
                    );
                    None
                }
                [only] => Some(*only),
                [first, ..] => {
                    warn!(
                        id = record.id,
                        parent_name = %record.parent_name,
                        matches = candidates.len(),
                        "Parent name is ambiguous, using the first match"
                    );
                    Some(*first)
                }
            }
        })
        .collect()
}

fn sibling_order(a: &MenuNode, b: &MenuNode) -> Ordering {
    a.sequence_order
        .cmp(&b.sequence_order)
        .then_with(|| a.nama.to_lowercase().cmp(&b.nama.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Build the menu forest
///
/// Every record appears exactly once. Records whose parent cannot be found,
/// and records caught in a parent cycle, become roots. Siblings are sorted by
/// `sequence_order`, then name.
pub fn build_tree(records: &[MenuNode]) -> Vec<MenuTreeNode> {
    let mut parents = resolve_parents(records);
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots = Vec::new();

    for (idx, parent) in parents.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(idx),
            None => roots.push(idx),
        }
    }

    // anything unreachable from a root sits on a cycle or hangs below one
    let mut visited = vec![false; records.len()];
    for &root in &roots {
        mark_subtree(root, &children, &mut visited);
    }
    for idx in 0..records.len() {
        if visited[idx] {
            continue;
        }
        let member = cycle_member(idx, &parents);
        if let Some(parent) = parents[member].take() {
            children[parent].retain(|&child| child != member);
        }
        warn!(id = records[member].id, "Menu parent chain forms a cycle, treating as root");
        roots.push(member);
        mark_subtree(member, &children, &mut visited);
    }

    let by_order = |a: &usize, b: &usize| sibling_order(&records[*a], &records[*b]);
    roots.sort_by(by_order);
    for list in children.iter_mut() {
        list.sort_by(by_order);
    }

    roots
        .into_iter()
        .map(|root| assemble(root, 0, records, &children))
        .collect()
}

/// First record on the loop reached by following parents from `start`
fn cycle_member(start: usize, parents: &[Option<usize>]) -> usize {
    let mut seen = HashSet::new();
    let mut current = start;
    while seen.insert(current) {
        match parents[current] {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}

fn mark_subtree(start: usize, children: &[Vec<usize>], visited: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(idx) = stack.pop() {
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        stack.extend(children[idx].iter().copied().filter(|&c| !visited[c]));
    }
}

fn assemble(
    idx: usize,
    depth: usize,
    records: &[MenuNode],
    children: &[Vec<usize>],
) -> MenuTreeNode {
    let mut node = records[idx].clone();
    node.depth = depth;
    MenuTreeNode {
        node,
        children: children[idx]
            .iter()
            .map(|&child| assemble(child, depth + 1, records, children))
            .collect(),
    }
}

/// Pre-order list of every node, with depth set
pub fn flatten(tree: &[MenuTreeNode]) -> Vec<MenuNode> {
    fn walk(nodes: &[MenuTreeNode], out: &mut Vec<MenuNode>) {
        for node in nodes {
            out.push(node.node.clone());
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

/// id → parent id, using the same linking rules as [`build_tree`]
pub fn parent_map(records: &[MenuNode]) -> HashMap<i64, Option<i64>> {
    resolve_parents(records)
        .into_iter()
        .zip(records)
        .map(|(parent, record)| (record.id, parent.map(|p| records[p].id)))
        .collect()
}

/// Whether making `candidate` the parent of `editing` would close a loop
///
/// True iff `candidate == editing` or `editing` is an ancestor of
/// `candidate`. Runs in O(depth).
pub fn would_create_cycle(
    parents: &HashMap<i64, Option<i64>>,
    candidate: i64,
    editing: i64,
) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(candidate);
    while let Some(id) = current {
        if id == editing {
            return true;
        }
        if !seen.insert(id) {
            warn!(candidate, "Ancestor chain already loops");
            return false;
        }
        current = parents.get(&id).copied().flatten();
    }
    false
}

/// Dropdown entries that may become the parent of `editing`
///
/// A new menu (`editing == None`) may pick any entry.
pub fn valid_parent_options(
    records: &[MenuNode],
    options: &[MenuOption],
    editing: Option<i64>,
) -> Vec<MenuOption> {
    let Some(editing) = editing else {
        return options.to_vec();
    };
    let parents = parent_map(records);
    options
        .iter()
        .filter(|option| !would_create_cycle(&parents, option.id, editing))
        .cloned()
        .collect()
}

/// Every id below `id` in the hierarchy
pub fn descendant_ids(records: &[MenuNode], id: i64) -> HashSet<i64> {
    let parents = parent_map(records);
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    for (&child, parent) in &parents {
        if let Some(parent) = parent {
            children.entry(*parent).or_default().push(child);
        }
    }

    let mut found = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        for &child in children.get(&current).into_iter().flatten() {
            if child != id && found.insert(child) {
                stack.push(child);
            }
        }
    }
    found
}

/// Deepest level in the forest (roots are level 0)
pub fn max_depth(tree: &[MenuTreeNode]) -> Option<usize> {
    tree.iter()
        .map(|node| max_depth(&node.children).unwrap_or(node.depth()))
        .max()
}

/// Number of nodes in the forest
pub fn count(tree: &[MenuTreeNode]) -> usize {
    tree.iter().map(|node| 1 + count(&node.children)).sum()
}
