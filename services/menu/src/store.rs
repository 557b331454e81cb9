//! Menu data store
//!
//! Single source of truth for menu records, exposed as a flat page for tables
//! and as a forest for hierarchical editing. Reads never fail: problems are
//! recorded in [`MenuState::error`]. Mutations validate locally, call the API
//! and then re-fetch everything from the server.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use common::{ApiClient, ClientConfig, ClientResult, GridQuery, SortDirection};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::filter::MenuFilter;
use crate::models::{
    MenuNode, MenuOption, MenuStatistics, MenuTreeNode, Pagination, ReorderRequest, Role,
    UpdateMenuPayload,
};
use crate::repositories::{MenuRepository, RoleRepository};
use crate::tree;
use crate::validation::{self, MenuForm};

/// Everything a view needs to render the menu screens
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    /// Current page of the flat list
    pub menus: Vec<MenuNode>,
    pub tree: Vec<MenuTreeNode>,
    pub options: Vec<MenuOption>,
    pub roles: Vec<Role>,
    pub statistics: Option<MenuStatistics>,
    pub pagination: Pagination,
    pub search: String,
    pub order_column: usize,
    pub order_dir: SortDirection,
    /// Failure message of the latest read, per read kind
    errors: [Option<String>; READ_KINDS],
    pending: usize,
}

impl MenuState {
    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// First outstanding read failure, if any
    pub fn error(&self) -> Option<&str> {
        self.errors.iter().flatten().next().map(String::as_str)
    }

    /// Full menu set as loaded for the tree; empty until the tree is fetched
    pub fn all_menus(&self) -> Vec<MenuNode> {
        tree::flatten(&self.tree)
    }
}

#[derive(Debug, Clone, Copy)]
enum ReadKind {
    Menus,
    Tree,
    Options,
    Roles,
    Statistics,
}

const READ_KINDS: usize = 5;

/// Shared handle to the menu state; clones observe the same data
#[derive(Clone)]
pub struct MenuStore {
    menus: MenuRepository,
    roles: RoleRepository,
    state: Arc<RwLock<MenuState>>,
    generations: Arc<[AtomicU64; READ_KINDS]>,
    draw: Arc<AtomicU64>,
    cancel: CancellationToken,
    tree_page_size: u32,
}

impl MenuStore {
    /// Create a new menu store
    pub fn new(client: ApiClient, config: &ClientConfig) -> Self {
        let state = MenuState {
            pagination: Pagination::new(1, config.default_page_size, 0),
            ..MenuState::default()
        };

        Self {
            menus: MenuRepository::new(client.clone(), config.menu_resource.clone()),
            roles: RoleRepository::new(client, config.role_resource.clone(), config.tree_page_size),
            state: Arc::new(RwLock::new(state)),
            generations: Arc::new(std::array::from_fn(|_| AtomicU64::new(0))),
            draw: Arc::new(AtomicU64::new(0)),
            cancel: CancellationToken::new(),
            tree_page_size: config.tree_page_size,
        }
    }

    pub fn repository(&self) -> &MenuRepository {
        &self.menus
    }

    /// Copy of the current state for rendering
    pub async fn snapshot(&self) -> MenuState {
        self.state.read().await.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error().map(str::to_string)
    }

    /// Stop applying results; in-flight reads are abandoned
    pub fn shutdown(&self) {
        info!("Menu store shut down");
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Set the server-side search term used by the next list fetch
    pub async fn set_search(&self, term: impl Into<String>) {
        self.state.write().await.search = term.into();
    }

    /// Set the server-side ordering used by the next list fetch
    pub async fn set_order(&self, column: usize, dir: SortDirection) {
        let mut state = self.state.write().await;
        state.order_column = column;
        state.order_dir = dir;
    }

    /// Load one page of the flat list
    pub async fn fetch_menus(&self, page: u32, per_page: u32) {
        let query = {
            let state = self.state.read().await;
            GridQuery {
                draw: self.draw.fetch_add(1, Ordering::SeqCst) + 1,
                search: state.search.clone(),
                order_column: state.order_column,
                order_dir: state.order_dir,
                ..GridQuery::for_page(page, per_page)
            }
        };

        self.load(ReadKind::Menus, self.menus.list(&query), |state, payload| {
            match payload {
                Some(payload) => {
                    state.pagination = Pagination::new(page, per_page, payload.total());
                    state.menus = payload.into_items();
                }
                None => state.menus.clear(),
            }
        })
        .await;
    }

    /// Load the whole menu set and rebuild the forest
    pub async fn fetch_menu_tree(&self) {
        self.load(
            ReadKind::Tree,
            self.menus.all(self.tree_page_size),
            |state, records| {
                state.tree = records.map(|r| tree::build_tree(&r)).unwrap_or_default();
            },
        )
        .await;
    }

    /// Load the parent-selection options
    pub async fn fetch_menu_options(&self) {
        self.load(ReadKind::Options, self.menus.options(), |state, options| {
            state.options = options.unwrap_or_default();
        })
        .await;
    }

    /// Load the canonical role list
    pub async fn fetch_roles(&self) {
        self.load(ReadKind::Roles, self.roles.list(), |state, roles| {
            state.roles = roles.unwrap_or_default();
        })
        .await;
    }

    /// Load server-side aggregate counts
    pub async fn get_menu_statistics(&self) {
        self.load(ReadKind::Statistics, self.menus.statistics(), |state, stats| {
            state.statistics = stats;
        })
        .await;
    }

    /// Re-fetch the flat page, tree, options and statistics
    pub async fn refresh_all(&self) {
        let Pagination {
            current_page,
            per_page,
            ..
        } = self.state.read().await.pagination;

        tokio::join!(
            self.fetch_menus(current_page, per_page),
            self.fetch_menu_tree(),
            self.fetch_menu_options(),
            self.get_menu_statistics(),
        );
    }

    /// Create a menu and refresh
    pub async fn create_menu(&self, form: &MenuForm) -> ClientResult<Option<MenuNode>> {
        let known = self.hierarchy_for(form.parent_id).await;
        let payload = validation::validate_menu_form(form, None, &known)?;

        let created = self.menus.store(&payload).await.inspect_err(|e| {
            warn!(error = %e, "Failed to create menu");
        })?;
        info!(nama = %payload.nama, "Menu created");

        self.refresh_all().await;
        Ok(created)
    }

    /// Update the menu identified by `pid` and refresh
    pub async fn update_menu(&self, pid: &str, form: &MenuForm) -> ClientResult<Option<MenuNode>> {
        validation::require_pid(pid)?;
        let known = self.hierarchy_for(form.parent_id).await;
        let editing = known.iter().find(|node| node.pid == pid).map(|node| node.id);
        let fields = validation::validate_menu_form(form, editing, &known)?;

        let payload = UpdateMenuPayload {
            pid: pid.to_string(),
            fields,
        };
        let updated = self.menus.update(&payload).await.inspect_err(|e| {
            warn!(pid, error = %e, "Failed to update menu");
        })?;
        info!(pid, "Menu updated");

        self.refresh_all().await;
        Ok(updated)
    }

    /// Delete the menu identified by `pid` and refresh
    pub async fn delete_menu(&self, pid: &str) -> ClientResult<()> {
        validation::require_pid(pid)?;

        self.menus.delete(pid).await.inspect_err(|e| {
            warn!(pid, error = %e, "Failed to delete menu");
        })?;
        info!(pid, "Menu deleted");

        self.refresh_all().await;
        Ok(())
    }

    /// Persist a sibling order, optionally under a new parent, and refresh
    pub async fn reorder_menus(&self, menu_ids: &[i64], parent_id: Option<i64>) -> ClientResult<()> {
        let known = self.hierarchy_for(parent_id).await;
        validation::validate_reorder(menu_ids, parent_id, &known)?;

        let request = ReorderRequest {
            menu_ids: menu_ids.to_vec(),
            parent_id,
        };
        self.menus.reorder(&request).await.inspect_err(|e| {
            warn!(error = %e, "Failed to reorder menus");
        })?;
        info!(count = menu_ids.len(), ?parent_id, "Menus reordered");

        self.refresh_all().await;
        Ok(())
    }

    /// Current flat page narrowed by a client-side filter
    pub async fn filtered(&self, filter: &MenuFilter) -> Vec<MenuNode> {
        let state = self.state.read().await;
        filter.apply(&state.menus).into_iter().cloned().collect()
    }

    /// Parent options that keep the hierarchy acyclic for `editing`
    pub async fn valid_parent_options(&self, editing: Option<i64>) -> Vec<MenuOption> {
        let state = self.state.read().await;
        tree::valid_parent_options(&state.all_menus(), &state.options, editing)
    }

    /// Full menu set for parent checks, loading the tree when needed
    ///
    /// Empty when no parent is involved or the tree cannot be loaded, in
    /// which case only self-parenting is rejected locally.
    async fn hierarchy_for(&self, parent_id: Option<i64>) -> Vec<MenuNode> {
        if parent_id.is_none() {
            return Vec::new();
        }
        if self.state.read().await.tree.is_empty() {
            self.fetch_menu_tree().await;
        }
        self.state.read().await.all_menus()
    }

    /// Run a read and apply its outcome if it is still the latest of its kind
    async fn load<T>(
        &self,
        kind: ReadKind,
        request: impl Future<Output = ClientResult<T>>,
        apply: impl FnOnce(&mut MenuState, Option<T>),
    ) {
        let counter = &self.generations[kind as usize];
        let ticket = counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.pending += 1;

        let result = tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = request => Some(result),
        };

        let mut state = self.state.write().await;
        state.pending = state.pending.saturating_sub(1);

        let Some(result) = result else {
            debug!(?kind, "Read cancelled");
            return;
        };
        if self.cancel.is_cancelled() || counter.load(Ordering::SeqCst) != ticket {
            debug!(?kind, "Discarding stale response");
            return;
        }

        match result {
            Ok(value) => {
                state.errors[kind as usize] = None;
                apply(&mut *state, Some(value));
            }
            Err(e) => {
                warn!(?kind, error = %e, "Failed to load menu data");
                state.errors[kind as usize] = Some(e.user_message());
                apply(&mut *state, None);
            }
        }
    }
}
