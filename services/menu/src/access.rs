//! Access synchronization: which roles may see a menu node
//!
//! Writes are full replacements. The editor keeps the administrator's
//! selection locally and sends the complete set on save.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use common::{ClientResult, ValidationErrors};
use tracing::{debug, info, warn};

use crate::models::{AccessInfo, Role, SyncAccessRequest};
use crate::repositories::MenuRepository;
use crate::validation;

/// Reads and replaces access grants
#[derive(Clone)]
pub struct AccessService {
    repo: MenuRepository,
    refresh_delay: Duration,
}

impl AccessService {
    /// `refresh_delay` is how long to wait after a sync before re-reading
    pub fn new(repo: MenuRepository, refresh_delay: Duration) -> Self {
        Self {
            repo,
            refresh_delay,
        }
    }

    /// Get the roles allowed to see a menu, bypassing every cache
    pub async fn fetch_access_info(&self, menu_pid: &str) -> ClientResult<AccessInfo> {
        validation::require_pid(menu_pid)?;
        self.repo.access_info(menu_pid).await
    }

    /// Replace the full role set of a menu and return the state read back
    ///
    /// The sync itself is the success point. When the follow-up read fails
    /// the requested set is returned instead.
    pub async fn save_access(
        &self,
        menu_pid: &str,
        role_ids: &BTreeSet<i64>,
    ) -> ClientResult<AccessInfo> {
        validation::require_pid(menu_pid)?;

        let request = SyncAccessRequest {
            pid: menu_pid.to_string(),
            role_ids: role_ids.iter().copied().collect(),
        };
        self.repo.sync_access(&request).await?;
        info!(pid = menu_pid, roles = request.role_ids.len(), "Menu access synchronized");

        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        match self.repo.access_info(menu_pid).await {
            Ok(info) => Ok(info),
            Err(e) => {
                warn!(pid = menu_pid, error = %e, "Failed to re-read access after sync");
                Ok(AccessInfo::from_role_ids(&request.role_ids))
            }
        }
    }
}

/// One line of the role checklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRow {
    pub id: i64,
    pub label: String,
    pub description: Option<String>,
    pub selected: bool,
    /// Not part of the canonical role list
    pub custom: bool,
}

/// Local editing state of one menu's access grants
#[derive(Debug, Clone)]
pub struct AccessEditor {
    pid: String,
    roles: Vec<Role>,
    server: BTreeSet<i64>,
    selected: BTreeSet<i64>,
    custom: BTreeMap<i64, String>,
}

impl AccessEditor {
    /// Empty editor for a menu; call [`AccessEditor::load`] or [`AccessEditor::seed`]
    pub fn new(menu_pid: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            pid: menu_pid.into(),
            roles,
            server: BTreeSet::new(),
            selected: BTreeSet::new(),
            custom: BTreeMap::new(),
        }
    }

    pub fn from_info(menu_pid: impl Into<String>, roles: Vec<Role>, info: &AccessInfo) -> Self {
        let mut editor = Self::new(menu_pid, roles);
        editor.seed(info);
        editor
    }

    /// Fetch the current grants and reset the selection to them
    pub async fn load(&mut self, service: &AccessService) -> ClientResult<()> {
        let info = service.fetch_access_info(&self.pid).await?;
        self.seed(&info);
        Ok(())
    }

    /// Reset server and selected sets from an access-info response
    ///
    /// Roles the canonical list does not know are kept as custom roles.
    pub fn seed(&mut self, info: &AccessInfo) {
        self.server = info.role_ids();
        self.selected = self.server.clone();

        for role in &info.accessible_roles {
            if self.is_canonical(role.id) {
                continue;
            }
            let named = role
                .child_role
                .as_deref()
                .or(role.nama.as_deref())
                .is_some_and(|name| !name.trim().is_empty());
            let label = if named {
                role.display_name()
            } else {
                custom_label(role.id)
            };
            self.custom.entry(role.id).or_insert(label);
        }
        debug!(pid = %self.pid, roles = self.server.len(), "Access editor seeded");
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn is_selected(&self, role_id: i64) -> bool {
        self.selected.contains(&role_id)
    }

    /// Flip one role; returns whether it is now selected
    pub fn toggle(&mut self, role_id: i64) -> bool {
        if self.selected.remove(&role_id) {
            false
        } else {
            self.selected.insert(role_id);
            true
        }
    }

    /// Select every canonical and custom role
    pub fn select_all(&mut self) {
        let ids: Vec<i64> = self
            .roles
            .iter()
            .map(|role| role.id)
            .chain(self.custom.keys().copied())
            .collect();
        self.selected.extend(ids);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Grant access to a role id that may not exist in the role list
    pub fn add_custom_role(&mut self, role_id: i64, label: &str) -> Result<(), ValidationErrors> {
        if let Err(message) = validation::validate_role_id(role_id) {
            let mut errors = ValidationErrors::new();
            errors.add("role_id", message);
            return Err(errors);
        }

        if !self.is_canonical(role_id) {
            let label = label.trim();
            let label = if label.is_empty() {
                custom_label(role_id)
            } else {
                label.to_string()
            };
            self.custom.insert(role_id, label);
        }
        self.selected.insert(role_id);
        Ok(())
    }

    /// Forget a custom role entirely
    pub fn remove_custom_role(&mut self, role_id: i64) {
        if self.custom.remove(&role_id).is_some() {
            self.selected.remove(&role_id);
        }
    }

    /// Whether the selection differs from what the server holds
    pub fn has_changes(&self) -> bool {
        self.server != self.selected
    }

    /// Selected role ids, sorted
    pub fn role_ids(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    /// Role ids the server reported, sorted
    pub fn server_role_ids(&self) -> Vec<i64> {
        self.server.iter().copied().collect()
    }

    /// Canonical roles in list order, then custom roles by id
    pub fn rows(&self) -> Vec<RoleRow> {
        let canonical = self.roles.iter().map(|role| RoleRow {
            id: role.id,
            label: role.display_name(),
            description: role.description.clone(),
            selected: self.is_selected(role.id),
            custom: false,
        });
        let custom = self
            .custom
            .iter()
            .filter(|(id, _)| !self.is_canonical(**id))
            .map(|(id, label)| RoleRow {
                id: *id,
                label: label.clone(),
                description: None,
                selected: self.is_selected(*id),
                custom: true,
            });
        canonical.chain(custom).collect()
    }

    /// Send the complete selection, re-seed from the server and notify
    ///
    /// On failure the local selection is left untouched so the save can be
    /// retried.
    pub async fn save(
        &mut self,
        service: &AccessService,
        on_saved: impl FnOnce(&AccessInfo),
    ) -> ClientResult<AccessInfo> {
        let info = service.save_access(&self.pid, &self.selected).await?;
        self.seed(&info);
        on_saved(&info);
        Ok(info)
    }

    fn is_canonical(&self, role_id: i64) -> bool {
        self.roles.iter().any(|role| role.id == role_id)
    }
}

fn custom_label(role_id: i64) -> String {
    format!("Custom Role #{role_id}")
}
