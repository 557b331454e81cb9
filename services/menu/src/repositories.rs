//! Repositories for the menu and role endpoints

use common::{ApiClient, ClientResult, GridQuery, ListPayload, ReadPolicy};
use serde_json::Value;

use crate::models::{
    AccessInfo, MenuNode, MenuOption, MenuPayload, MenuStatistics, PidRequest, ReorderRequest,
    Role, SyncAccessRequest, UpdateMenuPayload,
};

/// Menu repository for API operations
#[derive(Clone)]
pub struct MenuRepository {
    client: ApiClient,
    resource: String,
}

impl MenuRepository {
    /// Create a new menu repository
    pub fn new(client: ApiClient, resource: impl Into<String>) -> Self {
        Self {
            client,
            resource: resource.into().trim_matches('/').to_string(),
        }
    }

    fn path(&self, endpoint: &str) -> String {
        format!("{}/{}", self.resource, endpoint)
    }

    /// Get one page of flat records
    ///
    /// Always fresh: the grid reflects search and ordering set moments ago.
    pub async fn list(&self, query: &GridQuery) -> ClientResult<ListPayload<MenuNode>> {
        self.client
            .get(&self.path("data"), &query.to_pairs(), ReadPolicy::Fresh)
            .await
    }

    /// Get the whole menu set in one page
    pub async fn all(&self, page_size: u32) -> ClientResult<Vec<MenuNode>> {
        let query = GridQuery::for_page(1, page_size);
        let payload: ListPayload<MenuNode> = self
            .client
            .get(&self.path("data"), &query.to_pairs(), ReadPolicy::Cached)
            .await?;
        Ok(payload.into_items())
    }

    /// Get parent-selection options
    pub async fn options(&self) -> ClientResult<Vec<MenuOption>> {
        self.client
            .get(&self.path("options"), &[], ReadPolicy::Cached)
            .await
    }

    /// Get server-side aggregate counts
    pub async fn statistics(&self) -> ClientResult<MenuStatistics> {
        self.client
            .get(&self.path("statistics"), &[], ReadPolicy::Cached)
            .await
    }

    /// Create a menu; returns the canonical record when the server sends one
    pub async fn store(&self, payload: &MenuPayload) -> ClientResult<Option<MenuNode>> {
        let data: Value = self.client.post(&self.path("store"), payload).await?;
        Ok(serde_json::from_value(data).ok())
    }

    /// Update a menu by pid
    pub async fn update(&self, payload: &UpdateMenuPayload) -> ClientResult<Option<MenuNode>> {
        let data: Value = self.client.post(&self.path("update"), payload).await?;
        Ok(serde_json::from_value(data).ok())
    }

    /// Delete a menu by pid
    pub async fn delete(&self, pid: &str) -> ClientResult<()> {
        let request = PidRequest {
            pid: pid.to_string(),
        };
        let _: Value = self.client.post(&self.path("hapus"), &request).await?;
        Ok(())
    }

    /// Persist a new sibling order, optionally under a new parent
    pub async fn reorder(&self, request: &ReorderRequest) -> ClientResult<()> {
        let _: Value = self.client.post(&self.path("reorder"), request).await?;
        Ok(())
    }

    /// Get the roles allowed to see a menu; never served from a cache
    pub async fn access_info(&self, pid: &str) -> ClientResult<AccessInfo> {
        let query = vec![("pid".to_string(), pid.to_string())];
        self.client
            .get(&self.path("access-info"), &query, ReadPolicy::Fresh)
            .await
    }

    /// Replace the complete role set of a menu
    pub async fn sync_access(&self, request: &SyncAccessRequest) -> ClientResult<()> {
        let _: Value = self.client.post(&self.path("sync-access"), request).await?;
        Ok(())
    }
}

/// Role repository for API operations
#[derive(Clone)]
pub struct RoleRepository {
    client: ApiClient,
    resource: String,
    page_size: u32,
}

impl RoleRepository {
    /// Create a new role repository
    pub fn new(client: ApiClient, resource: impl Into<String>, page_size: u32) -> Self {
        Self {
            client,
            resource: resource.into().trim_matches('/').to_string(),
            page_size,
        }
    }

    /// Get the canonical role list
    pub async fn list(&self) -> ClientResult<Vec<Role>> {
        let query = GridQuery::for_page(1, self.page_size);
        let payload: ListPayload<Role> = self
            .client
            .get(
                &format!("{}/data", self.resource),
                &query.to_pairs(),
                ReadPolicy::Cached,
            )
            .await?;
        Ok(payload.into_items())
    }
}
