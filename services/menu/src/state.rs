//! Application state shared across views

use std::sync::Arc;

use common::{ApiClient, ClientConfig, ClientResult, TokenProvider};
use tracing::info;

use crate::access::{AccessEditor, AccessService};
use crate::repositories::MenuRepository;
use crate::store::MenuStore;

/// Menu store and access service wired to one API client
#[derive(Clone)]
pub struct MenuAdmin {
    pub client: ApiClient,
    pub store: MenuStore,
    pub access: AccessService,
}

impl MenuAdmin {
    /// Wire every component from configuration and a session
    pub fn new(config: &ClientConfig, session: Arc<dyn TokenProvider>) -> ClientResult<Self> {
        let client = ApiClient::new(config, session)?;
        let store = MenuStore::new(client.clone(), config);
        let access = AccessService::new(
            MenuRepository::new(client.clone(), config.menu_resource.clone()),
            config.access_refresh_delay(),
        );

        info!(base_url = %client.base_url(), "Menu admin initialized");
        Ok(Self {
            client,
            store,
            access,
        })
    }

    /// Load the grants of one menu into a fresh editor
    ///
    /// Uses the role list already held by the store.
    pub async fn open_access_editor(&self, menu_pid: &str) -> ClientResult<AccessEditor> {
        let roles = self.store.snapshot().await.roles;
        let mut editor = AccessEditor::new(menu_pid, roles);
        editor.load(&self.access).await?;
        Ok(editor)
    }
}
