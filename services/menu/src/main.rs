use std::sync::Arc;

use anyhow::Result;
use common::{ClientConfig, SessionHandle};
use menu::MenuAdmin;
use menu::models::MenuTreeNode;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const TOKEN_VAR: &str = "MENU_ADMIN_TOKEN";
const FINGERPRINT_VAR: &str = "MENU_ADMIN_FINGERPRINT";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting menu admin");

    let config = ClientConfig::from_env()?;

    let session = SessionHandle::new();
    match std::env::var(TOKEN_VAR) {
        Ok(token) => session.login(token, std::env::var(FINGERPRINT_VAR).ok()),
        Err(_) => warn!("{TOKEN_VAR} is not set; requests will be refused"),
    }

    let admin = MenuAdmin::new(&config, Arc::new(session))?;

    tokio::join!(
        admin.store.fetch_menu_tree(),
        admin.store.get_menu_statistics(),
        admin.store.fetch_roles(),
    );

    let state = admin.store.snapshot().await;
    if let Some(error) = state.error() {
        anyhow::bail!("Failed to load menus: {error}");
    }

    if let Some(stats) = &state.statistics {
        info!(
            total = stats.total_menus,
            roots = stats.root_menus,
            max_depth = stats.max_depth,
            roles = state.roles.len(),
            "Menu statistics"
        );
    }

    for root in &state.tree {
        print_node(root);
    }

    admin.store.shutdown();
    Ok(())
}

fn print_node(node: &MenuTreeNode) {
    println!(
        "{}{} [{}] {}",
        "  ".repeat(node.depth()),
        node.node.nama,
        node.id(),
        node.node.url
    );
    for child in &node.children {
        print_node(child);
    }
}
