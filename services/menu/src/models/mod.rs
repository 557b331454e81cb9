//! Menu service models

pub mod access;
mod de;
pub mod menu;
pub mod role;

// Re-export for convenience
pub use access::{AccessInfo, AccessRole, SyncAccessRequest};
pub use menu::{
    MenuNode, MenuOption, MenuPayload, MenuStatistics, MenuTreeNode, Pagination, PidRequest,
    ReorderRequest, ROOT_PARENT_NAME, SENTINEL_URL, UpdateMenuPayload,
};
pub use role::Role;
