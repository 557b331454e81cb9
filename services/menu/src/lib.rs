//! Menu hierarchy and access-control management
//!
//! Client-side core of the back-office menu screens: a store that mirrors the
//! server's menu records as a flat page and as a forest, validation that keeps
//! the hierarchy acyclic, and full-replace synchronization of which roles may
//! see each menu node.

pub mod access;
pub mod filter;
pub mod models;
pub mod repositories;
pub mod state;
pub mod store;
pub mod tree;
pub mod validation;

pub use access::{AccessEditor, AccessService, RoleRow};
pub use filter::{MenuFilter, ParentFilter};
pub use state::MenuAdmin;
pub use store::{MenuState, MenuStore};
pub use validation::MenuForm;
