//! Input validation for menu forms and reorder requests
//!
//! Everything here runs before a request is built; a failed check means the
//! API is never called.

use std::collections::HashSet;
use std::sync::OnceLock;

use common::{ClientError, ClientResult, ValidationErrors};
use regex::Regex;

use crate::models::{MenuNode, MenuPayload, SENTINEL_URL, menu::normalize_url};
use crate::tree;

const MAX_NAME_LEN: usize = 100;
const MAX_ICON_LEN: usize = 64;

/// Menu form as entered by the administrator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuForm {
    pub nama: String,
    pub icon: Option<String>,
    pub url: String,
    pub sequence_order: i64,
    pub parent_id: Option<i64>,
}

impl MenuForm {
    /// Pre-fill a form from an existing record
    pub fn from_node(node: &MenuNode) -> Self {
        Self {
            nama: node.nama.clone(),
            icon: node.icon.clone(),
            url: node.url.clone(),
            sequence_order: node.sequence_order as i64,
            parent_id: node.parent_id,
        }
    }
}

/// Validate menu name
pub fn validate_nama(nama: &str) -> Result<(), String> {
    let nama = nama.trim();
    if nama.is_empty() {
        return Err("Nama menu wajib diisi".to_string());
    }

    if nama.chars().count() > MAX_NAME_LEN {
        return Err(format!("Nama menu maksimal {MAX_NAME_LEN} karakter"));
    }

    Ok(())
}

/// Validate sibling order
pub fn validate_sequence_order(order: i64) -> Result<i32, String> {
    if order < 0 {
        return Err("Urutan tidak boleh negatif".to_string());
    }

    i32::try_from(order).map_err(|_| "Urutan terlalu besar".to_string())
}

/// Validate icon name; blank means no icon
pub fn validate_icon(icon: Option<&str>) -> Result<Option<String>, String> {
    let Some(icon) = icon.map(str::trim).filter(|icon| !icon.is_empty()) else {
        return Ok(None);
    };

    if icon.len() > MAX_ICON_LEN {
        return Err(format!("Nama ikon maksimal {MAX_ICON_LEN} karakter"));
    }

    static ICON_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = ICON_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Failed to compile icon regex"));

    if !regex.is_match(icon) {
        return Err("Nama ikon hanya boleh berisi huruf, angka, '-' dan '_'".to_string());
    }

    Ok(Some(icon.to_string()))
}

/// Validate url; blank becomes the sentinel
pub fn validate_url(url: &str) -> Result<String, String> {
    let url = normalize_url(url);
    if url == SENTINEL_URL {
        return Ok(url);
    }

    if url.chars().any(char::is_whitespace) {
        return Err("URL tidak boleh mengandung spasi".to_string());
    }

    let allowed = url.starts_with('/')
        || url.starts_with('#')
        || url.starts_with("http://")
        || url.starts_with("https://");
    if !allowed {
        return Err("URL harus diawali '/', '#' atau http(s)://".to_string());
    }

    Ok(url)
}

/// Validate the chosen parent of `editing`
///
/// `records` is the full known menu set; when it is empty only the
/// self-reference check applies.
pub fn validate_parent(
    parent_id: Option<i64>,
    editing: Option<i64>,
    records: &[MenuNode],
) -> Result<(), String> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };

    if editing == Some(parent_id) {
        return Err("Menu tidak dapat menjadi parent dirinya sendiri".to_string());
    }

    if records.is_empty() {
        return Ok(());
    }

    if !records.iter().any(|record| record.id == parent_id) {
        return Err("Parent menu tidak ditemukan".to_string());
    }

    if let Some(editing) = editing {
        let parents = tree::parent_map(records);
        if tree::would_create_cycle(&parents, parent_id, editing) {
            return Err("Parent tidak valid: menu turunan tidak dapat menjadi parent".to_string());
        }
    }

    Ok(())
}

/// Validate a whole form and produce the request payload
pub fn validate_menu_form(
    form: &MenuForm,
    editing: Option<i64>,
    records: &[MenuNode],
) -> Result<MenuPayload, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(message) = validate_nama(&form.nama) {
        errors.add("nama", message);
    }
    let sequence_order = validate_sequence_order(form.sequence_order)
        .map_err(|message| errors.add("sequence_order", message))
        .unwrap_or_default();
    let icon = validate_icon(form.icon.as_deref())
        .map_err(|message| errors.add("icon", message))
        .unwrap_or_default();
    let url = validate_url(&form.url)
        .map_err(|message| errors.add("url", message))
        .unwrap_or_default();
    if let Err(message) = validate_parent(form.parent_id, editing, records) {
        errors.add("parent_id", message);
    }

    errors.into_result()?;

    Ok(MenuPayload {
        nama: form.nama.trim().to_string(),
        icon,
        url,
        sequence_order,
        parent_id: form.parent_id,
    })
}

/// Validate a reorder batch against the known hierarchy
pub fn validate_reorder(
    menu_ids: &[i64],
    parent_id: Option<i64>,
    records: &[MenuNode],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if menu_ids.is_empty() {
        errors.add("menu_ids", "Tidak ada menu yang diurutkan");
    }

    let mut seen = HashSet::with_capacity(menu_ids.len());
    if menu_ids.iter().any(|id| !seen.insert(*id)) {
        errors.add("menu_ids", "Daftar menu mengandung duplikat");
    }

    if let Some(parent_id) = parent_id {
        if seen.contains(&parent_id) {
            errors.add("parent_id", "Menu tidak dapat menjadi parent dirinya sendiri");
        } else if !records.is_empty() {
            let parents = tree::parent_map(records);
            if menu_ids
                .iter()
                .any(|id| tree::would_create_cycle(&parents, parent_id, *id))
            {
                errors.add(
                    "parent_id",
                    "Parent tidak valid: menu turunan tidak dapat menjadi parent",
                );
            }
        }
    }

    errors.into_result()
}

/// Mutations need the public id of an existing menu
pub(crate) fn require_pid(pid: &str) -> ClientResult<()> {
    if pid.trim().is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add("pid", "Menu belum dipilih");
        return Err(ClientError::Validation(errors));
    }
    Ok(())
}

/// Validate an ad hoc role id
pub fn validate_role_id(role_id: i64) -> Result<(), String> {
    if role_id <= 0 {
        return Err("ID role harus bilangan bulat positif".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, nama: &str, parent_id: Option<i64>) -> MenuNode {
        MenuNode {
            id,
            pid: format!("pid-{id}"),
            nama: nama.to_string(),
            icon: None,
            url: "#".to_string(),
            sequence_order: 0,
            parent_id,
            parent_name: "-".to_string(),
            has_children: false,
            depth: 0,
        }
    }

    fn records() -> Vec<MenuNode> {
        vec![node(1, "A", None), node(2, "B", Some(1)), node(3, "C", Some(2))]
    }

    fn form(nama: &str) -> MenuForm {
        MenuForm {
            nama: nama.to_string(),
            ..MenuForm::default()
        }
    }

    #[test]
    fn test_blank_url_becomes_sentinel() {
        let payload = validate_menu_form(&form("Laporan"), None, &[]).unwrap();
        assert_eq!(payload.url, "#");

        let payload = validate_menu_form(
            &MenuForm {
                url: "   ".to_string(),
                ..form("Laporan")
            },
            None,
            &[],
        )
        .unwrap();
        assert_eq!(payload.url, "#");
    }

    #[test]
    fn test_negative_order_rejected() {
        let errors = validate_menu_form(
            &MenuForm {
                sequence_order: -1,
                ..form("Laporan")
            },
            None,
            &[],
        )
        .unwrap_err();
        assert_eq!(errors.get("sequence_order"), Some("Urutan tidak boleh negatif"));
    }

    #[test]
    fn test_collects_every_field_error() {
        let errors = validate_menu_form(
            &MenuForm {
                nama: " ".to_string(),
                icon: Some("bad icon!".to_string()),
                url: "laporan".to_string(),
                sequence_order: -5,
                parent_id: Some(1),
            },
            Some(1),
            &records(),
        )
        .unwrap_err();

        for field in ["nama", "icon", "url", "sequence_order", "parent_id"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_parent_cycle_rejected() {
        // A cannot move under its grandchild C
        let err = validate_parent(Some(3), Some(1), &records()).unwrap_err();
        assert!(err.contains("turunan"));

        assert!(validate_parent(Some(1), Some(3), &records()).is_ok());
        assert!(validate_parent(Some(42), Some(3), &records()).is_err());
        assert!(validate_parent(Some(42), None, &[]).is_ok());
    }

    #[test]
    fn test_payload_is_trimmed() {
        let payload = validate_menu_form(
            &MenuForm {
                nama: "  Master Data ".to_string(),
                icon: Some(" FaDatabase ".to_string()),
                url: " /master ".to_string(),
                sequence_order: 4,
                parent_id: None,
            },
            None,
            &[],
        )
        .unwrap();

        assert_eq!(payload.nama, "Master Data");
        assert_eq!(payload.icon.as_deref(), Some("FaDatabase"));
        assert_eq!(payload.url, "/master");
        assert_eq!(payload.sequence_order, 4);
    }

    #[test]
    fn test_validate_reorder() {
        assert!(validate_reorder(&[2, 3], Some(1), &records()).is_ok());
        assert!(validate_reorder(&[2, 3], Some(2), &records()).is_err());
        assert!(validate_reorder(&[], None, &records()).is_err());
        assert!(validate_reorder(&[2, 2], None, &records()).is_err());
        assert!(validate_reorder(&[1], Some(3), &records()).is_err());
        assert!(validate_reorder(&[3], Some(1), &records()).is_ok());
        assert!(validate_reorder(&[1, 4], None, &records()).is_ok());
    }

    #[test]
    fn test_validate_role_id() {
        assert!(validate_role_id(7).is_ok());
        assert!(validate_role_id(0).is_err());
        assert!(validate_role_id(-3).is_err());
    }
}
