use crate::error::AppError;

pub const ADMINS_GROUP: &str = "Admins";
pub const CUSTOMERS_GROUP: &str = "Customers";

/// Permissions vérifiées par les endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ViewData,
    AddData,
    ChangeData,
    DeleteData,
    ManageUsers,
}

impl Permission {
    pub fn codename(self) -> &'static str {
        match self {
            Permission::ViewData => "view_data",
            Permission::AddData => "add_data",
            Permission::ChangeData => "change_data",
            Permission::DeleteData => "delete_data",
            Permission::ManageUsers => "manage_users",
        }
    }

    pub fn denied(self) -> AppError {
        AppError::forbidden(format!(
            "You do not have permission to perform this action ({}).",
            self.codename()
        ))
    }
}

/// Libellé de rôle dérivé des groupes
pub fn role_label<S: AsRef<str>>(groups: &[S]) -> &'static str {
    let has = |name: &str| groups.iter().any(|g| g.as_ref() == name);
    if has(ADMINS_GROUP) {
        "Administrator"
    } else if has(CUSTOMERS_GROUP) {
        "Customer"
    } else {
        "No role assigned"
    }
}

/// Groupe cible d'une assignation de rôle: `admin`, `customer`, sinon aucun
pub fn group_for_role(role: &str) -> Option<&'static str> {
    match role.trim().to_ascii_lowercase().as_str() {
        "admin" => Some(ADMINS_GROUP),
        "customer" => Some(CUSTOMERS_GROUP),
        _ => None,
    }
}
