use serde::{Deserialize, Serialize};

// -------- AUTH FORMS --------
// Les formulaires arrivent en x-www-form-urlencoded: un champ absent vaut "".

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password1: String, // Plain text
    pub password2: String, // Confirmation
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String, // Plain text
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RoleAssignmentRequest {
    pub user_id: i32,
    /// "admin", "customer", anything else removes every role
    pub role: String,
}

// -------- CRUD BODIES --------

/// Body of every DELETE endpoint
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default)]
pub struct DeleteRequest {
    #[serde(default)]
    pub id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Table2Input {
    #[serde(default)]
    pub id: Option<i32>,
    /// Nombre ou chaîne numérique, contrôlé côté service
    #[serde(default)]
    pub positive_small_int: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Table3Input {
    #[serde(default)]
    pub id: Option<i32>,
    /// "DD HH:MM:SS" or "HH:MM:SS"
    #[serde(default)]
    pub duration_field: Option<String>,
    #[serde(default)]
    pub email_field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_defaults_missing_fields_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert_eq!(req.username, "bob");
        assert!(req.password1.is_empty());
        assert!(req.password2.is_empty());
    }

    #[test]
    fn table3_input_accepts_partial_update() {
        let input: Table3Input = serde_json::from_str(r#"{"id":4,"email_field":"a@b.io"}"#).unwrap();
        assert_eq!(input.id, Some(4));
        assert!(input.duration_field.is_none());
    }
}
