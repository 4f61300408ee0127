use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Usuario,
    Admin,
    Docente,
    Alumno,
    Gtiv,
    JefeCarrera,
    User,
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Roles offered by the admin table.
    pub const ASSIGNABLE: [Role; 6] = [
        Role::User,
        Role::Admin,
        Role::Docente,
        Role::Alumno,
        Role::Gtiv,
        Role::JefeCarrera,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Role::Usuario | Role::User => "Usuario",
            Role::Admin => "Administrador",
            Role::Docente => "Docente",
            Role::Alumno => "Alumno",
            Role::Gtiv => "GTIV",
            Role::JefeCarrera => "Jefe de Carrera",
            Role::Unknown => "Desconocido",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "pase")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(alias = "rol")]
    pub role: Role,
    #[serde(default, alias = "_id", alias = "id")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "pase")]
    pub password: String,
    #[serde(rename = "nombre")]
    pub full_name: String,
    #[serde(rename = "rol")]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "correo", default)]
    pub email: String,
    #[serde(alias = "rol", default = "unknown_role")]
    pub role: Role,
}

fn unknown_role() -> Role {
    Role::Unknown
}

/// Profile edit body. Blank fields are left out so the server keeps them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "correo", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "pase", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProfileUpdate {
    pub fn from_form(name: &str, email: &str, password: &str) -> Self {
        let keep = |v: &str| (!v.trim().is_empty()).then(|| v.trim().to_string());
        Self {
            name: keep(name),
            email: keep(email),
            password: (!password.is_empty()).then(|| password.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// Admin PATCH body for one user row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "correo", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none() && self.password.is_none()
    }
}

impl UserProfile {
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(role) = &update.role {
            self.role = role.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_accepts_rol_alias() {
        let res: LoginResponse =
            serde_json::from_str(r#"{"token": "t", "rol": "ADMIN", "_id": "u1"}"#).unwrap();
        assert_eq!(res.role, Role::Admin);
        assert_eq!(res.user_id.as_deref(), Some("u1"));

        let res: LoginResponse =
            serde_json::from_str(r#"{"token": "t", "role": "SUPERVISOR"}"#).unwrap();
        assert_eq!(res.role, Role::Unknown);
    }

    #[test]
    fn register_body_uses_backend_field_names() {
        let body = serde_json::to_value(RegisterRequest {
            email: "ana@uni.mx".into(),
            password: "secreto".into(),
            full_name: "Ana".into(),
            role: Role::Usuario,
        })
        .unwrap();
        assert_eq!(body["correo"], "ana@uni.mx");
        assert_eq!(body["pase"], "secreto");
        assert_eq!(body["nombre"], "Ana");
        assert_eq!(body["rol"], "USUARIO");
    }

    #[test]
    fn profile_update_skips_blank_fields() {
        let update = ProfileUpdate::from_form("  ", "nuevo@uni.mx", "");
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, serde_json::json!({"correo": "nuevo@uni.mx"}));
        assert!(ProfileUpdate::from_form("", "", "").is_empty());
    }

    #[test]
    fn applies_admin_edit_to_row() {
        let mut row = UserProfile {
            id: "1".into(),
            name: "Ana".into(),
            email: "ana@uni.mx".into(),
            role: Role::User,
        };
        row.apply(&UserUpdate {
            role: Some(Role::Docente),
            password: Some("x".into()),
            ..Default::default()
        });
        assert_eq!(row.role, Role::Docente);
        assert_eq!(row.name, "Ana");
        assert_eq!(Role::JefeCarrera.to_string(), "JEFECARRERA");
    }
}
