use serde::Serialize;

/// Role granted access to the admin-only endpoints.
pub const ADMIN_ROLE: &str = "Administrador";

/// Row of the credentials `users` table.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub usuario: String,
    pub nombre: String,
    pub rol: String,
    pub num_empleado: Option<String>,
    #[serde(skip)]
    pub pass_hash: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.rol == ADMIN_ROLE
    }
}
