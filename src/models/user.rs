use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UserRole {
    #[default]
    Student,
    Staff,
}

impl UserRole {
    /// Value of the `tipo` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "aluno",
            UserRole::Staff => "professor",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "aluno" => UserRole::Student,
            _ => UserRole::Staff,
        }
    }

    pub fn is_student(&self) -> bool {
        matches!(self, UserRole::Student)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Identifier of the matching authentication record, when one exists.
    pub auth_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn created_on(&self) -> String {
        self.created_at
            .map(|at| at.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "—".to_string())
    }
}

impl FromSqliteRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let role: String = row.get("tipo")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("nome")?,
            email: row.get("email")?,
            role: UserRole::parse(&role),
            auth_id: row.get("auth_id")?,
            created_at: row.get("criado_em")?,
        })
    }
}

/// Roster form payload.
#[derive(Debug, Deserialize)]
pub struct CreateStudent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Student record as handed to the backend. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_user_role_round_trip() {
        assert_eq!(UserRole::parse(UserRole::Student.as_str()), UserRole::Student);
        assert_eq!(UserRole::parse(UserRole::Staff.as_str()), UserRole::Staff);
    }

    #[test]
    fn test_unknown_role_is_not_student() {
        assert!(!UserRole::parse("admin").is_student());
        assert!(!UserRole::parse("").is_student());
        assert!(UserRole::parse("aluno").is_student());
    }

    #[test]
    fn test_created_on_formats_date() {
        let mut user = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: UserRole::Student,
            auth_id: None,
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()),
        };
        assert_eq!(user.created_on(), "05/03/2024");

        user.created_at = None;
        assert_eq!(user.created_on(), "—");
    }
}
