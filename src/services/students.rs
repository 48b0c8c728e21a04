use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::models::{CreateStudent, NewStudent, User};

#[derive(Error, Debug)]
pub enum StudentError {
    #[error("Preencha todos os campos!")]
    MissingFields,

    #[error("Erro ao processar a senha.")]
    PasswordHash,

    #[error("Erro ao salvar aluno.")]
    Backend(#[from] BackendError),
}

/// Only the argon2 hash of the password leaves the console.
pub fn hash_password(password: &str) -> Result<String, StudentError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| StudentError::PasswordHash)?
        .to_string();
    Ok(hash)
}

pub async fn create_student(
    backend: &dyn Backend,
    form: &CreateStudent,
) -> Result<User, StudentError> {
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(StudentError::MissingFields);
    }

    let student = NewStudent {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(&form.password)?,
    };
    let user = backend.create_student(&student).await?;
    tracing::info!(student_id = %user.id, "Registered student");
    Ok(user)
}

/// Removes the linked auth record first, then the roster row. A failure
/// of the first step leaves the roster untouched.
pub async fn delete_student(
    backend: &dyn Backend,
    student_id: &str,
    auth_id: Option<&str>,
) -> Result<(), StudentError> {
    if let Some(auth_id) = auth_id.filter(|id| !id.is_empty()) {
        backend.delete_auth_user(auth_id).await?;
    }
    backend.delete_user(student_id).await?;
    tracing::info!(student_id, "Deleted student");
    Ok(())
}
