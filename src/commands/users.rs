use crate::database::{Database, User};
use crate::error::AppError;
use std::sync::Arc;
use tauri::State;

/// Get all users
#[tauri::command]
pub async fn get_users(db: State<'_, Arc<Database>>) -> Result<Vec<User>, AppError> {
    db.list_users().map_err(AppError::from)
}

/// Create a user. A blank name or email makes this a silent no-op and
/// returns None, matching the form's submit behavior.
#[tauri::command]
pub async fn create_user(
    db: State<'_, Arc<Database>>,
    name: String,
    email: String,
) -> Result<Option<i64>, AppError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() {
        return Ok(None);
    }

    log::info!("Creating user: {} <{}>", name, email);
    let id = db.create_user(name, email).map_err(AppError::from)?;
    Ok(Some(id))
}

/// Update a user. Blank fields or an unknown id change nothing; returns
/// whether a row was updated.
#[tauri::command]
pub async fn update_user(
    db: State<'_, Arc<Database>>,
    user_id: i64,
    name: String,
    email: String,
) -> Result<bool, AppError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() {
        return Ok(false);
    }

    log::info!("Updating user {}: {} <{}>", user_id, name, email);
    let changed = db
        .update_user(user_id, name, email)
        .map_err(AppError::from)?;
    Ok(changed > 0)
}

/// Delete a user and, through the cascade, every audio file, transcription
/// and analysis they own.
#[tauri::command]
pub async fn delete_user(db: State<'_, Arc<Database>>, user_id: i64) -> Result<(), AppError> {
    log::info!("Deleting user {}", user_id);
    db.delete_user(user_id).map_err(AppError::from)
}
