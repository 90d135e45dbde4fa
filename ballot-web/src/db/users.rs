//! User account queries

use ballot_common::auth::{generate_salt, hash_password};
use ballot_common::db::models::User;
use ballot_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Field bundle for registration
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub birthday: Option<&'a str>,
}

/// User row with the stored credential columns, for login verification
#[derive(Debug)]
pub struct UserAuth {
    pub user: User,
    pub password_hash: String,
    pub password_salt: String,
}

/// Insert a new user with a fresh guid, salt and password hash
///
/// A taken username surfaces as a UNIQUE violation in the returned error.
pub async fn create_user(db: &SqlitePool, new: &NewUser<'_>) -> Result<User> {
    let guid = Uuid::new_v4().to_string();
    let salt = generate_salt();
    let hash = hash_password(new.password, &salt);

    sqlx::query(
        r#"
        INSERT INTO users (guid, username, password_hash, password_salt, name, email, birthday)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(new.username)
    .bind(&hash)
    .bind(&salt)
    .bind(new.name)
    .bind(new.email)
    .bind(new.birthday)
    .execute(db)
    .await?;

    Ok(User {
        guid,
        username: new.username.to_string(),
        name: new.name.to_string(),
        email: new.email.to_string(),
        birthday: new.birthday.map(|s| s.to_string()),
    })
}

/// Look up a user by username together with the stored credentials
pub async fn find_auth_by_username(db: &SqlitePool, username: &str) -> Result<Option<UserAuth>> {
    let row = sqlx::query_as::<
        _,
        (String, String, String, String, String, String, Option<String>),
    >(
        "SELECT guid, username, password_hash, password_salt, name, email, birthday \
         FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(row.map(
        |(guid, username, password_hash, password_salt, name, email, birthday)| UserAuth {
            user: User {
                guid,
                username,
                name,
                email,
                birthday,
            },
            password_hash,
            password_salt,
        },
    ))
}

/// Look up a user profile by guid
pub async fn get_user(db: &SqlitePool, guid: &str) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, (String, String, String, String, Option<String>)>(
        "SELECT guid, username, name, email, birthday FROM users WHERE guid = ?",
    )
    .bind(guid)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|(guid, username, name, email, birthday)| User {
        guid,
        username,
        name,
        email,
        birthday,
    }))
}

/// Stored (password_hash, password_salt) pair for a user
pub async fn get_credentials(db: &SqlitePool, guid: &str) -> Result<Option<(String, String)>> {
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT password_hash, password_salt FROM users WHERE guid = ?",
    )
    .bind(guid)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Update the profile fields of a user
pub async fn update_profile(
    db: &SqlitePool,
    guid: &str,
    name: &str,
    email: &str,
    birthday: Option<&str>,
) -> Result<()> {
    sqlx::query(
        "UPDATE users SET name = ?, email = ?, birthday = ?, updated_at = CURRENT_TIMESTAMP \
         WHERE guid = ?",
    )
    .bind(name)
    .bind(email)
    .bind(birthday)
    .bind(guid)
    .execute(db)
    .await?;

    Ok(())
}

/// Replace a user's password with a freshly salted hash
pub async fn update_password(db: &SqlitePool, guid: &str, new_password: &str) -> Result<()> {
    let salt = generate_salt();
    let hash = hash_password(new_password, &salt);

    sqlx::query(
        "UPDATE users SET password_hash = ?, password_salt = ?, updated_at = CURRENT_TIMESTAMP \
         WHERE guid = ?",
    )
    .bind(&hash)
    .bind(&salt)
    .bind(guid)
    .execute(db)
    .await?;

    Ok(())
}

/// Delete a user; sessions cascade. Returns false when the guid is unknown.
pub async fn delete_user(db: &SqlitePool, guid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE guid = ?")
        .bind(guid)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
