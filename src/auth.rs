use thiserror::Error;

use crate::models::{Role, Session, User};
use crate::store::{Store, StoreError, keys, read_record, write_record};

/// The office account. Always an administrator, whatever the stored
/// record says: its role is recomputed at every login and at startup.
pub const PRIVILEGED_EMAIL: &str = "fortuna@hotmail.com";
const PRIVILEGED_PASSWORD: &str = "karolayn";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Usuario ya existe")]
    DuplicateUser,
    #[error("Credenciales incorrectas")]
    BadCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn role_for(email: &str) -> Role {
    if email == PRIVILEGED_EMAIL {
        Role::Admin
    } else {
        Role::User
    }
}

/// Create a user and immediately open a session for it. Fails if the
/// email is already taken, leaving the stored user list untouched.
pub async fn register(
    store: &dyn Store,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let mut users: Vec<User> = read_record(store, keys::USERS).await?;
    if users.iter().any(|u| u.email == email) {
        return Err(AuthError::DuplicateUser);
    }

    let user = User {
        email: email.to_string(),
        password: password.to_string(),
        role: role_for(email),
    };
    let session = Session {
        email: user.email.clone(),
        role: user.role,
    };

    users.push(user);
    write_record(store, keys::USERS, &users).await?;
    write_record(store, keys::SESSION, &session).await?;

    Ok(session)
}

/// Exact match on both fields. The privileged email always gets an
/// admin session, even if its stored record was downgraded.
pub async fn login(store: &dyn Store, email: &str, password: &str) -> Result<Session, AuthError> {
    let users: Vec<User> = read_record(store, keys::USERS).await?;
    let user = users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .ok_or(AuthError::BadCredentials)?;

    let role = if user.email == PRIVILEGED_EMAIL {
        Role::Admin
    } else {
        user.role
    };
    let session = Session {
        email: user.email.clone(),
        role,
    };
    write_record(store, keys::SESSION, &session).await?;

    Ok(session)
}

/// Startup pass: seed the office account if it is missing, and repair a
/// leftover session for it that lost the admin role.
pub async fn bootstrap(store: &dyn Store) -> Result<(), AuthError> {
    let mut users: Vec<User> = read_record(store, keys::USERS).await?;
    if !users.iter().any(|u| u.email == PRIVILEGED_EMAIL) {
        users.push(User {
            email: PRIVILEGED_EMAIL.to_string(),
            password: PRIVILEGED_PASSWORD.to_string(),
            role: Role::Admin,
        });
        write_record(store, keys::USERS, &users).await?;
    }

    if let Some(mut session) = current_session(store).await? {
        if session.email == PRIVILEGED_EMAIL && session.role != Role::Admin {
            session.role = Role::Admin;
            write_record(store, keys::SESSION, &session).await?;
        }
    }

    Ok(())
}

pub async fn logout(store: &dyn Store) -> Result<(), AuthError> {
    store.remove(keys::SESSION).await?;
    Ok(())
}

pub async fn current_session(store: &dyn Store) -> Result<Option<Session>, AuthError> {
    Ok(read_record(store, keys::SESSION).await?)
}
