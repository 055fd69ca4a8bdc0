//! Authentication
//!
//! Bearer tokens are HS256 JWTs issued by the identity provider. The API
//! only reads the subject, the linked employee record and the roles.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use core_kernel::EmployeeId;
use domain_travel::{Actor, Role};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Employee record of the user, absent for pure staff accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Uuid>,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// The acting user described by the token
    ///
    /// Roles this service does not know are ignored.
    pub fn to_actor(&self) -> Actor {
        let roles: BTreeSet<Role> = self
            .roles
            .iter()
            .filter_map(|name| match Role::from_str(name) {
                Ok(role) => Some(role),
                Err(_) => {
                    debug!(user = %self.sub, role = %name, "Ignoring unknown role");
                    None
                }
            })
            .collect();

        Actor::new(self.sub.clone(), self.employee_id.map(EmployeeId::from_uuid), roles)
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token could not be issued: {0}")]
    Issue(String),
}

/// Creates a signed token
pub fn create_token(
    user_id: &str,
    employee_id: Option<Uuid>,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let lifetime = i64::try_from(expiration_secs).map_err(|e| AuthError::Issue(e.to_string()))?;
    let exp = now + Duration::seconds(lifetime);

    let claims = Claims {
        sub: user_id.to_string(),
        employee_id,
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Issue(e.to_string()))
}

/// Validates a token and returns its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
