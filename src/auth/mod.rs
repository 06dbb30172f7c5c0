//! Bearer-token validation and role checks.
//!
//! Token issuance belongs to the identity service; this API only validates
//! the `Authorization: Bearer <token>` header it receives and exposes the
//! caller's roles to handlers.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{errors::ServiceError, AppState};

/// Staff role names carried in token claims.
pub mod roles {
    /// Dealer-side staff: create quotations, convert approved quotations.
    pub const DEALER_STAFF: &str = "dealer_staff";
    /// Manufacturer-side staff: approve/reject quotations, own promotions
    /// and inventory writes.
    pub const EVM_STAFF: &str = "evm_staff";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: staff user id
    pub sub: String,
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
}

/// Authenticated staff member extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Role guard used at the top of privileged handlers.
    pub fn require_role(&self, role: &str) -> Result<(), ServiceError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "this operation requires the {role} role"
            )))
        }
    }
}

/// Validates a bearer token and returns its claims.
pub fn validate_token(token: &str, secret: &str, issuer: &str) -> Result<Claims, ServiceError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))?;

    Ok(data.claims)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized("missing Authorization header".to_string())
            })?;

        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            ServiceError::Unauthorized("Authorization header must be a bearer token".to_string())
        })?;

        let claims = validate_token(
            token.trim(),
            &state.config.jwt_secret,
            &state.config.auth_issuer,
        )?;

        Ok(AuthUser {
            user_id: claims.sub,
            name: claims.name,
            roles: claims.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "a_test_secret_key_that_is_long_enough_for_validation";
    const ISSUER: &str = "ev-sales-portal";

    fn mint(roles: &[&str], iss: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "42".to_string(),
            name: Some("Test Staff".to_string()),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            iss: iss.to_string(),
            exp: (now + exp_offset) as usize,
            iat: now as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_round_trips_claims() {
        let token = mint(&[roles::DEALER_STAFF], ISSUER, 3600);
        let claims = validate_token(&token, SECRET, ISSUER).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.roles, vec![roles::DEALER_STAFF.to_string()]);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = mint(&[roles::DEALER_STAFF], ISSUER, -3600);
        assert!(validate_token(&token, SECRET, ISSUER).is_err());
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let token = mint(&[roles::DEALER_STAFF], "someone-else", 3600);
        assert!(validate_token(&token, SECRET, ISSUER).is_err());
    }

    #[test]
    fn role_guard_distinguishes_staff_kinds() {
        let user = AuthUser {
            user_id: "42".to_string(),
            name: None,
            roles: vec![roles::DEALER_STAFF.to_string()],
        };
        assert!(user.require_role(roles::DEALER_STAFF).is_ok());
        assert!(matches!(
            user.require_role(roles::EVM_STAFF),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
