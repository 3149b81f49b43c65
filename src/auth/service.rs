use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{BankDetails, User, UserRole, WithdrawalLimitConfig};
use crate::store::UserStore;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // user id
    pub role: String, // role name, checked again per admin route
    pub exp: usize,
    pub iat: usize,
}

/// Successful login payload.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

pub struct AuthService {
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            jwt_secret,
            token_ttl_hours,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Verify credentials and issue a JWT.
    pub async fn login(
        &self,
        pool: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        let user = UserStore::get_by_email(pool, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed_hash =
            PasswordHash::new(&user.password_hash).map_err(|_| AuthError::InvalidCredentials)?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let token = self.issue_token(&user)?;

        Ok(AuthResponse {
            token,
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        })
    }

    fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.token_ttl_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|_| AuthError::InvalidToken)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
    }

    /// Create a vendor account (admin operation). Returns the user and the
    /// plaintext password, shown exactly once.
    pub async fn create_vendor(
        &self,
        pool: &PgPool,
        email: &str,
        name: &str,
        password: Option<String>,
        bank_details: Option<BankDetails>,
        upi_id: Option<String>,
    ) -> Result<(User, String), AuthError> {
        if UserStore::get_by_email(pool, email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password = password.unwrap_or_else(generate_password);
        let password_hash = self.hash_password(&password)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            name: name.to_string(),
            role: UserRole::Vendor,
            bank_details,
            upi_id,
            qr_code: None,
            withdrawal_limit_config: WithdrawalLimitConfig::Global,
            max_withdrawal_limit: None,
            created_at: now,
            updated_at: now,
        };

        let mut conn = pool.acquire().await?;
        UserStore::create(&mut conn, &user).await?;

        tracing::info!(vendor_id = %user.id, "Vendor account created");
        Ok((user, password))
    }

    /// Configure a vendor's withdrawal limit (admin operation).
    pub async fn set_withdrawal_limit(
        &self,
        pool: &PgPool,
        vendor_id: Uuid,
        config: WithdrawalLimitConfig,
        max_limit: Option<Decimal>,
    ) -> Result<bool, AuthError> {
        Ok(UserStore::update_withdrawal_limit(pool, vendor_id, config, max_limit).await?)
    }
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn service() -> AuthService {
        AuthService::new("test-secret".to_string(), 24)
    }

    fn user(service: &AuthService) -> User {
        User {
            id: Uuid::new_v4(),
            email: "vendor@test.local".to_string(),
            password_hash: service.hash_password("hunter2").unwrap(),
            name: "Vendor".to_string(),
            role: UserRole::Vendor,
            bank_details: None,
            upi_id: None,
            qr_code: None,
            withdrawal_limit_config: WithdrawalLimitConfig::Global,
            max_withdrawal_limit: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_verifies() {
        let service = service();
        let hash = service.hash_password("hunter2").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"hunter2", &parsed)
                .is_ok()
        );
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[test]
    fn test_token_roundtrip() {
        let service = service();
        let user = user(&service);

        let token = service.issue_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "VENDOR");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = service();
        let user = user(&service);

        let mut token = service.issue_token(&user).unwrap();
        token.push('x');
        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn test_generated_password_shape() {
        let password = generate_password();
        assert_eq!(password.len(), 12);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
