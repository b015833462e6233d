use crate::database::{MongoDB, USERS_COLLECTION};
use crate::models::User;
use crate::services::email_service::Mailer;
use crate::utils::error::ApiError;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, DateTime as BsonDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Verification codes are valid for 9 minutes after issuance.
pub const VERIFICATION_WINDOW_MINUTES: i64 = 9;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub verified: bool,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VerifyRequest {
    pub code: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub verified: bool,
}

fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

fn get_jwt_issuer() -> String {
    std::env::var("JWT_ISSUER").unwrap_or_else(|_| "finance-service".to_string())
}

fn get_jwt_audience() -> String {
    std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "finance-api".to_string())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Generate JWT token (24h expiry)
pub fn generate_jwt(user: &User) -> Result<String, ApiError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let jti = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user.user_id.clone(),
        email: user.email.clone(),
        verified: user.verified,
        iat,
        exp,
        jti,
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[get_jwt_audience()]);

    let mut issuers = HashSet::new();
    issuers.insert(get_jwt_issuer());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

/// Random 6-digit verification code, zero-padded.
pub fn generate_verification_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// A code issued more than 9 minutes ago no longer verifies.
pub fn code_expired(sent_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - sent_at > Duration::minutes(VERIFICATION_WINDOW_MINUTES)
}

async fn find_by_user_id(db: &MongoDB, user_id: &str) -> Result<Option<User>, ApiError> {
    let collection = db.collection::<User>(USERS_COLLECTION);
    collection
        .find_one(doc! { "user_id": user_id })
        .await
        .map_err(ApiError::database)
}

/// Stores a fresh bcrypt-hashed code + timestamp for the user, then emails
/// the plaintext code. Called on signup, unverified login, and re-send.
async fn rotate_verification_code(
    db: &MongoDB,
    mailer: &Mailer,
    user: &User,
) -> Result<(), ApiError> {
    let code = generate_verification_code();
    let code_hash = hash(&code, DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("Failed to hash verification code: {}", e)))?;

    let collection = db.collection::<User>(USERS_COLLECTION);
    collection
        .update_one(
            doc! { "user_id": &user.user_id },
            doc! { "$set": {
                "verification_code": code_hash,
                "verification_sent_at": BsonDateTime::now(),
                "updated_at": BsonDateTime::now(),
            }},
        )
        .await
        .map_err(ApiError::database)?;

    mailer.send_verification_code(&user.email, &code).await
}

// User signup: create an unverified account, email a verification code,
// return a signed token.
pub async fn signup(
    db: &MongoDB,
    mailer: &Mailer,
    request: &SignupRequest,
) -> Result<AuthResponse, ApiError> {
    let collection = db.collection::<User>(USERS_COLLECTION);
    let email = normalize_email(&request.email);

    let existing = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(ApiError::database)?;
    if existing.is_some() {
        return Err(ApiError::EmailAlreadyExists);
    }

    let password_hash = hash(&request.password, DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    let user = User {
        _id: None,
        user_id: Uuid::new_v4().to_string(),
        email,
        password: password_hash,
        verified: false,
        verification_code: None,
        verification_sent_at: None,
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    };

    collection
        .insert_one(&user)
        .await
        .map_err(ApiError::database)?;

    rotate_verification_code(db, mailer, &user).await?;

    log::info!("✅ User registered: {}", user.email);

    let token = generate_jwt(&user)?;
    Ok(AuthResponse {
        token,
        verified: false,
    })
}

// User login. An unverified account gets a fresh verification code on every
// attempt but still receives a token.
pub async fn login(
    db: &MongoDB,
    mailer: &Mailer,
    request: &LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let collection = db.collection::<User>(USERS_COLLECTION);
    let email = normalize_email(&request.email);

    let user = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(ApiError::database)?
        .ok_or(ApiError::InvalidEmailPassword)?;

    let valid = verify(&request.password, &user.password)
        .map_err(|e| ApiError::Internal(format!("Password verification error: {}", e)))?;
    if !valid {
        return Err(ApiError::InvalidEmailPassword);
    }

    if !user.verified {
        log::info!("🔁 Unverified login, re-sending code: {}", user.email);
        rotate_verification_code(db, mailer, &user).await?;
    }

    let token = generate_jwt(&user)?;
    Ok(AuthResponse {
        token,
        verified: user.verified,
    })
}

// Mark the account verified when the submitted code matches the stored hash
// and was issued within the validity window.
pub async fn verify_account(db: &MongoDB, user_id: &str, code: &str) -> Result<(), ApiError> {
    let user = find_by_user_id(db, user_id)
        .await?
        .ok_or(ApiError::NoPermission)?;

    let code_hash = user
        .verification_code
        .as_ref()
        .ok_or(ApiError::InvalidVerificationCode)?;
    let sent_at = user
        .verification_sent_at
        .and_then(|ts| DateTime::from_timestamp_millis(ts.timestamp_millis()))
        .ok_or(ApiError::InvalidVerificationCode)?;

    if code_expired(sent_at, Utc::now()) {
        return Err(ApiError::InvalidVerificationCode);
    }

    let matches = verify(code, code_hash)
        .map_err(|e| ApiError::Internal(format!("Code verification error: {}", e)))?;
    if !matches {
        return Err(ApiError::InvalidVerificationCode);
    }

    let collection = db.collection::<User>(USERS_COLLECTION);
    collection
        .update_one(
            doc! { "user_id": user_id },
            doc! {
                "$set": { "verified": true, "updated_at": BsonDateTime::now() },
                "$unset": { "verification_code": "", "verification_sent_at": "" },
            },
        )
        .await
        .map_err(ApiError::database)?;

    log::info!("✅ Account verified: {}", user.email);
    Ok(())
}

// Re-send a fresh verification code for the authenticated user.
pub async fn resend_verification(
    db: &MongoDB,
    mailer: &Mailer,
    user_id: &str,
) -> Result<(), ApiError> {
    let user = find_by_user_id(db, user_id)
        .await?
        .ok_or(ApiError::NoPermission)?;

    if user.verified {
        log::info!("ℹ️  Account already verified, skipping email: {}", user.email);
        return Ok(());
    }

    rotate_verification_code(db, mailer, &user).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            _id: None,
            user_id: "user-1".to_string(),
            email: "a@x.com".to_string(),
            password: "hash".to_string(),
            verified: false,
            verification_code: None,
            verification_sent_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_jwt_round_trip() {
        let user = sample_user();
        let token = generate_jwt(&user).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@x.com");
        assert!(!claims.verified);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let user = sample_user();
        let mut token = generate_jwt(&user).unwrap();
        token.push('x');
        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn test_verification_code_is_six_digits() {
        for _ in 0..50 {
            let code = generate_verification_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_code_expiry_window() {
        let now = Utc::now();
        assert!(!code_expired(now - Duration::minutes(8), now));
        assert!(!code_expired(now - Duration::minutes(9), now));
        // One second past the window always fails, even if otherwise correct.
        assert!(code_expired(
            now - Duration::minutes(9) - Duration::seconds(1),
            now
        ));
        assert!(code_expired(now - Duration::minutes(30), now));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB and an SMTP server to be running
    async fn test_duplicate_signup_conflicts() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/finance_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();
        let mailer = Mailer::from_env().unwrap();

        let request = SignupRequest {
            email: format!("{}@example.com", Uuid::new_v4()),
            password: "password1".to_string(),
        };

        assert!(signup(&db, &mailer, &request).await.is_ok());
        match signup(&db, &mailer, &request).await {
            Err(ApiError::EmailAlreadyExists) => {}
            other => panic!("expected EmailAlreadyExists, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB and an SMTP server to be running
    async fn test_unverified_login_rotates_code() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/finance_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();
        let mailer = Mailer::from_env().unwrap();

        let email = format!("{}@example.com", Uuid::new_v4());
        let request = SignupRequest {
            email: email.clone(),
            password: "password1".to_string(),
        };
        signup(&db, &mailer, &request).await.unwrap();

        let collection = db.collection::<User>(USERS_COLLECTION);
        let before = collection
            .find_one(doc! { "email": &email })
            .await
            .unwrap()
            .unwrap();

        let login_request = LoginRequest {
            email: email.clone(),
            password: "password1".to_string(),
        };
        login(&db, &mailer, &login_request).await.unwrap();

        let after = collection
            .find_one(doc! { "email": &email })
            .await
            .unwrap()
            .unwrap();

        // New hash and new timestamp on every unverified attempt
        assert_ne!(before.verification_code, after.verification_code);
        assert_ne!(before.verification_sent_at, after.verification_sent_at);
    }
}
