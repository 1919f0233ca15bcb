use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::organization::Organization;
use crate::models::user::{User, ROLE_APPLICANT};
use crate::utils::crypto::{hash_password, verify_password};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use uuid::Uuid;

const TOKEN_TTL_SECS: i64 = 12 * 60 * 60;

const USER_COLUMNS: &str =
    "id, email, name, password_hash, role, organization_id, created_at, updated_at";

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register_applicant(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User> {
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(Error::Conflict(
                "a user with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password)
            .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(ROLE_APPLICANT)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized("invalid credentials".to_string()))?;

        let ok = verify_password(password, &user.password_hash)
            .map_err(|e| Error::Internal(format!("password verification failed: {}", e)))?;
        if !ok {
            return Err(Error::Unauthorized("invalid credentials".to_string()));
        }

        let token = issue_token(&user)?;
        Ok((user, token))
    }

    pub async fn user_name(&self, email: &str) -> Result<Option<String>> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    pub async fn organizations(&self) -> Result<Vec<Organization>> {
        let rows = sqlx::query_as::<_, Organization>(
            "SELECT id, name, created_at FROM organizations ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_organization(&self, name: &str) -> Result<Organization> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(org)
    }
}

pub fn issue_token(user: &User) -> Result<String> {
    let config = crate::config::get_config();
    let claims = Claims {
        sub: user.email.clone(),
        exp: (chrono::Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
        role: Some(user.role.clone()),
        org: user.organization_id,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("token encoding failed: {}", e)))
}
