use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::profile::{FarmerProfile, NewUser, PesticideUsage, ProfileUpdate, User};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Credential store seam. Email uniqueness (case-insensitive) is enforced
/// by the implementation, not by callers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// All users, newest first.
    async fn list_newest_first(&self) -> anyhow::Result<Vec<User>>;
    /// Applies the provided fields in one atomic step, leaving the rest as
    /// stored. `None` when the user no longer exists.
    async fn update(&self, id: Uuid, change: ProfileUpdate) -> anyhow::Result<Option<User>>;
}

/// Row of the `users` table.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    full_name: String,
    phone: String,
    communication: Option<String>,
    language: Option<String>,
    farm_name: Option<String>,
    farm_location: Option<String>,
    farm_size: Option<f64>,
    primary_crops: Vec<String>,
    secondary_crops: Vec<String>,
    sprayer_type: Option<String>,
    iot_devices: Vec<String>,
    machinery: Vec<String>,
    pesticides: Json<Vec<PesticideUsage>>,
    fertilizer_preference: Option<String>,
    monthly_expenditure: Option<f64>,
    farming_experience: Option<String>,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            role: r.role.parse()?,
            profile: FarmerProfile {
                full_name: r.full_name,
                phone: r.phone,
                communication: r.communication,
                language: r.language,
                farm_name: r.farm_name,
                farm_location: r.farm_location,
                farm_size: r.farm_size,
                primary_crops: r.primary_crops,
                secondary_crops: r.secondary_crops,
                sprayer_type: r.sprayer_type,
                iot_devices: r.iot_devices,
                machinery: r.machinery,
                pesticides: r.pesticides.0,
                fertilizer_preference: r.fertilizer_preference,
                monthly_expenditure: r.monthly_expenditure,
                farming_experience: r.farming_experience,
            },
            created_at: r.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, role, full_name, phone, communication, \
    language, farm_name, farm_location, farm_size, primary_crops, secondary_crops, sprayer_type, \
    iot_devices, machinery, pesticides, fertilizer_preference, monthly_expenditure, \
    farming_experience, created_at";

// SQLSTATE unique_violation
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let p = user.profile;
        let sql = format!(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, phone, communication, language,
                               farm_name, farm_location, farm_size, primary_crops, secondary_crops,
                               sprayer_type, iot_devices, machinery, pesticides,
                               fertilizer_preference, monthly_expenditure, farming_experience)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(p.full_name)
            .bind(p.phone)
            .bind(p.communication)
            .bind(p.language)
            .bind(p.farm_name)
            .bind(p.farm_location)
            .bind(p.farm_size)
            .bind(p.primary_crops)
            .bind(p.secondary_crops)
            .bind(p.sprayer_type)
            .bind(p.iot_devices)
            .bind(p.machinery)
            .bind(Json(p.pesticides))
            .bind(p.fertilizer_preference)
            .bind(p.monthly_expenditure)
            .bind(p.farming_experience)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepoError::DuplicateEmail
                } else {
                    RepoError::Other(anyhow::Error::new(e).context("insert user"))
                }
            })?;
        Ok(User::try_from(row)?)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_newest_first(&self) -> anyhow::Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql).fetch_all(&self.db).await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, id: Uuid, change: ProfileUpdate) -> anyhow::Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
               SET password_hash = COALESCE($2, password_hash),
                   full_name = COALESCE($3, full_name),
                   phone = COALESCE($4, phone),
                   communication = COALESCE($5, communication),
                   language = COALESCE($6, language),
                   farm_name = COALESCE($7, farm_name),
                   farm_location = COALESCE($8, farm_location),
                   farm_size = COALESCE($9, farm_size),
                   primary_crops = COALESCE($10, primary_crops),
                   secondary_crops = COALESCE($11, secondary_crops),
                   sprayer_type = COALESCE($12, sprayer_type),
                   iot_devices = COALESCE($13, iot_devices),
                   machinery = COALESCE($14, machinery),
                   pesticides = COALESCE($15, pesticides),
                   fertilizer_preference = COALESCE($16, fertilizer_preference),
                   monthly_expenditure = COALESCE($17, monthly_expenditure),
                   farming_experience = COALESCE($18, farming_experience)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(change.password_hash)
            .bind(change.full_name)
            .bind(change.phone)
            .bind(change.communication)
            .bind(change.language)
            .bind(change.farm_name)
            .bind(change.farm_location)
            .bind(change.farm_size)
            .bind(change.primary_crops)
            .bind(change.secondary_crops)
            .bind(change.sprayer_type)
            .bind(change.iot_devices)
            .bind(change.machinery)
            .bind(change.pesticides.map(Json))
            .bind(change.fertilizer_preference)
            .bind(change.monthly_expenditure)
            .bind(change.farming_experience)
            .fetch_optional(&self.db)
            .await
            .context("update user")?;
        row.map(User::try_from).transpose()
    }
}
