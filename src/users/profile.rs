use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::lenient;

/// One pesticide the farmer uses and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PesticideUsage {
    pub name: String,
    #[serde(default)]
    pub frequency: String,
}

/// Everything a farmer tells us about themselves besides credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerProfile {
    #[serde(default, deserialize_with = "lenient::text")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub communication: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub farm_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub farm_location: Option<String>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub farm_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub primary_crops: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub secondary_crops: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub sprayer_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub iot_devices: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub machinery: Vec<String>,
    #[serde(default, deserialize_with = "lenient::pesticides")]
    pub pesticides: Vec<PesticideUsage>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub fertilizer_preference: Option<String>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub monthly_expenditure: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub farming_experience: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Farmer,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Role::Farmer),
            "admin" => Ok(Role::Admin),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

/// Stored user. Holds the password hash, so it is never serialized directly;
/// use [`PublicUser`] for anything leaving the process.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub profile: FarmerProfile,
    pub created_at: OffsetDateTime,
}

/// Input for creating a user; the email is already normalized and the
/// password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub profile: FarmerProfile,
}

/// User as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(flatten)]
    pub profile: FarmerProfile,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
            profile: u.profile,
            created_at: u.created_at,
        }
    }
}

/// Partial profile change; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub communication: Option<String>,
    pub language: Option<String>,
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub farm_size: Option<f64>,
    pub primary_crops: Option<Vec<String>>,
    pub secondary_crops: Option<Vec<String>>,
    pub sprayer_type: Option<String>,
    pub iot_devices: Option<Vec<String>>,
    pub machinery: Option<Vec<String>>,
    pub pesticides: Option<Vec<PesticideUsage>>,
    pub fertilizer_preference: Option<String>,
    pub monthly_expenditure: Option<f64>,
    pub farming_experience: Option<String>,
    pub password_hash: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) {
        let p = &mut user.profile;
        if let Some(v) = self.full_name {
            p.full_name = v;
        }
        if let Some(v) = self.phone {
            p.phone = v;
        }
        p.communication = self.communication.or(p.communication.take());
        p.language = self.language.or(p.language.take());
        p.farm_name = self.farm_name.or(p.farm_name.take());
        p.farm_location = self.farm_location.or(p.farm_location.take());
        p.farm_size = self.farm_size.or(p.farm_size);
        p.sprayer_type = self.sprayer_type.or(p.sprayer_type.take());
        p.fertilizer_preference = self.fertilizer_preference.or(p.fertilizer_preference.take());
        p.monthly_expenditure = self.monthly_expenditure.or(p.monthly_expenditure);
        p.farming_experience = self.farming_experience.or(p.farming_experience.take());
        if let Some(v) = self.primary_crops {
            p.primary_crops = v;
        }
        if let Some(v) = self.secondary_crops {
            p.secondary_crops = v;
        }
        if let Some(v) = self.iot_devices {
            p.iot_devices = v;
        }
        if let Some(v) = self.machinery {
            p.machinery = v;
        }
        if let Some(v) = self.pesticides {
            p.pesticides = v;
        }
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
    }
}
