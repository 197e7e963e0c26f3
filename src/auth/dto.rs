use serde::{Deserialize, Serialize};

use crate::users::{
    lenient,
    profile::{FarmerProfile, PesticideUsage, ProfileUpdate, PublicUser},
};

/// Request body for user registration: credentials plus the full profile
/// collected by the five-step form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub profile: FarmerProfile,
}

/// Request body for login. Both fields are optional on the wire so a missing
/// one produces a 400 with our own message instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for `PUT /api/profile`. The email is the identity key and
/// cannot be changed; unknown fields (including `email`) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "lenient::opt_raw_text", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_raw_text", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
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
    #[serde(default, deserialize_with = "lenient::opt_string_list", skip_serializing_if = "Option::is_none")]
    pub primary_crops: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_string_list", skip_serializing_if = "Option::is_none")]
    pub secondary_crops: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub sprayer_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string_list", skip_serializing_if = "Option::is_none")]
    pub iot_devices: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_string_list", skip_serializing_if = "Option::is_none")]
    pub machinery: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_pesticides", skip_serializing_if = "Option::is_none")]
    pub pesticides: Option<Vec<PesticideUsage>>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub fertilizer_preference: Option<String>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub monthly_expenditure: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub farming_experience: Option<String>,
    /// New password; blank means "keep the current one".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    /// Converts into a storage-level update; `password_hash` is filled in
    /// by the caller once the new password (if any) has been hashed.
    pub fn into_update(self, password_hash: Option<String>) -> ProfileUpdate {
        ProfileUpdate {
            full_name: self.full_name,
            phone: self.phone,
            communication: self.communication,
            language: self.language,
            farm_name: self.farm_name,
            farm_location: self.farm_location,
            farm_size: self.farm_size,
            primary_crops: self.primary_crops,
            secondary_crops: self.secondary_crops,
            sprayer_type: self.sprayer_type,
            iot_devices: self.iot_devices,
            machinery: self.machinery,
            pesticides: self.pesticides,
            fertilizer_preference: self.fertilizer_preference,
            monthly_expenditure: self.monthly_expenditure,
            farming_experience: self.farming_experience,
            password_hash,
        }
    }
}

/// Response returned after login or register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

/// Response for profile reads and updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub users: Vec<PublicUser>,
}

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
