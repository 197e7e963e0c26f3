use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{RegisterRequest, UpdateProfileRequest};

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lowercases an email so it can serve as the identity key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_amount(errors: &mut Vec<String>, label: &str, value: Option<f64>) {
    if let Some(v) = value {
        if !v.is_finite() {
            errors.push(format!("{label} must be a number"));
        } else if v < 0.0 {
            errors.push(format!("{label} cannot be negative"));
        }
    }
}

/// Record-level rules applied before a user is stored. Returns one message
/// per failing field.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let p = &req.profile;
    if p.full_name.is_empty() {
        errors.push("Full name is required".to_string());
    }
    if req.email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !is_valid_email(&req.email) {
        errors.push("Please enter a valid email".to_string());
    }
    if req.password.is_empty() {
        errors.push("Password is required".to_string());
    }
    if p.phone.is_empty() {
        errors.push("Phone number is required".to_string());
    }
    check_amount(&mut errors, "Farm size", p.farm_size);
    check_amount(&mut errors, "Monthly expenditure", p.monthly_expenditure);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Same rules as registration, applied only to the fields being changed.
pub fn validate_update(req: &UpdateProfileRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if matches!(req.full_name.as_deref(), Some("")) {
        errors.push("Full name is required".to_string());
    }
    if matches!(req.phone.as_deref(), Some("")) {
        errors.push("Phone number is required".to_string());
    }
    check_amount(&mut errors, "Farm size", req.farm_size);
    check_amount(&mut errors, "Monthly expenditure", req.monthly_expenditure);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
