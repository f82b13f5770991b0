//! Artisan domain types.
//!
//! Artisans are marketplace users with `role = artisan`. Customers share the
//! same table but carry no craft/search profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shilpkaar_core::{ArtisanId, UserRole};

use crate::validate::{Validate, ValidationError, Violations};

/// A marketplace user, searchable when `role` is [`UserRole::Artisan`].
#[derive(Debug, Clone, Serialize)]
pub struct Artisan {
    pub id: ArtisanId,
    pub name: String,
    pub role: UserRole,
    /// Primary craft; free-form taxonomy value.
    pub craft: Option<String>,
    /// All crafts practiced, primary included.
    pub crafts: Vec<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub techniques: Vec<String>,
    pub specializations: Vec<String>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub bio: Option<String>,
    /// Denormalized mean rating across the artisan's products.
    pub rating: f32,
    pub review_count: i32,
    pub is_verified: bool,
    pub is_active: bool,
    /// Derived search cache; empty for customers, recomputed on every write
    /// for artisans.
    pub search_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write payload for an artisan's searchable profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanProfileDraft {
    pub name: String,
    #[serde(default)]
    pub craft: Option<String>,
    #[serde(default)]
    pub crafts: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub techniques: Vec<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

const MAX_NAME_LEN: usize = 120;
const MAX_BIO_LEN: usize = 2000;

impl Validate for ArtisanProfileDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();

        if self.name.trim().is_empty() {
            v.add("name", "must not be empty");
        } else if self.name.len() > MAX_NAME_LEN {
            v.add("name", format!("must be at most {MAX_NAME_LEN} characters"));
        }

        if self.bio.as_ref().is_some_and(|b| b.len() > MAX_BIO_LEN) {
            v.add("bio", format!("must be at most {MAX_BIO_LEN} characters"));
        }

        for (field, values) in [
            ("crafts", &self.crafts),
            ("techniques", &self.techniques),
            ("specializations", &self.specializations),
            ("certifications", &self.certifications),
            ("languages", &self.languages),
        ] {
            if values.iter().any(|s| s.trim().is_empty()) {
                v.add(field, "must not contain empty values");
            }
        }

        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_validation() {
        let draft = ArtisanProfileDraft {
            name: "Meera Devi".to_string(),
            craft: Some("blue_pottery".to_string()),
            crafts: vec!["blue_pottery".to_string()],
            location: Some("Jaipur".to_string()),
            region: Some("north".to_string()),
            state: Some("Rajasthan".to_string()),
            city: Some("Jaipur".to_string()),
            techniques: vec!["glazing".to_string()],
            specializations: vec![],
            certifications: vec![],
            languages: vec!["hi".to_string()],
            bio: Some("Third-generation potter".to_string()),
        };
        assert!(draft.validate().is_ok());

        let mut bad = draft;
        bad.name = String::new();
        bad.crafts.push("  ".to_string());
        let err = bad.validate().expect_err("must fail");
        let fields: Vec<_> = err.violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "crafts"]);
    }
}
