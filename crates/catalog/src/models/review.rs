//! Review domain types and the denormalized rating aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shilpkaar_core::{ProductId, ReviewId, UserId};

use crate::validate::{Validate, ValidationError, Violations};

/// A product review. One review per (user, product) pair.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Star rating in [1, 5].
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write payload for creating or updating a review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub product_id: ProductId,
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

const MAX_COMMENT_LEN: usize = 2000;

impl Validate for ReviewDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();

        if !(1..=5).contains(&self.rating) {
            v.add("rating", "must be between 1 and 5");
        }
        if self.comment.len() > MAX_COMMENT_LEN {
            v.add(
                "comment",
                format!("must be at most {MAX_COMMENT_LEN} characters"),
            );
        }

        v.finish()
    }
}

/// Recompute the denormalized product rating from its review ratings.
///
/// Returns `(mean rounded to 1 decimal, count)`; `(0.0, 0)` for no reviews.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn aggregate_rating(ratings: &[i16]) -> (f32, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    let rounded = (mean * 10.0).round() / 10.0;
    (rounded as f32, ratings.len() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        for rating in [0, 6, -1] {
            let draft = ReviewDraft {
                product_id: ProductId::new(1),
                rating,
                comment: String::new(),
            };
            let err = draft.validate().expect_err("must fail");
            assert_eq!(err.violations[0].field, "rating");
        }
        for rating in 1..=5 {
            let draft = ReviewDraft {
                product_id: ProductId::new(1),
                rating,
                comment: "solid".to_string(),
            };
            assert!(draft.validate().is_ok());
        }
    }

    #[test]
    fn test_aggregate_rating_empty() {
        assert_eq!(aggregate_rating(&[]), (0.0, 0));
    }

    #[test]
    fn test_aggregate_rating_rounds_to_one_decimal() {
        // mean of 4, 5, 5 = 4.666... -> 4.7
        let (mean, count) = aggregate_rating(&[4, 5, 5]);
        assert!((mean - 4.7).abs() < f32::EPSILON);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_aggregate_rating_single() {
        assert_eq!(aggregate_rating(&[3]), (3.0, 1));
    }
}
