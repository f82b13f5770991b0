//! Caller identity extraction.
//!
//! Authentication itself lives at the gateway; by the time a request reaches
//! this service the caller has been resolved to a user id and role, forwarded
//! as headers. The extractor rejects requests where either header is missing
//! or malformed rather than guessing.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use shilpkaar_core::{ArtisanId, UserId, UserRole};

use crate::error::ApiError;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

/// The resolved identity of the calling user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(caller: CallerIdentity) -> impl IntoResponse {
///     format!("user {} ({})", caller.user_id.as_i32(), caller.role)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub role: UserRole,
}

impl CallerIdentity {
    /// Require the artisan role, returning the caller's id as an artisan id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for customers.
    pub fn require_artisan(&self) -> Result<ArtisanId, ApiError> {
        match self.role {
            UserRole::Artisan => Ok(ArtisanId::new(self.user_id.as_i32())),
            UserRole::Customer => Err(ApiError::Forbidden(
                "this operation requires the artisan role".to_string(),
            )),
        }
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_ID_HEADER)?
            .parse::<i32>()
            .map_err(|_| {
                ApiError::Unauthorized(format!("{USER_ID_HEADER} must be an integer"))
            })?;
        if user_id < 1 {
            return Err(ApiError::Unauthorized(format!(
                "{USER_ID_HEADER} must be positive"
            )));
        }

        let raw_role = header_value(parts, USER_ROLE_HEADER)?;
        let role = UserRole::parse(raw_role).ok_or_else(|| {
            ApiError::Unauthorized(format!("unknown {USER_ROLE_HEADER} '{raw_role}'"))
        })?;

        Ok(Self {
            user_id: UserId::new(user_id),
            role,
        })
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized(format!("{name} must be ASCII")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<CallerIdentity, ApiError> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(()).expect("request");
        let (mut parts, ()) = request.into_parts();
        CallerIdentity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_identity() {
        let caller = extract(&[("x-user-id", "42"), ("x-user-role", "artisan")])
            .await
            .expect("identity");
        assert_eq!(caller.user_id.as_i32(), 42);
        assert_eq!(caller.role, UserRole::Artisan);
        assert_eq!(caller.require_artisan().expect("artisan").as_i32(), 42);
    }

    #[tokio::test]
    async fn test_missing_headers_rejected() {
        assert!(matches!(
            extract(&[("x-user-id", "42")]).await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            extract(&[("x-user-role", "customer")]).await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_id_rejected() {
        for bad in ["abc", "0", "-3"] {
            assert!(matches!(
                extract(&[("x-user-id", bad), ("x-user-role", "customer")]).await,
                Err(ApiError::Unauthorized(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_customer_cannot_act_as_artisan() {
        let caller = extract(&[("x-user-id", "7"), ("x-user-role", "customer")])
            .await
            .expect("identity");
        assert!(matches!(
            caller.require_artisan(),
            Err(ApiError::Forbidden(_))
        ));
    }
}
