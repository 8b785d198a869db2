/// Error handling for the API server
///
/// A unified error type that maps the domain error taxonomy onto HTTP
/// responses. Handlers return `Result<T, ApiError>`; every shared domain
/// error converts into the right status via `From`, so nothing propagates
/// as an unhandled fault.
///
/// | Variant           | Status | Meaning                                   |
/// |-------------------|--------|-------------------------------------------|
/// | BadRequest        | 400    | malformed request                         |
/// | Unauthorized      | 401    | anonymous caller on a protected operation |
/// | Forbidden         | 403    | non-author attempting replace/delete      |
/// | NotFound          | 404    | referenced entity does not exist          |
/// | Conflict          | 409    | duplicate/absent membership edge          |
/// | ValidationError   | 422    | field-level validation failure            |
/// | InternalError     | 500    | logged; details hidden from clients       |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use ladle_shared::auth::jwt::JwtError;
use ladle_shared::auth::password::PasswordError;
use ladle_shared::models::follow::FollowError;
use ladle_shared::models::recipe::RecipeEditError;
use ladle_shared::models::tag::TagError;
use ladle_shared::models::MembershipError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate favorite edge
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "conflict")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Builds a single-field validation error
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    /// Flattens `validator` derive output into field-level details
    pub fn from_validator(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(details)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    if constraint.contains("username") {
                        return ApiError::Conflict("Username already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert recipe edit errors to API errors
impl From<RecipeEditError> for ApiError {
    fn from(err: RecipeEditError) -> Self {
        match err {
            RecipeEditError::Validation { field, message } => ApiError::validation(&field, message),
            RecipeEditError::TagNotFound(id) => {
                ApiError::NotFound(format!("Tag {} does not exist", id))
            }
            RecipeEditError::IngredientNotFound(id) => {
                ApiError::NotFound(format!("Ingredient {} does not exist", id))
            }
            RecipeEditError::RecipeNotFound(id) => {
                ApiError::NotFound(format!("Recipe {} does not exist", id))
            }
            RecipeEditError::Database(e) => e.into(),
        }
    }
}

/// Convert follow errors to API errors
///
/// Self-follow is a validation failure; duplicate and absent edges surface
/// as conflicts.
impl From<FollowError> for ApiError {
    fn from(err: FollowError) -> Self {
        match err {
            FollowError::SelfFollow => ApiError::validation("author", "Cannot follow yourself"),
            FollowError::AlreadyFollowing => {
                ApiError::Conflict("Already following this author".to_string())
            }
            FollowError::NotFollowing => {
                ApiError::Conflict("Not following this author".to_string())
            }
            FollowError::Database(e) => e.into(),
        }
    }
}

/// Convert membership errors (favorites, cart) to API errors
impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::AlreadyMember => ApiError::Conflict("Already a member".to_string()),
            MembershipError::NotMember => ApiError::Conflict("Not a member".to_string()),
            MembershipError::Database(e) => e.into(),
        }
    }
}

/// Convert tag errors to API errors
impl From<TagError> for ApiError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::InvalidColor(msg) => ApiError::validation("color", msg),
            TagError::Database(e) => e.into(),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}
