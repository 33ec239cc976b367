use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(..) => AppError::NotFound(e.to_string()),
            DomainError::Conflict(..) => AppError::Conflict(e.to_string()),
            DomainError::InvalidInput(msg) => AppError::InvalidInput(msg),
            DomainError::Persistence(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Conflict(_) => HttpResponse::Conflict().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::InvalidInput(_) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": self.to_string()
                }))
            }
            // Persistence causes stay in the logs, not in the response body.
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use uuid::Uuid;

    use crate::domain::errors::EntityKind;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("cart not found".to_string()).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_returns_409() {
        let resp = AppError::Conflict("cart already exists".to_string()).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_input_returns_422() {
        let resp = AppError::InvalidInput("quantity must be at least 1".to_string())
            .error_response();
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_not_found_keeps_entity_context() {
        let id = Uuid::new_v4();
        let app_err: AppError = DomainError::NotFound(EntityKind::Product, id).into();
        match app_err {
            AppError::NotFound(msg) => {
                assert!(msg.contains("product"));
                assert!(msg.contains(&id.to_string()));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn domain_conflict_maps_to_app_conflict() {
        let app_err: AppError = DomainError::Conflict(EntityKind::Cart, Uuid::new_v4()).into();
        assert!(matches!(app_err, AppError::Conflict(_)));
    }

    #[test]
    fn domain_invalid_input_maps_to_app_invalid_input() {
        let app_err: AppError = DomainError::InvalidInput("bad value".to_string()).into();
        assert!(matches!(app_err, AppError::InvalidInput(_)));
    }

    #[test]
    fn domain_persistence_maps_to_app_internal() {
        let app_err: AppError = DomainError::Persistence("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
