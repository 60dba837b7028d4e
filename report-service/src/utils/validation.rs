use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// JSON body that has passed its `Validate` rules.
///
/// Malformed JSON is rejected as 400, a body that parses but breaks the
/// schema or a validation rule as 422.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value.validate().map_err(|e| {
            tracing::debug!(error = %e, "Request failed validation");
            AppError::from(e)
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportRequest;
    use axum::body::Body;
    use axum::http::{header, StatusCode};

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn extract(body: &str) -> Result<ValidatedJson<ReportRequest>, AppError> {
        ValidatedJson::<ReportRequest>::from_request(json_request(body), &()).await
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let ValidatedJson(request) = extract(r#"{"skills":[{"name":"Communication","score":85}]}"#)
            .await
            .unwrap();
        assert_eq!(request.assessment.skills.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let err = extract(r#"{"skills": ["#).await.err().unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_unprocessable() {
        let err = extract(r#"{"skills":[{"name":"Communication","score":"high"}]}"#)
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_unprocessable() {
        let err = extract(r#"{"skills":[{"name":"Communication","score":101}]}"#)
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
