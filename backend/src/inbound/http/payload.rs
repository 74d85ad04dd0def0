//! Request body and response helpers shared by the entity handlers.

use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::Value;

use crate::domain::ports::SaveRequest;
use crate::domain::{DomainError, Operator};

/// Prefix of every entity URL.
pub const API_PREFIX: &str = "/api/v1";

/// Operator placed in the request extensions by authentication middleware.
#[must_use]
pub fn operator(req: &HttpRequest) -> Option<Operator> {
    req.extensions().get::<Operator>().cloned()
}

/// Turn a JSON body into field values for the saver.
///
/// Only objects are accepted; their keys are field names.
pub fn save_request(req: &HttpRequest, body: Value) -> Result<SaveRequest, DomainError> {
    match body {
        Value::Object(fields) => Ok(SaveRequest::new(operator(req), fields)),
        other => Err(DomainError::invalid_request(format!(
            "payload must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `201 Created` with a `Location` header and the stored entity.
#[must_use]
pub fn created<T: Serialize>(location: &str, body: &T) -> HttpResponse {
    HttpResponse::Created()
        .insert_header((header::LOCATION, format!("{API_PREFIX}{location}")))
        .json(body)
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(json!([1, 2]), "payload must be a JSON object, got an array")]
    #[case(json!("text"), "payload must be a JSON object, got a string")]
    #[case(Value::Null, "payload must be a JSON object, got null")]
    fn non_object_bodies_are_rejected(#[case] body: Value, #[case] message: &str) {
        let req = TestRequest::default().to_http_request();

        let err = save_request(&req, body).expect_err("non-object rejected");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), message);
    }

    #[test]
    fn object_bodies_carry_the_operator() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut()
            .insert(Operator::new("per@example.org"));

        let request = save_request(&req, json!({"name": "Lab"})).expect("object accepted");

        assert_eq!(request.operator, Some(Operator::new("per@example.org")));
        assert_eq!(request.fields.get("name"), Some(&json!("Lab")));
    }

    #[test]
    fn anonymous_requests_have_no_operator() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(operator(&req), None);
    }
}
