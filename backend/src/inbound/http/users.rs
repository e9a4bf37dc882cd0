//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users {"email":"a@x.com","password":"Abcdef1!","username":"a1",
//!                     "firstName":"A","lastName":"B","code":"..."}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::{RegistrationRequest, RegistrationResult, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RoleSchema};
use crate::inbound::http::state::HttpState;

/// Registration request body for `POST /api/v1/users`.
///
/// Every field is optional on the wire; missing values are reported as
/// `invalid_argument` by the registration service.
#[derive(Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Email address for the identity record.
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    /// Password; 8 to 12 characters with an uppercase letter, a digit and a symbol.
    #[schema(example = "Abcdef1!")]
    pub password: Option<String>,
    /// Chosen handle.
    #[schema(example = "ada")]
    pub username: Option<String>,
    /// Given name.
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    /// Family name.
    #[schema(example = "Lovelace")]
    pub last_name: Option<String>,
    /// Optional invite code selecting the role.
    pub code: Option<String>,
}

impl From<CreateUserRequest> for RegistrationRequest {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            email: value.email,
            password: value.password.map(Zeroizing::new),
            username: value.username,
            first_name: value.first_name,
            last_name: value.last_name,
            invite_code: value.code.map(Zeroizing::new),
        }
    }
}

/// Successful registration response.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateUserResponse {
    /// Identifier assigned by the identity provider.
    #[schema(example = "Xk3vQ9hL2bP0aZ")]
    pub uid: String,
    /// Role written to the profile.
    #[schema(value_type = RoleSchema)]
    pub role: Role,
}

impl From<RegistrationResult> for CreateUserResponse {
    fn from(value: RegistrationResult) -> Self {
        Self {
            uid: value.uid.into(),
            role: value.role,
        }
    }
}

/// Register a new user.
///
/// Creates the identity, stores the profile at `users/<uid>` and returns the
/// assigned id and role.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use registration::inbound::http::users::create_user;
///
/// let app = App::new().service(web::scope("/api/v1").service(create_user));
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User registered", body = CreateUserResponse),
        (status = 400, description = "Missing field, weak password or bad body", body = ErrorSchema),
        (status = 409, description = "Email already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<CreateUserResponse>> {
    let result = state
        .registration
        .register(payload.into_inner().into())
        .await?;
    info!(uid = %result.uid, role = %result.role, "registration request completed");
    Ok(web::Json(result.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::ports::MockUserRegistration;
    use crate::domain::{Error, ErrorCode, UserId};
    use crate::inbound::http::error::json_error_handler;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn test_app(
        registration: MockUserRegistration,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(HttpState::new(Arc::new(registration))))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(web::scope("/api/v1").service(create_user))
    }

    async fn post_users(
        registration: MockUserRegistration,
        request: actix_test::TestRequest,
    ) -> (StatusCode, Value) {
        let app = actix_test::init_service(test_app(registration)).await;
        let response =
            actix_test::call_service(&app, request.uri("/api/v1/users").to_request()).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        let value = serde_json::from_slice(&body).expect("JSON body");
        (status, value)
    }

    #[actix_web::test]
    async fn create_user_forwards_payload_and_returns_uid_and_role() {
        let mut registration = MockUserRegistration::new();
        registration
            .expect_register()
            .withf(|request| {
                request.email.as_deref() == Some("a@x.com")
                    && request.password.as_deref().map(String::as_str) == Some("Abcdef1!")
                    && request.username.as_deref() == Some("a1")
                    && request.first_name.as_deref() == Some("A")
                    && request.last_name.as_deref() == Some("B")
                    && request.invite_code.as_deref().map(String::as_str) == Some("ADMIN-123")
            })
            .times(1)
            .return_once(|_| {
                Ok(RegistrationResult {
                    uid: UserId::new("uid-1").expect("valid id"),
                    role: Role::Admin,
                })
            });

        let request = actix_test::TestRequest::post().set_json(json!({
            "email": "a@x.com",
            "password": "Abcdef1!",
            "username": "a1",
            "firstName": "A",
            "lastName": "B",
            "code": "ADMIN-123",
        }));
        let (status, body) = post_users(registration, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"uid": "uid-1", "role": "Admin"}));
    }

    #[actix_web::test]
    async fn absent_fields_reach_the_service_as_none() {
        let mut registration = MockUserRegistration::new();
        registration
            .expect_register()
            .withf(|request| *request == RegistrationRequest::default())
            .times(1)
            .return_once(|_| {
                Err(Error::invalid_argument("Missing required fields.")
                    .with_details(json!({"field": "email", "code": "missing_field"})))
            });

        let request = actix_test::TestRequest::post().set_json(json!({}));
        let (status, body) = post_users(registration, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
        assert_eq!(body["message"], "Missing required fields.");
        assert_eq!(body["details"]["field"], "email");
    }

    #[rstest]
    #[case(ErrorCode::AlreadyExists, StatusCode::CONFLICT, "Email already in use.")]
    #[case(
        ErrorCode::Internal,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error"
    )]
    #[actix_web::test]
    async fn service_errors_map_to_statuses(
        #[case] code: ErrorCode,
        #[case] status: StatusCode,
        #[case] message: &str,
    ) {
        let mut registration = MockUserRegistration::new();
        registration.expect_register().times(1).return_once(move |_| {
            Err(match code {
                ErrorCode::AlreadyExists => Error::already_exists("Email already in use."),
                _ => Error::internal("Failed to create user."),
            })
        });

        let request = actix_test::TestRequest::post().set_json(json!({"email": "a@x.com"}));
        let (actual_status, body) = post_users(registration, request).await;

        assert_eq!(actual_status, status);
        assert_eq!(body["message"], message);
    }

    #[rstest]
    #[case::not_json(actix_test::TestRequest::post()
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json"))]
    #[case::string(actix_test::TestRequest::post().set_json(json!("a@x.com")))]
    #[case::wrong_type(actix_test::TestRequest::post().set_json(json!({"email": 42})))]
    #[actix_web::test]
    async fn malformed_bodies_are_invalid_argument(#[case] request: actix_test::TestRequest) {
        let mut registration = MockUserRegistration::new();
        registration.expect_register().never();

        let (status, body) = post_users(registration, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
        assert_eq!(body["details"]["code"], "malformed_json");
    }
}
