//! Sign-in, profile, and income declaration endpoints.
//!
//! ```text
//! POST /api/auth/login {"email":"ada@example.com","display_name":"Ada","image":null}
//! GET /api/user/me
//! POST /api/user/income {"annual_income":400000}
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AnnualIncome, Email, Error, SignInProfile, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/auth/login`.
///
/// Carries the identity-provider profile of a freshly verified sign-in. The
/// avatar keeps its provider wire name `image`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Verified email address, the upsert key.
    pub email: String,
    /// Display name from the provider, if any.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar URL from the provider, if any.
    #[serde(default)]
    pub image: Option<String>,
}

/// Wire representation of a user profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    /// Stable user identifier.
    pub id: UserId,
    /// Email address.
    pub email: Email,
    /// Display name, if set.
    pub display_name: Option<String>,
    /// Avatar URL under its provider wire name.
    pub image: Option<String>,
    /// Declared annual income in rupees, if onboarding is complete.
    pub annual_income: Option<AnnualIncome>,
    /// Whether the income declaration has happened.
    pub onboarding_completed: bool,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            image: user.avatar_url,
            annual_income: user.annual_income,
            onboarding_completed: user.onboarding_completed,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request body for `POST /api/user/income`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncomeRequest {
    /// Declared annual income in rupees, 1 to 100,000,000.
    pub annual_income: i64,
}

/// Response body for `POST /api/user/income`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IncomeResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The updated profile.
    pub user: UserDto,
}

/// Complete a sign-in: upsert the profile and establish the session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Profile upserted, session established", body = UserDto,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid email", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserDto>> {
    let LoginRequest {
        email,
        display_name,
        image,
    } = payload.into_inner();
    let profile = SignInProfile {
        email: Email::new(email).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "email" }))
        })?,
        display_name,
        avatar_url: image,
    };
    let user = state.onboarding.sign_in(&profile).await?;
    session.persist_user(&user.id)?;
    Ok(web::Json(UserDto::from(user)))
}

/// Current profile for the authenticated session.
#[utoipa::path(
    get,
    path = "/api/user/me",
    responses(
        (status = 200, description = "Current profile", body = UserDto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Session user no longer exists", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user/me")]
pub async fn current_user(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UserDto>> {
    let user_id = session.require_user_id()?;
    let user = state.onboarding.profile(&user_id).await?;
    Ok(web::Json(UserDto::from(user)))
}

/// Declare the annual income, completing onboarding.
#[utoipa::path(
    post,
    path = "/api/user/income",
    request_body = IncomeRequest,
    responses(
        (status = 200, description = "Income stored, onboarding complete", body = IncomeResponse),
        (status = 400, description = "Income out of range", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Update matched no record", body = Error)
    ),
    tags = ["users"],
    operation_id = "declareIncome"
)]
#[post("/user/income")]
pub async fn declare_income(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<IncomeRequest>,
) -> ApiResult<web::Json<IncomeResponse>> {
    let user_id = session.require_user_id()?;
    let income = AnnualIncome::new(payload.annual_income).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "annual_income" }))
    })?;
    let user = state.onboarding.declare_income(&user_id, income).await?;
    Ok(web::Json(IncomeResponse {
        success: true,
        user: UserDto::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(HttpState::fixture()))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api")
                    .service(login)
                    .service(current_user)
                    .service(declare_income),
            )
    }

    fn login_request() -> actix_http::Request {
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&LoginRequest {
                email: "ada@example.com".to_owned(),
                display_name: Some("Ada".to_owned()),
                image: None,
            })
            .to_request()
    }

    fn session_cookie(
        res: &actix_web::dev::ServiceResponse,
    ) -> actix_web::cookie::Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    #[actix_web::test]
    async fn login_upserts_and_sets_the_session() {
        let app = actix_test::init_service(test_app()).await;
        let login_res = actix_test::call_service(&app, login_request()).await;
        assert!(login_res.status().is_success());
        let cookie = session_cookie(&login_res);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/user/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("email").and_then(Value::as_str),
            Some("ada@example.com")
        );
        assert_eq!(
            body.get("onboarding_completed").and_then(Value::as_bool),
            Some(false)
        );
    }

    #[actix_web::test]
    async fn login_rejects_malformed_emails() {
        let app = actix_test::init_service(test_app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(&LoginRequest {
                    email: "not-an-email".to_owned(),
                    display_name: None,
                    image: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        let details = body.get("details").expect("details present");
        assert_eq!(
            details.get("field").and_then(Value::as_str),
            Some("email")
        );
    }

    #[actix_web::test]
    async fn income_update_completes_onboarding() {
        let app = actix_test::init_service(test_app()).await;
        let login_res = actix_test::call_service(&app, login_request()).await;
        assert!(login_res.status().is_success());
        let cookie = session_cookie(&login_res);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/user/income")
                .cookie(cookie)
                .set_json(&IncomeRequest {
                    annual_income: 400_000,
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("success").and_then(Value::as_bool), Some(true));
        let user = body.get("user").expect("user present");
        assert_eq!(
            user.get("annual_income").and_then(Value::as_i64),
            Some(400_000)
        );
        assert_eq!(
            user.get("onboarding_completed").and_then(Value::as_bool),
            Some(true)
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(100_000_001)]
    #[actix_web::test]
    async fn income_out_of_range_is_rejected(#[case] income: i64) {
        let app = actix_test::init_service(test_app()).await;
        let login_res = actix_test::call_service(&app, login_request()).await;
        assert!(login_res.status().is_success());
        let cookie = session_cookie(&login_res);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/user/income")
                .cookie(cookie)
                .set_json(&IncomeRequest {
                    annual_income: income,
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn profile_requires_a_session() {
        let app = actix_test::init_service(test_app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/user/me").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
