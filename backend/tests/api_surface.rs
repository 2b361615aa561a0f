//! End-to-end coverage of the REST surface over fixture-backed state.
//!
//! These tests drive the same handler set the server mounts, with the
//! embedded catalog loaded into the in-memory product store and a canned
//! completion source standing in for the hosted advisor.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::json;

use backend::catalogue_seed::load_catalogue;
use backend::domain::ports::{
    FixtureChatTranscriptRepository, FixtureCompletionSource, FixtureProductRepository,
    FixtureUserRepository,
};
use backend::domain::{AdvisorService, CatalogueService, OnboardingService};
use backend::inbound::http::advisor::{ask, history};
use backend::inbound::http::products::{list_products, recommended_products};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{current_user, declare_income, login};

const CANNED_REPLY: &str = "Yes, prepayment is allowed after the third EMI.";

fn seeded_state() -> web::Data<HttpState> {
    let products = Arc::new(FixtureProductRepository::with_products(
        load_catalogue().expect("embedded catalog loads"),
    ));
    web::Data::new(HttpState::new(
        CatalogueService::new(products.clone()),
        AdvisorService::new(
            products,
            Arc::new(FixtureChatTranscriptRepository::new()),
            Arc::new(FixtureCompletionSource::with_reply(CANNED_REPLY)),
        ),
        OnboardingService::new(Arc::new(FixtureUserRepository::new())),
    ))
}

async fn spawn_app()
-> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build();

    test::init_service(
        App::new().app_data(seeded_state()).service(
            web::scope("/api")
                .wrap(session)
                .service(login)
                .service(current_user)
                .service(declare_income)
                .service(list_products)
                .service(recommended_products)
                .service(ask)
                .service(history),
        ),
    )
    .await
}

async fn sign_in(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ada@example.com" }))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "login should succeed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("login sets the session cookie")
}

#[actix_web::test]
async fn protected_endpoints_require_a_session() {
    let app = spawn_app().await;

    for request in [
        test::TestRequest::get().uri("/api/products").to_request(),
        test::TestRequest::get()
            .uri("/api/products/recommended")
            .to_request(),
        test::TestRequest::get().uri("/api/user/me").to_request(),
        test::TestRequest::post()
            .uri("/api/ai/ask")
            .set_json(json!({
                "productId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
                "message": "Can I prepay?"
            }))
            .to_request(),
    ] {
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status().as_u16(), 401);
    }
}

#[actix_web::test]
async fn catalog_lists_every_product_ascending_by_apr() {
    let app = spawn_app().await;
    let cookie = sign_in(&app).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/products")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert!(response.status().is_success());

    let body: serde_json::Value = test::read_body_json(response).await;
    let products = body["products"].as_array().expect("products array");
    assert_eq!(products.len(), 6);

    let rates: Vec<f64> = products
        .iter()
        .map(|product| product["rate_apr"].as_f64().expect("numeric apr"))
        .collect();
    let mut sorted = rates.clone();
    sorted.sort_by(f64::total_cmp);
    assert_eq!(rates, sorted, "catalog should be ascending by APR");
    assert!(products[0]["type"].is_string(), "loan type uses wire name");
}

#[actix_web::test]
async fn recommendations_are_gated_on_declared_income() {
    let app = spawn_app().await;
    let cookie = sign_in(&app).await;

    let premature = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/products/recommended")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(premature.status().as_u16(), 403);

    let declared = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/user/income")
            .cookie(cookie.clone())
            .set_json(json!({ "annual_income": 400_000 }))
            .to_request(),
    )
    .await;
    assert!(declared.status().is_success());

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/products/recommended")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert!(response.status().is_success());

    let body: serde_json::Value = test::read_body_json(response).await;
    let products = body["products"].as_array().expect("products array");
    assert!(!products.is_empty());
    assert!(products.len() <= 5);
    for product in products {
        let floor = product["min_income"].as_i64().expect("income floor");
        assert!(floor <= 400_000, "every pick must fit the declared income");
    }
}

#[actix_web::test]
async fn advisor_answers_and_persists_the_transcript() {
    let app = spawn_app().await;
    let cookie = sign_in(&app).await;

    let listing = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/products")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: serde_json::Value = test::read_body_json(listing).await;
    let product_id = body["products"][0]["id"].as_str().expect("product id").to_owned();

    let answer = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/ai/ask")
            .cookie(cookie.clone())
            .set_json(json!({ "productId": product_id, "message": "Can I prepay this loan?" }))
            .to_request(),
    )
    .await;
    assert!(answer.status().is_success());
    let body: serde_json::Value = test::read_body_json(answer).await;
    assert_eq!(body["response"], json!(CANNED_REPLY));

    let transcript = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/ai/history/{product_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert!(transcript.status().is_success());
    let body: serde_json::Value = test::read_body_json(transcript).await;
    let messages = body["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], json!("user"));
    assert_eq!(messages[1]["role"], json!("assistant"));
    assert_eq!(messages[1]["content"], json!(CANNED_REPLY));
}

#[actix_web::test]
async fn unknown_products_yield_not_found_from_the_advisor() {
    let app = spawn_app().await;
    let cookie = sign_in(&app).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/ai/ask")
            .cookie(cookie)
            .set_json(json!({
                "productId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
                "message": "Can I prepay?"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status().as_u16(), 404);
}
