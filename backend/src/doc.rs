//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every REST path and the wire schemas they exchange.
//! The generated document feeds Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{ChatRole, ChatTurn, DisbursalSpeed, DocsLevel, Error, ErrorCode, Faq, LoanType};
use crate::inbound::http::advisor::{AskRequest, AskResponse, ChatMessageDto, TranscriptResponse};
use crate::inbound::http::products::{ProductDto, ProductsResponse};
use crate::inbound::http::users::{IncomeRequest, IncomeResponse, LoginRequest, UserDto};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Loanatlas backend API",
        description = "Loan catalog browsing, income-based recommendations, and a product-scoped AI advisor."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::declare_income,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::recommended_products,
        crate::inbound::http::advisor::ask,
        crate::inbound::http::advisor::history,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        UserDto,
        IncomeRequest,
        IncomeResponse,
        ProductDto,
        ProductsResponse,
        LoanType,
        DisbursalSpeed,
        DocsLevel,
        Faq,
        AskRequest,
        AskResponse,
        ChatMessageDto,
        TranscriptResponse,
        ChatTurn,
        ChatRole,
    )),
    tags(
        (name = "users", description = "Sign-in, profile, and income declaration"),
        (name = "products", description = "Loan catalog browsing and recommendations"),
        (name = "advisor", description = "Product-scoped AI advisor"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Schema shape checks for the generated document.

    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn product_schema_uses_wire_field_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let product_schema = schemas.get("ProductDto").expect("ProductDto schema");

        assert_object_schema_has_field(product_schema, "type");
        assert_object_schema_has_field(product_schema, "rate_apr");
        assert_object_schema_has_field(product_schema, "faq");
    }

    #[test]
    fn every_api_path_is_registered() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/user/me",
            "/api/user/income",
            "/api/products",
            "/api/products/recommended",
            "/api/ai/ask",
            "/api/ai/history/{product_id}",
            "/readyz",
            "/livez",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "document should describe {path}"
            );
        }
    }
}
