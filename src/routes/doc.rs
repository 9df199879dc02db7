use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::AdminDashboard,
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        customer::{CustomerDashboard, RequestServicePayload},
        professional::ProfessionalDashboard,
    },
    models::{RequestStatus, Service, ServiceProfessional, ServiceRequest, User, UserRole},
    response::{ApiResponse, Meta},
    routes::{admin, auth, customer, health, professional},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        admin::dashboard,
        admin::approve_professional,
        admin::create_service,
        admin::delete_service,
        admin::approve_service,
        admin::block_user,
        admin::unblock_user,
        admin::delete_user,
        customer::dashboard,
        customer::request_service,
        customer::cancel_request,
        professional::dashboard
    ),
    components(
        schemas(
            User,
            UserRole,
            Service,
            ServiceProfessional,
            ServiceRequest,
            RequestStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AdminDashboard,
            CustomerDashboard,
            RequestServicePayload,
            ProfessionalDashboard,
            admin::DashboardQuery,
            admin::CreateServiceRequest,
            health::HealthData,
            Meta,
            ApiResponse<User>,
            ApiResponse<LoginResponse>,
            ApiResponse<AdminDashboard>,
            ApiResponse<CustomerDashboard>,
            ApiResponse<ProfessionalDashboard>,
            ApiResponse<Service>,
            ApiResponse<ServiceProfessional>,
            ApiResponse<ServiceRequest>,
            ApiResponse<health::HealthData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Admin", description = "Marketplace administration"),
        (name = "Customer", description = "Customer endpoints"),
        (name = "Professional", description = "Professional endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
