use household_services_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        customer::RequestServicePayload,
    },
    entity::{
        audit_logs::{Column as AuditCol, Entity as AuditLogs},
        customers::{Column as CustomerCol, Entity as Customers},
        service_professionals::{Column as ProfessionalCol, Entity as ServiceProfessionals},
        service_requests::Entity as ServiceRequests,
        services::Entity as Services,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{RequestStatus, UserRole},
    routes::admin::{CreateServiceRequest, DashboardQuery},
    services::{admin_service, auth_service, customer_service, professional_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    Statement,
};
use uuid::Uuid;

// Full marketplace pass: registration rules, login for users and the
// configured admin, approval gating of the customer catalogue, the request
// lifecycle, block/unblock, and the cascading account delete.
#[tokio::test]
async fn marketplace_end_to_end_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    unsafe {
        std::env::set_var("JWT_SECRET", "integration-test-secret");
        std::env::set_var("ADMIN_USERNAME", "overseer");
        std::env::set_var("ADMIN_PASSWORD", "overseer-pw");
    }

    let state = setup_state(&database_url).await?;
    let admin = AuthUser {
        user_id: None,
        role: UserRole::Admin,
    };

    // Admin-role registration is refused before any row is written.
    let err = auth_service::register_user(&state, register_payload("boss", UserRole::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(Users::find().count(&state.orm).await?, 0);

    // Customer registration creates the account and its profile together.
    let mut payload = register_payload("carla", UserRole::Customer);
    payload.address = Some("3 Meadow Row".into());
    let resp = auth_service::register_user(&state, payload).await?;
    assert_eq!(resp.message, "Registration successful. Please login.");
    let carla = resp.data.unwrap();
    assert_eq!(carla.role, UserRole::Customer);
    assert!(!carla.is_blocked);
    assert_eq!(
        Customers::find()
            .filter(CustomerCol::UserId.eq(carla.id))
            .count(&state.orm)
            .await?,
        1
    );

    // Same username again is a conflict.
    let mut dup = register_payload("carla", UserRole::Customer);
    dup.address = Some("elsewhere".into());
    let err = auth_service::register_user(&state, dup).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The username match is exact: a differently-cased name is a new account.
    let mut cased = register_payload("Carla", UserRole::Customer);
    cased.address = Some("41 Meadow Row".into());
    let carla_caps = auth_service::register_user(&state, cased)
        .await?
        .data
        .unwrap();
    assert_ne!(carla_caps.id, carla.id);
    assert_eq!(
        Users::find()
            .filter(UserCol::Username.is_in(["carla", "Carla"]))
            .count(&state.orm)
            .await?,
        2
    );

    // Customer without an address: nothing survives the failed transaction.
    let err = auth_service::register_user(&state, register_payload("ghost", UserRole::Customer))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::OrmError(_)));
    assert_eq!(
        Users::find()
            .filter(UserCol::Username.eq("ghost"))
            .count(&state.orm)
            .await?,
        0
    );

    // Login: wrong password is refused, the right one returns a bearer token.
    let err = auth_service::login_user(
        &state,
        LoginRequest {
            username: "carla".into(),
            password: "nope".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let resp = auth_service::login_user(
        &state,
        LoginRequest {
            username: "carla".into(),
            password: "carla-pw".into(),
        },
    )
    .await?;
    assert_eq!(resp.message, "Logged in successfully!");
    let login = resp.data.unwrap();
    assert!(login.token.starts_with("Bearer "));
    assert_eq!(login.role, UserRole::Customer);

    // The configured admin pair logs in without any users row existing.
    let resp = auth_service::login_user(
        &state,
        LoginRequest {
            username: "overseer".into(),
            password: "overseer-pw".into(),
        },
    )
    .await?;
    assert_eq!(resp.message, "Logged in as admin!");
    assert_eq!(resp.data.unwrap().role, UserRole::Admin);
    assert_eq!(
        Users::find()
            .filter(UserCol::Role.eq(UserRole::Admin))
            .count(&state.orm)
            .await?,
        0
    );

    // A professional with a resume gets an unapproved profile row holding the
    // sanitized path.
    let mut payload = register_payload("pavel", UserRole::Professional);
    payload.service_type = Some("Plumbing".into());
    payload.experience = Some("6 years".into());
    payload.resume = Some("Pavel CV 2024.pdf".into());
    let pavel = auth_service::register_user(&state, payload)
        .await?
        .data
        .unwrap();

    let pavel_profile = ServiceProfessionals::find()
        .filter(ProfessionalCol::UserId.eq(pavel.id))
        .one(&state.orm)
        .await?
        .expect("professional profile");
    assert!(!pavel_profile.is_approved);
    assert_eq!(
        pavel_profile.resume_path.as_deref(),
        Some("uploads/Pavel_CV_2024.pdf")
    );

    // A professional without a resume still gets an account, but no profile.
    let mut payload = register_payload("nora", UserRole::Professional);
    payload.service_type = Some("Cleaning".into());
    payload.experience = Some("2 years".into());
    let nora = auth_service::register_user(&state, payload)
        .await?
        .data
        .unwrap();
    assert_eq!(
        ServiceProfessionals::find()
            .filter(ProfessionalCol::UserId.eq(nora.id))
            .count(&state.orm)
            .await?,
        0
    );

    let nora_auth = AuthUser {
        user_id: Some(nora.id),
        role: UserRole::Professional,
    };
    let resp = professional_service::dashboard(&state, &nora_auth).await?;
    assert_eq!(resp.message, "No professional profile on file.");
    assert!(resp.data.unwrap().profile.is_none());

    // Admin creates a service; customers see nothing while no professional is
    // approved.
    let service = admin_service::create_service(
        &state,
        &admin,
        CreateServiceRequest {
            name: "Pipe Repair".into(),
            base_price: 49900,
            time_required: "2 hours".into(),
            description: "Fix leaking pipes".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!service.is_approved);

    let carla_auth = AuthUser {
        user_id: Some(carla.id),
        role: UserRole::Customer,
    };
    let dash = customer_service::dashboard(&state, &carla_auth)
        .await?
        .data
        .unwrap();
    assert!(dash.services.is_empty());
    assert!(dash.requests.is_empty());

    // An unknown profile id is refused and approves nothing.
    let err = admin_service::approve_professional(&state, &admin, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert_eq!(
        ServiceProfessionals::find()
            .filter(ProfessionalCol::IsApproved.eq(true))
            .count(&state.orm)
            .await?,
        0
    );

    // Approving the professional opens the whole catalogue, including
    // services never approved themselves. A second approval changes nothing.
    let resp = admin_service::approve_professional(&state, &admin, pavel_profile.id).await?;
    assert_eq!(resp.message, "Service Professional approved successfully!");
    assert!(resp.data.unwrap().is_approved);
    let again = admin_service::approve_professional(&state, &admin, pavel_profile.id).await?;
    assert!(again.data.unwrap().is_approved);

    let dash = customer_service::dashboard(&state, &carla_auth)
        .await?
        .data
        .unwrap();
    assert_eq!(dash.services.len(), 1);
    assert!(!dash.services[0].is_approved);

    let pavel_auth = AuthUser {
        user_id: Some(pavel.id),
        role: UserRole::Professional,
    };
    let resp = professional_service::dashboard(&state, &pavel_auth).await?;
    let profile = resp.data.unwrap().profile.expect("own profile");
    assert!(profile.is_approved);

    // Request lifecycle: create, refuse a duplicate, cancel, re-request.
    let resp = customer_service::request_service(
        &state,
        &carla_auth,
        RequestServicePayload {
            professional_id: pavel_profile.id,
        },
    )
    .await?;
    assert_eq!(resp.message, "Service requested successfully!");
    let request = resp.data.unwrap();
    assert_eq!(request.professional_id, pavel_profile.id);
    assert_eq!(request.service_id, None);
    assert_eq!(request.service_status, RequestStatus::Requested);
    assert_eq!(request.status, RequestStatus::Requested);

    let err = customer_service::request_service(
        &state,
        &carla_auth,
        RequestServicePayload {
            professional_id: pavel_profile.id,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(ServiceRequests::find().count(&state.orm).await?, 1);

    let err = customer_service::request_service(
        &state,
        &carla_auth,
        RequestServicePayload {
            professional_id: Uuid::new_v4(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Someone else's request cannot be cancelled and is reported as missing.
    let mut payload = register_payload("dmitri", UserRole::Customer);
    payload.address = Some("9 Quay Side".into());
    let dmitri = auth_service::register_user(&state, payload)
        .await?
        .data
        .unwrap();
    let dmitri_auth = AuthUser {
        user_id: Some(dmitri.id),
        role: UserRole::Customer,
    };
    let err = customer_service::cancel_request(&state, &dmitri_auth, request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert_eq!(ServiceRequests::find().count(&state.orm).await?, 1);

    let resp = customer_service::cancel_request(&state, &carla_auth, request.id).await?;
    assert_eq!(resp.message, "Your service request has been canceled.");
    assert_eq!(ServiceRequests::find().count(&state.orm).await?, 0);

    // After cancelling, the same pair can be requested again.
    let rerequest = customer_service::request_service(
        &state,
        &carla_auth,
        RequestServicePayload {
            professional_id: pavel_profile.id,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(rerequest.service_status, RequestStatus::Requested);

    // The duplicate guard is scoped to the (customer, professional) pair;
    // a second customer may hold an open request with the same professional.
    let resp = customer_service::request_service(
        &state,
        &dmitri_auth,
        RequestServicePayload {
            professional_id: pavel_profile.id,
        },
    )
    .await?;
    assert_eq!(resp.message, "Service requested successfully!");
    assert_eq!(ServiceRequests::find().count(&state.orm).await?, 2);

    // Role gates.
    let err = customer_service::dashboard(&state, &admin).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = admin_service::dashboard(&state, &carla_auth, DashboardQuery { role: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Blocking an unknown id is refused and flags nobody; blocking a real
    // account flags it but does not shut the door.
    let err = admin_service::block_user(&state, &admin, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert_eq!(
        Users::find()
            .filter(UserCol::IsBlocked.eq(true))
            .count(&state.orm)
            .await?,
        0
    );

    let resp = admin_service::block_user(&state, &admin, carla.id).await?;
    assert_eq!(resp.message, "User carla blocked successfully!");
    assert!(resp.data.unwrap().is_blocked);

    let resp = auth_service::login_user(
        &state,
        LoginRequest {
            username: "carla".into(),
            password: "carla-pw".into(),
        },
    )
    .await?;
    assert!(resp.data.unwrap().token.starts_with("Bearer "));

    let resp = admin_service::unblock_user(&state, &admin, carla.id).await?;
    assert!(!resp.data.unwrap().is_blocked);

    // Admin-role rows cannot come from registration; insert one directly to
    // check the delete guard and the dashboard exclusion.
    let legacy_admin = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set("legacy_admin".into()),
        password_hash: Set("dummy".into()),
        role: Set(UserRole::Admin),
        is_blocked: NotSet,
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let err = admin_service::delete_user(&state, &admin, legacy_admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(
        Users::find()
            .filter(UserCol::Id.eq(legacy_admin.id))
            .count(&state.orm)
            .await?,
        1
    );

    // Dashboard lists: the default view leaves admin-role rows out, a role
    // filter replaces the list with exactly that role.
    let dash = admin_service::dashboard(&state, &admin, DashboardQuery { role: None })
        .await?
        .data
        .unwrap();
    assert_eq!(dash.users.len(), 5);
    assert!(dash.users.iter().all(|u| u.role != UserRole::Admin));
    assert_eq!(dash.professionals.len(), 1);
    assert_eq!(dash.services.len(), 1);

    let dash = admin_service::dashboard(
        &state,
        &admin,
        DashboardQuery {
            role: Some(UserRole::Admin),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(dash.users.len(), 1);
    assert_eq!(dash.users[0].username, "legacy_admin");

    let dash = admin_service::dashboard(
        &state,
        &admin,
        DashboardQuery {
            role: Some(UserRole::Professional),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(dash.users.len(), 2);
    assert!(dash.users.iter().all(|u| u.role == UserRole::Professional));

    // Service approval and deletion. An unknown id approves nothing.
    let err = admin_service::approve_service(&state, &admin, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let stored = Services::find_by_id(service.id)
        .one(&state.orm)
        .await?
        .expect("service row");
    assert!(!stored.is_approved);

    let resp = admin_service::approve_service(&state, &admin, service.id).await?;
    assert_eq!(resp.message, "Service approved successfully!");
    assert!(resp.data.unwrap().is_approved);

    let resp = admin_service::delete_service(&state, &admin, service.id).await?;
    assert_eq!(resp.message, "Service \"Pipe Repair\" deleted successfully!");
    assert_eq!(Services::find().count(&state.orm).await?, 0);
    let err = admin_service::delete_service(&state, &admin, service.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Stateless logout still leaves an audit record.
    let resp = auth_service::logout_user(&state, &admin).await?;
    assert_eq!(resp.message, "Admin logged out.");
    let resp = auth_service::logout_user(&state, &carla_auth).await?;
    assert_eq!(resp.message, "Logged out.");

    // Deleting the professional clears the profile and requests aimed at it.
    let resp = admin_service::delete_user(&state, &admin, pavel.id).await?;
    assert_eq!(resp.message, "User pavel deleted successfully!");
    assert_eq!(
        Users::find()
            .filter(UserCol::Id.eq(pavel.id))
            .count(&state.orm)
            .await?,
        0
    );
    assert_eq!(ServiceProfessionals::find().count(&state.orm).await?, 0);
    assert_eq!(ServiceRequests::find().count(&state.orm).await?, 0);

    let err = admin_service::delete_user(&state, &admin, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Deleting the customer clears the customer profile too.
    admin_service::delete_user(&state, &admin, carla.id).await?;
    assert_eq!(
        Customers::find()
            .filter(CustomerCol::UserId.eq(carla.id))
            .count(&state.orm)
            .await?,
        0
    );

    // Mutations left an audit trail; admin actions carry no user id.
    assert!(AuditLogs::find().count(&state.orm).await? > 0);
    assert!(
        AuditLogs::find()
            .filter(AuditCol::Action.eq("user_delete"))
            .filter(AuditCol::UserId.is_null())
            .count(&state.orm)
            .await?
            >= 2
    );

    Ok(())
}

fn register_payload(username: &str, role: UserRole) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        password: format!("{username}-pw"),
        role,
        address: None,
        service_type: None,
        experience: None,
        resume: None,
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE service_requests, customers, service_professionals, services, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}
