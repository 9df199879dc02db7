use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use household_services_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

// Demo data only. The admin identity comes from ADMIN_USERNAME and
// ADMIN_PASSWORD and must never be seeded as a row.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let alice = ensure_account(&pool, "alice", "alice123", "Customer").await?;
    ensure_customer_profile(&pool, alice, "12 Rosewood Lane").await?;
    let bob = ensure_account(&pool, "bob", "bob123", "Customer").await?;
    ensure_customer_profile(&pool, bob, "7 Harbor Street").await?;

    let pradeep = ensure_account(&pool, "pradeep", "pradeep123", "Professional").await?;
    ensure_professional_profile(&pool, pradeep, "Plumbing", "8 years", true).await?;
    let meera = ensure_account(&pool, "meera", "meera123", "Professional").await?;
    ensure_professional_profile(&pool, meera, "Cleaning", "3 years", false).await?;

    seed_services(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If the account already exists, fetch its id instead.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured account {username} (role={role})");
    Ok(user_id)
}

async fn ensure_customer_profile(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    address: &str,
) -> anyhow::Result<()> {
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM customers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    if exists.is_none() {
        sqlx::query("INSERT INTO customers (id, user_id, address) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(address)
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn ensure_professional_profile(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    service_type: &str,
    experience: &str,
    approved: bool,
) -> anyhow::Result<()> {
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM service_professionals WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    if exists.is_none() {
        sqlx::query(
            r#"
            INSERT INTO service_professionals (id, user_id, service_type, experience, is_approved, resume_path)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(service_type)
        .bind(experience)
        .bind(approved)
        .bind(format!("uploads/{}_resume.pdf", service_type.to_lowercase()))
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn seed_services(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let services: Vec<(&str, i64, &str, &str)> = vec![
        ("Pipe Repair", 49900, "2 hours", "Fix leaking or burst pipes"),
        ("Deep Cleaning", 129900, "6 hours", "Full home deep clean"),
        (
            "Electrical Inspection",
            79900,
            "1 hour",
            "Safety check of home wiring",
        ),
    ];

    // Service names are not unique in the schema, so guard by hand.
    for (name, base_price, time_required, description) in services {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM services WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if exists.is_some() {
            continue;
        }
        sqlx::query(
            r#"
            INSERT INTO services (id, name, base_price, time_required, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(base_price)
        .bind(time_required)
        .bind(description)
        .execute(pool)
        .await?;
    }

    println!("Seeded services");
    Ok(())
}
