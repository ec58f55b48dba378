use uuid::Uuid;
use zing_bites_api::{
    config::AppConfig,
    db::{create_pool, migrate},
    services::auth_service::hash_password,
};

struct SeedUser<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: &'a str,
    // (address, longitude, latitude)
    default_address: (&'a str, f64, f64),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    migrate(&pool).await?;

    let admin_id = ensure_user(
        &pool,
        SeedUser {
            name: "Zing Admin",
            email: "admin@zingbites.dev",
            password: "admin12345",
            role: "admin",
            default_address: ("12 MG Road, Bengaluru", 77.6033, 12.9756),
        },
    )
    .await?;
    let user_id = ensure_user(
        &pool,
        SeedUser {
            name: "Hungry User",
            email: "user@zingbites.dev",
            password: "user12345",
            role: "user",
            default_address: ("48 Brigade Road, Bengaluru", 77.6070, 12.9716),
        },
    )
    .await?;
    seed_catalog(&pool).await?;

    pool.close().await;
    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, user: SeedUser<'_>) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(user.password)?;
    let user_id = Uuid::new_v4();
    let (address, longitude, latitude) = user.default_address;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, default_address, default_longitude, default_latitude)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(user.name)
    .bind(user.email)
    .bind(password_hash)
    .bind(user.role)
    .bind(address)
    .bind(longitude)
    .bind(latitude)
    .fetch_one(pool)
    .await?;

    // The address book entry only comes with a freshly created account.
    if id == user_id {
        sqlx::query(
            "INSERT INTO user_addresses (id, user_id, address, longitude, latitude) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(address)
        .bind(longitude)
        .bind(latitude)
        .execute(pool)
        .await?;
    }

    println!("Ensured user {} (role={})", user.email, user.role);
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let restaurants = vec![
        (
            "Masala Junction",
            "5 Church Street, Bengaluru",
            77.6050,
            12.9750,
            4.4,
            vec![
                ("Paneer Butter Masala", "Cottage cheese in a rich tomato gravy", 240, 4.6),
                ("Garlic Naan", "Tandoor bread brushed with garlic butter", 60, 4.3),
            ],
        ),
        (
            "Dosa Corner",
            "22 Residency Road, Bengaluru",
            77.6010,
            12.9690,
            4.1,
            vec![
                ("Masala Dosa", "Crisp rice crepe with spiced potato", 90, 4.5),
                ("Filter Coffee", "Chicory coffee with frothed milk", 40, 4.8),
            ],
        ),
        (
            "Wok Street",
            "9 Koramangala 5th Block, Bengaluru",
            77.6190,
            12.9340,
            3.9,
            vec![
                ("Hakka Noodles", "Stir-fried noodles with vegetables", 180, 4.0),
                ("Chilli Chicken", "Indo-Chinese fried chicken, dry", 220, 4.2),
            ],
        ),
    ];

    for (name, address, longitude, latitude, rating, dishes) in restaurants {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM restaurants WHERE name = $1 LIMIT 1")
                .bind(name)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            println!("Restaurant {name} already present");
            continue;
        }

        let restaurant_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO restaurants (id, name, address, longitude, latitude, rating)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(restaurant_id)
        .bind(name)
        .bind(address)
        .bind(longitude)
        .bind(latitude)
        .bind(rating)
        .execute(pool)
        .await?;

        for (dish, description, price, dish_rating) in dishes {
            sqlx::query(
                r#"
                INSERT INTO dishes (id, name, description, rating, price, restaurant_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(dish)
            .bind(description)
            .bind(dish_rating)
            .bind(price as i64)
            .bind(restaurant_id)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded restaurants and dishes");
    Ok(())
}
