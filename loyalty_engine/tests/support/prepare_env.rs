use log::*;
use loyalty_common::Points;
use loyalty_engine::{
    db_types::{OrderNumber, OrderStatusType},
    traits::{OrderCrediting, OrderManagement},
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/loyalty_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    db.close().await;
    info!("🚀️ Migrations complete");
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        trace!("Could not drop database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

/// A freshly migrated database at a random path.
pub async fn new_test_database() -> (String, SqliteDatabase) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    (url, db)
}

pub async fn drop_test_database(url: &str, db: SqliteDatabase) {
    db.close().await;
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Could not remove test database {url}: {e}");
    }
}

/// Registers `number` for the user and marks it as processed with the given accrual, so that the user's balance
/// increases by `points`.
pub async fn fund_user(db: &SqliteDatabase, user_id: i64, number: &str, points: i64) {
    let number = OrderNumber::from(number);
    db.insert_order(user_id, &number).await.expect("Error inserting order");
    db.credit_order(&number, user_id, OrderStatusType::Processed, Some(Points::from_points(points)))
        .await
        .expect("Error crediting order");
}
