use std::time::Duration;

use sqlx::PgPool;
use tracing::info;

/// Applies the embedded migrations on a single connection with
/// `statement_timeout` set, so a blocked migration fails instead of hanging
/// startup.
pub async fn run_migrations(pool: &PgPool, timeout: Duration) -> anyhow::Result<()> {
    let mut conn = pool.acquire().await?;

    sqlx::query(&format!("SET statement_timeout = {}", timeout.as_millis()))
        .execute(&mut *conn)
        .await?;

    let result = sqlx::migrate!("./migrations").run(&mut *conn).await;

    sqlx::query("RESET statement_timeout")
        .execute(&mut *conn)
        .await?;

    result?;
    info!("migrations applied");
    Ok(())
}
