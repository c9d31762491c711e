use anyhow::{Context, Result};
use dotenv::dotenv;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{MySql, Pool};

use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::employee_service::MySqlEmployeeStore;
use crate::services::onboarding_service::OnboardingService;
use crate::services::processor_service::RecordProcessor;
use crate::services::scheduler_service::Scheduler;

mod config;
mod logger;
mod models;
mod services;

/// Conexiones máximas del pool (el flujo usa una a la vez)
const DB_POOL_SIZE: u32 = 10;

async fn setup_database(config: &AppConfig) -> Result<Pool<MySql>> {
    log::info!(
        "Conectando a MySQL en {}:{}/{}",
        config.db_host,
        config.db_port,
        config.db_name
    );

    let options = MySqlConnectOptions::new()
        .host(&config.db_host)
        .port(config.db_port)
        .username(&config.db_user)
        .password(&config.db_password)
        .database(&config.db_name);

    let db_pool = MySqlPoolOptions::new()
        .max_connections(DB_POOL_SIZE)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos MySQL")?;

    Ok(db_pool)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env().context("Configuración inválida")?;

    // El pool se crea una sola vez acá y se presta a los servicios;
    // se cierra al terminar el proceso.
    let db_pool = setup_database(&config).await?;

    // Verificar la conexión
    let conn = db_pool.acquire().await.context("Falló la conexión")?;
    drop(conn);

    let store = MySqlEmployeeStore::new(
        db_pool.clone(),
        config.db_procedure.clone(),
        config.db_table.clone(),
    );
    let api = OnboardingService::new(
        config.api_url.clone(),
        config.api_credential.clone(),
        config.retry.clone(),
    );
    let processor = RecordProcessor::new(store, api);

    // `--once` corre el flujo completo una vez y sale (útil para
    // disparos manuales o para probar credenciales).
    if std::env::args().any(|arg| arg == "--once") {
        let summary = processor.run().await?;
        log::info!(
            "Corrida manual completada: {} pendientes, {} exitosos, {} fallidos.",
            summary.fetched,
            summary.succeeded,
            summary.failed
        );
        db_pool.close().await;
        return Ok(());
    }

    let scheduler = Scheduler::new(processor, config.timezone);
    log::info!("Agenda diaria activa (08:00 {}).", config.timezone);

    tokio::select! {
        _ = scheduler.run_forever() => {}
        _ = tokio::signal::ctrl_c() => {
            log::info!("Señal de terminación recibida, cerrando...");
        }
    }

    db_pool.close().await;
    Ok(())
}
