//! config/app_config.rs
//! Configuración de la aplicación leída del entorno (.env o variables reales).
//! Toda variable obligatoria ausente corta el arranque con un error claro.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;

use crate::services::onboarding_service::RetryPolicy;

/// Zona horaria por defecto para interpretar fechas y la hora de disparo.
const DEFAULT_TIMEZONE: &str = "Asia/Bangkok";
/// Puerto MySQL por defecto
const DEFAULT_DB_PORT: u16 = 3306;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    /// Stored procedure que prepara la tabla antes de cada corrida
    pub db_procedure: String,
    /// Tabla de empleados pendientes
    pub db_table: String,
    pub api_url: String,
    /// Credencial ya codificada para `Authorization: Basic <credencial>`
    pub api_credential: String,
    pub timezone: Tz,
    pub retry: RetryPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let timezone_name =
            env::var("TZ_NAME").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|e| anyhow!("Zona horaria desconocida '{}': {}", timezone_name, e))?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: optional_parsed("API_MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts),
            delay: optional_parsed("API_RETRY_DELAY_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.delay),
            delay_first_attempt: optional_parsed("API_DELAY_FIRST_ATTEMPT")?
                .unwrap_or(defaults.delay_first_attempt),
        };

        Ok(AppConfig {
            db_host: required("DB_HOST")?,
            db_port: optional_parsed("DB_PORT")?.unwrap_or(DEFAULT_DB_PORT),
            db_user: required("DB_USER")?,
            db_password: required("DB_PASSWORD")?,
            db_name: required("DB_NAME")?,
            db_procedure: required("DB_SP")?,
            db_table: required("DB_TABLE")?,
            api_url: required("API_URL")?,
            api_credential: required("AUTHORIZATION")?,
            timezone,
            retry,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| anyhow!("Falta la variable de entorno {}", key))
}

fn optional_parsed<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => {
            let value = raw
                .parse::<T>()
                .with_context(|| format!("Valor inválido en {}: '{}'", key, raw))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
