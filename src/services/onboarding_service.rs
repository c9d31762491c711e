use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::models::employee_model::Employee;
use crate::models::onboarding_model::{OnboardingConfirmation, OnboardingPayload};

/// Intentos totales por registro por corrida
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Espera fija entre intentos
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Política de reintentos del cliente HTTP.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    /// La espera también aplica antes del primer intento (no solo en
    /// los reintentos); se puede apagar por configuración.
    pub delay_first_attempt: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
            delay_first_attempt: true,
        }
    }
}

/// Cliente del API de onboarding.
///
/// `submit` agota internamente la política de reintentos: un `Err` final
/// significa que el registro queda pendiente para la próxima corrida.
#[async_trait]
pub trait OnboardingApi: Send + Sync {
    async fn submit(&self, employee: &Employee) -> Result<OnboardingConfirmation>;
}

#[async_trait]
impl<A> OnboardingApi for Arc<A>
where
    A: OnboardingApi + ?Sized,
{
    async fn submit(&self, employee: &Employee) -> Result<OnboardingConfirmation> {
        (**self).submit(employee).await
    }
}

#[derive(Clone)]
pub struct OnboardingService {
    http_client: Client,
    api_url: String,
    credential: String,
    retry: RetryPolicy,
}

impl OnboardingService {
    pub fn new(api_url: String, credential: String, retry: RetryPolicy) -> Self {
        OnboardingService {
            http_client: Client::new(),
            api_url,
            credential,
            retry,
        }
    }

    /// Un intento: POST autenticado y parseo estricto de la confirmación.
    /// Cualquier desvío (red, status no exitoso, cuerpo con otra forma)
    /// es un intento fallido.
    async fn attempt(&self, payload: &OnboardingPayload) -> Result<OnboardingConfirmation> {
        let resp = self
            .http_client
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", self.credential))
            .json(payload)
            .send()
            .await
            .context("Fallo al hacer POST al API de onboarding")?;

        let status = resp.status();
        if !status.is_success() {
            let body_txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Respuesta no exitosa del API ({}): {}",
                status,
                body_txt
            ));
        }

        let confirmation = resp
            .json::<OnboardingConfirmation>()
            .await
            .context("El cuerpo de la respuesta no tiene la forma esperada (namelist/magiclink)")?;

        Ok(confirmation)
    }
}

#[async_trait]
impl OnboardingApi for OnboardingService {
    async fn submit(&self, employee: &Employee) -> Result<OnboardingConfirmation> {
        let payload = OnboardingPayload::from_employee(employee);

        let mut attempts = 0;
        let mut last_error = anyhow!("sin intentos realizados");

        while attempts < self.retry.max_attempts {
            if attempts > 0 {
                log::info!(
                    "(submit) Reintentando API para {} (intento {}) en {:?}...",
                    employee.emp_id,
                    attempts + 1,
                    self.retry.delay
                );
                tokio::time::sleep(self.retry.delay).await;
            } else {
                log::info!("(submit) Llamando API para {}...", employee.emp_id);
                if self.retry.delay_first_attempt {
                    tokio::time::sleep(self.retry.delay).await;
                }
            }

            match self.attempt(&payload).await {
                Ok(confirmation) => {
                    log::info!(
                        "(submit) API confirmó {} en {}. Magic link: {}",
                        confirmation.namelist.emp_id,
                        confirmation.namelist.created_at,
                        confirmation.magiclink
                    );
                    return Ok(confirmation);
                }
                Err(e) => {
                    log::error!(
                        "(submit) Error llamando API para {} (intento {}): {:?}",
                        employee.emp_id,
                        attempts + 1,
                        e
                    );
                    last_error = e;
                }
            }

            attempts += 1;
        }

        Err(last_error.context(format!(
            "API para {} falló tras {} intentos",
            employee.emp_id, self.retry.max_attempts
        )))
    }
}
