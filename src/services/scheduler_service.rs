use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;

use crate::services::employee_service::EmployeeStore;
use crate::services::onboarding_service::OnboardingApi;
use crate::services::processor_service::RecordProcessor;

/// Hora local de disparo diario
const FIRE_HOUR: u32 = 8;
const FIRE_MINUTE: u32 = 0;

/// Dispara una corrida diaria a las 08:00 en la zona horaria configurada.
///
/// Las corridas no se superponen: el loop espera a que cada corrida
/// termine antes de calcular el próximo disparo.
pub struct Scheduler<S, A> {
    processor: RecordProcessor<S, A>,
    timezone: Tz,
}

impl<S, A> Scheduler<S, A>
where
    S: EmployeeStore,
    A: OnboardingApi,
{
    pub fn new(processor: RecordProcessor<S, A>, timezone: Tz) -> Self {
        Scheduler {
            processor,
            timezone,
        }
    }

    pub async fn run_forever(&self) {
        loop {
            let now = Utc::now().with_timezone(&self.timezone);
            let next = match next_occurrence(now) {
                Some(next) => next,
                None => {
                    // No debería pasar; reintentamos el cálculo en una hora
                    log::error!(
                        "(run_forever) No se pudo calcular el próximo disparo desde {}; reintentando en una hora.",
                        now
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                    continue;
                }
            };

            let wait = (next - now).to_std().unwrap_or_default();
            log::info!(
                "(run_forever) Próxima corrida programada para {} (en {:?}).",
                next,
                wait
            );
            tokio::time::sleep(wait).await;

            log::info!("(run_forever) Ejecutando tarea programada...");
            match self.processor.run().await {
                Ok(summary) => {
                    log::info!(
                        "(run_forever) Tarea completada: {} pendientes, {} exitosos, {} fallidos.",
                        summary.fetched,
                        summary.succeeded,
                        summary.failed
                    );
                }
                Err(e) => {
                    // Corrida fallida: se descarta este disparo y se
                    // vuelve a intentar en el próximo programado
                    log::error!(
                        "(run_forever) La corrida falló y se omite hasta el próximo disparo: {:?}",
                        e
                    );
                }
            }
        }
    }
}

/// Próximo instante con hora 08:00 estrictamente posterior a `after`,
/// en la misma zona horaria. Barrido minuto a minuto (un disparo diario
/// siempre cae dentro de las próximas 48 horas).
pub fn next_occurrence(after: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let mut candidate = after + Duration::minutes(1);
    candidate = candidate.with_second(0).unwrap_or(candidate);
    candidate = candidate.with_nanosecond(0).unwrap_or(candidate);

    for _ in 0..(48 * 60) {
        if candidate.hour() == FIRE_HOUR && candidate.minute() == FIRE_MINUTE {
            return Some(candidate);
        }
        candidate = candidate + Duration::minutes(1);
    }

    None
}
