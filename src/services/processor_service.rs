use anyhow::Result;
use uuid::Uuid;

use crate::services::employee_service::EmployeeStore;
use crate::services::onboarding_service::OnboardingApi;

/// Resultado de una corrida completa, para dejarlo en el log.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub fetched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Orquesta una corrida: stored procedure, lectura de pendientes y
/// envío secuencial de cada registro al API, marcando los exitosos.
pub struct RecordProcessor<S, A> {
    store: S,
    api: A,
}

impl<S, A> RecordProcessor<S, A>
where
    S: EmployeeStore,
    A: OnboardingApi,
{
    pub fn new(store: S, api: A) -> Self {
        RecordProcessor { store, api }
    }

    /// Una corrida completa. Un error aquí es fatal para la corrida
    /// (procedure o lectura fallida) y lo decide quien llama; el fallo
    /// de un registro individual nunca corta el resto.
    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        log::info!("(run) Iniciando corrida {}...", run_id);

        self.store.run_procedure().await?;

        let employees = self.store.fetch_pending().await?;
        if employees.is_empty() {
            log::info!("(run) Corrida {}: sin registros pendientes, nada que hacer.", run_id);
            return Ok(RunSummary::default());
        }

        let mut summary = RunSummary {
            fetched: employees.len(),
            ..RunSummary::default()
        };

        // Estrictamente uno a la vez, en el orden en que llegaron de la tabla
        for employee in &employees {
            match self.api.submit(employee).await {
                Ok(confirmation) => {
                    // El EmpID que se marca es el que confirmó el API
                    self.store.mark_done(&confirmation.namelist.emp_id).await?;
                    summary.succeeded += 1;
                }
                Err(e) => {
                    // El registro queda elegible para la próxima corrida
                    log::error!(
                        "(run) Corrida {}: EmpID={} quedó pendiente: {:?}",
                        run_id,
                        employee.emp_id,
                        e
                    );
                    summary.failed += 1;
                }
            }
        }

        log::info!(
            "(run) Corrida {} finalizada: {} pendientes, {} exitosos, {} fallidos.",
            run_id,
            summary.fetched,
            summary.succeeded,
            summary.failed
        );
        Ok(summary)
    }
}
