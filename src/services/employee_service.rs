use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySql, Pool};

use crate::models::employee_model::Employee;

/// Acceso a la tabla de empleados pendientes.
///
/// El trait existe para poder correr el procesador contra un almacén
/// en memoria en las pruebas; en producción la implementación es MySQL.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Ejecuta el stored procedure que prepara/actualiza la tabla.
    async fn run_procedure(&self) -> Result<()>;

    /// Devuelve todas las filas con LogStatus NULL o 0.
    /// Una tabla sin pendientes es un Vec vacío, no un error.
    async fn fetch_pending(&self) -> Result<Vec<Employee>>;

    /// Marca la fila como notificada: LogStatus = 1, LogNotification = NOW().
    async fn mark_done(&self, emp_id: &str) -> Result<()>;
}

#[async_trait]
impl<S> EmployeeStore for Arc<S>
where
    S: EmployeeStore + ?Sized,
{
    async fn run_procedure(&self) -> Result<()> {
        (**self).run_procedure().await
    }

    async fn fetch_pending(&self) -> Result<Vec<Employee>> {
        (**self).fetch_pending().await
    }

    async fn mark_done(&self, emp_id: &str) -> Result<()> {
        (**self).mark_done(emp_id).await
    }
}

#[derive(Clone)]
pub struct MySqlEmployeeStore {
    db_pool: Pool<MySql>,
    procedure: String,
    table: String,
}

impl MySqlEmployeeStore {
    pub fn new(db_pool: Pool<MySql>, procedure: String, table: String) -> Self {
        MySqlEmployeeStore {
            db_pool,
            procedure,
            table,
        }
    }
}

#[async_trait]
impl EmployeeStore for MySqlEmployeeStore {
    async fn run_procedure(&self) -> Result<()> {
        log::info!("(run_procedure) Ejecutando stored procedure {}...", self.procedure);

        let sql = format!("CALL {}", self.procedure);
        sqlx::query(&sql)
            .execute(&self.db_pool)
            .await
            .with_context(|| format!("Fallo al ejecutar el stored procedure {}", self.procedure))?;

        log::info!("(run_procedure) Stored procedure ejecutado con éxito.");
        Ok(())
    }

    async fn fetch_pending(&self) -> Result<Vec<Employee>> {
        let sql = format!(
            "SELECT * FROM {} WHERE LogStatus IS NULL OR LogStatus = 0",
            self.table
        );

        let rows = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.db_pool)
            .await
            .with_context(|| format!("Fallo al leer pendientes de {}", self.table))?;

        log::info!("(fetch_pending) {} registros pendientes.", rows.len());
        Ok(rows)
    }

    async fn mark_done(&self, emp_id: &str) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET LogStatus = 1, LogNotification = NOW() WHERE EmpID = ?",
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(emp_id)
            .execute(&self.db_pool)
            .await
            .with_context(|| format!("Fallo al marcar EmpID={} como notificado", emp_id))?;

        if result.rows_affected() == 0 {
            // El EmpID de la confirmación no coincide con ninguna fila local
            log::warn!(
                "(mark_done) Ninguna fila actualizada para EmpID={}; el identificador del API no coincide con la tabla.",
                emp_id
            );
        }

        Ok(())
    }
}
