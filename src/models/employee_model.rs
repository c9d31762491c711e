use chrono::NaiveDateTime;
use sqlx::FromRow;

/// Una fila de la tabla de empleados pendientes de onboarding.
/// La tabla la llena un proceso de RRHH externo; este sistema solo
/// marca las filas como notificadas (`LogStatus = 1`).
#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    #[sqlx(rename = "EmpID")]
    pub emp_id: String,
    #[sqlx(rename = "FirstName")]
    pub first_name: String,
    #[sqlx(rename = "SurName")]
    pub sur_name: String,
    #[sqlx(rename = "PersonalEmail")]
    pub personal_email: String,
    /// Código de compañía
    #[sqlx(rename = "Comp")]
    pub comp: String,
    /// Unidad de negocio
    #[sqlx(rename = "BU")]
    pub bu: String,
    // La fecha viaja tal cual viene de la tabla (texto)
    #[sqlx(rename = "StartingDate")]
    pub starting_date: String,
    #[sqlx(rename = "EmailSPD")]
    pub email_spd: String,
    /// Lista de correos HRBP separados por coma (puede venir NULL)
    #[sqlx(rename = "EmailHRBP")]
    pub email_hrbp: Option<String>,
    #[sqlx(rename = "ShortComp")]
    pub short_comp: String,
    /// NULL o 0 = pendiente, 1 = notificado
    #[sqlx(rename = "LogStatus")]
    pub log_status: Option<i32>,
    /// Fecha de la notificación exitosa (NULL hasta entonces)
    #[sqlx(rename = "LogNotification")]
    pub log_notification: Option<NaiveDateTime>,
}

impl Employee {
    /// Un empleado es elegible mientras su LogStatus sea NULL o 0.
    pub fn is_pending(&self) -> bool {
        matches!(self.log_status, None | Some(0))
    }
}
