use serde::{Deserialize, Serialize};

use crate::models::employee_model::Employee;

/// Cuerpo del POST al API de onboarding. Los nombres de campo
/// deben coincidir exactamente con el contrato del API.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingPayload {
    #[serde(rename = "EmpID")]
    pub emp_id: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "SurName")]
    pub sur_name: String,
    #[serde(rename = "PersonalEmail")]
    pub personal_email: String,
    #[serde(rename = "Comp")]
    pub comp: String,
    #[serde(rename = "BU")]
    pub bu: String,
    #[serde(rename = "StartingDate")]
    pub starting_date: String,
    #[serde(rename = "EmailSPD")]
    pub email_spd: String,
    /// El API espera una lista; en la tabla viene como string separado por comas.
    #[serde(rename = "EmailHRBP")]
    pub email_hrbp: Vec<String>,
    #[serde(rename = "ShortComp")]
    pub short_comp: String,
}

impl OnboardingPayload {
    pub fn from_employee(employee: &Employee) -> Self {
        OnboardingPayload {
            emp_id: employee.emp_id.clone(),
            first_name: employee.first_name.clone(),
            sur_name: employee.sur_name.clone(),
            personal_email: employee.personal_email.clone(),
            comp: employee.comp.clone(),
            bu: employee.bu.clone(),
            starting_date: employee.starting_date.clone(),
            email_spd: employee.email_spd.clone(),
            email_hrbp: split_email_list(employee.email_hrbp.as_deref()),
            short_comp: employee.short_comp.clone(),
        }
    }
}

/// "a@x.com,b@x.com" -> ["a@x.com", "b@x.com"]; vacío o NULL -> [].
pub fn split_email_list(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(value) if !value.is_empty() => value.split(',').map(|s| s.to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Respuesta del API cuando el registro quedó confirmado.
/// Solo un cuerpo con esta forma cuenta como éxito.
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingConfirmation {
    pub namelist: NamelistEntry,
    /// Enlace de acceso generado por el API (solo se registra en el log)
    pub magiclink: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamelistEntry {
    #[serde(rename = "EmpID")]
    pub emp_id: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: String,
}
