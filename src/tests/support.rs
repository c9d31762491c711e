//! tests/support.rs
//! Dobles de prueba: almacén en memoria, cliente falso y un stub HTTP
//! del API de onboarding levantado en un puerto efímero.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::models::employee_model::Employee;
use crate::models::onboarding_model::{NamelistEntry, OnboardingConfirmation};
use crate::services::employee_service::EmployeeStore;
use crate::services::onboarding_service::{OnboardingApi, RetryPolicy};

pub fn sample_employee(emp_id: &str) -> Employee {
    Employee {
        emp_id: emp_id.to_string(),
        first_name: "Ana".to_string(),
        sur_name: "Morales".to_string(),
        personal_email: "ana.morales@example.com".to_string(),
        comp: "C001".to_string(),
        bu: "BU-01".to_string(),
        starting_date: "2025-09-01".to_string(),
        email_spd: "spd@example.com".to_string(),
        email_hrbp: Some("hrbp1@example.com,hrbp2@example.com".to_string()),
        short_comp: "C1".to_string(),
        log_status: None,
        log_notification: None,
    }
}

/// Política corta para que las pruebas de reintento no tarden segundos.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        delay: Duration::from_millis(20),
        delay_first_attempt: false,
    }
}

// ============================================================
// Almacén en memoria que imita la tabla de empleados
// ============================================================

pub struct InMemoryEmployeeStore {
    pub rows: Mutex<Vec<Employee>>,
    pub procedure_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    /// EmpIDs marcados, en orden de llamada
    pub marked: Mutex<Vec<String>>,
    pub fail_procedure: bool,
}

impl InMemoryEmployeeStore {
    pub fn new(rows: Vec<Employee>) -> Self {
        InMemoryEmployeeStore {
            rows: Mutex::new(rows),
            procedure_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            marked: Mutex::new(Vec::new()),
            fail_procedure: false,
        }
    }

    pub fn failing_procedure() -> Self {
        let mut store = Self::new(vec![sample_employee("E1")]);
        store.fail_procedure = true;
        store
    }
}

#[async_trait]
impl EmployeeStore for InMemoryEmployeeStore {
    async fn run_procedure(&self) -> Result<()> {
        self.procedure_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_procedure {
            return Err(anyhow!("fallo simulado del stored procedure"));
        }
        Ok(())
    }

    async fn fetch_pending(&self) -> Result<Vec<Employee>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|r| r.is_pending()).cloned().collect())
    }

    async fn mark_done(&self, emp_id: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.emp_id == emp_id) {
            row.log_status = Some(1);
            row.log_notification = Some(Utc::now().naive_utc());
        }
        self.marked.lock().unwrap().push(emp_id.to_string());
        Ok(())
    }
}

// ============================================================
// Cliente falso del API
// ============================================================

pub struct FakeOnboardingApi {
    pub calls: AtomicUsize,
    /// EmpIDs que siempre fallan (simula agotar los reintentos)
    pub fail_for: Vec<String>,
    /// Si está presente, la confirmación trae este EmpID en vez del enviado
    pub confirm_as: Option<String>,
}

impl FakeOnboardingApi {
    pub fn new() -> Self {
        Self::failing_for(&[])
    }

    pub fn failing_for(emp_ids: &[&str]) -> Self {
        FakeOnboardingApi {
            calls: AtomicUsize::new(0),
            fail_for: emp_ids.iter().map(|s| s.to_string()).collect(),
            confirm_as: None,
        }
    }
}

#[async_trait]
impl OnboardingApi for FakeOnboardingApi {
    async fn submit(&self, employee: &Employee) -> Result<OnboardingConfirmation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_for.contains(&employee.emp_id) {
            return Err(anyhow!("fallo simulado del API"));
        }
        let emp_id = self.confirm_as.clone().unwrap_or_else(|| employee.emp_id.clone());
        Ok(confirmation_for(&emp_id))
    }
}

pub fn confirmation_for(emp_id: &str) -> OnboardingConfirmation {
    OnboardingConfirmation {
        namelist: NamelistEntry {
            emp_id: emp_id.to_string(),
            created_at: "2025-09-01T08:00:05+07:00".to_string(),
        },
        magiclink: format!("https://onboarding.example.com/magic/{}", emp_id),
    }
}

// ============================================================
// Stub HTTP del API de onboarding
// ============================================================

pub enum StubFailure {
    /// 200 con un JSON que no tiene la forma namelist/magiclink
    MalformedBody,
    /// 500 Internal Server Error
    ServerError,
}

pub struct StubApiState {
    pub hits: AtomicUsize,
    pub failures_before_success: usize,
    pub failure: StubFailure,
    pub confirm_emp_id: String,
    pub auth_seen: Mutex<Option<String>>,
    pub last_body: Mutex<Option<serde_json::Value>>,
}

/// Levanta el stub en 127.0.0.1 con puerto efímero y devuelve la URL
/// del endpoint más el estado compartido para inspeccionar llamadas.
pub async fn spawn_stub_api(
    failures_before_success: usize,
    confirm_emp_id: &str,
) -> (String, Arc<StubApiState>) {
    spawn_stub_api_failing_with(failures_before_success, confirm_emp_id, StubFailure::MalformedBody)
        .await
}

pub async fn spawn_stub_api_failing_with(
    failures_before_success: usize,
    confirm_emp_id: &str,
    failure: StubFailure,
) -> (String, Arc<StubApiState>) {
    let state = Arc::new(StubApiState {
        hits: AtomicUsize::new(0),
        failures_before_success,
        failure,
        confirm_emp_id: confirm_emp_id.to_string(),
        auth_seen: Mutex::new(None),
        last_body: Mutex::new(None),
    });

    let data = web::Data::new(state.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/newstaff", web::post().to(stub_endpoint))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("No se pudo enlazar el stub del API");

    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());

    (format!("http://{}/newstaff", addr), state)
}

async fn stub_endpoint(
    req: HttpRequest,
    body: web::Json<serde_json::Value>,
    state: web::Data<Arc<StubApiState>>,
) -> HttpResponse {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst);

    *state.auth_seen.lock().unwrap() = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    *state.last_body.lock().unwrap() = Some(body.into_inner());

    if hit < state.failures_before_success {
        return match state.failure {
            StubFailure::MalformedBody => HttpResponse::Ok().json(json!({ "status": "processing" })),
            StubFailure::ServerError => HttpResponse::InternalServerError().body("boom"),
        };
    }

    HttpResponse::Ok().json(json!({
        "namelist": {
            "EmpID": state.confirm_emp_id,
            "CreatedAt": "2025-09-01T08:00:05+07:00",
        },
        "magiclink": format!("https://onboarding.example.com/magic/{}", state.confirm_emp_id),
    }))
}
