//! Integration tests for the stencil-control HTTP API.
//!
//! Uses axum-test against in-memory databases, without starting a real server.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use stencil_control::api::types::{
    HistoryResponse, LinesResponse, LoginResponse, LogsResponse, LookupResponse, TensionResponse,
    TensionsResponse,
};
use stencil_control::api::{AppState, create_router};
use stencil_control::config::Config;
use stencil_control::core::users::{NewUser, add_user};
use stencil_control::db::cycles;
use stencil_control::db::migrate::{run_credentials_migrations, run_stencil_migrations};
use stencil_control::db::pool::DbPool;
use stencil_control::db::stencils;
use stencil_control::models::user::ADMIN_ROLE;

const SECRET: &str = "test-secret";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

struct TestApp {
    server: TestServer,
    /// Same database the router writes to, for seeding.
    stencil: DbPool,
}

fn create_test_app() -> TestApp {
    let stencil = DbPool::in_memory().unwrap();
    stencil.with_conn(run_stencil_migrations).unwrap();

    let cred = DbPool::in_memory().unwrap();
    cred.with_conn(run_credentials_migrations).unwrap();
    cred.with_conn(|conn| {
        add_user(
            conn,
            &NewUser {
                usuario: "admin",
                nombre: "Jefe de Turno",
                rol: ADMIN_ROLE,
                num_empleado: Some("0001"),
                password: "adminpw",
            },
            4,
        )?;
        add_user(
            conn,
            &NewUser {
                usuario: "jperez",
                nombre: "Juan Pérez",
                rol: "Operador",
                num_empleado: Some("179"),
                password: "secret",
            },
            4,
        )
    })
    .unwrap();

    let config = Config {
        jwt_secret: SECRET.into(),
        tension_min: -30.0,
        tension_max: -10.0,
        bcrypt_cost: 4,
        ..Config::default()
    };

    let state = AppState::new(config, stencil.clone(), cred);
    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        stencil,
    }
}

fn bearer(token: &str) -> HeaderValue {
    format!("Bearer {token}").parse::<HeaderValue>().unwrap()
}

async fn login(server: &TestServer, usuario: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "usuario": usuario, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<LoginResponse>().token
}

fn error_of(body: &Value) -> &str {
    body["error"].as_str().unwrap_or_default()
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "ok": true }));
}

// =============================================================================
// AUTH
// =============================================================================

#[tokio::test]
async fn test_login_returns_token_and_profile() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "usuario": "admin", "password": "adminpw" }))
        .await;

    response.assert_status_ok();
    let body: LoginResponse = response.json();
    assert_eq!(body.usuario, "admin");
    assert_eq!(body.nombre, "Jefe de Turno");
    assert_eq!(body.rol, ADMIN_ROLE);

    let claims = stencil_control::core::token::verify(&body.token, SECRET).unwrap();
    assert!(claims.is_admin());
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "usuario": "admin", "password": "nope" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&response.json()), "invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_user_is_unauthorized() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "usuario": "ghost", "password": "x" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_missing_fields_is_bad_request() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "usuario": "admin" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(error_of(&response.json()), "usuario and password required");
}

#[tokio::test]
async fn test_login_malformed_body_is_bad_request() {
    let app = create_test_app();

    let response = app.server.post("/api/auth/login").text("{not json").await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_lookup_normalizes_badge() {
    let app = create_test_app();

    let response = app.server.get("/api/auth/lookup/0179A").await;

    response.assert_status_ok();
    let body: LookupResponse = response.json();
    assert_eq!(body.usuario, "jperez");
    assert_eq!(body.nombre, "Juan Pérez");
}

#[tokio::test]
async fn test_lookup_unknown_badge_is_not_found() {
    let app = create_test_app();

    let response = app.server.get("/api/auth/lookup/4242").await;

    response.assert_status_not_found();
    assert_eq!(error_of(&response.json()), "user not found");
}

// =============================================================================
// LINES
// =============================================================================

#[tokio::test]
async fn test_lines_start_idle() {
    let app = create_test_app();

    let response = app.server.get("/api/lines").await;

    response.assert_status_ok();
    let body: LinesResponse = response.json();
    assert_eq!(body.hours, 8);
    assert_eq!(body.lines.len(), 4);
    assert!(body.lines.iter().all(|l| !l.running && l.stencil.is_none()));
}

#[tokio::test]
async fn test_start_requires_stencil() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/lines/0/start")
        .json(&json!({ "stencil": "" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(error_of(&response.json()), "stencil required");
}

#[tokio::test]
async fn test_start_rejects_unknown_line() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/lines/7/start")
        .json(&json!({ "stencil": "ST-1" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(error_of(&response.json()), "invalid line id");
}

#[tokio::test]
async fn test_start_marks_line_running() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/lines/1/start")
        .json(&json!({ "stencil": 4411, "usuario": "Ana" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "ok": true }));

    let lines: LinesResponse = app.server.get("/api/lines").await.json();
    let line = &lines.lines[1];
    assert!(line.running);
    assert_eq!(line.stencil.as_deref(), Some("4411"));
    assert_eq!(line.user.as_deref(), Some("Ana"));
    assert_eq!(line.completed, Some(false));
    assert!(!lines.lines[0].running);
}

#[tokio::test]
async fn test_start_on_running_line_fails() {
    let app = create_test_app();

    app.server
        .post("/api/lines/0/start")
        .json(&json!({ "stencil": "ST-1" }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/api/lines/0/start")
        .json(&json!({ "stencil": "ST-2" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(error_of(&response.json()), "line already running");
}

#[tokio::test]
async fn test_stop_requires_running_cycle() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/lines/2/stop")
        .json(&json!({ "usuario": "jperez", "password": "secret" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(error_of(&response.json()), "no running cycle to stop");
}

#[tokio::test]
async fn test_stop_requires_valid_credentials() {
    let app = create_test_app();

    app.server
        .post("/api/lines/0/start")
        .json(&json!({ "stencil": "ST-1" }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/api/lines/0/stop")
        .json(&json!({ "usuario": "jperez", "password": "wrong" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stop_closes_cycle_and_records_operator() {
    let app = create_test_app();

    app.server
        .post("/api/lines/0/start")
        .json(&json!({ "stencil": "ST-1" }))
        .await
        .assert_status_ok();

    app.server
        .post("/api/lines/0/stop")
        .json(&json!({ "usuario": "jperez", "password": "secret" }))
        .await
        .assert_status_ok();

    let lines: LinesResponse = app.server.get("/api/lines").await.json();
    assert!(!lines.lines[0].running);
    assert_eq!(lines.lines[0].stencil.as_deref(), Some("ST-1"));

    let history: HistoryResponse = app.server.get("/api/history").await.json();
    assert_eq!(history.history.len(), 1);
    assert_eq!(history.history[0].usuario1.as_deref(), Some("jperez"));
    assert!(history.history[0].fh_d.is_some());
}

#[tokio::test]
async fn test_reset_before_target_reports_progress() {
    let app = create_test_app();

    app.server
        .post("/api/lines/0/start")
        .json(&json!({ "stencil": "ST-1" }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/api/lines/0/reset")
        .json(&json!({ "usuario": "jperez", "password": "secret" }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["target"], json!(8 * 3600 * 1000));
    assert!(body["elapsed"].as_i64().unwrap() < 8 * 3600 * 1000);
}

#[tokio::test]
async fn test_reset_without_cycle_fails() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/lines/3/reset")
        .json(&json!({ "usuario": "jperez", "password": "secret" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(error_of(&response.json()), "no cycle to reset");
}

#[tokio::test]
async fn test_reset_after_target_restarts_cycle() {
    let app = create_test_app();
    let started = Utc::now() - Duration::hours(9);
    app.stencil
        .with_conn(|conn| cycles::insert_cycle(conn, 1, "ST-9", Some("Ana"), &started))
        .unwrap();

    let lines: LinesResponse = app.server.get("/api/lines").await.json();
    assert_eq!(lines.lines[0].completed, Some(true));

    app.server
        .post("/api/lines/0/reset")
        .json(&json!({ "usuario": "jperez", "password": "secret" }))
        .await
        .assert_status_ok();

    let history: HistoryResponse = app.server.get("/api/history").await.json();
    assert_eq!(history.history.len(), 2);
    let finished = history.history.iter().find(|r| r.fh_r.is_some()).unwrap();
    assert_eq!(finished.stencil, "ST-9");
    assert!(finished.fh_d.is_some());

    let lines: LinesResponse = app.server.get("/api/lines").await.json();
    assert!(lines.lines[0].running);
    assert_eq!(lines.lines[0].stencil.as_deref(), Some("ST-9"));
    assert_eq!(lines.lines[0].completed, Some(false));
}

// =============================================================================
// HISTORY
// =============================================================================

#[tokio::test]
async fn test_history_filters_by_line() {
    let app = create_test_app();
    let t = Utc::now() - Duration::hours(1);
    app.stencil
        .with_conn(|conn| {
            cycles::insert_cycle(conn, 1, "A", None, &t)?;
            cycles::insert_cycle(conn, 2, "B", None, &t)
        })
        .unwrap();

    let response = app.server.get("/api/history").add_query_param("line", "2").await;

    response.assert_status_ok();
    let body: HistoryResponse = response.json();
    assert_eq!(body.history.len(), 1);
    assert_eq!(body.history[0].stencil, "B");
}

#[tokio::test]
async fn test_history_rejects_bad_filters() {
    let app = create_test_app();

    app.server
        .get("/api/history")
        .add_query_param("line", "x")
        .await
        .assert_status_bad_request();

    app.server
        .get("/api/history")
        .add_query_param("from", "31/12/2025")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_history_export_is_a_csv_attachment() {
    let app = create_test_app();
    let t = Utc::now() - Duration::hours(1);
    app.stencil
        .with_conn(|conn| cycles::insert_cycle(conn, 1, "ST, \"quoted\"", None, &t))
        .unwrap();

    let response = app.server.get("/api/history/export").await;

    response.assert_status_ok();
    let disposition = response.header(header::CONTENT_DISPOSITION);
    assert!(disposition.to_str().unwrap().contains("history_export.csv"));
    let text = response.text();
    assert!(text.starts_with("ID,Línea,Stencil"));
    assert!(text.contains("\"ST, \"\"quoted\"\"\""));
}

#[tokio::test]
async fn test_export_rejects_unknown_format() {
    let app = create_test_app();

    let response = app
        .server
        .get("/api/history/export")
        .add_query_param("format", "pdf")
        .await;

    response.assert_status_bad_request();
}

// =============================================================================
// LOGS (ADMIN)
// =============================================================================

#[tokio::test]
async fn test_logs_require_token() {
    let app = create_test_app();

    let response = app.server.get("/api/logs").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&response.json()), "missing token");
}

#[tokio::test]
async fn test_logs_reject_malformed_header() {
    let app = create_test_app();

    let response = app
        .server
        .get("/api/logs")
        .add_header(header::AUTHORIZATION, "Token abc".parse::<HeaderValue>().unwrap())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&response.json()), "invalid auth header");
}

#[tokio::test]
async fn test_logs_reject_invalid_token() {
    let app = create_test_app();

    let response = app
        .server
        .get("/api/logs")
        .add_header(header::AUTHORIZATION, bearer("not-a-jwt"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&response.json()), "invalid token");
}

#[tokio::test]
async fn test_logs_forbidden_for_operators() {
    let app = create_test_app();
    let token = login(&app.server, "jperez", "secret").await;

    let response = app
        .server
        .get("/api/logs")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(error_of(&response.json()), "admin required");
}

#[tokio::test]
async fn test_logs_list_cycles_for_admin() {
    let app = create_test_app();
    app.server
        .post("/api/lines/0/start")
        .json(&json!({ "stencil": "ST-1" }))
        .await
        .assert_status_ok();
    let token = login(&app.server, "admin", "adminpw").await;

    let response = app
        .server
        .get("/api/logs")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body: LogsResponse = response.json();
    assert_eq!(body.registros.len(), 1);
    assert_eq!(body.registros[0].stencil, "ST-1");
}

// =============================================================================
// STENCILS
// =============================================================================

#[tokio::test]
async fn test_stencil_lookup_by_id_and_number() {
    let app = create_test_app();
    let id = app
        .stencil
        .with_conn(|conn| {
            stencils::insert(conn, "ABC-7", Some("M-1"))?;
            stencils::insert(conn, "ABC-7", Some("M-2"))
        })
        .unwrap();

    let by_number: Value = app.server.get("/api/stencils/ABC-7").await.json();
    assert_eq!(by_number["model"], "M-2");

    let by_id: Value = app.server.get(&format!("/api/stencils/{id}")).await.json();
    assert_eq!(by_id["numero"], "ABC-7");

    app.server
        .get("/api/stencils/NOPE")
        .await
        .assert_status_not_found();
}

// =============================================================================
// TENSIONS
// =============================================================================

#[tokio::test]
async fn test_tension_validation_order() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/tensions")
        .json(&json!({ "da": "abc" }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(error_of(&response.json()), "numero required");

    let response = app
        .server
        .post("/api/tensions")
        .json(&json!({ "numero": "501", "da": "abc" }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(error_of(&response.json()), "da..de must be numeric");

    let response = app
        .server
        .post("/api/tensions")
        .json(&json!({ "numero": "501", "da": 12 }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(
        error_of(&response.json()),
        "num_empleado and password required"
    );
}

#[tokio::test]
async fn test_tension_rejects_bad_credentials() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/tensions")
        .json(&json!({ "numero": "501", "da": 12, "num_empleado": "179", "password": "x" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tension_is_stored_normalized() {
    let app = create_test_app();
    app.stencil
        .with_conn(|conn| stencils::insert(conn, "501", Some("M-501")))
        .unwrap();

    let response = app
        .server
        .post("/api/tensions")
        .json(&json!({
            "numero": "501",
            "da": 12.5,
            "db": "-20",
            "dc": "",
            "num_empleado": "0179A",
            "password": "secret"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let record = response.json::<TensionResponse>().record.unwrap();
    assert_eq!(record.numero, "501");
    assert_eq!(record.model.as_deref(), Some("M-501"));
    assert_eq!(record.da, Some(-12.5));
    assert_eq!(record.db, Some(-20.0));
    assert_eq!(record.dc, None);
    assert_eq!(record.operador, "Juan Pérez");
    assert_eq!(record.supervisor, "SUPERVISOR");
    assert_eq!((record.min, record.max), (-30.0, -10.0));
}

#[tokio::test]
async fn test_tension_latest_and_history() {
    let app = create_test_app();
    for (numero, da) in [("501", 11.0), ("501", 15.0), ("502", 20.0)] {
        app.server
            .post("/api/tensions")
            .json(&json!({
                "numero": numero, "da": da, "num_empleado": "179", "password": "secret"
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let latest: TensionResponse = app
        .server
        .get("/api/tensions/latest")
        .add_query_param("numero", "501")
        .await
        .json();
    assert_eq!(latest.record.unwrap().da, Some(-15.0));

    let missing: TensionResponse = app
        .server
        .get("/api/tensions/latest")
        .add_query_param("id", "999")
        .await
        .json();
    assert!(missing.record.is_none());

    let per_number: TensionsResponse = app.server.get("/api/tensions/latest").await.json();
    let numbers: Vec<_> = per_number.records.iter().map(|r| r.numero.as_str()).collect();
    assert_eq!(numbers, ["502", "501"]);

    let all: TensionsResponse = app.server.get("/api/tensions/501/all").await.json();
    assert_eq!(all.records.len(), 2);
}

#[tokio::test]
async fn test_tension_latest_blank_numero_uses_id() {
    let app = create_test_app();
    for numero in ["5", "7"] {
        app.server
            .post("/api/tensions")
            .json(&json!({
                "numero": numero, "db": 14, "num_empleado": "179", "password": "secret"
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let latest: TensionResponse = app
        .server
        .get("/api/tensions/latest")
        .add_query_param("numero", "")
        .add_query_param("id", "5")
        .await
        .json();
    assert_eq!(latest.record.unwrap().numero, "5");
}

#[tokio::test]
async fn test_tension_export_formats() {
    let app = create_test_app();
    app.server
        .post("/api/tensions")
        .json(&json!({ "numero": "501", "da": 12, "num_empleado": "179", "password": "secret" }))
        .await
        .assert_status(StatusCode::CREATED);

    let csv = app.server.get("/api/tensions/export").await;
    csv.assert_status_ok();
    assert!(csv.text().starts_with("id,fecha,numero,model,da"));

    let xlsx = app
        .server
        .get("/api/tensions/export")
        .add_query_param("format", "xlsx")
        .await;
    xlsx.assert_status_ok();
    assert!(
        xlsx.header(header::CONTENT_TYPE)
            .to_str()
            .unwrap()
            .contains("spreadsheetml")
    );
    // XLSX files are zip archives.
    assert!(xlsx.as_bytes().starts_with(b"PK"));
}
