use std::sync::{Arc, Mutex};
use std::time::Duration;

use applog::config::ApiConfig;
use applog::{
    FilterUpdate, HttpJobRepository, JobApplication, JobRepository, JobStatus, JobStore, JobUpdate,
    NewJobApplication, RepositoryError,
};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, response::IntoResponse};
use chrono::NaiveDate;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct ServerState {
    jobs: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<Mutex<u64>>,
}

// json-server style: ids may be strings or numbers
fn id_matches(job: &Value, id: &str) -> bool {
    match &job["id"] {
        Value::String(s) => s == id,
        other => other.to_string() == id,
    }
}

async fn list(State(state): State<ServerState>) -> Json<Vec<Value>> {
    Json(state.jobs.lock().unwrap().clone())
}

async fn find(Path(id): Path<String>, State(state): State<ServerState>) -> impl IntoResponse {
    let jobs = state.jobs.lock().unwrap();
    match jobs.iter().find(|job| id_matches(job, &id)) {
        Some(job) => Json(job.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn create(State(state): State<ServerState>, Json(mut body): Json<Value>) -> impl IntoResponse {
    let mut next_id = state.next_id.lock().unwrap();
    *next_id += 1;
    body["id"] = json!(next_id.to_string());
    state.jobs.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn update(
    Path(id): Path<String>,
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut jobs = state.jobs.lock().unwrap();
    let Some(job) = jobs.iter_mut().find(|job| id_matches(job, &id)) else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    if let (Some(job), Some(changes)) = (job.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            job.insert(key.clone(), value.clone());
        }
    }
    Json(job.clone()).into_response()
}

async fn remove(Path(id): Path<String>, State(state): State<ServerState>) -> StatusCode {
    let mut jobs = state.jobs.lock().unwrap();
    match jobs.iter().position(|job| id_matches(job, &id)) {
        Some(idx) => {
            jobs.remove(idx);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Serve an in-memory `/jobs` resource and point a repository at it.
async fn start_server(seed: Vec<Value>) -> (HttpJobRepository, ServerState) {
    let state = ServerState::default();
    *state.next_id.lock().unwrap() = seed.len() as u64;
    *state.jobs.lock().unwrap() = seed;

    let app = Router::new()
        .route("/jobs", get(list).post(create))
        .route("/jobs/:id", get(find).put(update).delete(remove))
        .route("/broken/jobs", get(|| async { Json(json!([{ "id": 1, "status": "Lost" }])) }))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ApiConfig::new(&format!("http://{}", addr)).unwrap();
    (HttpJobRepository::new(&config).unwrap(), state)
}

fn seed() -> Vec<Value> {
    vec![
        json!({
            "id": "1",
            "company": "Tech Corp",
            "position": "Frontend Developer",
            "status": "Applied",
            "dateApplied": "2024-01-15",
            "location": "San Francisco",
            "salary": 80000
        }),
        json!({
            "id": 2,
            "company": "Startup Inc",
            "position": "Full Stack Developer",
            "status": "Interview",
            "dateApplied": "2024-01-10",
            "location": "Remote"
        }),
    ]
}

#[tokio::test]
async fn lists_and_gets_jobs() {
    // given
    let (repo, _state) = start_server(seed()).await;
    // when
    let jobs = repo.list_jobs().await.unwrap();
    let job = repo.get_job("1").await.unwrap();
    // then
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[1].id, "2");
    assert_eq!(job.company, "Tech Corp");
    assert_eq!(job.salary, Some(80000.0));
}

#[tokio::test]
async fn missing_job_is_a_status_error() {
    // given
    let (repo, _state) = start_server(seed()).await;
    // when
    let err = repo.get_job("42").await.expect_err("job 42 does not exist");
    // then
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "request failed with status 404: Not Found");
}

#[tokio::test]
async fn creates_updates_and_deletes() {
    // given
    let (repo, state) = start_server(seed()).await;
    let new_job = NewJobApplication {
        company: "Test Company".to_string(),
        position: "Developer".to_string(),
        status: JobStatus::Applied,
        date_applied: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        location: "Remote".to_string(),
        salary: None,
        description: None,
        notes: Some("Referral from Sam".to_string()),
        contact_person: None,
        contact_email: None,
        application_url: None,
    };

    // when
    let created = repo.create_job(&new_job).await.unwrap();
    let updated = repo
        .update_job(&created.id, &JobUpdate::status(JobStatus::Interview))
        .await
        .unwrap();
    // then
    assert_eq!(created.id, "3");
    assert_eq!(created.notes.as_deref(), Some("Referral from Sam"));
    assert_eq!(updated.status, JobStatus::Interview);
    assert_eq!(updated.company, "Test Company");
    assert!(state.jobs.lock().unwrap()[2].get("salary").is_none());

    // when
    repo.delete_job(&created.id).await.unwrap();
    // then
    assert_eq!(state.jobs.lock().unwrap().len(), 2);
    assert!(repo.delete_job(&created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    // given
    let (repo, _state) = start_server(seed()).await;
    let broken = HttpJobRepository::new(
        &ApiConfig::new(&format!("{}broken", repo.base_url())).unwrap(),
    )
    .unwrap();
    // when
    let err = broken.list_jobs().await.expect_err("status Lost is not a job status");
    // then
    assert!(matches!(err, RepositoryError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // given
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let config = ApiConfig::new(&format!("http://{}", addr))
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    let repo = HttpJobRepository::new(&config).unwrap();
    // when
    let err = repo.list_jobs().await.expect_err("nothing is listening");
    // then
    assert!(matches!(err, RepositoryError::Network(_)));
}

#[tokio::test]
async fn store_over_http_filters_and_deletes() {
    // given
    let (repo, state) = start_server(seed()).await;
    let mut store = JobStore::new(repo);
    store.fetch_jobs().await;
    // when
    store.set_filters(FilterUpdate::search(Some("startup".to_string())));
    let target: JobApplication = store.sorted_jobs()[0].clone();
    store.delete_job(&target.id).await.unwrap();
    // then
    assert_eq!(target.id, "2");
    assert!(store.filtered_jobs().is_empty());
    assert_eq!(store.all_jobs().len(), 1);
    assert_eq!(state.jobs.lock().unwrap().len(), 1);
}
