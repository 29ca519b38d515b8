use rsvpd_server::{AppConfig, build_app};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

async fn start_server() -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    start_server_with(AppConfig::default()).await
}

async fn start_server_with(
    cfg: AppConfig,
) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(&cfg).await.expect("build app");

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

fn register_body(email: &str, event_id: &str, publications: &[&str]) -> Value {
    json!({
        "name": "Ada Example",
        "email": email,
        "bio": "Writes about things.",
        "publications": publications,
        "eventId": event_id,
    })
}

#[tokio::test]
async fn server_endpoints_work() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    // GET /
    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "rsvpd");
    assert_eq!(body["status"], "ok");

    // GET /healthz
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // GET /readyz
    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");

    // GET /api/occurrences
    let resp = client
        .get(format!("{base}/api/occurrences"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 5);
    assert_eq!(list[0]["id"], "date1");
    assert_eq!(list[0]["capacity"], 14);
    assert_eq!(list[0]["maxPerCohort"], 5);
    assert_eq!(list[0]["total"], 0);

    // responses carry a request id
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn classify_flow() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    // majority of cohort-a publications classifies as cohort-a
    let resp = client
        .post(format!("{base}/api/classify"))
        .json(&json!({"publications": ["The Meridian Review", "Harbor Quarterly"]}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["cohort"], "cohort-a");
    assert_eq!(body["available"].as_array().unwrap().len(), 5);
    assert_eq!(body["waitlistOffered"], false);
    assert_eq!(body["preferredDefaults"].as_array().unwrap().len(), 0);

    // a tie falls back to the middle cohort
    let resp = client
        .post(format!("{base}/api/classify"))
        .json(&json!({"publications": ["The Meridian Review", "Summit Dispatch"]}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["cohort"], "cohort-b");

    // empty selection is a validation error
    let resp = client
        .post(format!("{base}/api/classify"))
        .json(&json!({"publications": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "invalid");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn register_flow_updates_counts_and_rejects_duplicates() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/registrations"))
        .json(&register_body(
            "ada@example.com",
            "date1",
            &["The Meridian Review"],
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["cohort"], "cohort-a");
    assert_eq!(body["eventId"], "date1");
    assert_eq!(body["movedFromWaitlist"], false);
    assert!(body["submittedAt"].is_string());

    // counts reflect the registration
    let resp = client
        .get(format!("{base}/api/occurrences"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body[0]["counts"]["cohortA"], 1);
    assert_eq!(body[0]["total"], 1);

    // the same email cannot register twice while active
    let resp = client
        .post(format!("{base}/api/registrations"))
        .json(&register_body(
            "ada@example.com",
            "date2",
            &["The Meridian Review"],
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "conflict");

    // unknown occurrence is a bad request
    let resp = client
        .post(format!("{base}/api/registrations"))
        .json(&register_body(
            "new@example.com",
            "date9",
            &["The Meridian Review"],
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn full_cohort_bucket_rejects_further_registrations() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    for i in 0..5 {
        let resp = client
            .post(format!("{base}/api/registrations"))
            .json(&register_body(
                &format!("a{i}@example.com"),
                "date1",
                &["The Meridian Review"],
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    // the occurrence no longer shows as open to this cohort
    let resp = client
        .post(format!("{base}/api/classify"))
        .json(&json!({"publications": ["The Meridian Review"]}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let open_ids: Vec<&str> = body["available"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert!(!open_ids.contains(&"date1"));

    // a sixth registration is refused with a capacity error
    let resp = client
        .post(format!("{base}/api/registrations"))
        .json(&register_body(
            "a5@example.com",
            "date1",
            &["The Meridian Review"],
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "capacity");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn waitlist_and_invite_submissions() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    // waitlist with no preferred occurrences is a validation error
    let resp = client
        .post(format!("{base}/api/waitlist"))
        .json(&json!({
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "bio": "Builds compilers.",
            "publications": ["Summit Dispatch"],
            "preferredEvents": [],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(format!("{base}/api/waitlist"))
        .json(&json!({
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "bio": "Builds compilers.",
            "publications": ["Summit Dispatch"],
            "preferredEvents": ["date1", "date3"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["cohort"], "cohort-c");
    assert_eq!(body["preferredEvents"], json!(["date1", "date3"]));

    let resp = client
        .post(format!("{base}/api/invites"))
        .json(&json!({"name": "Alan Turing", "email": "alan@example.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
