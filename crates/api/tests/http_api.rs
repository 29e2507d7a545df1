//! Black-box tests over a real listener: the production router wired with
//! in-memory stores, an in-memory broker, and a static identity directory.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use hireboard_api::app::{build_app, state};
use hireboard_core::UserId;
use hireboard_events::{InMemoryBroker, MessageBroker, routing_keys};
use hireboard_identity::{CategorySubscriber, Role, StaticDirectory, UserProfile};
use hireboard_jobs::{InMemoryApplicationStore, InMemoryJobStore};

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    directory: Arc<StaticDirectory>,
    broker: Arc<InMemoryBroker>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestApp {
    async fn spawn() -> Self {
        let directory = Arc::new(StaticDirectory::new());
        let broker = Arc::new(InMemoryBroker::new());

        let app_state = state::assemble(
            Arc::new(InMemoryJobStore::new()),
            Arc::new(InMemoryApplicationStore::new()),
            directory.clone(),
            broker.clone(),
        );
        let app = build_app(app_state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            directory,
            broker,
            handle,
        }
    }

    fn register(&self, token: &str, role: Role) -> UserProfile {
        let profile = UserProfile {
            id: UserId::new(),
            username: token.to_string(),
            email: format!("{token}@example.com"),
            role,
        };
        self.directory.insert_user(token, profile.clone());
        profile
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    async fn get_auth(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn post_json(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .unwrap()
    }

    async fn put_json(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .unwrap()
    }

    async fn patch(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn job_body() -> Value {
    json!({
        "title": "Backend Engineer",
        "description": "Build and operate the services behind our hiring platform, \
                        from API design to production support.",
        "companyName": "Initech",
        "location": "Austin, TX",
        "jobType": "FULL_TIME",
        "category": "SOFTWARE_DEVELOPMENT",
        "experienceLevel": "MID_LEVEL",
        "salaryMin": 90000.0,
        "salaryMax": 120000.0,
        "skillsRequired": "rust, sql",
        "applicationDeadline": null,
    })
}

fn application_body() -> Value {
    json!({
        "coverLetter": "c".repeat(120),
        "resumeUrl": null,
    })
}

async fn create_job(app: &TestApp, token: &str) -> Value {
    let response = app.post_json("/jobs", token, &job_body()).await;
    assert_eq!(response.status(), 201);
    response.json().await.unwrap()
}

#[tokio::test]
async fn health_is_open() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn posting_a_job_requires_a_bearer_token() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/jobs"))
        .json(&job_body())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], 401);
    assert_eq!(body["path"], "/jobs");
    assert!(body["error"].is_string());
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn an_unknown_token_is_rejected_as_401() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/jobs", "never-registered", &job_body()).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn employer_creates_and_reads_back_a_job() {
    let app = TestApp::spawn().await;
    app.register("emp", Role::Employer);

    let job = create_job(&app, "emp").await;
    assert_eq!(job["isActive"], true);
    assert_eq!(job["applicationCount"], 0);
    assert_eq!(job["postedByUsername"], "emp");

    let id = job["id"].as_str().unwrap();
    let fetched = app.get(&format!("/jobs/{id}")).await;
    assert_eq!(fetched.status(), 200);

    let listed: Value = app.get("/jobs").await.json().await.unwrap();
    assert_eq!(listed["totalElements"], 1);
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn seekers_cannot_post_jobs() {
    let app = TestApp::spawn().await;
    app.register("peter", Role::User);

    let response = app.post_json("/jobs", "peter", &job_body()).await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn inverted_salary_range_is_a_400_and_persists_nothing() {
    let app = TestApp::spawn().await;
    app.register("emp", Role::Employer);

    let mut body = job_body();
    body["salaryMin"] = json!(50000.0);
    body["salaryMax"] = json!(40000.0);

    let response = app.post_json("/jobs", "emp", &body).await;
    assert_eq!(response.status(), 400);

    let listed: Value = app.get("/jobs").await.json().await.unwrap();
    assert_eq!(listed["totalElements"], 0);
}

#[tokio::test]
async fn malformed_and_unknown_job_ids() {
    let app = TestApp::spawn().await;

    assert_eq!(app.get("/jobs/not-a-uuid").await.status(), 400);

    let random = uuid_string();
    assert_eq!(app.get(&format!("/jobs/{random}")).await.status(), 404);
}

fn uuid_string() -> String {
    // A v7 id that is valid but matches nothing.
    hireboard_core::JobId::new().to_string()
}

#[tokio::test]
async fn unknown_sort_key_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.get("/jobs?sortBy=salary").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn zero_page_size_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.get("/jobs?page=0&size=0").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn filtered_listings_match_on_their_dimension() {
    let app = TestApp::spawn().await;
    app.register("emp", Role::Employer);

    create_job(&app, "emp").await;

    let mut design = job_body();
    design["title"] = json!("Product Designer");
    design["category"] = json!("DESIGN");
    design["jobType"] = json!("CONTRACT");
    design["salaryMin"] = json!(40000.0);
    design["salaryMax"] = json!(60000.0);
    let response = app.post_json("/jobs", "emp", &design).await;
    assert_eq!(response.status(), 201);

    let by_category: Value = app
        .get("/jobs/category/DESIGN")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(by_category["totalElements"], 1);

    let by_type: Value = app.get("/jobs/type/FULL_TIME").await.json().await.unwrap();
    assert_eq!(by_type["totalElements"], 1);

    let by_salary: Value = app
        .get("/jobs/salary-range?minSalary=80000&maxSalary=130000")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(by_salary["totalElements"], 1);
    assert_eq!(by_salary["items"][0]["title"], "Backend Engineer");

    let searched: Value = app
        .get("/jobs/search?keyword=designer")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(searched["totalElements"], 1);

    assert_eq!(
        app.get("/jobs/category/NOT_A_CATEGORY").await.status(),
        400
    );
}

#[tokio::test]
async fn my_jobs_is_scoped_to_the_calling_employer() {
    let app = TestApp::spawn().await;
    app.register("emp-a", Role::Employer);
    app.register("emp-b", Role::Employer);
    app.register("peter", Role::User);

    create_job(&app, "emp-a").await;
    create_job(&app, "emp-b").await;

    let mine: Value = app
        .get_auth("/jobs/my-jobs", "emp-a")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);

    assert_eq!(app.get_auth("/jobs/my-jobs", "peter").await.status(), 403);
}

#[tokio::test]
async fn only_the_owner_may_update_or_delete() {
    let app = TestApp::spawn().await;
    app.register("emp-a", Role::Employer);
    app.register("emp-b", Role::Employer);

    let job = create_job(&app, "emp-a").await;
    let id = job["id"].as_str().unwrap();

    let response = app
        .put_json(&format!("/jobs/{id}"), "emp-b", &job_body())
        .await;
    assert_eq!(response.status(), 403);

    let response = app.delete(&format!("/jobs/{id}"), "emp-b").await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn delete_is_idempotent_and_closes_applications() {
    let app = TestApp::spawn().await;
    app.register("emp", Role::Employer);
    app.register("peter", Role::User);

    let job = create_job(&app, "emp").await;
    let id = job["id"].as_str().unwrap();

    assert_eq!(app.delete(&format!("/jobs/{id}"), "emp").await.status(), 204);
    assert_eq!(app.delete(&format!("/jobs/{id}"), "emp").await.status(), 204);

    // Soft-deleted: still readable by id, gone from active listings.
    let fetched: Value = app.get(&format!("/jobs/{id}")).await.json().await.unwrap();
    assert_eq!(fetched["isActive"], false);
    let listed: Value = app.get("/jobs").await.json().await.unwrap();
    assert_eq!(listed["totalElements"], 0);

    let response = app
        .post_json(&format!("/jobs/{id}/apply"), "peter", &application_body())
        .await;
    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Job Closed");
}

#[tokio::test]
async fn application_flow_apply_review_withdraw() {
    let app = TestApp::spawn().await;
    app.register("emp", Role::Employer);
    app.register("peter", Role::User);

    let job = create_job(&app, "emp").await;
    let job_id = job["id"].as_str().unwrap();

    // Apply.
    let response = app
        .post_json(&format!("/jobs/{job_id}/apply"), "peter", &application_body())
        .await;
    assert_eq!(response.status(), 201);
    let application: Value = response.json().await.unwrap();
    assert_eq!(application["status"], "PENDING");
    assert_eq!(application["jobTitle"], "Backend Engineer");
    let application_id = application["id"].as_str().unwrap();

    // Applying twice is a conflict.
    let response = app
        .post_json(&format!("/jobs/{job_id}/apply"), "peter", &application_body())
        .await;
    assert_eq!(response.status(), 409);

    // The job now counts one application.
    let fetched: Value = app
        .get(&format!("/jobs/{job_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["applicationCount"], 1);

    // Owner sees the application list; the applicant does not.
    let listed = app
        .get_auth(&format!("/jobs/{job_id}/applications"), "emp")
        .await;
    assert_eq!(listed.status(), 200);
    let listed: Value = listed.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(
        app.get_auth(&format!("/jobs/{job_id}/applications"), "peter")
            .await
            .status(),
        403
    );

    // Owner moves it through the review states; a stranger cannot.
    let response = app
        .patch(
            &format!("/jobs/applications/{application_id}/status?status=SHORTLISTED"),
            "emp",
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["status"], "SHORTLISTED");

    assert_eq!(
        app.patch(
            &format!("/jobs/applications/{application_id}/status?status=ACCEPTED"),
            "peter",
        )
        .await
        .status(),
        403
    );

    // Owner cannot set WITHDRAWN directly.
    assert_eq!(
        app.patch(
            &format!("/jobs/applications/{application_id}/status?status=WITHDRAWN"),
            "emp",
        )
        .await
        .status(),
        400
    );

    // The applicant's own view.
    let mine: Value = app
        .get_auth("/jobs/applications/my-applications", "peter")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // Withdraw, then the owner cannot resurrect.
    let response = app
        .delete(&format!("/jobs/{job_id}/applications/withdraw"), "peter")
        .await;
    assert_eq!(response.status(), 200);
    let withdrawn: Value = response.json().await.unwrap();
    assert_eq!(withdrawn["status"], "WITHDRAWN");

    assert_eq!(
        app.patch(
            &format!("/jobs/applications/{application_id}/status?status=ACCEPTED"),
            "emp",
        )
        .await
        .status(),
        409
    );
}

#[tokio::test]
async fn posting_a_job_routes_an_event_with_the_subscriber_list() {
    let app = TestApp::spawn().await;
    app.register("emp", Role::Employer);
    for name in ["ada", "grace"] {
        app.directory.subscribe(
            "SOFTWARE_DEVELOPMENT",
            CategorySubscriber {
                user_id: UserId::new(),
                username: name.into(),
                email: format!("{name}@example.com"),
            },
        );
    }

    let queue = app.broker.bind(routing_keys::JOB_POSTED);
    let job = create_job(&app, "emp").await;

    let delivery = tokio::task::spawn_blocking(move || {
        queue.recv_timeout(Duration::from_secs(1))
    })
    .await
    .unwrap()
    .expect("job.posted event should be on the queue");

    let event: hireboard_events::JobPosted = delivery.envelope.decode().unwrap();
    assert_eq!(event.job_id.to_string(), job["id"].as_str().unwrap());
    assert_eq!(event.recipient_emails.len(), 2);
    assert!(event.recipient_emails.contains(&"ada@example.com".to_string()));
}
