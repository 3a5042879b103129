use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskflow::categories::LocalCategoryStore;
use taskflow::client::{ApiClient, ApiConfig};
use taskflow::error::ApiError;
use taskflow::models::{Priority, RecurringFrequency, TaskDraft, TaskPatch};
use taskflow::repo::TaskRepository;
use taskflow::session::{Session, StoredToken};

fn repo(server: &MockServer, dir: &TempDir) -> TaskRepository {
    let mut session = Session::load(dir.path().join("token.json"));
    session
        .store(StoredToken {
            access_token: "tok".into(),
            token_type: "bearer".into(),
        })
        .unwrap();
    let client = ApiClient::new(ApiConfig::new(server.uri()), session);
    let categories = LocalCategoryStore::new(dir.path().join("categories.json"));
    TaskRepository::new(client, Box::new(categories))
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn task_json(id: i64, title: &str, is_completed: bool, due_date: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "is_completed": is_completed,
        "due_date": due_date,
        "user_id": 1,
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-02T00:00:00"
    })
}

async fn mount_task_list(server: &MockServer, tasks: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tasks))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_all_replaces_list_and_fills_defaults() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(
        &server,
        json!([
            task_json(1, "open task", false, Some("2024-03-01T00:00:00")),
            task_json(2, "done task", true, None),
        ]),
    )
    .await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    let tasks = repo.tasks();
    assert_eq!(tasks.len(), 2);

    let open = &tasks[0];
    assert_eq!(open.title, "open task");
    assert!(!open.completed);
    assert_eq!(open.due_date, Some(date("2024-03-01")));
    // Client-only fields come back at their defaults.
    assert_eq!(open.priority, Priority::Medium);
    assert!(!open.is_recurring);
    assert!(open.recurring_frequency.is_none());
    assert!(!open.reminder_enabled);
    assert!(open.completed_at.is_none());

    let done = &tasks[1];
    assert!(done.completed);
    // A completed record is stamped with the server's update time.
    assert!(done.completed_at.is_some());
}

#[tokio::test]
async fn test_create_prepends_and_keeps_draft_extensions() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([task_json(1, "existing", false, None)])).await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(task_json(7, "water plants", false, Some("2024-04-01T00:00:00"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    let created = repo
        .create(TaskDraft {
            title: "water plants".into(),
            due_date: Some(date("2024-04-01")),
            priority: Priority::High,
            category_id: Some("garden".into()),
            is_recurring: true,
            recurring_frequency: Some(RecurringFrequency::Weekly),
            reminder_enabled: true,
            ..TaskDraft::default()
        })
        .await
        .unwrap();

    // Server-assigned identity, draft-supplied extensions.
    assert_eq!(created.id, 7);
    assert_eq!(created.priority, Priority::High);
    assert_eq!(created.category_id.as_deref(), Some("garden"));
    assert!(created.is_recurring);
    assert!(created.reminder_enabled);

    let tasks = repo.tasks();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, 7);
    assert_eq!(tasks[1].id, 1);
}

#[tokio::test]
async fn test_create_failure_leaves_list_unchanged() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([task_json(1, "existing", false, None)])).await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "nope" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    let err = repo
        .create(TaskDraft {
            title: "doomed".into(),
            ..TaskDraft::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(repo.tasks().len(), 1);
    assert_eq!(repo.tasks()[0].id, 1);
}

#[tokio::test]
async fn test_create_recurring_without_frequency_is_rejected_offline() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut repo = repo(&server, &dir);
    let err = repo
        .create(TaskDraft {
            title: "broken".into(),
            is_recurring: true,
            recurring_frequency: None,
            ..TaskDraft::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_update_unknown_id_is_a_noop() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([])).await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    let result = repo
        .update(
            42,
            TaskPatch {
                title: Some("ghost".into()),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(result.is_none());

    // Only the initial fetch reached the server.
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_update_merges_partial_fields() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([task_json(1, "old title", false, None)])).await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "title": "new title",
            "description": null,
            "is_completed": false,
            "due_date": null,
            "user_id": 1,
            "created_at": "2024-01-01T00:00:00",
            "updated_at": "2024-02-02T00:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    let updated = repo
        .update(
            1,
            TaskPatch {
                title: Some("new title".into()),
                priority: Some(Priority::Low),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "new title");
    assert_eq!(updated.priority, Priority::Low);
    // Untouched fields survive the merge.
    assert!(!updated.completed);
    assert_eq!(
        updated.updated_at,
        chrono::NaiveDate::from_ymd_opt(2024, 2, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );
}

#[tokio::test]
async fn test_delete_absent_id_keeps_list_intact() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([task_json(1, "keep me", false, None)])).await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    let deleted = repo.delete(99).await.unwrap();
    assert!(!deleted);
    assert_eq!(repo.tasks().len(), 1);

    // No DELETE ever went out.
    let deletes = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.to_string() == "DELETE")
        .count();
    assert_eq!(deletes, 0);
}

#[tokio::test]
async fn test_delete_failure_is_non_destructive() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([task_json(1, "survivor", false, None)])).await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "locked" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    assert!(repo.delete(1).await.is_err());
    assert_eq!(repo.tasks().len(), 1);
}

#[tokio::test]
async fn test_delete_removes_locally_after_server_accepts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([task_json(1, "goner", false, None)])).await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    assert!(repo.delete(1).await.unwrap());
    assert!(repo.tasks().is_empty());
}

#[tokio::test]
async fn test_toggle_complete_sets_completion_and_timestamp() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([task_json(1, "plain task", false, None)])).await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(task_json(1, "plain task", true, None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    let task = repo.toggle_complete(1).await.unwrap().unwrap();
    assert!(task.completed);
    assert!(task.completed_at.is_some());

    // A non-recurring completion creates nothing.
    assert_eq!(repo.tasks().len(), 1);
    let posts = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.to_string() == "POST")
        .count();
    assert_eq!(posts, 0);
}

#[tokio::test]
async fn test_toggle_complete_unknown_id_is_a_noop() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([])).await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();
    assert!(repo.toggle_complete(5).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reopening_a_task_clears_completed_at() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([task_json(1, "done task", true, None)])).await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(task_json(1, "done task", false, None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();

    let task = repo.toggle_complete(1).await.unwrap().unwrap();
    assert!(!task.completed);
    assert!(task.completed_at.is_none());
}

#[tokio::test]
async fn test_completing_recurring_task_spawns_next_occurrence_first() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_task_list(&server, json!([])).await;

    // First POST creates the original task, the second creates the next
    // occurrence during completion.
    Mock::given(method("POST"))
        .and(path("/api/tasks/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(task_json(1, "water plants", false, Some("2024-01-01T00:00:00"))),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(task_json(2, "water plants", false, Some("2024-01-08T00:00:00"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(task_json(1, "water plants", true, Some("2024-01-01T00:00:00"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = repo(&server, &dir);
    repo.fetch_all().await.unwrap();
    repo.create(TaskDraft {
        title: "water plants".into(),
        due_date: Some(date("2024-01-01")),
        priority: Priority::High,
        is_recurring: true,
        recurring_frequency: Some(RecurringFrequency::Weekly),
        ..TaskDraft::default()
    })
    .await
    .unwrap();

    let original = repo.toggle_complete(1).await.unwrap().unwrap();
    assert!(original.completed);

    let tasks = repo.tasks();
    assert_eq!(tasks.len(), 2);

    // The new occurrence carries the same settings, one week later.
    let next = &tasks[0];
    assert_eq!(next.id, 2);
    assert_eq!(next.title, "water plants");
    assert!(!next.completed);
    assert_eq!(next.due_date, Some(date("2024-01-08")));
    assert_eq!(next.priority, Priority::High);
    assert!(next.is_recurring);
    assert_eq!(next.recurring_frequency, Some(RecurringFrequency::Weekly));

    // The occurrence was created before the original was marked complete.
    let mutations: Vec<String> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.to_string() != "GET")
        .map(|r| r.method.to_string())
        .collect();
    assert_eq!(mutations, vec!["POST", "POST", "PUT"]);
}
