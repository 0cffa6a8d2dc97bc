use crate::fixtures::seed::SeededProject;
use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn list_task_ids(app: &TestApp, token: &str, project: &SeededProject, idx: usize) -> Vec<String> {
    let resp = app
        .auth_get(&format!("/api/boards/{}", project.board_id), token)
        .send()
        .await
        .unwrap();
    let detail: Value = resp.json().await.unwrap();
    detail["lists"][idx]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn create_task_appends_to_list() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Tasker", "tasker", "tasker@test.com").await;
    let project = app.seed_project(&user.token, "Tasks").await;

    let resp = app
        .auth_post("/api/tasks", &user.token)
        .json(&serde_json::json!({
            "title": "First",
            "list_id": project.list_ids[0],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let first: Value = resp.json().await.unwrap();
    assert_eq!(first["title"], "First");
    assert_eq!(first["position"], 0);
    assert_eq!(first["priority"], "medium");
    assert_eq!(first["description"], "");
    assert!(first["labels"].as_array().unwrap().is_empty());
    assert!(first["completed_at"].is_null());

    let resp = app
        .auth_post("/api/tasks", &user.token)
        .json(&serde_json::json!({
            "title": "Second",
            "list_id": project.list_ids[0],
        }))
        .send()
        .await
        .unwrap();
    let second: Value = resp.json().await.unwrap();
    assert_eq!(second["position"], 1);
}

#[tokio::test]
async fn create_task_requires_title_and_known_list() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Strict", "strict", "strict@test.com").await;
    let project = app.seed_project(&user.token, "Strict").await;

    let resp = app
        .auth_post("/api/tasks", &user.token)
        .json(&serde_json::json!({
            "title": "  ",
            "list_id": project.list_ids[0],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .auth_post("/api/tasks", &user.token)
        .json(&serde_json::json!({
            "title": "Orphan",
            "list_id": bson::oid::ObjectId::new().to_hex(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn non_member_cannot_create_task() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@test.com").await;
    let project = app.seed_project(&alice.token, "Private").await;

    let resp = app
        .auth_post("/api/tasks", &bob.token)
        .json(&serde_json::json!({
            "title": "Sneaky",
            "list_id": project.list_ids[0],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn due_date_accepts_plain_dates_and_clears_on_empty() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Dates", "dates", "dates@test.com").await;
    let project = app.seed_project(&user.token, "Dated").await;

    let resp = app
        .auth_post("/api/tasks", &user.token)
        .json(&serde_json::json!({
            "title": "Deadline",
            "list_id": project.list_ids[0],
            "due_date": "2026-09-01",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let task: Value = resp.json().await.unwrap();
    let task_id = task["id"].as_str().unwrap();
    assert!(task["due_date"].as_str().unwrap().starts_with("2026-09-01"));

    // Empty string clears the date
    let resp = app
        .auth_put(&format!("/api/tasks/{}", task_id), &user.token)
        .json(&serde_json::json!({ "due_date": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let task: Value = resp.json().await.unwrap();
    assert!(task["due_date"].is_null());

    let resp = app
        .auth_put(&format!("/api/tasks/{}", task_id), &user.token)
        .json(&serde_json::json!({ "due_date": "not-a-date" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn move_to_another_list_renumbers_both() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Mover", "mover", "mover@test.com").await;
    let project = app.seed_project(&user.token, "Moving").await;

    let a = app.seed_task(&user.token, &project.list_ids[0], "A").await;
    let b = app.seed_task(&user.token, &project.list_ids[0], "B").await;
    let c = app.seed_task(&user.token, &project.list_ids[0], "C").await;
    let x = app.seed_task(&user.token, &project.list_ids[1], "X").await;

    // Move B to the head of the second list
    let resp = app
        .auth_put(&format!("/api/tasks/{}/move", b), &user.token)
        .json(&serde_json::json!({
            "new_list_id": project.list_ids[1],
            "new_position": 0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let moved: Value = resp.json().await.unwrap();
    assert_eq!(moved["list"], project.list_ids[1].as_str());
    assert_eq!(moved["position"], 0);

    // Source list closed the gap, destination shifted
    assert_eq!(list_task_ids(&app, &user.token, &project, 0).await, [a.clone(), c.clone()]);
    assert_eq!(list_task_ids(&app, &user.token, &project, 1).await, [b.clone(), x.clone()]);

    let resp = app.auth_get(&format!("/api/tasks/{}", c), &user.token).send().await.unwrap();
    let task: Value = resp.json().await.unwrap();
    assert_eq!(task["position"], 1);
}

#[tokio::test]
async fn move_within_list_reorders() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Shuffler", "shuffler", "shuffler@test.com").await;
    let project = app.seed_project(&user.token, "Shuffling").await;

    let a = app.seed_task(&user.token, &project.list_ids[0], "A").await;
    let b = app.seed_task(&user.token, &project.list_ids[0], "B").await;
    let c = app.seed_task(&user.token, &project.list_ids[0], "C").await;

    let resp = app
        .auth_put(&format!("/api/tasks/{}/move", c), &user.token)
        .json(&serde_json::json!({
            "new_list_id": project.list_ids[0],
            "new_position": 0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    assert_eq!(
        list_task_ids(&app, &user.token, &project, 0).await,
        [c, a, b]
    );
}

#[tokio::test]
async fn move_position_is_clamped_to_list_end() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Clamp", "clamp", "clamp@test.com").await;
    let project = app.seed_project(&user.token, "Clamped").await;

    let a = app.seed_task(&user.token, &project.list_ids[0], "A").await;
    let b = app.seed_task(&user.token, &project.list_ids[0], "B").await;

    let resp = app
        .auth_put(&format!("/api/tasks/{}/move", a), &user.token)
        .json(&serde_json::json!({
            "new_list_id": project.list_ids[0],
            "new_position": 99,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let moved: Value = resp.json().await.unwrap();
    assert_eq!(moved["position"], 1);

    assert_eq!(list_task_ids(&app, &user.token, &project, 0).await, [b, a]);
}

#[tokio::test]
async fn moving_logs_destination_list_name() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Audit", "audit", "audit@test.com").await;
    let project = app.seed_project(&user.token, "Audited").await;
    let task = app.seed_task(&user.token, &project.list_ids[0], "Tracked").await;

    app.auth_put(&format!("/api/tasks/{}/move", task), &user.token)
        .json(&serde_json::json!({
            "new_list_id": project.list_ids[1],
            "new_position": 0,
        }))
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_get(&format!("/api/projects/{}/changelog", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = resp.json().await.unwrap();
    assert!(entries.iter().any(|e| {
        e["message"] == "moved the task \"Tracked\" to In Progress." && e["category"] == "task"
    }));
}

#[tokio::test]
async fn complete_and_reopen_roundtrip() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Finisher", "finisher", "finisher@test.com").await;
    let project = app.seed_project(&user.token, "Finishing").await;
    let task = app.seed_task(&user.token, &project.list_ids[0], "Finish me").await;

    let resp = app
        .auth_put(&format!("/api/tasks/{}/complete", task), &user.token)
        .json(&serde_json::json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert!(json["completed_at"].is_string());

    let resp = app
        .auth_put(&format!("/api/tasks/{}/complete", task), &user.token)
        .json(&serde_json::json!({ "completed": false }))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert!(json["completed_at"].is_null());

    let resp = app
        .auth_get(&format!("/api/projects/{}/changelog", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = resp.json().await.unwrap();
    assert!(entries
        .iter()
        .any(|e| e["message"] == "completed the task \"Finish me\"."));
    assert!(entries
        .iter()
        .any(|e| e["message"] == "reopened the task \"Finish me\"."));
}

#[tokio::test]
async fn priority_validates_its_value() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Urgent", "urgent", "urgent@test.com").await;
    let project = app.seed_project(&user.token, "Priorities").await;
    let task = app.seed_task(&user.token, &project.list_ids[0], "Prioritize").await;

    let resp = app
        .auth_put(&format!("/api/tasks/{}/priority", task), &user.token)
        .json(&serde_json::json!({ "priority": "urgent" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["priority"], "urgent");

    let resp = app
        .auth_put(&format!("/api/tasks/{}/priority", task), &user.token)
        .json(&serde_json::json!({ "priority": "whenever" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Invalid priority");
}

#[tokio::test]
async fn update_task_changes_fields() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Updater", "updater", "updater@test.com").await;
    let project = app.seed_project(&user.token, "Updates").await;
    let task = app.seed_task(&user.token, &project.list_ids[0], "Draft").await;

    let resp = app
        .auth_put(&format!("/api/tasks/{}", task), &user.token)
        .json(&serde_json::json!({
            "title": "Final",
            "description": "Polished",
            "assignees": [user.id],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["title"], "Final");
    assert_eq!(json["description"], "Polished");
    assert_eq!(json["assignees"][0], user.id.as_str());
}

#[tokio::test]
async fn delete_task_renumbers_the_rest() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Remover", "remover", "remover@test.com").await;
    let project = app.seed_project(&user.token, "Removals").await;

    let a = app.seed_task(&user.token, &project.list_ids[0], "A").await;
    let b = app.seed_task(&user.token, &project.list_ids[0], "B").await;
    let c = app.seed_task(&user.token, &project.list_ids[0], "C").await;

    let resp = app
        .auth_delete(&format!("/api/tasks/{}", a), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    assert_eq!(
        list_task_ids(&app, &user.token, &project, 0).await,
        [b.clone(), c.clone()]
    );

    let resp = app.auth_get(&format!("/api/tasks/{}", b), &user.token).send().await.unwrap();
    let task: Value = resp.json().await.unwrap();
    assert_eq!(task["position"], 0);
    let resp = app.auth_get(&format!("/api/tasks/{}", c), &user.token).send().await.unwrap();
    let task: Value = resp.json().await.unwrap();
    assert_eq!(task["position"], 1);
}
