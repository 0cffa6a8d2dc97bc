use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn create_universal(app: &TestApp, token: &str, name: &str, color: &str) -> String {
    let resp = app
        .auth_post("/api/admin/labels", token)
        .json(&serde_json::json!({ "name": name, "color": color }))
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.status().as_u16(),
        201,
        "Create universal label failed: {}",
        resp.text().await.unwrap_or_default()
    );
    let label: Value = resp.json().await.unwrap();
    label["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn project_label_crud() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Labeler", "labeler", "labeler@test.com").await;
    let project = app.seed_project(&user.token, "Labeled").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/labels", project.id), &user.token)
        .json(&serde_json::json!({ "name": "Frontend", "color": "#ff0000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let label: Value = resp.json().await.unwrap();
    assert_eq!(label["name"], "Frontend");
    assert_eq!(label["color"], "#ff0000");
    assert_eq!(label["project"], project.id.as_str());
    let label_id = label["id"].as_str().unwrap().to_string();

    let resp = app
        .auth_put(&format!("/api/labels/{}", label_id), &user.token)
        .json(&serde_json::json!({ "color": "#00ff00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let label: Value = resp.json().await.unwrap();
    assert_eq!(label["color"], "#00ff00");

    let resp = app
        .auth_delete(&format!("/api/labels/{}", label_id), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(&format!("/api/projects/{}/labels", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let labels: Vec<Value> = resp.json().await.unwrap();
    assert!(labels.is_empty());
}

#[tokio::test]
async fn deleting_project_label_detaches_it_from_tasks() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Detacher", "detacher", "detacher@test.com").await;
    let project = app.seed_project(&user.token, "Detaching").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/labels", project.id), &user.token)
        .json(&serde_json::json!({ "name": "Gone", "color": "#123456" }))
        .send()
        .await
        .unwrap();
    let label: Value = resp.json().await.unwrap();
    let label_id = label["id"].as_str().unwrap().to_string();

    let resp = app
        .auth_post("/api/tasks", &user.token)
        .json(&serde_json::json!({
            "title": "Tagged",
            "list_id": project.list_ids[0],
            "labels": [label_id],
        }))
        .send()
        .await
        .unwrap();
    let task: Value = resp.json().await.unwrap();
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["labels"].as_array().unwrap().len(), 1);

    app.auth_delete(&format!("/api/labels/{}", label_id), &user.token)
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_get(&format!("/api/tasks/{}", task_id), &user.token)
        .send()
        .await
        .unwrap();
    let task: Value = resp.json().await.unwrap();
    assert!(task["labels"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn project_labels_include_universal_ones() {
    let app = TestApp::spawn().await;

    let admin = app.admin_login().await;
    create_universal(&app, &admin.token, "Bug", "#cc0000").await;

    let user = app.seed_user("Member", "member", "member@test.com").await;
    let project = app.seed_project(&user.token, "Sees Universal").await;

    let resp = app
        .auth_get(&format!("/api/projects/{}/labels", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let labels: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0]["name"], "Bug");
    // Universal labels carry no project field
    assert!(labels[0]["project"].is_null());
}

#[tokio::test]
async fn universal_labels_require_admin() {
    let app = TestApp::spawn().await;

    let admin = app.admin_login().await;
    let label_id = create_universal(&app, &admin.token, "Shared", "#333333").await;

    let user = app.seed_user("Pleb", "pleb", "pleb@test.com").await;

    let resp = app
        .auth_put(&format!("/api/labels/{}", label_id), &user.token)
        .json(&serde_json::json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_post("/api/admin/labels", &user.token)
        .json(&serde_json::json!({ "name": "Nope", "color": "#000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn editing_universal_label_localizes_existing_usages() {
    let app = TestApp::spawn().await;

    let admin = app.admin_login().await;
    let universal = create_universal(&app, &admin.token, "Bug", "#cc0000").await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@test.com").await;
    let used = app.seed_project(&alice.token, "Uses Bug").await;
    let unused = app.seed_project(&bob.token, "No Bugs").await;

    let resp = app
        .auth_post("/api/tasks", &alice.token)
        .json(&serde_json::json!({
            "title": "Broken build",
            "list_id": used.list_ids[0],
            "labels": [universal],
        }))
        .send()
        .await
        .unwrap();
    let task: Value = resp.json().await.unwrap();
    let task_id = task["id"].as_str().unwrap().to_string();

    // Rename the universal label as admin
    let resp = app
        .auth_put(&format!("/api/admin/labels/{}", universal), &admin.token)
        .json(&serde_json::json!({ "name": "Defect" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let renamed: Value = resp.json().await.unwrap();
    assert_eq!(renamed["name"], "Defect");

    // The using project got a local copy with the pre-edit name
    let resp = app
        .auth_get(&format!("/api/projects/{}/labels", used.id), &alice.token)
        .send()
        .await
        .unwrap();
    let labels: Vec<Value> = resp.json().await.unwrap();
    let local = labels
        .iter()
        .find(|l| l["project"] == used.id.as_str())
        .expect("Local copy missing");
    assert_eq!(local["name"], "Bug");
    assert_eq!(local["color"], "#cc0000");

    // The task now points at the copy, not the universal label
    let resp = app
        .auth_get(&format!("/api/tasks/{}", task_id), &alice.token)
        .send()
        .await
        .unwrap();
    let task: Value = resp.json().await.unwrap();
    let task_labels: Vec<&str> = task["labels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_str().unwrap())
        .collect();
    assert_eq!(task_labels, [local["id"].as_str().unwrap()]);

    // A project that never used the label sees only the renamed universal one
    let resp = app
        .auth_get(&format!("/api/projects/{}/labels", unused.id), &bob.token)
        .send()
        .await
        .unwrap();
    let labels: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0]["name"], "Defect");
    assert!(labels[0]["project"].is_null());
}

#[tokio::test]
async fn deleting_universal_label_leaves_local_copies() {
    let app = TestApp::spawn().await;

    let admin = app.admin_login().await;
    let universal = create_universal(&app, &admin.token, "Legacy", "#888888").await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let project = app.seed_project(&alice.token, "Keeps Copy").await;

    app.auth_post("/api/tasks", &alice.token)
        .json(&serde_json::json!({
            "title": "Old task",
            "list_id": project.list_ids[0],
            "labels": [universal],
        }))
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_delete(&format!("/api/admin/labels/{}", universal), &admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(&format!("/api/projects/{}/labels", project.id), &alice.token)
        .send()
        .await
        .unwrap();
    let labels: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0]["name"], "Legacy");
    assert_eq!(labels[0]["project"], project.id.as_str());

    // The universal list is empty again
    let resp = app.auth_get("/api/admin/labels", &admin.token).send().await.unwrap();
    let universals: Vec<Value> = resp.json().await.unwrap();
    assert!(universals.is_empty());
}
