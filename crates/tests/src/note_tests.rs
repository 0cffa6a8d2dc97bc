use crate::fixtures::seed::SeededProject;
use crate::fixtures::seed::SeededUser;
use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn create_note(app: &TestApp, token: &str, project_id: &str, body: Value) -> Value {
    let resp = app
        .auth_post(&format!("/api/projects/{}/notes", project_id), token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.status().as_u16(),
        201,
        "Create note failed: {}",
        resp.text().await.unwrap_or_default()
    );
    resp.json().await.unwrap()
}

async fn setup(app: &TestApp) -> (SeededUser, SeededProject) {
    let user = app.seed_user("Writer", "writer", "writer@test.com").await;
    let project = app.seed_project(&user.token, "Notebook").await;
    (user, project)
}

#[tokio::test]
async fn untitled_notes_get_a_default_title() {
    let app = TestApp::spawn().await;
    let (user, project) = setup(&app).await;

    let note = create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "content": "just text" }),
    )
    .await;

    assert_eq!(note["title"], "Untitled Note");
    assert_eq!(note["content"], "just text");
    assert_eq!(note["is_pinned"], false);
    assert!(note["folder"].is_null());
}

#[tokio::test]
async fn search_matches_title_content_and_tags() {
    let app = TestApp::spawn().await;
    let (user, project) = setup(&app).await;

    create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Deploy checklist", "content": "steps" }),
    )
    .await;
    create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Meeting", "content": "discussed deploys" }),
    )
    .await;
    create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Groceries", "content": "milk", "tags": ["personal"] }),
    )
    .await;

    let resp = app
        .auth_get(
            &format!("/api/projects/{}/notes?search=deploy", project.id),
            &user.token,
        )
        .send()
        .await
        .unwrap();
    let notes: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(notes.len(), 2);

    let resp = app
        .auth_get(
            &format!("/api/projects/{}/notes?search=PERSONAL", project.id),
            &user.token,
        )
        .send()
        .await
        .unwrap();
    let notes: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "Groceries");
}

#[tokio::test]
async fn pinned_notes_sort_first() {
    let app = TestApp::spawn().await;
    let (user, project) = setup(&app).await;

    // The pinned note is older, so recency alone would sort it last
    create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Sticky", "is_pinned": true }),
    )
    .await;
    create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Plain" }),
    )
    .await;

    let resp = app
        .auth_get(&format!("/api/projects/{}/notes", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let notes: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(notes[0]["title"], "Sticky");
    assert_eq!(notes[1]["title"], "Plain");
}

#[tokio::test]
async fn folder_filter_supports_unfiled() {
    let app = TestApp::spawn().await;
    let (user, project) = setup(&app).await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/folders", project.id), &user.token)
        .json(&serde_json::json!({ "name": "Work" }))
        .send()
        .await
        .unwrap();
    let folder: Value = resp.json().await.unwrap();
    let folder_id = folder["id"].as_str().unwrap().to_string();

    create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Filed", "folder": folder_id }),
    )
    .await;
    create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Loose" }),
    )
    .await;

    let resp = app
        .auth_get(
            &format!("/api/projects/{}/notes?folder={}", project.id, folder_id),
            &user.token,
        )
        .send()
        .await
        .unwrap();
    let notes: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "Filed");
    assert_eq!(notes[0]["folder"], folder_id.as_str());

    let resp = app
        .auth_get(
            &format!("/api/projects/{}/notes?folder=none", project.id),
            &user.token,
        )
        .send()
        .await
        .unwrap();
    let notes: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "Loose");

    let resp = app
        .auth_get(&format!("/api/projects/{}/notes", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let notes: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(notes.len(), 2);
}

#[tokio::test]
async fn empty_folder_string_unfiles_the_note() {
    let app = TestApp::spawn().await;
    let (user, project) = setup(&app).await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/folders", project.id), &user.token)
        .json(&serde_json::json!({ "name": "Inbox" }))
        .send()
        .await
        .unwrap();
    let folder: Value = resp.json().await.unwrap();
    let folder_id = folder["id"].as_str().unwrap().to_string();

    let note = create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Mobile", "folder": folder_id }),
    )
    .await;
    let note_id = note["id"].as_str().unwrap();

    let resp = app
        .auth_put(&format!("/api/notes/{}", note_id), &user.token)
        .json(&serde_json::json!({ "folder": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let note: Value = resp.json().await.unwrap();
    assert!(note["folder"].is_null());
}

#[tokio::test]
async fn drawing_payload_roundtrips() {
    let app = TestApp::spawn().await;
    let (user, project) = setup(&app).await;

    let drawing = serde_json::json!({
        "shapes": [{ "kind": "rect", "x": 10, "y": 20 }],
        "zoom": 1.5,
    });
    let note = create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Sketch", "drawing": drawing }),
    )
    .await;

    assert_eq!(note["drawing"]["shapes"][0]["kind"], "rect");
    assert_eq!(note["drawing"]["zoom"], 1.5);
}

#[tokio::test]
async fn update_and_delete_note() {
    let app = TestApp::spawn().await;
    let (user, project) = setup(&app).await;

    let note = create_note(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "title": "Old", "content": "draft" }),
    )
    .await;
    let note_id = note["id"].as_str().unwrap();

    let resp = app
        .auth_put(&format!("/api/notes/{}", note_id), &user.token)
        .json(&serde_json::json!({
            "title": "New",
            "is_pinned": true,
            "tags": ["todo"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let note: Value = resp.json().await.unwrap();
    assert_eq!(note["title"], "New");
    assert_eq!(note["is_pinned"], true);
    assert_eq!(note["tags"][0], "todo");

    let resp = app
        .auth_delete(&format!("/api/notes/{}", note_id), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Note deleted");

    let resp = app
        .auth_get(&format!("/api/projects/{}/notes", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let notes: Vec<Value> = resp.json().await.unwrap();
    assert!(notes.is_empty());
}

#[tokio::test]
async fn non_member_cannot_list_notes() {
    let app = TestApp::spawn().await;
    let (_, project) = setup(&app).await;

    let outsider = app.seed_user("Out", "out", "out@test.com").await;
    let resp = app
        .auth_get(&format!("/api/projects/{}/notes", project.id), &outsider.token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 403);
}
