use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn create_folder(app: &TestApp, token: &str, project_id: &str, body: Value) -> Value {
    let resp = app
        .auth_post(&format!("/api/projects/{}/folders", project_id), token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.status().as_u16(),
        201,
        "Create folder failed: {}",
        resp.text().await.unwrap_or_default()
    );
    resp.json().await.unwrap()
}

#[tokio::test]
async fn folders_nest_by_parent() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Filer", "filer", "filer@test.com").await;
    let project = app.seed_project(&user.token, "Filing").await;

    let root = create_folder(&app, &user.token, &project.id, serde_json::json!({ "name": "Docs" })).await;
    let root_id = root["id"].as_str().unwrap();
    assert!(root["parent"].is_null());

    let child = create_folder(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "name": "Specs", "parent": root_id }),
    )
    .await;
    assert_eq!(child["parent"], root_id);

    let resp = app
        .auth_get(&format!("/api/projects/{}/folders", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let folders: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(folders.len(), 2);
}

#[tokio::test]
async fn empty_parent_string_moves_folder_to_top_level() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Mover", "mover", "mover@test.com").await;
    let project = app.seed_project(&user.token, "Moving").await;

    let root = create_folder(&app, &user.token, &project.id, serde_json::json!({ "name": "Root" })).await;
    let child = create_folder(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "name": "Nested", "parent": root["id"].as_str().unwrap() }),
    )
    .await;

    let resp = app
        .auth_put(
            &format!("/api/folders/{}", child["id"].as_str().unwrap()),
            &user.token,
        )
        .json(&serde_json::json!({ "name": "Promoted", "parent": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let folder: Value = resp.json().await.unwrap();
    assert_eq!(folder["name"], "Promoted");
    assert!(folder["parent"].is_null());
}

#[tokio::test]
async fn deleting_a_folder_reparents_children_and_notes() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Pruner", "pruner", "pruner@test.com").await;
    let project = app.seed_project(&user.token, "Pruning").await;

    let top = create_folder(&app, &user.token, &project.id, serde_json::json!({ "name": "Top" })).await;
    let top_id = top["id"].as_str().unwrap().to_string();
    let middle = create_folder(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "name": "Middle", "parent": top_id }),
    )
    .await;
    let middle_id = middle["id"].as_str().unwrap().to_string();
    let leaf = create_folder(
        &app,
        &user.token,
        &project.id,
        serde_json::json!({ "name": "Leaf", "parent": middle_id }),
    )
    .await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/notes", project.id), &user.token)
        .json(&serde_json::json!({ "title": "Filed", "folder": middle_id }))
        .send()
        .await
        .unwrap();
    let note: Value = resp.json().await.unwrap();

    let resp = app
        .auth_delete(&format!("/api/folders/{}", middle_id), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Folder deleted");

    // The leaf moved up under Top
    let resp = app
        .auth_get(&format!("/api/projects/{}/folders", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let folders: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(folders.len(), 2);
    let leaf_now = folders
        .iter()
        .find(|f| f["id"] == leaf["id"])
        .expect("Leaf folder missing");
    assert_eq!(leaf_now["parent"], top_id.as_str());

    // The note moved with it
    let resp = app
        .auth_get(
            &format!("/api/projects/{}/notes?folder={}", project.id, top_id),
            &user.token,
        )
        .send()
        .await
        .unwrap();
    let notes: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"], note["id"]);
}

#[tokio::test]
async fn deleting_top_level_folder_unfiles_its_notes() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Flat", "flat", "flat@test.com").await;
    let project = app.seed_project(&user.token, "Flattened").await;

    let folder = create_folder(&app, &user.token, &project.id, serde_json::json!({ "name": "Only" })).await;
    let folder_id = folder["id"].as_str().unwrap().to_string();

    app.auth_post(&format!("/api/projects/{}/notes", project.id), &user.token)
        .json(&serde_json::json!({ "title": "Homeless", "folder": folder_id }))
        .send()
        .await
        .unwrap();

    app.auth_delete(&format!("/api/folders/{}", folder_id), &user.token)
        .send()
        .await
        .unwrap();

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
    assert_eq!(notes[0]["title"], "Homeless");
}
