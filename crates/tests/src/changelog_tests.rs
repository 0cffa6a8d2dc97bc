use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn manual_entry_is_created_with_author_details() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Cleo", "cleo", "cleo@example.com").await;
    let project = app.seed_project(&user.token, "Log Project").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/changelog", project.id), &user.token)
        .json(&serde_json::json!({ "message": "Shipped the search feature" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let entry: Value = resp.json().await.unwrap();
    assert_eq!(entry["message"], "Shipped the search feature");
    assert_eq!(entry["type"], "manual");
    assert_eq!(entry["include_in_report"], true);
    assert!(entry["category"].is_null());
    assert_eq!(entry["user"]["id"], user.id);
    assert_eq!(entry["user"]["name"], "Cleo");
    assert_eq!(entry["user"]["username"], "cleo");
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Cleo", "cleo", "cleo@example.com").await;
    let project = app.seed_project(&user.token, "Log Project").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/changelog", project.id), &user.token)
        .json(&serde_json::json!({ "message": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Message is required");
}

#[tokio::test]
async fn list_is_newest_first_and_includes_automatic_entries() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Cleo", "cleo", "cleo@example.com").await;
    let project = app.seed_project(&user.token, "Log Project").await;

    for message in ["First note", "Second note"] {
        let resp = app
            .auth_post(&format!("/api/projects/{}/changelog", project.id), &user.token)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
    }

    let resp = app
        .auth_get(&format!("/api/projects/{}/changelog", project.id), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let entries: Vec<Value> = resp.json().await.unwrap();
    // Board creation during seeding logged one automatic entry.
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["message"], "Second note");
    assert_eq!(entries[1]["message"], "First note");
    assert_eq!(entries[2]["message"], "created the board \"Log Project Board\".");
    assert_eq!(entries[2]["type"], "automatic");
    assert_eq!(entries[2]["category"], "board");
}

#[tokio::test]
async fn author_can_edit_and_delete_their_manual_entry() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Cleo", "cleo", "cleo@example.com").await;
    let project = app.seed_project(&user.token, "Log Project").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/changelog", project.id), &user.token)
        .json(&serde_json::json!({ "message": "Draft wording" }))
        .send()
        .await
        .unwrap();
    let entry: Value = resp.json().await.unwrap();
    let entry_id = entry["id"].as_str().unwrap().to_string();

    let resp = app
        .auth_put(&format!("/api/changelog/{entry_id}"), &user.token)
        .json(&serde_json::json!({ "message": "Final wording" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["message"], "Final wording");

    let resp = app
        .auth_delete(&format!("/api/changelog/{entry_id}"), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Changelog entry deleted");

    let resp = app
        .auth_get(&format!("/api/projects/{}/changelog", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = resp.json().await.unwrap();
    assert!(entries.iter().all(|e| e["id"] != entry_id.as_str()));
}

#[tokio::test]
async fn entries_can_only_be_edited_by_their_author() {
    let app = TestApp::spawn().await;
    let alice = app.seed_user("Alice", "alice", "alice@example.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@example.com").await;
    let project = app.seed_project(&alice.token, "Shared Log").await;
    app.add_member(&alice.token, &project.id, &bob).await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/changelog", project.id), &alice.token)
        .json(&serde_json::json!({ "message": "Alice wrote this" }))
        .send()
        .await
        .unwrap();
    let entry: Value = resp.json().await.unwrap();
    let entry_id = entry["id"].as_str().unwrap();

    let resp = app
        .auth_put(&format!("/api/changelog/{entry_id}"), &bob.token)
        .json(&serde_json::json!({ "message": "Bob rewrote this" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "You can only edit your own changelog entries");

    let resp = app
        .auth_delete(&format!("/api/changelog/{entry_id}"), &bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn automatic_entries_cannot_be_edited() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Cleo", "cleo", "cleo@example.com").await;
    let project = app.seed_project(&user.token, "Log Project").await;

    let resp = app
        .auth_get(&format!("/api/projects/{}/changelog", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = resp.json().await.unwrap();
    let automatic = entries
        .iter()
        .find(|e| e["type"] == "automatic")
        .expect("board creation should have been logged");
    let entry_id = automatic["id"].as_str().unwrap();

    let resp = app
        .auth_put(&format!("/api/changelog/{entry_id}"), &user.token)
        .json(&serde_json::json!({ "message": "Rewritten history" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Automatic entries cannot be edited");

    let resp = app
        .auth_delete(&format!("/api/changelog/{entry_id}"), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn toggle_report_flips_the_flag() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Cleo", "cleo", "cleo@example.com").await;
    let project = app.seed_project(&user.token, "Log Project").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/changelog", project.id), &user.token)
        .json(&serde_json::json!({ "message": "Maybe not report-worthy" }))
        .send()
        .await
        .unwrap();
    let entry: Value = resp.json().await.unwrap();
    let entry_id = entry["id"].as_str().unwrap();
    assert_eq!(entry["include_in_report"], true);

    let resp = app
        .auth_put(&format!("/api/changelog/{entry_id}/toggle-report"), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let toggled: Value = resp.json().await.unwrap();
    assert_eq!(toggled["include_in_report"], false);

    let resp = app
        .auth_put(&format!("/api/changelog/{entry_id}/toggle-report"), &user.token)
        .send()
        .await
        .unwrap();
    let toggled: Value = resp.json().await.unwrap();
    assert_eq!(toggled["include_in_report"], true);
}

#[tokio::test]
async fn non_member_cannot_read_the_changelog() {
    let app = TestApp::spawn().await;
    let alice = app.seed_user("Alice", "alice", "alice@example.com").await;
    let mallory = app.seed_user("Mallory", "mallory", "mallory@example.com").await;
    let project = app.seed_project(&alice.token, "Private Log").await;

    let resp = app
        .auth_get(&format!("/api/projects/{}/changelog", project.id), &mallory.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}
