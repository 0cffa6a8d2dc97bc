use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn snippet_crud_roundtrip() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Coder", "coder", "coder@test.com").await;
    let project = app.seed_project(&user.token, "Snippets").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/snippets", project.id), &user.token)
        .json(&serde_json::json!({
            "title": "Retry helper",
            "code": "fn retry() {}",
            "language": "rust",
            "tags": ["async"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let snippet: Value = resp.json().await.unwrap();
    assert_eq!(snippet["title"], "Retry helper");
    assert_eq!(snippet["language"], "rust");
    assert_eq!(snippet["user"], user.id.as_str());
    let snippet_id = snippet["id"].as_str().unwrap().to_string();

    let resp = app
        .auth_get(
            &format!("/api/projects/{}/snippets/{}", project.id, snippet_id),
            &user.token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_put(
            &format!("/api/projects/{}/snippets/{}", project.id, snippet_id),
            &user.token,
        )
        .json(&serde_json::json!({ "code": "fn retry(n: u32) {}" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let snippet: Value = resp.json().await.unwrap();
    assert_eq!(snippet["code"], "fn retry(n: u32) {}");

    let resp = app
        .auth_delete(
            &format!("/api/projects/{}/snippets/{}", project.id, snippet_id),
            &user.token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(&format!("/api/projects/{}/snippets", project.id), &user.token)
        .send()
        .await
        .unwrap();
    let snippets: Vec<Value> = resp.json().await.unwrap();
    assert!(snippets.is_empty());
}

#[tokio::test]
async fn snippet_requires_title_and_code() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Strict", "strict", "strict@test.com").await;
    let project = app.seed_project(&user.token, "Strict").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/snippets", project.id), &user.token)
        .json(&serde_json::json!({ "title": "No code" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Title and code are required");
}

#[tokio::test]
async fn snippets_are_scoped_to_their_project() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@test.com").await;
    let mine = app.seed_project(&alice.token, "Mine").await;
    let theirs = app.seed_project(&bob.token, "Theirs").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/snippets", mine.id), &alice.token)
        .json(&serde_json::json!({ "title": "Secret", "code": "let x = 1;" }))
        .send()
        .await
        .unwrap();
    let snippet: Value = resp.json().await.unwrap();
    let snippet_id = snippet["id"].as_str().unwrap();

    // Bob cannot list Alice's snippets
    let resp = app
        .auth_get(&format!("/api/projects/{}/snippets", mine.id), &bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // A snippet id under the wrong project is not found
    let resp = app
        .auth_get(
            &format!("/api/projects/{}/snippets/{}", theirs.id, snippet_id),
            &bob.token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
