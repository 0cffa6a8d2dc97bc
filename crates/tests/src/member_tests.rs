use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn members_list_embeds_user_details() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let project = app.seed_project(&alice.token, "Team").await;

    let resp = app
        .auth_get(&format!("/api/projects/{}/members", project.id), &alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let members: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["role"], "owner");
    assert_eq!(members[0]["user"]["email"], "alice@test.com");
    assert_eq!(members[0]["user"]["username"], "alice");
}

#[tokio::test]
async fn invite_unknown_email_returns_404() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let project = app.seed_project(&alice.token, "Team").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/members", project.id), &alice.token)
        .json(&serde_json::json!({ "email": "stranger@test.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 404);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "User not found");
}

#[tokio::test]
async fn invite_cannot_be_sent_twice() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@test.com").await;
    let project = app.seed_project(&alice.token, "Team").await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/members", project.id), &alice.token)
        .json(&serde_json::json!({ "email": bob.email }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_post(&format!("/api/projects/{}/members", project.id), &alice.token)
        .json(&serde_json::json!({ "email": bob.email }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "An invitation has already been sent to this user");
}

#[tokio::test]
async fn invite_rejects_existing_member() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@test.com").await;
    let project = app.seed_project(&alice.token, "Team").await;

    app.add_member(&alice.token, &project.id, &bob).await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/members", project.id), &alice.token)
        .json(&serde_json::json!({ "email": bob.email }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "User is already a member of this project");
}

#[tokio::test]
async fn plain_member_cannot_invite() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@test.com").await;
    let carol = app.seed_user("Carol", "carol", "carol@test.com").await;
    let project = app.seed_project(&alice.token, "Team").await;

    app.add_member(&alice.token, &project.id, &bob).await;

    let resp = app
        .auth_post(&format!("/api/projects/{}/members", project.id), &bob.token)
        .json(&serde_json::json!({ "email": carol.email }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn owner_can_promote_member_to_admin() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@test.com").await;
    let project = app.seed_project(&alice.token, "Team").await;

    app.add_member(&alice.token, &project.id, &bob).await;

    let resp = app
        .auth_put(
            &format!("/api/projects/{}/members/{}", project.id, bob.id),
            &alice.token,
        )
        .json(&serde_json::json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let members: Vec<Value> = resp.json().await.unwrap();
    let bob_entry = members
        .iter()
        .find(|m| m["user"]["id"] == bob.id.as_str())
        .unwrap();
    assert_eq!(bob_entry["role"], "admin");
}

#[tokio::test]
async fn owner_role_cannot_be_assigned_or_taken() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@test.com").await;
    let project = app.seed_project(&alice.token, "Team").await;

    app.add_member(&alice.token, &project.id, &bob).await;

    // Nobody can be promoted to owner
    let resp = app
        .auth_put(
            &format!("/api/projects/{}/members/{}", project.id, bob.id),
            &alice.token,
        )
        .json(&serde_json::json!({ "role": "owner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    // The owner's own role is fixed
    let resp = app
        .auth_put(
            &format!("/api/projects/{}/members/{}", project.id, alice.id),
            &alice.token,
        )
        .json(&serde_json::json!({ "role": "member" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn remove_member_logs_to_changelog() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let bob = app.seed_user("Bob", "bob", "bob@test.com").await;
    let project = app.seed_project(&alice.token, "Team").await;

    app.add_member(&alice.token, &project.id, &bob).await;

    let resp = app
        .auth_delete(
            &format!("/api/projects/{}/members/{}", project.id, bob.id),
            &alice.token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Member removed");

    // Bob lost access
    let resp = app
        .auth_get(&format!("/api/projects/{}", project.id), &bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_get(&format!("/api/projects/{}/changelog", project.id), &alice.token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = resp.json().await.unwrap();
    assert!(entries
        .iter()
        .any(|e| e["message"] == "removed Bob from the project."));
}

#[tokio::test]
async fn owner_cannot_be_removed() {
    let app = TestApp::spawn().await;

    let alice = app.seed_user("Alice", "alice", "alice@test.com").await;
    let project = app.seed_project(&alice.token, "Team").await;

    let resp = app
        .auth_delete(
            &format!("/api/projects/{}/members/{}", project.id, alice.id),
            &alice.token,
        )
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Cannot remove the project owner");
}
