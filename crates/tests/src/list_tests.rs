use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn new_list_is_appended_after_defaults() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Lists", "lists", "lists@test.com").await;
    let project = app.seed_project(&user.token, "Columns").await;

    let resp = app
        .auth_post(&format!("/api/boards/{}/lists", project.board_id), &user.token)
        .json(&serde_json::json!({ "name": "Blocked" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 201);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["name"], "Blocked");
    assert_eq!(json["position"], 4);
}

#[tokio::test]
async fn reorder_rewrites_positions() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Order", "order", "order@test.com").await;
    let project = app.seed_project(&user.token, "Ordered").await;

    let mut reversed = project.list_ids.clone();
    reversed.reverse();

    let resp = app
        .auth_put(
            &format!("/api/boards/{}/lists/reorder", project.board_id),
            &user.token,
        )
        .json(&serde_json::json!({ "ordered_list_ids": reversed }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let lists: Vec<Value> = resp.json().await.unwrap();
    let ids: Vec<&str> = lists.iter().map(|l| l["id"].as_str().unwrap()).collect();
    assert_eq!(ids, reversed.iter().map(String::as_str).collect::<Vec<_>>());
    for (i, list) in lists.iter().enumerate() {
        assert_eq!(list["position"], i as i64);
    }
}

#[tokio::test]
async fn reorder_rejects_non_array_body() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Strict", "strict", "strict@test.com").await;
    let project = app.seed_project(&user.token, "Strict").await;

    let resp = app
        .auth_put(
            &format!("/api/boards/{}/lists/reorder", project.board_id),
            &user.token,
        )
        .json(&serde_json::json!({ "ordered_list_ids": "not-an-array" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "ordered_list_ids must be an array");
}

#[tokio::test]
async fn rename_list_keeps_position() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Rename", "rename", "rename@test.com").await;
    let project = app.seed_project(&user.token, "Renaming").await;

    let resp = app
        .auth_put(&format!("/api/lists/{}", project.list_ids[1]), &user.token)
        .json(&serde_json::json!({ "name": "Doing" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["name"], "Doing");
    assert_eq!(json["position"], 1);
}

#[tokio::test]
async fn delete_list_takes_its_tasks_along() {
    let app = TestApp::spawn().await;

    let user = app.seed_user("Dropper", "dropper", "dropper@test.com").await;
    let project = app.seed_project(&user.token, "Dropping").await;

    let doomed = app.seed_task(&user.token, &project.list_ids[0], "Doomed").await;
    let survivor = app.seed_task(&user.token, &project.list_ids[1], "Survivor").await;

    let resp = app
        .auth_delete(&format!("/api/lists/{}", project.list_ids[0]), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "List deleted");

    let resp = app
        .auth_get(&format!("/api/tasks/{}", doomed), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_get(&format!("/api/tasks/{}", survivor), &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(&format!("/api/boards/{}", project.board_id), &user.token)
        .send()
        .await
        .unwrap();
    let detail: Value = resp.json().await.unwrap();
    assert_eq!(detail["lists"].as_array().unwrap().len(), 3);
}
