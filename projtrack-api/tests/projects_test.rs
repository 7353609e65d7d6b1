/// Integration tests for project ownership and validation
///
/// Drives the full router over an in-memory store:
/// - guests are sent to the sign-in page
/// - non-owners are sent to the dashboard and change nothing
/// - names are required and unique per owner
/// - the late flag follows the due date

mod common;

use axum::http::StatusCode;
use common::{assert_root_redirect, assert_sign_in_redirect, TestContext};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_guest_is_redirected_to_sign_in() {
    let ctx = TestContext::new();
    let owner = ctx.sign_up("Owner", "One").await;
    let project_id = ctx.create_project(&owner, json!({ "name": "Test Project" })).await;

    assert_sign_in_redirect(&ctx.get("/projects", None).await);
    assert_sign_in_redirect(&ctx.get(&format!("/projects/{}", project_id), None).await);
    assert_sign_in_redirect(
        &ctx.patch(&format!("/projects/{}", project_id), None, json!({ "name": "Hijacked" }))
            .await,
    );
    assert_sign_in_redirect(&ctx.delete(&format!("/projects/{}", project_id), None).await);

    let create = ctx.post("/projects", None, json!({ "name": "Guest Project" })).await;
    assert_sign_in_redirect(&create);

    assert_eq!(ctx.project_count(&owner).await, 1);
}

#[tokio::test]
async fn test_invalid_token_is_treated_as_guest() {
    let ctx = TestContext::new();

    let response = ctx.get("/projects", Some("not-a-token")).await;
    assert_sign_in_redirect(&response);
}

#[tokio::test]
async fn test_sign_in_redirect_target_resolves() {
    let ctx = TestContext::new();

    let response = ctx.get("/users/sign_in", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["sign_in"]["path"], "/users/sign_in");
}

#[tokio::test]
async fn test_owner_can_create_and_count_increments() {
    let ctx = TestContext::new();
    let owner = ctx.sign_up("Owner", "One").await;
    assert_eq!(ctx.project_count(&owner).await, 0);

    let response = ctx
        .post(
            "/projects",
            Some(&owner.access_token),
            json!({ "name": "Test Project", "description": "Trying things out" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["notice"], "Project was successfully created.");
    assert_eq!(response.body["project"]["name"], "Test Project");
    assert_eq!(response.body["project"]["owner_name"], "Owner One");
    assert_eq!(response.body["project"]["owner_id"], owner.id.to_string());
    assert_eq!(ctx.project_count(&owner).await, 1);
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let ctx = TestContext::new();
    let owner = ctx.sign_up("Owner", "One").await;

    for body in [json!({}), json!({ "name": "" }), json!({ "name": "   " })] {
        let response = ctx.post("/projects", Some(&owner.access_token), body).await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body["details"][0]["field"], "name");
        assert_eq!(response.body["details"][0]["message"], "can't be blank");
        assert_eq!(response.body["message"], "Name can't be blank");
    }

    assert_eq!(ctx.project_count(&owner).await, 0);
}

#[tokio::test]
async fn test_overlong_name_is_rejected() {
    let ctx = TestContext::new();
    let owner = ctx.sign_up("Owner", "One").await;

    let response = ctx
        .post("/projects", Some(&owner.access_token), json!({ "name": "x".repeat(256) }))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(ctx.project_count(&owner).await, 0);
}

#[tokio::test]
async fn test_duplicate_name_rejected_per_owner_only() {
    let ctx = TestContext::new();
    let alice = ctx.sign_up("Alice", "Owner").await;
    let bob = ctx.sign_up("Bob", "Other").await;

    ctx.create_project(&alice, json!({ "name": "Test Project" })).await;

    let dup = ctx
        .post("/projects", Some(&alice.access_token), json!({ "name": "Test Project" }))
        .await;
    assert_eq!(dup.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(dup.body["details"][0]["message"], "has already been taken");
    assert_eq!(ctx.project_count(&alice).await, 1);

    // Case differs, so this is a different name
    ctx.create_project(&alice, json!({ "name": "test project" })).await;
    assert_eq!(ctx.project_count(&alice).await, 2);

    // Another owner may reuse the name
    ctx.create_project(&bob, json!({ "name": "Test Project" })).await;
    assert_eq!(ctx.project_count(&bob).await, 1);
}

#[tokio::test]
async fn test_foreign_user_is_redirected_and_changes_nothing() {
    let ctx = TestContext::new();
    let owner = ctx.sign_up("Owner", "One").await;
    let stranger = ctx.sign_up("Stranger", "Two").await;
    let project_id = ctx.create_project(&owner, json!({ "name": "Private" })).await;
    let uri = format!("/projects/{}", project_id);

    assert_root_redirect(&ctx.get(&uri, Some(&stranger.access_token)).await);
    assert_root_redirect(
        &ctx.patch(&uri, Some(&stranger.access_token), json!({ "name": "Hijacked" }))
            .await,
    );
    assert_root_redirect(&ctx.delete(&uri, Some(&stranger.access_token)).await);

    let show = ctx.get(&uri, Some(&owner.access_token)).await;
    assert_eq!(show.status, StatusCode::OK);
    assert_eq!(show.body["project"]["name"], "Private");
    assert_eq!(ctx.project_count(&owner).await, 1);
}

#[tokio::test]
async fn test_denied_update_skips_validation() {
    let ctx = TestContext::new();
    let owner = ctx.sign_up("Owner", "One").await;
    let stranger = ctx.sign_up("Stranger", "Two").await;
    let project_id = ctx.create_project(&owner, json!({ "name": "Private" })).await;

    // Invalid body, but the gate answers first
    let response = ctx
        .patch(
            &format!("/projects/{}", project_id),
            Some(&stranger.access_token),
            json!({ "name": "" }),
        )
        .await;
    assert_root_redirect(&response);
}

#[tokio::test]
async fn test_missing_project_looks_like_foreign_project() {
    let ctx = TestContext::new();
    let user = ctx.sign_up("Some", "User").await;

    let response = ctx
        .get(&format!("/projects/{}", Uuid::new_v4()), Some(&user.access_token))
        .await;
    assert_root_redirect(&response);
}

#[tokio::test]
async fn test_malformed_project_id_goes_through_the_gate() {
    let ctx = TestContext::new();
    let user = ctx.sign_up("Some", "User").await;

    for uri in ["/projects/not-a-uuid", "/projects/42"] {
        assert_sign_in_redirect(&ctx.get(uri, None).await);
        assert_sign_in_redirect(&ctx.patch(uri, None, json!({ "name": "x" })).await);
        assert_sign_in_redirect(&ctx.delete(uri, None).await);

        assert_root_redirect(&ctx.get(uri, Some(&user.access_token)).await);
        assert_root_redirect(
            &ctx.patch(uri, Some(&user.access_token), json!({ "name": "x" }))
                .await,
        );
        assert_root_redirect(&ctx.delete(uri, Some(&user.access_token)).await);
    }
}

#[tokio::test]
async fn test_list_shows_only_own_projects() {
    let ctx = TestContext::new();
    let alice = ctx.sign_up("Alice", "Owner").await;
    let bob = ctx.sign_up("Bob", "Other").await;

    ctx.create_project(&alice, json!({ "name": "Alpha" })).await;
    ctx.create_project(&alice, json!({ "name": "Beta" })).await;
    ctx.create_project(&bob, json!({ "name": "Gamma" })).await;

    let response = ctx.get("/projects", Some(&alice.access_token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let names: Vec<&str> = response.body["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Alpha"));
    assert!(names.contains(&"Beta"));
}

#[tokio::test]
async fn test_update_project() {
    let ctx = TestContext::new();
    let owner = ctx.sign_up("Owner", "One").await;
    let project_id = ctx
        .create_project(&owner, json!({ "name": "Original", "due_on": "2016-10-01" }))
        .await;
    ctx.create_project(&owner, json!({ "name": "Sibling" })).await;
    let uri = format!("/projects/{}", project_id);

    // Keeping its own name is fine
    let same = ctx
        .patch(&uri, Some(&owner.access_token), json!({ "name": "Original" }))
        .await;
    assert_eq!(same.status, StatusCode::OK);

    // Taking a sibling's name is not
    let clash = ctx
        .patch(&uri, Some(&owner.access_token), json!({ "name": "Sibling" }))
        .await;
    assert_eq!(clash.status, StatusCode::UNPROCESSABLE_ENTITY);

    let renamed = ctx
        .patch(
            &uri,
            Some(&owner.access_token),
            json!({ "name": "Renamed", "due_on": null }),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["notice"], "Project was successfully updated.");
    assert_eq!(renamed.body["project"]["name"], "Renamed");
    assert!(renamed.body["project"]["due_on"].is_null());
    assert_eq!(renamed.body["project"]["late"], false);
}

#[tokio::test]
async fn test_delete_project_removes_tasks() {
    let ctx = TestContext::new();
    let owner = ctx.sign_up("Owner", "One").await;
    let project_id = ctx.create_project(&owner, json!({ "name": "Doomed" })).await;
    ctx.create_task(&owner, project_id, "Task").await;

    let response = ctx
        .delete(&format!("/projects/{}", project_id), Some(&owner.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["notice"], "Project was successfully destroyed.");

    assert_eq!(ctx.project_count(&owner).await, 0);
    assert_root_redirect(
        &ctx.get(&format!("/projects/{}/tasks", project_id), Some(&owner.access_token))
            .await,
    );
}

#[tokio::test]
async fn test_late_flag_follows_due_date() {
    // Today is 2016-10-05 in every test
    let ctx = TestContext::new();
    let owner = ctx.sign_up("Owner", "One").await;

    let overdue = ctx
        .create_project(&owner, json!({ "name": "Overdue", "due_on": "2016-10-01" }))
        .await;
    let due_today = ctx
        .create_project(&owner, json!({ "name": "Due today", "due_on": "2016-10-05" }))
        .await;
    let upcoming = ctx
        .create_project(&owner, json!({ "name": "Upcoming", "due_on": "2016-10-15" }))
        .await;
    let undated = ctx.create_project(&owner, json!({ "name": "Undated" })).await;

    for (id, late) in [(overdue, true), (due_today, false), (upcoming, false), (undated, false)] {
        let response = ctx
            .get(&format!("/projects/{}", id), Some(&owner.access_token))
            .await;
        assert_eq!(response.body["project"]["late"], late, "project {}", id);
    }
}
