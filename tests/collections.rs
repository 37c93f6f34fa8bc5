mod common;
use common::{call, payload, server, video_json, StubUpstream};

use serde_json::{json, Value};

#[tokio::test]
async fn list_folders_passes_parent_id() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "GET",
        "/v1/folders",
        200,
        json!({"folders": [{"id": 7, "name": "Design", "video_count": 3, "parent_id": "root"}]}),
    );

    let body = payload(
        &call(
            &server(),
            "loom_list_folders",
            json!({"parentId": "root", "perPage": 2}),
            stub.meta(),
        )
        .await,
    );
    assert_eq!(body["items"][0]["id"], "7");
    assert_eq!(body["items"][0]["videoCount"], 3);
    assert_eq!(body["items"][0]["parentId"], "root");
    let req = stub.last();
    assert_eq!(req.query.get("parent_id").map(String::as_str), Some("root"));
    assert_eq!(req.query.get("per_page").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn create_folder_omits_absent_parent() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "POST",
        "/v1/folders",
        201,
        json!({"id": "f9", "name": "Launch", "created_at": "2024-01-01", "updated_at": "2024-01-01"}),
    );

    let body = payload(
        &call(&server(), "loom_create_folder", json!({"name": "Launch"}), stub.meta()).await,
    );
    assert_eq!(body["message"], "Folder created successfully");
    assert_eq!(body["folder"]["id"], "f9");
    assert_eq!(stub.last().body, Some(json!({"name": "Launch"})));
}

#[tokio::test]
async fn update_and_delete_folder() {
    let stub = StubUpstream::start().await;
    stub.respond("PATCH", "/v1/folders/f1", 204, Value::Null);
    stub.respond("DELETE", "/v1/folders/f1", 204, Value::Null);
    let server = server();

    let body = payload(
        &call(
            &server,
            "loom_update_folder",
            json!({"folderId": "f1", "parentId": "f0"}),
            stub.meta(),
        )
        .await,
    );
    assert_eq!(body, json!({"success": true, "message": "Folder updated successfully"}));
    assert_eq!(stub.last().body, Some(json!({"parent_id": "f0"})));

    let body = payload(
        &call(&server, "loom_delete_folder", json!({"folderId": "f1"}), stub.meta()).await,
    );
    assert_eq!(body["message"], "Folder deleted successfully");
    assert_eq!(stub.hits(), 2);
}

#[tokio::test]
async fn comments_list_and_create() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "GET",
        "/v1/videos/v1/comments",
        200,
        json!({"comments": [{"id": "c1", "text": "Nice", "timestamp": 12.0, "author": {"id": "u1", "name": "Sam"}, "created_at": "2024-01-01"}]}),
    );
    stub.respond(
        "POST",
        "/v1/videos/v1/comments",
        201,
        json!({"id": "c2", "text": "At 30s", "timestamp": 30.0, "author": {"id": "u1", "name": "Sam"}}),
    );
    let server = server();

    let body = payload(
        &call(&server, "loom_list_comments", json!({"videoId": "v1"}), stub.meta()).await,
    );
    assert_eq!(body["items"][0]["author"]["name"], "Sam");
    assert_eq!(body["items"][0]["createdAt"], "2024-01-01");

    let body = payload(
        &call(
            &server,
            "loom_create_comment",
            json!({"videoId": "v1", "text": "At 30s", "timestamp": 30}),
            stub.meta(),
        )
        .await,
    );
    assert_eq!(body["message"], "Comment added successfully");
    assert_eq!(body["comment"]["id"], "c2");
    assert_eq!(stub.last().body, Some(json!({"text": "At 30s", "timestamp": 30.0})));
}

#[tokio::test]
async fn workspaces_list_and_get() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "GET",
        "/v1/workspaces",
        200,
        json!({"workspaces": [{"id": "w1", "name": "Acme", "member_count": 14}], "cursor": "n2"}),
    );
    stub.respond("GET", "/v1/workspaces/w1", 200, json!({"id": "w1", "name": "Acme"}));
    let server = server();

    let body = payload(&call(&server, "loom_list_workspaces", json!({}), stub.meta()).await);
    assert_eq!(body["items"][0]["memberCount"], 14);
    assert_eq!(body["nextCursor"], "n2");

    let body = payload(
        &call(&server, "loom_get_workspace", json!({"workspaceId": "w1"}), stub.meta()).await,
    );
    assert_eq!(body["name"], "Acme");
}

#[tokio::test]
async fn space_membership_round() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "GET",
        "/v1/spaces/s1/videos",
        200,
        json!({"data": [video_json("v1")]}),
    );
    stub.respond("POST", "/v1/spaces/s1/videos", 204, Value::Null);
    stub.respond("DELETE", "/v1/spaces/s1/videos/v1", 204, Value::Null);
    let server = server();

    let body = payload(
        &call(&server, "loom_list_space_videos", json!({"spaceId": "s1"}), stub.meta()).await,
    );
    assert_eq!(body["items"][0]["id"], "v1");

    let body = payload(
        &call(
            &server,
            "loom_add_video_to_space",
            json!({"spaceId": "s1", "videoId": "v1"}),
            stub.meta(),
        )
        .await,
    );
    assert_eq!(body["message"], "Video added to space successfully");
    assert_eq!(stub.last().body, Some(json!({"video_id": "v1"})));

    let body = payload(
        &call(
            &server,
            "loom_remove_video_from_space",
            json!({"spaceId": "s1", "videoId": "v1"}),
            stub.meta(),
        )
        .await,
    );
    assert_eq!(body["message"], "Video removed from space successfully");
    let req = stub.last();
    assert_eq!(req.method, "DELETE");
    assert_eq!(req.path, "/v1/spaces/s1/videos/v1");
}

#[tokio::test]
async fn get_space_returns_record() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "GET",
        "/v1/spaces/s1",
        200,
        json!({"id": "s1", "name": "Eng", "video_count": 8}),
    );
    let body = payload(&call(&server(), "loom_get_space", json!({"spaceId": "s1"}), stub.meta()).await);
    assert_eq!(body["videoCount"], 8);
    assert!(body.get("description").is_none());
}

#[tokio::test]
async fn get_folder_normalizes_numeric_ids() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "GET",
        "/v1/folders/42",
        200,
        json!({"id": 42, "name": "Archive", "parent_id": 7, "created_at": "2024-01-01", "updated_at": "2024-01-02"}),
    );
    let body = payload(&call(&server(), "loom_get_folder", json!({"folderId": "42"}), stub.meta()).await);
    assert_eq!(body["id"], "42");
    assert_eq!(body["parentId"], "7");
    assert_eq!(body["updatedAt"], "2024-01-02");
}

#[tokio::test]
async fn get_space_accepts_only_space_id() {
    let stub = StubUpstream::start().await;
    let err = server()
        .handle_tools_call(&json!({
            "name": "loom_get_space",
            "arguments": {"spaceId": "s1", "perPage": 5},
            "_meta": stub.meta()
        }))
        .await
        .unwrap_err();
    assert!(err.message.contains("unknown field 'perPage'"), "{}", err.message);
    assert_eq!(stub.hits(), 0);
}
