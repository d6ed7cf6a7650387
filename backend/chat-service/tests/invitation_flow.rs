mod common;

use actix_web::test;
use common::{init_app, signup, start_conversation, test_state};
use serde_json::{json, Value};

fn participant_id_of(detail: &Value, username: &str) -> String {
    detail["participants"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["username"] == username)
        .and_then(|p| p["id"].as_str())
        .unwrap()
        .to_string()
}

#[actix_web::test]
async fn test_accept_invitation_end_to_end() {
    let app = init_app(test_state().await).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let detail = start_conversation(&app, &alice, &bob, "come chat").await;
    let slug = detail["slug"].as_str().unwrap().to_string();

    // inbox shows the pending invitation with context
    let req = test::TestRequest::get()
        .uri("/users/me/invitations")
        .insert_header(bob.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let invitations: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0]["conversation_slug"], slug.as_str());
    assert_eq!(invitations[0]["invited_by_username"], "alice");
    assert_eq!(invitations[0]["initial_message"], "come chat");

    let participant_id = invitations[0]["participant_id"].as_str().unwrap();
    let req = test::TestRequest::put()
        .uri(&format!("/participants/{}", participant_id))
        .insert_header(bob.bearer())
        .set_json(json!({"status": "joined"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let participant: Value = test::read_body_json(resp).await;
    assert_eq!(participant["status"], "joined");
    assert!(participant["joined_at"].is_string());

    // bob can now post and the inbox is empty
    let req = test::TestRequest::post()
        .uri(&format!("/conversations/{}/messages", slug))
        .insert_header(bob.bearer())
        .set_json(json!({"content": "I'm in"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::get()
        .uri("/users/me/invitations")
        .insert_header(bob.bearer())
        .to_request();
    let invitations: Vec<Value> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert!(invitations.is_empty());

    // answering twice is a business-rule violation
    let req = test::TestRequest::put()
        .uri(&format!("/participants/{}", participant_id))
        .insert_header(bob.bearer())
        .set_json(json!({"status": "rejected"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BUSINESS_RULE_VIOLATION");
}

#[actix_web::test]
async fn test_reject_invitation_hides_conversation() {
    let app = init_app(test_state().await).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let detail = start_conversation(&app, &alice, &bob, "hello").await;
    let slug = detail["slug"].as_str().unwrap();
    let participant_id = participant_id_of(&detail, "bob");

    let req = test::TestRequest::put()
        .uri(&format!("/participants/{}", participant_id))
        .insert_header(bob.bearer())
        .set_json(json!({"status": "REJECTED"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let participant: Value = test::read_body_json(resp).await;
    assert_eq!(participant["status"], "rejected");

    let req = test::TestRequest::get()
        .uri(&format!("/conversations/{}", slug))
        .insert_header(bob.bearer())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);
}

#[actix_web::test]
async fn test_invitation_update_errors() {
    let app = init_app(test_state().await).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let detail = start_conversation(&app, &alice, &bob, "hello").await;
    let participant_id = participant_id_of(&detail, "bob");

    let cases = [
        // someone else answering
        (&alice, participant_id.clone(), json!({"status": "joined"}), 403),
        // unknown status string
        (&bob, participant_id.clone(), json!({"status": "accepted"}), 400),
        // valid status, but not an answer
        (&bob, participant_id.clone(), json!({"status": "left"}), 400),
        // unknown participant
        (&bob, uuid::Uuid::new_v4().to_string(), json!({"status": "joined"}), 404),
    ];

    for (user, id, payload, status) in cases {
        let req = test::TestRequest::put()
            .uri(&format!("/participants/{}", id))
            .insert_header(user.bearer())
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "payload {}", payload);
    }
}

#[actix_web::test]
async fn test_invite_more_participants() {
    let app = init_app(test_state().await).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let carol = signup(&app, "carol").await;
    let detail = start_conversation(&app, &alice, &bob, "hello").await;
    let slug = detail["slug"].as_str().unwrap();
    let uri = format!("/conversations/{}/participants", slug);

    // an invited user cannot invite others
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bob.bearer())
        .set_json(json!({"invitee_user_id": carol.id}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(alice.bearer())
        .set_json(json!({"invitee_user_id": carol.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let invited: Value = test::read_body_json(resp).await;
    assert_eq!(invited["status"], "invited");
    assert_eq!(invited["invited_by_user_id"], alice.id.as_str());

    // inviting the same user twice conflicts
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(alice.bearer())
        .set_json(json!({"invitee_user_id": carol.id}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(carol.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let participants: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(participants.len(), 3);
}
