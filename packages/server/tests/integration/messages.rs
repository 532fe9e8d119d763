use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn student_and_admin_can_exchange_messages() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    let admin = app.create_admin("registrar").await;

    let res = app
        .post_with_token(
            routes::MESSAGES,
            &json!({"receiver_id": admin.id, "body": "  Can I get my grade reviewed?  "}),
            &student.token,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["body"], "Can I get my grade reviewed?");
    assert_eq!(res.body["is_read"], false);

    let res = app
        .post_with_token(
            routes::MESSAGES,
            &json!({"receiver_id": student.id, "body": "Sure, see you Monday."}),
            &admin.token,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    let res = app
        .get_with_token(&format!("{}?with={}", routes::MESSAGES, admin.id), &student.token)
        .await;
    assert_eq!(res.status, 200);
    let thread = res.body.as_array().unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0]["sender_id"], student.id);
    assert_eq!(thread[1]["sender_id"], admin.id);
}

#[tokio::test]
async fn students_cannot_message_each_other() {
    let app = TestApp::spawn().await;
    let juan = app.create_student("juan").await;
    let maria = app.create_student("maria").await;

    let res = app
        .post_with_token(
            routes::MESSAGES,
            &json!({"receiver_id": maria.id, "body": "hi"}),
            &juan.token,
        )
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn unknown_receiver_is_not_found() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;

    let res = app
        .post_with_token(
            routes::MESSAGES,
            &json!({"receiver_id": 999_999, "body": "hello"}),
            &student.token,
        )
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    let admin = app.create_admin("registrar").await;

    let res = app
        .post_with_token(
            routes::MESSAGES,
            &json!({"receiver_id": admin.id, "body": "   "}),
            &student.token,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn unread_messages_are_counted_until_read() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    let admin = app.create_admin("registrar").await;
    for body in ["first", "second"] {
        app.post_with_token(
            routes::MESSAGES,
            &json!({"receiver_id": admin.id, "body": body}),
            &student.token,
        )
        .await;
    }

    let res = app.get_with_token(routes::UNREAD_COUNT, &admin.token).await;
    assert_eq!(res.body["count"], 2);

    let res = app.get_with_token(routes::CONTACTS, &admin.token).await;
    let contacts = res.body.as_array().unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["id"], student.id);
    assert_eq!(contacts[0]["unread"], 2);

    let res = app
        .post_with_token(
            routes::MARK_READ,
            &json!({"counterpart_id": student.id}),
            &admin.token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["updated"], 2);

    let res = app.get_with_token(routes::UNREAD_COUNT, &admin.token).await;
    assert_eq!(res.body["count"], 0);
}

#[tokio::test]
async fn student_contacts_are_admins() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    app.create_student("maria").await;
    let admin = app.create_admin("registrar").await;

    let res = app.get_with_token(routes::CONTACTS, &student.token).await;

    assert_eq!(res.status, 200);
    let contacts = res.body.as_array().unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["id"], admin.id);
    assert_eq!(contacts[0]["role"], "admin");
}
