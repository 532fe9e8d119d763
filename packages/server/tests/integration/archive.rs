use crate::common::{TestApp, routes};
use serde_json::json;

#[tokio::test]
async fn archive_and_restore_keep_the_grade() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    let id = app.graded_enrollment(&student.token, "IT 102").await;

    let res = app.post_with_token(&routes::archive(id), &json!({}), &student.token).await;
    assert_eq!(res.status, 201, "{}", res.text);
    let archive_id = res.body["archived_subject_id"].as_i64().unwrap() as i32;
    assert!((res.f64("/performance/overall_grade") - 90.0).abs() < 1e-9);

    let enrollments = app.get_with_token(routes::ENROLLMENTS, &student.token).await;
    assert_eq!(enrollments.body.as_array().unwrap().len(), 0);

    let archives = app.get_with_token(routes::ARCHIVES, &student.token).await;
    let archives = archives.body.as_array().unwrap().clone();
    assert_eq!(archives.len(), 1);
    assert_eq!(archives[0]["subject"]["code"], "IT 102");
    assert_eq!(archives[0]["performance"]["risk_level"], "low");

    let res = app
        .post_with_token(&routes::restore(archive_id), &json!({}), &student.token)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    let restored = res.body["enrollment_id"].as_i64().unwrap() as i32;

    let detail = app.get_with_token(&routes::enrollment(restored), &student.token).await;
    assert_eq!(detail.status, 200);
    assert_eq!(detail.body["categories"].as_array().unwrap().len(), 1);
    assert_eq!(detail.body["scores"].as_array().unwrap().len(), 1);
    assert_eq!(detail.body["exams"].as_array().unwrap().len(), 2);
    assert!((detail.f64("/performance/overall_grade") - 90.0).abs() < 1e-9);

    let archives = app.get_with_token(routes::ARCHIVES, &student.token).await;
    assert_eq!(archives.body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn restore_is_refused_while_enrolled() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    let id = app.enroll(&student.token, "IT 102").await;
    let res = app.post_with_token(&routes::archive(id), &json!({}), &student.token).await;
    let archive_id = res.body["archived_subject_id"].as_i64().unwrap() as i32;
    app.enroll(&student.token, "IT 102").await;

    let res = app
        .post_with_token(&routes::restore(archive_id), &json!({}), &student.token)
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn archives_belong_to_their_owner() {
    let app = TestApp::spawn().await;
    let owner = app.create_student("juan").await;
    let other = app.create_student("maria").await;
    let id = app.enroll(&owner.token, "IT 102").await;
    let res = app.post_with_token(&routes::archive(id), &json!({}), &owner.token).await;
    let archive_id = res.body["archived_subject_id"].as_i64().unwrap() as i32;

    let res = app.delete_with_token(&routes::archived(archive_id), &other.token).await;
    assert_eq!(res.status, 404);

    let res = app.delete_with_token(&routes::archived(archive_id), &owner.token).await;
    assert_eq!(res.status, 204);

    let res = app.get_with_token(routes::ARCHIVES, &owner.token).await;
    assert_eq!(res.body.as_array().unwrap().len(), 0);
}

mod history {
    use super::*;

    async fn archived_pair(app: &TestApp, token: &str) {
        let graded = app.graded_enrollment(token, "IT 102").await;
        app.post_with_token(&routes::archive(graded), &json!({}), token).await;
        let empty = app.enroll(token, "COMP 104").await;
        app.post_with_token(&routes::archive(empty), &json!({}), token).await;
    }

    #[tokio::test]
    async fn history_lists_archives_with_a_summary() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        archived_pair(&app, &student.token).await;

        let res = app.get_with_token(routes::HISTORY, &student.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let rows = res.body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["subject_code"], "COMP 104");
        assert_eq!(res.body["summary"]["total_subjects"], 2);
        assert_eq!(res.body["summary"]["graded_subjects"], 1);
        assert_eq!(res.f64("/summary/weighted_gpa"), 1.0);
    }

    #[tokio::test]
    async fn history_filters_by_semester() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        archived_pair(&app, &student.token).await;

        let res = app
            .get_with_token(&format!("{}?semester=2nd", routes::HISTORY), &student.token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["rows"].as_array().unwrap().len(), 0);

        let res = app
            .get_with_token(&format!("{}?semester=summer", routes::HISTORY), &student.token)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn export_is_a_csv_attachment() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        archived_pair(&app, &student.token).await;

        let res = app
            .get_with_token(&format!("{}?semester=1st", routes::HISTORY_EXPORT), &student.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.content_type.as_deref(), Some("text/csv; charset=utf-8"));
        let disposition = res.content_disposition.unwrap();
        assert!(disposition.starts_with("attachment; filename=\"semester_grades_first_semester_"));

        let lines: Vec<&str> = res.text.lines().collect();
        assert_eq!(
            lines[0],
            "Subject Code,Subject Name,Professor,Credits,Semester,Subject Grade"
        );
        assert!(lines[1].starts_with("COMP 104,") && lines[1].ends_with(",N/A"));
        assert!(lines[2].starts_with("IT 102,") && lines[2].ends_with(",90.00"));
    }
}
