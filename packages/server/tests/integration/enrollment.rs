use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn catalog_can_be_filtered_by_semester_alias() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;

    let all = app.get_with_token(routes::SUBJECTS, &student.token).await;
    assert_eq!(all.status, 200);
    assert_eq!(all.body.as_array().unwrap().len(), 10);

    let first = app
        .get_with_token(&format!("{}?semester=1st", routes::SUBJECTS), &student.token)
        .await;
    assert_eq!(first.status, 200);
    let first = first.body.as_array().unwrap().clone();
    assert_eq!(first.len(), 5);
    assert!(first.iter().all(|s| s["semester"] == "First Semester"));
}

#[tokio::test]
async fn only_admins_can_add_catalog_subjects() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    let admin = app.create_admin("registrar").await;
    let body = json!({"code": "it 401", "name": "Capstone", "credits": 3, "semester": "Second Semester"});

    let res = app.post_with_token(routes::SUBJECTS, &body, &student.token).await;
    assert_eq!(res.status, 403);

    let res = app.post_with_token(routes::SUBJECTS, &body, &admin.token).await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["code"], "IT 401");

    let res = app.post_with_token(routes::SUBJECTS, &body, &admin.token).await;
    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn available_subjects_exclude_current_enrollments() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    app.enroll(&student.token, "COMP 104").await;

    let res = app.get_with_token(routes::AVAILABLE, &student.token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let codes: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes.len(), 4);
    assert!(!codes.contains(&"COMP 104"));
    assert!(!codes.contains(&"IT 103"), "second-semester subjects are not offered");
}

#[tokio::test]
async fn changing_semester_switches_the_available_catalog() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;

    let res = app
        .patch_with_token(routes::ME, &json!({"semester": "summer"}), &student.token)
        .await;
    assert_eq!(res.status, 400);

    let res = app
        .patch_with_token(routes::ME, &json!({"semester": "2nd"}), &student.token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["semester"], "2nd");

    let res = app.get_with_token(routes::AVAILABLE, &student.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let codes: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes.len(), 5);
    assert!(codes.contains(&"IT 103"));
    assert!(!codes.contains(&"COMP 104"));
}

#[tokio::test]
async fn admins_have_no_semester_to_change() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("registrar").await;

    let res = app
        .patch_with_token(routes::ME, &json!({"semester": "2nd"}), &admin.token)
        .await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn enrolling_twice_is_a_conflict() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    app.enroll(&student.token, "IT 102").await;
    let subject_id = app.subject_id(&student.token, "IT 102").await;

    let res = app
        .post_with_token(
            routes::ENROLLMENTS,
            &json!({"subject_id": subject_id, "professor_name": "Prof. Reyes"}),
            &student.token,
        )
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn new_enrollment_has_no_data() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    let id = app.enroll(&student.token, "IT 102").await;

    let res = app.get_with_token(&routes::enrollment(id), &student.token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["performance"]["risk_level"], "no-data");
    assert_eq!(res.f64("/performance/overall_grade"), 0.0);
    assert_eq!(res.f64("/remaining_allocation"), 60.0);
}

#[tokio::test]
async fn another_students_enrollment_is_not_found() {
    let app = TestApp::spawn().await;
    let owner = app.create_student("juan").await;
    let other = app.create_student("maria").await;
    let id = app.enroll(&owner.token, "IT 102").await;

    let res = app.get_with_token(&routes::enrollment(id), &other.token).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");

    let res = app
        .post_with_token(
            &routes::categories(id),
            &json!({"name": "Quizzes", "weight": 20.0}),
            &other.token,
        )
        .await;
    assert_eq!(res.status, 404);

    let res = app.delete_with_token(&routes::enrollment(id), &other.token).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn patch_updates_professor_and_clears_schedule() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    let id = app.enroll(&student.token, "IT 102").await;

    let res = app
        .patch_with_token(
            &routes::enrollment(id),
            &json!({"professor_name": "Prof. Reyes", "schedule": null}),
            &student.token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["professor_name"], "Prof. Reyes");
    assert!(res.body["schedule"].is_null());
}

#[tokio::test]
async fn deleting_an_enrollment_removes_its_grades() {
    let app = TestApp::spawn().await;
    let student = app.create_student("juan").await;
    let id = app.graded_enrollment(&student.token, "IT 102").await;

    let res = app.delete_with_token(&routes::enrollment(id), &student.token).await;
    assert_eq!(res.status, 204, "{}", res.text);

    let res = app.get_with_token(routes::ENROLLMENTS, &student.token).await;
    assert_eq!(res.body.as_array().unwrap().len(), 0);

    let res = app.get_with_token(&routes::enrollment(id), &student.token).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn admins_cannot_use_student_routes() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("registrar").await;

    let res = app.get_with_token(routes::ENROLLMENTS, &admin.token).await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}
