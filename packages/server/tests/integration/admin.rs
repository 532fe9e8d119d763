use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};
use server::entity::{enrollment, message, system_log};

use crate::common::{DEFAULT_PASSWORD, EMAIL_DOMAIN, PASSWORD, Session, TestApp, routes};

/// One low-risk student (90) and one high-risk student (26), both in IT 102.
async fn graded_roster(app: &TestApp) -> (Session, Session) {
    let juan = app.create_student("juan").await;
    app.graded_enrollment(&juan.token, "IT 102").await;

    let maria = app.create_student("maria").await;
    let id = app.enroll(&maria.token, "IT 102").await;
    let quizzes = app.add_category(&maria.token, id, "Quizzes", 60.0).await;
    app.add_score(&maria.token, id, quizzes, 3.0, 10.0).await;
    app.put_exam(&maria.token, id, "midterm", 20.0, 50.0).await;

    (juan, maria)
}

fn find<'a>(rows: &'a Value, code: &str) -> &'a Value {
    rows.as_array()
        .unwrap()
        .iter()
        .find(|r| r["subject"]["code"] == code)
        .unwrap()
}

mod students {
    use super::*;

    #[tokio::test]
    async fn list_is_paginated_and_searchable() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        for handle in ["juan", "maria", "pedro"] {
            app.create_student(handle).await;
        }

        let res = app
            .get_with_token(&format!("{}?per_page=2", routes::STUDENTS), &admin.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
        assert_eq!(res.body["data"][0]["fullname"], "Student pedro");

        let res = app
            .get_with_token(&format!("{}?search=MARIA", routes::STUDENTS), &admin.token)
            .await;
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["student_number"], "23-maria");

        let res = app
            .get_with_token(&format!("{}?search=100%25", routes::STUDENTS), &admin.token)
            .await;
        assert_eq!(res.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn detail_includes_enrollments() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        let student = app.create_student("juan").await;
        app.graded_enrollment(&student.token, "IT 102").await;

        let res = app.get_with_token(&routes::student(student.id), &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["profile"]["email"], format!("juan{EMAIL_DOMAIN}"));
        let enrollments = res.body["enrollments"].as_array().unwrap();
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0]["performance"]["risk_level"], "low");
    }

    #[tokio::test]
    async fn admins_are_not_listed_as_students() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;

        let res = app.get_with_token(&routes::student(admin.id), &admin.token).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn deleting_a_student_removes_their_data() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        let student = app.create_student("juan").await;
        let kept = app.graded_enrollment(&student.token, "IT 102").await;
        let archived = app.enroll(&student.token, "COMP 104").await;
        app.post_with_token(&routes::archive(archived), &json!({}), &student.token)
            .await;
        app.post_with_token(
            routes::MESSAGES,
            &json!({"receiver_id": admin.id, "body": "hello"}),
            &student.token,
        )
        .await;

        let res = app.delete_with_token(&routes::student(student.id), &admin.token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        assert!(
            enrollment::Entity::find_by_id(kept)
                .one(&app.db)
                .await
                .unwrap()
                .is_none()
        );
        let messages = message::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(messages, 0);
        let logs = system_log::Entity::find()
            .filter(system_log::Column::Email.eq(&student.email))
            .all(&app.db)
            .await
            .unwrap();
        assert!(!logs.is_empty());
        assert!(logs.iter().all(|l| l.user_id.is_none()));

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": student.email, "password": PASSWORD}),
            )
            .await;
        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn reset_password_restores_the_default() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        let student = app.create_student("juan").await;

        let res = app
            .post_with_token(&routes::reset_password(student.id), &json!({}), &admin.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let session = app.login(&student.email, DEFAULT_PASSWORD).await;
        assert_eq!(session.id, student.id);
    }

    #[tokio::test]
    async fn students_cannot_use_admin_routes() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;

        for path in [
            routes::STUDENTS,
            routes::DASHBOARD,
            routes::OVERVIEW,
            routes::RISK_ASSESSMENT,
            routes::LOGS,
        ] {
            let res = app.get_with_token(path, &student.token).await;
            assert_eq!(res.status, 403, "{path}");
        }
    }
}

mod reports {
    use super::*;

    #[tokio::test]
    async fn overview_counts_risk_per_enrollment() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        graded_roster(&app).await;

        let res = app.get_with_token(routes::OVERVIEW, &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["total_students"], 2);
        assert_eq!(res.body["total_subjects"], 10);
        assert_eq!(res.body["active_students"], 2);
        assert_eq!(res.body["total_enrollments"], 2);
        assert_eq!(res.body["new_registrations"], 2);
        assert_eq!(res.body["risk_distribution"]["low"], 1);
        assert_eq!(res.body["risk_distribution"]["high"], 1);
    }

    #[tokio::test]
    async fn student_performance_is_sorted_by_average() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        let (juan, maria) = graded_roster(&app).await;

        let res = app.get_with_token(routes::STUDENT_PERFORMANCE, &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let students = res.body["students"].as_array().unwrap();
        assert_eq!(students[0]["student_id"], juan.id);
        assert_eq!(students[0]["performance_level"], "Excellent");
        assert_eq!(students[1]["student_id"], maria.id);
        assert_eq!(students[1]["performance_level"], "Needs Improvement");
        assert_eq!(res.body["summary"]["excellent"], 1);
        assert_eq!(res.body["summary"]["needs_improvement"], 1);
    }

    #[tokio::test]
    async fn subject_analysis_averages_graded_enrollments() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        graded_roster(&app).await;

        let res = app.get_with_token(routes::SUBJECT_ANALYSIS, &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let it102 = find(&res.body, "IT 102");
        assert_eq!(it102["enrolled"], 2);
        assert_eq!(it102["average_grade"].as_f64(), Some(58.0));
        assert_eq!(it102["high_risk_percentage"].as_f64(), Some(50.0));
        assert!(find(&res.body, "COMP 104")["average_grade"].is_null());
    }

    #[tokio::test]
    async fn risk_assessment_puts_the_riskiest_first() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        let (_, maria) = graded_roster(&app).await;

        let res = app.get_with_token(routes::RISK_ASSESSMENT, &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let first = &res.body["students"][0];
        assert_eq!(first["student_id"], maria.id);
        assert_eq!(first["risk_score"], 4);
        assert_eq!(first["overall_risk"], "high");
        assert_eq!(res.body["summary"]["high"], 1);
        assert_eq!(res.body["summary"]["low"], 1);
    }

    #[tokio::test]
    async fn dashboard_buckets_students_by_semester() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        let (_, maria) = graded_roster(&app).await;

        let res = app.get_with_token(routes::DASHBOARD, &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["first_semester"]["total_students"], 2);
        assert_eq!(res.body["first_semester"]["risk"]["high"], 1);
        assert_eq!(res.body["second_semester"]["total_students"], 0);
        assert_eq!(res.body["overall"]["total_students"], 2);
        let recent = res.body["recent_students"].as_array().unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0]["id"], maria.id);
    }
}

mod logs {
    use super::*;

    #[tokio::test]
    async fn sessions_are_paired_from_student_logins() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        let juan = app.create_student("juan").await;
        app.create_student("maria").await;
        app.post_with_token(routes::LOGOUT, &json!({}), &juan.token).await;

        let res = app.get_with_token(routes::LOGS, &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["events"].as_array().unwrap().len(), 3);
        assert_eq!(res.body["summary"]["total_sessions"], 2);
        assert_eq!(res.body["summary"]["active_sessions"], 1);
        assert_eq!(res.body["summary"]["unique_students"], 2);

        let res = app
            .get_with_token(&format!("{}?email=JUAN", routes::LOGS), &admin.token)
            .await;
        assert_eq!(res.body["events"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["summary"]["active_sessions"], 0);
    }

    #[tokio::test]
    async fn other_days_are_empty() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("registrar").await;
        app.create_student("juan").await;

        let res = app
            .get_with_token(&format!("{}?date=2001-01-01", routes::LOGS), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["events"].as_array().unwrap().len(), 0);
    }
}
