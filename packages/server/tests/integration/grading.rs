use serde_json::json;

use crate::common::{TestApp, routes};

mod categories {
    use super::*;

    #[tokio::test]
    async fn weights_cannot_exceed_the_class_standing_ceiling() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        app.add_category(&student.token, id, "Quizzes", 20.0).await;
        app.add_category(&student.token, id, "Projects", 15.0).await;

        let res = app
            .post_with_token(
                &routes::categories(id),
                &json!({"name": "Recitation", "weight": 30.0}),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(
            res.body["message"].as_str().unwrap().contains("25%"),
            "{}",
            res.text
        );

        // Exactly the remainder still fits.
        app.add_category(&student.token, id, "Recitation", 25.0).await;
        let detail = app.get_with_token(&routes::enrollment(id), &student.token).await;
        assert_eq!(detail.f64("/remaining_allocation"), 0.0);
    }

    #[tokio::test]
    async fn fractional_weights_can_fill_the_ceiling_exactly() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        app.add_category(&student.token, id, "Recitation", 0.1).await;
        app.add_category(&student.token, id, "Quizzes", 16.3).await;

        let detail = app.get_with_token(&routes::enrollment(id), &student.token).await;
        assert_eq!(detail.f64("/remaining_allocation"), 43.6);

        let res = app
            .post_with_token(
                &routes::categories(id),
                &json!({"name": "Projects", "weight": 43.6}),
                &student.token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let detail = app.get_with_token(&routes::enrollment(id), &student.token).await;
        assert_eq!(detail.f64("/remaining_allocation"), 0.0);

        let res = app
            .post_with_token(
                &routes::categories(id),
                &json!({"name": "Seatwork", "weight": 0.01}),
                &student.token,
            )
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn zero_weight_is_rejected() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;

        let res = app
            .post_with_token(
                &routes::categories(id),
                &json!({"name": "Quizzes", "weight": 0.0}),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn deleting_a_category_removes_its_scores() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        let quizzes = app.add_category(&student.token, id, "Quizzes", 30.0).await;
        app.add_score(&student.token, id, quizzes, 8.0, 10.0).await;

        let res = app
            .delete_with_token(&routes::category(id, quizzes), &student.token)
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let detail = app.get_with_token(&routes::enrollment(id), &student.token).await;
        assert_eq!(detail.body["categories"].as_array().unwrap().len(), 0);
        assert_eq!(detail.body["scores"].as_array().unwrap().len(), 0);
        assert_eq!(detail.f64("/remaining_allocation"), 60.0);
    }
}

mod scores {
    use super::*;

    #[tokio::test]
    async fn score_above_max_is_rejected() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        let quizzes = app.add_category(&student.token, id, "Quizzes", 30.0).await;

        let res = app
            .post_with_token(
                &routes::scores(id),
                &json!({"category_id": quizzes, "name": "Quiz 1", "value": 11.0, "max_score": 10.0}),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn score_in_a_foreign_category_is_not_found() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let first = app.enroll(&student.token, "IT 102").await;
        let second = app.enroll(&student.token, "COMP 104").await;
        let quizzes = app.add_category(&student.token, first, "Quizzes", 30.0).await;

        let res = app
            .post_with_token(
                &routes::scores(second),
                &json!({"category_id": quizzes, "name": "Quiz 1", "value": 5.0, "max_score": 10.0}),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn update_is_bounded_by_the_stored_max() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        let quizzes = app.add_category(&student.token, id, "Quizzes", 30.0).await;
        let score = app.add_score(&student.token, id, quizzes, 5.0, 10.0).await;

        let res = app
            .patch_with_token(&routes::score(id, score), &json!({"value": 12.0}), &student.token)
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .patch_with_token(&routes::score(id, score), &json!({"value": 9.0}), &student.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.f64("/value"), 9.0);

        let res = app.delete_with_token(&routes::score(id, score), &student.token).await;
        assert_eq!(res.status, 204);
    }

    #[tokio::test]
    async fn attendance_is_one_record_per_day() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        let attendance = app.add_category(&student.token, id, "Attendance", 10.0).await;
        let body = json!({"category_id": attendance, "date": "2025-09-01", "status": "present"});

        let res = app.post_with_token(&routes::attendance(id), &body, &student.token).await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "Present");
        assert_eq!(res.f64("/max_score"), 1.0);

        let res = app.post_with_token(&routes::attendance(id), &body, &student.token).await;
        assert_eq!(res.status, 409);

        let absent = json!({"category_id": attendance, "date": "2025-09-02", "status": "absent"});
        let res = app.post_with_token(&routes::attendance(id), &absent, &student.token).await;
        assert_eq!(res.status, 201);

        let perf = app.get_with_token(&routes::performance(id), &student.token).await;
        assert_eq!(perf.f64("/class_standing_total"), 5.0);
    }

    #[tokio::test]
    async fn editing_attendance_flips_presence() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        let attendance = app.add_category(&student.token, id, "Attendance", 10.0).await;
        let absent = json!({"category_id": attendance, "date": "2025-09-02", "status": "absent"});
        let record = app
            .post_with_token(&routes::attendance(id), &absent, &student.token)
            .await
            .id();

        let res = app
            .patch_with_token(&routes::score(id, record), &json!({"value": 0.5}), &student.token)
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .patch_with_token(&routes::score(id, record), &json!({"value": 1.0}), &student.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Present");

        let perf = app.get_with_token(&routes::performance(id), &student.token).await;
        assert_eq!(perf.f64("/class_standing_total"), 10.0);
    }

    #[tokio::test]
    async fn scores_for_removed_parents_are_not_found() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        let quizzes = app.add_category(&student.token, id, "Quizzes", 30.0).await;
        app.delete_with_token(&routes::category(id, quizzes), &student.token)
            .await;
        let body = json!({"category_id": quizzes, "name": "Quiz 1", "value": 5.0, "max_score": 10.0});

        let res = app.post_with_token(&routes::scores(id), &body, &student.token).await;
        assert_eq!(res.status, 404, "{}", res.text);

        let projects = app.add_category(&student.token, id, "Projects", 30.0).await;
        app.post_with_token(&routes::archive(id), &json!({}), &student.token)
            .await;
        let body = json!({"category_id": projects, "name": "Project 1", "value": 5.0, "max_score": 10.0});
        let res = app.post_with_token(&routes::scores(id), &body, &student.token).await;
        assert_eq!(res.status, 404, "{}", res.text);
    }
}

mod exams {
    use super::*;

    #[tokio::test]
    async fn putting_an_exam_twice_replaces_it() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;

        app.put_exam(&student.token, id, "midterm", 30.0, 50.0).await;
        app.put_exam(&student.token, id, "midterm", 40.0, 50.0).await;

        let detail = app.get_with_token(&routes::enrollment(id), &student.token).await;
        let exams = detail.body["exams"].as_array().unwrap();
        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0]["exam_type"], "midterm");
        assert_eq!(exams[0]["value"].as_f64(), Some(40.0));
        assert_eq!(detail.f64("/performance/midterm_contribution"), 16.0);
    }

    #[tokio::test]
    async fn unknown_exam_type_is_rejected() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;

        let res = app
            .put_with_token(
                &routes::exam(id, "quarterly"),
                &json!({"value": 1.0, "max_score": 2.0}),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn deleting_a_missing_exam_is_not_found() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;

        let res = app.delete_with_token(&routes::exam(id, "final"), &student.token).await;
        assert_eq!(res.status, 404);

        app.put_exam(&student.token, id, "final", 10.0, 20.0).await;
        let res = app.delete_with_token(&routes::exam(id, "final"), &student.token).await;
        assert_eq!(res.status, 204);
    }
}

mod performance {
    use super::*;

    #[tokio::test]
    async fn full_enrollment_is_low_risk() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.graded_enrollment(&student.token, "IT 102").await;

        let res = app.get_with_token(&routes::performance(id), &student.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!((res.f64("/overall_grade") - 90.0).abs() < 1e-9);
        assert_eq!(res.f64("/gpa"), 1.0);
        assert_eq!(res.body["risk_level"], "low");
    }

    #[tokio::test]
    async fn low_scores_get_high_risk_advice() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        let quizzes = app.add_category(&student.token, id, "Quizzes", 60.0).await;
        app.add_score(&student.token, id, quizzes, 3.0, 10.0).await;
        app.put_exam(&student.token, id, "midterm", 20.0, 50.0).await;

        let res = app.get_with_token(&routes::advice(id), &student.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["risk_level"], "high");
        let interventions = res.body["interventions"].as_array().unwrap();
        assert!(interventions.iter().any(|a| a["priority"] == "high"));
        let recommendations = res.body["recommendations"].as_array().unwrap();
        assert!(
            recommendations
                .iter()
                .any(|a| a["message"].as_str().unwrap().contains("Quizzes"))
        );
    }

    #[tokio::test]
    async fn projection_reports_what_is_still_needed() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;
        let quizzes = app.add_category(&student.token, id, "Quizzes", 60.0).await;
        app.add_score(&student.token, id, quizzes, 10.0, 10.0).await;

        let res = app
            .get_with_token(
                &format!("{}?target=80&outlook=maintain", routes::projection(id)),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.f64("/current_grade"), 60.0);
        assert_eq!(res.f64("/remaining_weight"), 40.0);
        assert_eq!(res.f64("/required_percentage"), 50.0);
        assert_eq!(res.f64("/projected_grade"), 100.0);
        assert_eq!(res.body["target_reachable"], true);
    }

    #[tokio::test]
    async fn projection_target_must_be_a_grade() {
        let app = TestApp::spawn().await;
        let student = app.create_student("juan").await;
        let id = app.enroll(&student.token, "IT 102").await;

        let res = app
            .get_with_token(&format!("{}?target=120", routes::projection(id)), &student.token)
            .await;

        assert_eq!(res.status, 400);
    }
}
