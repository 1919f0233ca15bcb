use async_trait::async_trait;
use ats_backend::error::{Error, Result};
use ats_backend::models::application::Application;
use ats_backend::models::career::Career;
use ats_backend::models::cv::{ApplicantCv, CvSection};
use ats_backend::models::history::HistoryTransaction;
use ats_backend::models::screening::{CvVerdict, Verdict};
use ats_backend::services::classifier_service::CvClassifier;
use ats_backend::services::screening_service::{
    run_screening, ScreeningRequest, ScreeningStore, ScreeningUpdate,
};
use chrono::Utc;
use mockall::mock;
use mockall::predicate::eq;
use sqlx::types::Json;
use uuid::Uuid;

mock! {
    pub Store {}

    #[async_trait]
    impl ScreeningStore for Store {
        async fn find_application(&self, uid: Uuid, email: &str) -> Result<Option<Application>>;
        async fn find_cv(&self, email: &str) -> Result<Option<ApplicantCv>>;
        async fn find_career(&self, id: Uuid) -> Result<Option<Career>>;
        async fn screening_prompt(&self) -> Result<Option<String>>;
        async fn apply_screening_update(
            &self,
            uid: Uuid,
            expected_status: &str,
            update: &ScreeningUpdate,
        ) -> Result<bool>;
        async fn append_history(&self, uid: Uuid, tx: &HistoryTransaction) -> Result<()>;
        async fn touch_career_activity(&self, career_id: Uuid) -> Result<()>;
    }
}

mock! {
    pub Classifier {}

    #[async_trait]
    impl CvClassifier for Classifier {
        async fn classify(&self, prompt: &str) -> Result<CvVerdict>;
    }
}

const EMAIL: &str = "dana@example.com";

fn fixture_career(setting: Option<&str>) -> Career {
    Career {
        id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        job_title: "Backend Engineer".to_string(),
        description: Some("Rust services at scale".to_string()),
        screening_setting: setting.map(|s| s.to_string()),
        status: "open".to_string(),
        last_activity_at: None,
        created_at: None,
        updated_at: None,
    }
}

fn fixture_application(career: &Career) -> Application {
    Application {
        uid: Uuid::new_v4(),
        candidate_email: EMAIL.to_string(),
        candidate_name: "Dana".to_string(),
        career_id: career.id,
        organization_id: career.organization_id,
        status: "For CV Screening".to_string(),
        application_status: Some("Ongoing".to_string()),
        current_step: Some("CV Screening".to_string()),
        cv_status: None,
        cv_screening_reason: None,
        confidence: None,
        job_fit_score: None,
        state_class: None,
        cv_setting_result: None,
        status_dates: None,
        application_metadata: None,
        pre_screening_answers: None,
        created_at: None,
        updated_at: None,
    }
}

fn fixture_cv() -> ApplicantCv {
    ApplicantCv {
        candidate_email: EMAIL.to_string(),
        digital_cv: Json(vec![CvSection {
            name: "Experience".to_string(),
            content: "Five years of Rust backend work".to_string(),
        }]),
        created_at: None,
        updated_at: None,
    }
}

fn verdict(result: Verdict, confidence: i32, job_fit_score: i32) -> CvVerdict {
    CvVerdict {
        result,
        reason: "because".to_string(),
        confidence,
        job_fit_score,
    }
}

fn request(uid: Uuid) -> ScreeningRequest {
    ScreeningRequest {
        application_uid: uid,
        candidate_email: EMAIL.to_string(),
        pre_screening_answers: None,
    }
}

/// Wire up the happy-path lookups shared by most tests.
fn expect_lookups(store: &mut MockStore, app: &Application, career: &Career) {
    let app_clone = app.clone();
    let uid = app.uid;
    store
        .expect_find_application()
        .withf(move |u, email| *u == uid && email == EMAIL)
        .returning(move |_, _| Ok(Some(app_clone.clone())));
    store
        .expect_find_cv()
        .withf(|email| email == EMAIL)
        .returning(|_| Ok(Some(fixture_cv())));
    let career_clone = career.clone();
    store
        .expect_find_career()
        .with(eq(career.id))
        .returning(move |_| Ok(Some(career_clone.clone())));
    store.expect_screening_prompt().returning(|| Ok(None));
}

#[tokio::test]
async fn strong_fit_without_setting_promotes_to_ai_interview() {
    let career = fixture_career(None);
    let app = fixture_application(&career);
    let uid = app.uid;

    let mut store = MockStore::new();
    expect_lookups(&mut store, &app, &career);
    store
        .expect_apply_screening_update()
        .withf(move |u, expected, update| {
            *u == uid
                && expected == "For CV Screening"
                && update.status == "For AI Interview"
                && update.cv_status == "Strong Fit"
                && update.state_class == "accepted"
                && update.cv_setting_result == "Passed"
                && update.application_status.is_none()
                && update.stage_dates.get("AI Interview").is_some()
        })
        .times(1)
        .returning(|_, _, _| Ok(true));
    store
        .expect_append_history()
        .withf(move |u, tx| {
            *u == uid
                && tx.action == "Auto-Promoted"
                && tx.from_stage.as_deref() == Some("CV Screening")
                && tx.to_stage.as_deref() == Some("Pending AI Interview")
                && tx.updated_by == "system"
        })
        .times(1)
        .returning(|_, _| Ok(()));
    store
        .expect_touch_career_activity()
        .with(eq(career.id))
        .times(1)
        .returning(|_| Ok(()));

    let mut classifier = MockClassifier::new();
    classifier
        .expect_classify()
        .times(1)
        .returning(|_| Ok(verdict(Verdict::StrongFit, 92, 88)));

    let outcome = run_screening(&store, &classifier, &request(uid), Utc::now())
        .await
        .expect("screening succeeds");

    assert_eq!(outcome.update.confidence, 92);
    assert_eq!(outcome.update.job_fit_score, 88);
    assert_eq!(outcome.update.status, "For AI Interview");
    let history = outcome.history.expect("promotion records history");
    assert_eq!(history.to_stage.as_deref(), Some("Pending AI Interview"));
}

#[tokio::test]
async fn no_fit_under_good_fit_and_above_drops_with_history() {
    let career = fixture_career(Some("Good Fit and above"));
    let app = fixture_application(&career);
    let uid = app.uid;

    let mut store = MockStore::new();
    expect_lookups(&mut store, &app, &career);
    store
        .expect_apply_screening_update()
        .withf(|_, _, update| {
            update.application_status.as_deref() == Some("Dropped")
                && update.cv_status == "No Fit"
                && update.state_class == "rejected"
                && update.cv_setting_result == "Failed"
        })
        .times(1)
        .returning(|_, _, _| Ok(true));
    store
        .expect_append_history()
        .withf(move |u, tx| *u == uid && tx.action == "Dropped" && tx.to_stage.is_none())
        .times(1)
        .returning(|_, _| Ok(()));
    store
        .expect_touch_career_activity()
        .times(1)
        .returning(|_| Ok(()));

    let mut classifier = MockClassifier::new();
    classifier
        .expect_classify()
        .returning(|_| Ok(verdict(Verdict::NoFit, 70, 5)));

    let outcome = run_screening(&store, &classifier, &request(uid), Utc::now())
        .await
        .expect("screening succeeds");
    assert_eq!(
        outcome.update.application_status.as_deref(),
        Some("Dropped")
    );
}

#[tokio::test]
async fn insufficient_data_stays_in_screening_without_history() {
    let career = fixture_career(None);
    let app = fixture_application(&career);
    let uid = app.uid;

    let mut store = MockStore::new();
    expect_lookups(&mut store, &app, &career);
    store
        .expect_apply_screening_update()
        .withf(|_, _, update| {
            update.status == "For CV Screening"
                && update.application_status.is_none()
                && update.state_class == "rejected"
        })
        .times(1)
        .returning(|_, _, _| Ok(true));
    store.expect_append_history().never();
    store
        .expect_touch_career_activity()
        .times(1)
        .returning(|_| Ok(()));

    let mut classifier = MockClassifier::new();
    classifier
        .expect_classify()
        .returning(|_| Ok(verdict(Verdict::InsufficientData, 40, 10)));

    let outcome = run_screening(&store, &classifier, &request(uid), Utc::now())
        .await
        .expect("screening succeeds");
    assert!(outcome.history.is_none());
}

#[tokio::test]
async fn missing_application_reports_not_found_and_writes_nothing() {
    let mut store = MockStore::new();
    store
        .expect_find_application()
        .returning(|_, _| Ok(None));
    store.expect_find_cv().never();
    store.expect_apply_screening_update().never();
    store.expect_append_history().never();
    store.expect_touch_career_activity().never();

    let mut classifier = MockClassifier::new();
    classifier.expect_classify().never();

    let err = run_screening(&store, &classifier, &request(Uuid::new_v4()), Utc::now())
        .await
        .expect_err("must fail");
    match err {
        Error::NotFound(msg) => assert_eq!(msg, "no application found for this job"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_cv_reports_not_found_and_writes_nothing() {
    let career = fixture_career(None);
    let app = fixture_application(&career);
    let uid = app.uid;

    let mut store = MockStore::new();
    let app_clone = app.clone();
    store
        .expect_find_application()
        .returning(move |_, _| Ok(Some(app_clone.clone())));
    store.expect_find_cv().returning(|_| Ok(None));
    store.expect_apply_screening_update().never();
    store.expect_append_history().never();
    store.expect_touch_career_activity().never();

    let mut classifier = MockClassifier::new();
    classifier.expect_classify().never();

    let err = run_screening(&store, &classifier, &request(uid), Utc::now())
        .await
        .expect_err("must fail");
    match err {
        Error::NotFound(msg) => assert_eq!(msg, "CV not uploaded for this application"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_classifier_output_leaves_application_untouched() {
    let career = fixture_career(None);
    let app = fixture_application(&career);
    let uid = app.uid;

    let mut store = MockStore::new();
    expect_lookups(&mut store, &app, &career);
    store.expect_apply_screening_update().never();
    store.expect_append_history().never();
    store.expect_touch_career_activity().never();

    let mut classifier = MockClassifier::new();
    classifier.expect_classify().returning(|_| {
        Err(Error::InvalidClassifierResponse(
            "unknown verdict 'Maybe Fit'".to_string(),
        ))
    });

    let err = run_screening(&store, &classifier, &request(uid), Utc::now())
        .await
        .expect_err("must fail");
    assert!(matches!(err, Error::InvalidClassifierResponse(_)));
}

#[tokio::test]
async fn terminal_application_is_not_rescreened() {
    let career = fixture_career(None);
    let mut app = fixture_application(&career);
    app.application_status = Some("Dropped".to_string());
    let uid = app.uid;

    let mut store = MockStore::new();
    let app_clone = app.clone();
    store
        .expect_find_application()
        .returning(move |_, _| Ok(Some(app_clone.clone())));
    store.expect_find_cv().never();
    store.expect_apply_screening_update().never();

    let mut classifier = MockClassifier::new();
    classifier.expect_classify().never();

    let err = run_screening(&store, &classifier, &request(uid), Utc::now())
        .await
        .expect_err("must fail");
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn concurrent_status_change_is_a_conflict_not_an_overwrite() {
    let career = fixture_career(None);
    let app = fixture_application(&career);
    let uid = app.uid;

    let mut store = MockStore::new();
    expect_lookups(&mut store, &app, &career);
    store
        .expect_apply_screening_update()
        .times(1)
        .returning(|_, _, _| Ok(false));
    store.expect_append_history().never();
    store.expect_touch_career_activity().never();

    let mut classifier = MockClassifier::new();
    classifier
        .expect_classify()
        .returning(|_| Ok(verdict(Verdict::GoodFit, 80, 75)));

    let err = run_screening(&store, &classifier, &request(uid), Utc::now())
        .await
        .expect_err("must fail");
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn pre_screening_answers_are_persisted_verbatim() {
    let career = fixture_career(None);
    let app = fixture_application(&career);
    let uid = app.uid;
    let answers = serde_json::json!({ "q1": "yes", "q2": "relocating in May" });

    let mut store = MockStore::new();
    expect_lookups(&mut store, &app, &career);
    let expected_answers = answers.clone();
    store
        .expect_apply_screening_update()
        .withf(move |_, _, update| {
            update.pre_screening_answers.as_ref() == Some(&expected_answers)
        })
        .times(1)
        .returning(|_, _, _| Ok(true));
    store
        .expect_append_history()
        .returning(|_, _| Ok(()));
    store
        .expect_touch_career_activity()
        .returning(|_| Ok(()));

    let mut classifier = MockClassifier::new();
    classifier
        .expect_classify()
        .returning(|_| Ok(verdict(Verdict::GoodFit, 80, 75)));

    let req = ScreeningRequest {
        application_uid: uid,
        candidate_email: EMAIL.to_string(),
        pre_screening_answers: Some(answers),
    };
    run_screening(&store, &classifier, &req, Utc::now())
        .await
        .expect("screening succeeds");
}

#[tokio::test]
async fn prompt_carries_job_cv_and_global_instructions() {
    let career = fixture_career(None);
    let app = fixture_application(&career);
    let uid = app.uid;

    let mut store = MockStore::new();
    let app_clone = app.clone();
    store
        .expect_find_application()
        .returning(move |_, _| Ok(Some(app_clone.clone())));
    store.expect_find_cv().returning(|_| Ok(Some(fixture_cv())));
    let career_clone = career.clone();
    store
        .expect_find_career()
        .returning(move |_| Ok(Some(career_clone.clone())));
    store
        .expect_screening_prompt()
        .returning(|| Ok(Some("Weigh production experience heavily.".to_string())));
    store
        .expect_apply_screening_update()
        .returning(|_, _, _| Ok(true));
    store.expect_append_history().returning(|_, _| Ok(()));
    store
        .expect_touch_career_activity()
        .returning(|_| Ok(()));

    let mut classifier = MockClassifier::new();
    classifier
        .expect_classify()
        .withf(|prompt: &str| {
            prompt.contains("Backend Engineer")
                && prompt.contains("Five years of Rust backend work")
                && prompt.contains("Weigh production experience heavily.")
        })
        .times(1)
        .returning(|_| Ok(verdict(Verdict::StrongFit, 90, 90)));

    run_screening(&store, &classifier, &request(uid), Utc::now())
        .await
        .expect("screening succeeds");
}
