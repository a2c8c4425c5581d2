use ecell_portal::confirmation::{ConfirmationView, REVIEW_STATUS, submission_id};
use ecell_portal::demo_user;
use ecell_portal::model::{Submission, SubmissionForm};

#[test]
fn test_submission_id_uses_last_six_millis_digits() {
    let id = submission_id("21CS101", "2025-03-14T09:26:53.123Z").unwrap();
    // 2025-03-14T09:26:53.123Z is 1741944413123 ms since the epoch
    assert_eq!(id, "21CS101-413123");
    println!("✓ Submission id {} derived from roll number and timestamp", id);
}

#[test]
fn test_submission_id_accepts_offsets() {
    let utc = submission_id("21CS101", "2025-03-14T09:26:53.123Z").unwrap();
    let shifted = submission_id("21CS101", "2025-03-14T14:56:53.123+05:30").unwrap();
    assert_eq!(utc, shifted);
}

#[test]
fn test_submission_id_rejects_bad_timestamp() {
    assert!(submission_id("21CS101", "yesterday").is_err());
}

#[test]
fn test_confirmation_view() {
    let submission = Submission {
        form: SubmissionForm {
            idea_title: "Campus Bikes".to_string(),
            one_liner_pitch: "Bikes for everyone.".to_string(),
            ..SubmissionForm::default()
        },
        submitted_at: "2025-03-14T09:26:53.123Z".to_string(),
        status: "submitted".to_string(),
    };
    let view = ConfirmationView::new(&demo_user(), &submission).unwrap();

    assert_eq!(view.first_name, "Ganesh");
    assert_eq!(view.idea_title, "Campus Bikes");
    assert_eq!(view.submission_id, "21CS101-413123");
    assert_eq!(view.status, REVIEW_STATUS);
    assert_eq!(view.submitted_on, "14 Mar 2025");
    assert_eq!(view.links.len(), 4);
}
