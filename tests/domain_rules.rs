//! Integration tests for the portal's domain rules.
//!
//! Everything here runs against the pure logic: the status transition
//! policy, reference codes, authorization predicates, attachment intake
//! validation, and filter parsing. Database-backed flows are covered by
//! the handler-level tests in `api_contract.rs`.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use complaints_portal_lib::models::{
    Category, Complaint, ComplaintFilter, Status, Urgency, validate_attachment,
    validate_comment,
};

fn sample_complaint(status: Status, submitter_id: Uuid) -> Complaint {
    let created = Utc.with_ymd_and_hms(2026, 2, 10, 8, 15, 0).unwrap();
    Complaint {
        id: 123,
        reference_code: Some(Complaint::reference_code_for(created, 123)),
        title: "Water main leak".to_string(),
        description: "Water has been pooling at the intersection for two days.".to_string(),
        category: Category::Utilities,
        status,
        urgency: Urgency::High,
        location: "Oak Ave and 3rd St".to_string(),
        submitter_id,
        assignee_id: None,
        staff_remark: String::new(),
        last_status_changed_at: None,
        created_at: created,
        updated_at: created,
    }
}

#[test]
fn reference_code_matches_expected_format() {
    let created = Utc.with_ymd_and_hms(2026, 2, 10, 8, 15, 0).unwrap();
    let code = Complaint::reference_code_for(created, 123);
    assert_eq!(code, "GOV-CMP-2026-000123");

    // Zero-padding to six digits
    assert_eq!(
        Complaint::reference_code_for(created, 1),
        "GOV-CMP-2026-000001"
    );
}

#[test]
fn resolved_is_terminal() {
    for target in [Status::Received, Status::InProgress] {
        assert!(
            !Status::Resolved.can_transition_to(target),
            "resolved must not move to {}",
            target
        );
    }
    assert!(Status::Resolved.can_transition_to(Status::Resolved));
}

#[test]
fn forward_transitions_succeed_and_skips_fail() {
    assert!(Status::Received.can_transition_to(Status::InProgress));
    assert!(Status::InProgress.can_transition_to(Status::Resolved));
    assert!(!Status::Received.can_transition_to(Status::Resolved));
}

#[test]
fn no_status_regression() {
    assert!(!Status::InProgress.can_transition_to(Status::Received));
    assert!(!Status::Resolved.can_transition_to(Status::Received));
}

#[test]
fn staff_view_any_citizen_view_own() {
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    let complaint = sample_complaint(Status::Received, owner);

    assert!(complaint.can_be_viewed_by(owner, false));
    assert!(!complaint.can_be_viewed_by(other, false));
    assert!(complaint.can_be_viewed_by(other, true));
}

#[test]
fn modification_requires_ownership_and_received_status() {
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    assert!(sample_complaint(Status::Received, owner).can_be_modified_by(owner));
    assert!(!sample_complaint(Status::Received, owner).can_be_modified_by(other));

    // Regardless of ownership, triage locks the complaint
    assert!(!sample_complaint(Status::InProgress, owner).can_be_modified_by(owner));
    assert!(!sample_complaint(Status::Resolved, owner).can_be_modified_by(owner));
}

#[test]
fn attachment_extension_allowlist() {
    for good in ["evidence.jpg", "evidence.JPEG", "scan.png", "form.pdf"] {
        assert!(validate_attachment(good, 1024).is_ok(), "{} should pass", good);
    }
    for bad in ["malware.exe", "video.mp4", "notes.txt", "archive.tar.gz"] {
        assert!(validate_attachment(bad, 1024).is_err(), "{} should fail", bad);
    }
}

#[test]
fn attachment_size_ceiling_is_five_mib() {
    let five_mib = 5 * 1024 * 1024;
    assert!(validate_attachment("photo.jpg", five_mib).is_ok());
    assert!(validate_attachment("photo.jpg", five_mib + 1).is_err());
}

#[test]
fn comment_minimum_length_applies_after_trim() {
    assert_eq!(validate_comment(Some("  ")).unwrap(), None);
    assert!(validate_comment(Some("ab")).is_err());
    assert_eq!(
        validate_comment(Some("  dispatched crew  ")).unwrap(),
        Some("dispatched crew".to_string())
    );
}

#[test]
fn malformed_filter_dates_are_silently_ignored() {
    let filter = ComplaintFilter {
        start_date: Some("02/10/2026".to_string()),
        end_date: Some("2026-13-01".to_string()),
        ..Default::default()
    };

    // Neither malformed date produces a filter, and neither is an error
    assert_eq!(filter.start_date(), None);
    assert_eq!(filter.end_date(), None);
}

#[test]
fn filter_query_and_choices_are_trimmed() {
    let filter = ComplaintFilter {
        q: Some("  leak  ".to_string()),
        status: Some(" received ".to_string()),
        urgency: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(filter.query(), Some("leak"));
    assert_eq!(filter.status(), Some("received"));
    assert_eq!(filter.urgency(), None);
}

#[test]
fn twelve_results_paginate_as_ten_plus_two() {
    use complaints_portal_lib::models::{PAGE_SIZE, Pagination};

    assert_eq!(PAGE_SIZE, 10);

    let page_one = Pagination::new(1, 12);
    assert_eq!(page_one.total_pages, 2);
    assert_eq!(page_one.per_page, 10);

    let page_two = ComplaintFilter {
        page: Some(2),
        ..Default::default()
    };
    assert_eq!(page_two.offset(), 10);
}
