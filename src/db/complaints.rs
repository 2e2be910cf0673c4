//! Database queries for complaints.
//!
//! Multi-write operations (create with attachments, staff triage update,
//! subtree delete) run inside a single transaction; the status transition
//! check always uses the status re-read within that transaction.

use chrono::{TimeZone, Utc};
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{complaint, staff_comment, user};
use crate::error::{AppError, AppResult};
use crate::models::{
    Complaint, ComplaintFilter, NewComplaint, PAGE_SIZE, Pagination, Status,
};

use super::DbPool;

/// Attachment metadata recorded alongside a complaint write. The blob
/// itself is stored separately, keyed by `storage_key`.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub id: Uuid,
    pub storage_key: String,
    pub original_filename: String,
    pub size_bytes: i64,
}

/// Result of a staff triage update.
#[derive(Debug, Clone)]
pub struct StaffUpdateOutcome {
    pub complaint: Complaint,
    pub previous_status: Status,
    pub status_changed: bool,
}

/// Map a complaint row to the typed domain model. Unknown enum values
/// mean a corrupt row, not bad user input.
pub fn model_to_complaint(m: complaint::Model) -> AppResult<Complaint> {
    let category = crate::models::Category::parse(&m.category).ok_or_else(|| {
        AppError::Database(format!(
            "complaint {} has unknown category '{}'",
            m.id, m.category
        ))
    })?;
    let status = Status::parse(&m.status).ok_or_else(|| {
        AppError::Database(format!("complaint {} has unknown status '{}'", m.id, m.status))
    })?;
    let urgency = crate::models::Urgency::parse(&m.urgency).ok_or_else(|| {
        AppError::Database(format!(
            "complaint {} has unknown urgency '{}'",
            m.id, m.urgency
        ))
    })?;

    Ok(Complaint {
        id: m.id,
        reference_code: m.reference_code,
        title: m.title,
        description: m.description,
        category,
        status,
        urgency,
        location: m.location,
        submitter_id: m.submitter_id,
        assignee_id: m.assignee_id,
        staff_remark: m.staff_remark,
        last_status_changed_at: m.last_status_changed_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

impl DbPool {
    /// Insert a new complaint with its attachment records and assign the
    /// reference code, all in one transaction.
    ///
    /// The reference code depends on the sequence-assigned id, so it is
    /// written immediately after the insert. Assignment is idempotent: a
    /// row that somehow already carries a code keeps it.
    pub async fn insert_complaint(
        &self,
        form: &NewComplaint,
        submitter_id: Uuid,
        attachments: &[NewAttachment],
    ) -> AppResult<Complaint> {
        let txn = self.connection().begin().await?;
        let now = Utc::now();

        let model = complaint::ActiveModel {
            id: NotSet,
            reference_code: Set(None),
            title: Set(form.title.clone()),
            description: Set(form.description.clone()),
            category: Set(form.category.as_str().to_string()),
            status: Set(Status::Received.as_str().to_string()),
            urgency: Set(form.urgency.as_str().to_string()),
            location: Set(form.location.clone()),
            submitter_id: Set(submitter_id),
            assignee_id: Set(None),
            staff_remark: Set(String::new()),
            last_status_changed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert complaint: {}", e)))?;

        let inserted = if inserted.reference_code.is_none() {
            let reference = Complaint::reference_code_for(inserted.created_at, inserted.id);
            let mut active: complaint::ActiveModel = inserted.into();
            active.reference_code = Set(Some(reference));
            active
                .update(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to assign reference: {}", e)))?
        } else {
            inserted
        };

        super::attachments::insert_rows(&txn, inserted.id, attachments, now).await?;

        txn.commit().await?;

        model_to_complaint(inserted)
    }

    /// Get a complaint by reference code.
    pub async fn find_complaint_by_reference(
        &self,
        reference_code: &str,
    ) -> AppResult<Option<Complaint>> {
        let result = complaint::Entity::find()
            .filter(complaint::Column::ReferenceCode.eq(reference_code))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get complaint: {}", e)))?;

        result.map(model_to_complaint).transpose()
    }

    /// List complaints with filtering and fixed-size pagination.
    ///
    /// `restrict_to` limits the listing to one submitter (citizen callers);
    /// staff listings pass None and see everything.
    pub async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        restrict_to: Option<Uuid>,
    ) -> AppResult<(Vec<Complaint>, Pagination)> {
        let mut select = complaint::Entity::find();

        if let Some(submitter_id) = restrict_to {
            select = select.filter(complaint::Column::SubmitterId.eq(submitter_id));
        }

        if let Some(q) = filter.query() {
            let pattern = format!("%{}%", q);
            select = select.filter(
                Condition::any()
                    .add(Expr::col(complaint::Column::Title).ilike(pattern.clone()))
                    .add(Expr::col(complaint::Column::ReferenceCode).ilike(pattern.clone()))
                    .add(Expr::col(complaint::Column::Location).ilike(pattern)),
            );
        }

        if let Some(category) = filter.category() {
            select = select.filter(complaint::Column::Category.eq(category));
        }
        if let Some(status) = filter.status() {
            select = select.filter(complaint::Column::Status.eq(status));
        }
        if let Some(urgency) = filter.urgency() {
            select = select.filter(complaint::Column::Urgency.eq(urgency));
        }

        // Inclusive date range on the creation date; malformed inputs have
        // already been dropped by the filter parser.
        if let Some(start) = filter.start_date() {
            let start_at = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap());
            select = select.filter(complaint::Column::CreatedAt.gte(start_at));
        }
        if let Some(end) = filter.end_date() {
            if let Some(next_day) = end.checked_add_days(chrono::Days::new(1)) {
                let end_at = Utc.from_utc_datetime(&next_day.and_hms_opt(0, 0, 0).unwrap());
                select = select.filter(complaint::Column::CreatedAt.lt(end_at));
            }
        }

        // Count total before pagination
        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count complaints: {}", e)))?;

        let rows = select
            .order_by_desc(complaint::Column::CreatedAt)
            .offset(filter.offset())
            .limit(PAGE_SIZE)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list complaints: {}", e)))?;

        let complaints = rows
            .into_iter()
            .map(model_to_complaint)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((complaints, Pagination::new(filter.page(), total)))
    }

    /// Apply a citizen edit: replace the form fields and record any new
    /// attachments, in one transaction. Authorization happens in the
    /// handler before this is called.
    pub async fn update_complaint(
        &self,
        complaint_id: i64,
        form: &NewComplaint,
        attachments: &[NewAttachment],
    ) -> AppResult<Complaint> {
        let txn = self.connection().begin().await?;
        let now = Utc::now();

        let existing = complaint::Entity::find_by_id(complaint_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get complaint: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Complaint".to_string()))?;

        let mut active: complaint::ActiveModel = existing.into();
        active.title = Set(form.title.clone());
        active.description = Set(form.description.clone());
        active.category = Set(form.category.as_str().to_string());
        active.urgency = Set(form.urgency.as_str().to_string());
        active.location = Set(form.location.clone());
        active.updated_at = Set(now);

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update complaint: {}", e)))?;

        super::attachments::insert_rows(&txn, updated.id, attachments, now).await?;

        txn.commit().await?;

        model_to_complaint(updated)
    }

    /// Apply a staff triage update: status transition, assignment, remark,
    /// and optional internal comment, in one transaction.
    ///
    /// The complaint is re-read inside the transaction so the transition
    /// check cannot race a concurrent update.
    pub async fn apply_staff_update(
        &self,
        reference_code: &str,
        new_status: Status,
        assignee_id: Option<Uuid>,
        staff_remark: String,
        comment: Option<(Uuid, String)>,
    ) -> AppResult<StaffUpdateOutcome> {
        let txn = self.connection().begin().await?;
        let now = Utc::now();

        let existing = complaint::Entity::find()
            .filter(complaint::Column::ReferenceCode.eq(reference_code))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get complaint: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Complaint".to_string()))?;

        let previous_status = Status::parse(&existing.status).ok_or_else(|| {
            AppError::Database(format!(
                "complaint {} has unknown status '{}'",
                existing.id, existing.status
            ))
        })?;

        if !previous_status.can_transition_to(new_status) {
            return Err(AppError::validation("status: Invalid status transition."));
        }

        if let Some(assignee) = assignee_id {
            let is_staff = user::Entity::find_by_id(assignee)
                .one(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to get assignee: {}", e)))?
                .map(|u| u.is_staff)
                .unwrap_or(false);
            if !is_staff {
                return Err(AppError::validation(
                    "assignee: Assigned user must be a staff account.",
                ));
            }
        }

        let status_changed = previous_status != new_status;
        let complaint_id = existing.id;

        let mut active: complaint::ActiveModel = existing.into();
        active.status = Set(new_status.as_str().to_string());
        active.assignee_id = Set(assignee_id);
        active.staff_remark = Set(staff_remark);
        if status_changed {
            active.last_status_changed_at = Set(Some(now));
        }
        active.updated_at = Set(now);

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update complaint: {}", e)))?;

        if let Some((author_id, body)) = comment {
            let comment_model = staff_comment::ActiveModel {
                id: Set(Uuid::new_v4()),
                complaint_id: Set(complaint_id),
                author_id: Set(author_id),
                body: Set(body),
                created_at: Set(now),
            };
            comment_model
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to insert comment: {}", e)))?;
        }

        txn.commit().await?;

        Ok(StaffUpdateOutcome {
            complaint: model_to_complaint(updated)?,
            previous_status,
            status_changed,
        })
    }

    /// Delete a complaint row; attachments and comments go with it via FK
    /// cascade. Blob cleanup happens before this is called (the two stores
    /// share no transaction).
    pub async fn delete_complaint(&self, complaint_id: i64) -> AppResult<()> {
        complaint::Entity::delete_by_id(complaint_id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete complaint: {}", e)))?;

        Ok(())
    }
}
