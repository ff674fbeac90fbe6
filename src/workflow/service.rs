//! Allocation submission workflow.
//!
//! [`AllocationService`] is the authoritative side of the allocation
//! lifecycle: it persists drafts, re-validates before every transition and
//! refuses edits to drafts that have left the `draft` status.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::allocation::validate;
use crate::config::ValidationRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{AllocationDraft, AllocationStatus, Department, Period, ValidationResult};

use super::export::{ExportFile, ExportFormat, render_export};
use super::store::AllocationStore;

/// A stored draft together with its current validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDraft {
    /// The draft as stored.
    pub draft: AllocationDraft,
    /// Validation of the stored draft.
    pub validation: ValidationResult,
}

/// Persists drafts and drives them through the approval lifecycle.
#[derive(Debug)]
pub struct AllocationService {
    store: AllocationStore,
    departments: Vec<Department>,
    rules: ValidationRules,
}

impl AllocationService {
    /// Creates a service over an empty store.
    pub fn new(departments: Vec<Department>, rules: ValidationRules) -> Self {
        Self {
            store: AllocationStore::new(),
            departments,
            rules,
        }
    }

    /// Returns the department registry.
    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// Returns the validation rules in force.
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validates a draft with the configured rules.
    pub fn validate(&self, draft: &AllocationDraft) -> ValidationResult {
        validate(draft, &self.rules)
    }

    /// Returns a stored draft by id.
    pub fn get(&self, id: Uuid) -> EngineResult<SavedDraft> {
        let draft = self.store.get(id)?;
        Ok(self.with_validation(draft))
    }

    /// Returns the latest draft for the period containing `today`.
    pub fn current(&self, today: NaiveDate) -> EngineResult<SavedDraft> {
        let period = Period::containing(today);
        self.store
            .latest_for_period(period)
            .map(|draft| self.with_validation(draft))
            .ok_or_else(|| EngineError::NoAllocationForPeriod {
                period: period.to_string(),
            })
    }

    /// Saves a draft, creating it when it has no id.
    ///
    /// Saving is allowed whether or not the draft validates. Updates must
    /// carry the version they were based on.
    ///
    /// # Errors
    ///
    /// - `DepartmentNotFound` if a line names an unknown department
    /// - `AllocationNotFound` if the id does not exist
    /// - `DraftLocked` if the stored draft is no longer editable
    /// - `VersionConflict` if the stored draft changed since it was loaded
    pub fn save_draft(&self, mut draft: AllocationDraft) -> EngineResult<SavedDraft> {
        self.check_departments(&draft)?;
        draft.sort_lines();
        let now = Utc::now();

        let saved = match draft.id {
            None => {
                let id = Uuid::new_v4();
                draft.id = Some(id);
                draft.version = 1;
                draft.status = AllocationStatus::Draft;
                draft.created_at = Some(now);
                draft.updated_at = Some(now);
                self.store.insert(id, draft.clone());
                info!(allocation_id = %id, period = %draft.period, "Allocation draft created");
                draft
            }
            Some(id) => {
                let saved = self.store.update(id, |stored| {
                    if !stored.is_editable() {
                        return Err(EngineError::DraftLocked {
                            status: stored.status,
                        });
                    }
                    if stored.version != draft.version {
                        return Err(EngineError::VersionConflict {
                            expected: draft.version,
                            actual: stored.version,
                        });
                    }
                    stored.period = draft.period;
                    stored.total_budget = draft.total_budget;
                    stored.lines = draft.lines;
                    stored.version += 1;
                    stored.updated_at = Some(now);
                    Ok(())
                })?;
                info!(allocation_id = %id, version = saved.version, "Allocation draft updated");
                saved
            }
        };

        Ok(self.with_validation(saved))
    }

    /// Submits a draft for approval after re-validating it.
    ///
    /// # Errors
    ///
    /// - `AllocationNotFound` if the id does not exist
    /// - `InvalidTransition` if the draft is not in `draft` status
    /// - `SubmissionBlocked` if validation fails or budget is over-allocated
    pub fn submit_for_approval(&self, id: Uuid) -> EngineResult<SavedDraft> {
        let rules = &self.rules;
        let saved = self.store.update(id, |stored| {
            Self::check_transition(stored, AllocationStatus::PendingApproval)?;

            let validation = validate(stored, rules);
            if !validation.allows_submission() {
                warn!(
                    allocation_id = %id,
                    errors = validation.errors.len(),
                    remaining = %validation.remaining,
                    "Submission blocked by validation"
                );
                return Err(EngineError::SubmissionBlocked {
                    validation: Box::new(validation),
                });
            }

            Self::move_to(stored, AllocationStatus::PendingApproval);
            Ok(())
        })?;

        info!(allocation_id = %id, "Allocation submitted for approval");
        Ok(self.with_validation(saved))
    }

    /// Approves a submitted draft.
    pub fn approve(&self, id: Uuid) -> EngineResult<SavedDraft> {
        self.decide(id, AllocationStatus::Approved)
    }

    /// Rejects a submitted draft.
    pub fn reject(&self, id: Uuid) -> EngineResult<SavedDraft> {
        self.decide(id, AllocationStatus::Rejected)
    }

    /// Renders a stored draft for download.
    pub fn export_allocation(&self, id: Uuid, format: ExportFormat) -> EngineResult<ExportFile> {
        let draft = self.store.get(id)?;
        render_export(&draft, &self.departments, format)
    }

    fn decide(&self, id: Uuid, outcome: AllocationStatus) -> EngineResult<SavedDraft> {
        let saved = self.store.update(id, |stored| {
            Self::check_transition(stored, outcome)?;
            Self::move_to(stored, outcome);
            Ok(())
        })?;

        info!(allocation_id = %id, status = %outcome, "Allocation decision recorded");
        Ok(self.with_validation(saved))
    }

    fn check_transition(draft: &AllocationDraft, next: AllocationStatus) -> EngineResult<()> {
        if draft.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                from: draft.status,
                to: next,
            })
        }
    }

    fn move_to(draft: &mut AllocationDraft, next: AllocationStatus) {
        draft.status = next;
        draft.version += 1;
        draft.updated_at = Some(Utc::now());
    }

    fn check_departments(&self, draft: &AllocationDraft) -> EngineResult<()> {
        for line in &draft.lines {
            if !self.departments.iter().any(|d| d.id == line.department_id) {
                return Err(EngineError::DepartmentNotFound {
                    id: line.department_id.clone(),
                });
            }
        }
        Ok(())
    }

    fn with_validation(&self, draft: AllocationDraft) -> SavedDraft {
        let validation = validate(&draft, &self.rules);
        SavedDraft { draft, validation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::models::{DepartmentStatus, Quarter};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn departments() -> Vec<Department> {
        ["eng", "ops"]
            .into_iter()
            .map(|id| Department {
                id: id.to_string(),
                name: id.to_uppercase(),
                code: id.to_uppercase(),
                head: String::new(),
                current_budget: Decimal::ZERO,
                employee_count: 1,
                status: DepartmentStatus::Active,
            })
            .collect()
    }

    fn service() -> AllocationService {
        AllocationService::new(departments(), ValidationRules::default())
    }

    fn period() -> Period {
        Period {
            year: 2026,
            quarter: Quarter::Q4,
        }
    }

    fn draft_with(total: &str, eng: &str, ops: &str) -> AllocationDraft {
        let mut draft = AllocationDraft::for_departments(period(), dec(total), &departments());
        draft.line_mut("eng").unwrap().amount = dec(eng);
        draft.line_mut("ops").unwrap().amount = dec(ops);
        draft
    }

    #[test]
    fn test_create_assigns_id_and_version() {
        let service = service();
        let mut draft = draft_with("1000", "500", "500");
        draft.status = AllocationStatus::Approved;

        let saved = service.save_draft(draft).unwrap();

        assert!(saved.draft.id.is_some());
        assert_eq!(saved.draft.version, 1);
        assert_eq!(saved.draft.status, AllocationStatus::Draft);
        assert!(saved.draft.created_at.is_some());
        assert!(saved.validation.overall_valid);
    }

    /// WF-001: invalid drafts can still be saved
    #[test]
    fn test_invalid_draft_can_be_saved() {
        let service = service();
        let saved = service.save_draft(draft_with("100000", "70000", "50000")).unwrap();

        assert!(!saved.validation.overall_valid);
        assert_eq!(saved.validation.remaining, dec("-20000"));
    }

    #[test]
    fn test_update_bumps_version() {
        let service = service();
        let mut draft = service.save_draft(draft_with("1000", "100", "100")).unwrap().draft;
        draft.line_mut("eng").unwrap().amount = dec("900");

        let saved = service.save_draft(draft).unwrap();
        assert_eq!(saved.draft.version, 2);
        assert_eq!(saved.draft.line("eng").unwrap().amount, dec("900"));
    }

    /// WF-002: stale saves are refused
    #[test]
    fn test_stale_version_conflicts() {
        let service = service();
        let original = service.save_draft(draft_with("1000", "100", "100")).unwrap().draft;

        let mut first = original.clone();
        first.line_mut("eng").unwrap().amount = dec("200");
        service.save_draft(first).unwrap();

        let mut second = original;
        second.line_mut("ops").unwrap().amount = dec("300");
        match service.save_draft(second) {
            Err(EngineError::VersionConflict { expected, actual }) => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected VersionConflict, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_department_line_is_rejected() {
        let service = service();
        let mut draft = draft_with("1000", "100", "100");
        draft.lines[1].department_id = "finance".to_string();

        assert!(matches!(
            service.save_draft(draft),
            Err(EngineError::DepartmentNotFound { .. })
        ));
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let service = service();
        let mut draft = draft_with("1000", "100", "100");
        draft.id = Some(Uuid::new_v4());
        assert!(matches!(
            service.save_draft(draft),
            Err(EngineError::AllocationNotFound { .. })
        ));
    }

    /// WF-003: valid drafts move to pending approval and become locked
    #[test]
    fn test_submit_then_edit_is_locked() {
        let service = service();
        let saved = service.save_draft(draft_with("1000", "600", "400")).unwrap();
        let id = saved.draft.id.unwrap();

        let submitted = service.submit_for_approval(id).unwrap();
        assert_eq!(submitted.draft.status, AllocationStatus::PendingApproval);
        assert_eq!(submitted.draft.version, 2);

        let mut edit = submitted.draft;
        edit.line_mut("eng").unwrap().amount = dec("1");
        match service.save_draft(edit) {
            Err(EngineError::DraftLocked { status }) => {
                assert_eq!(status, AllocationStatus::PendingApproval)
            }
            other => panic!("Expected DraftLocked, got {:?}", other),
        }
    }

    /// WF-004: over-allocated drafts cannot be submitted
    #[test]
    fn test_over_allocated_submit_is_blocked() {
        let service = service();
        let id = service
            .save_draft(draft_with("100000", "70000", "50000"))
            .unwrap()
            .draft
            .id
            .unwrap();

        match service.submit_for_approval(id) {
            Err(EngineError::SubmissionBlocked { validation }) => {
                assert_eq!(validation.remaining, dec("-20000"));
                assert!(!validation.overall_valid);
            }
            other => panic!("Expected SubmissionBlocked, got {:?}", other),
        }
        assert_eq!(service.get(id).unwrap().draft.status, AllocationStatus::Draft);
    }

    #[test]
    fn test_submit_twice_is_invalid_transition() {
        let service = service();
        let id = service
            .save_draft(draft_with("1000", "500", "500"))
            .unwrap()
            .draft
            .id
            .unwrap();
        service.submit_for_approval(id).unwrap();

        assert!(matches!(
            service.submit_for_approval(id),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_approve_and_reject_require_pending() {
        let service = service();
        let id = service
            .save_draft(draft_with("1000", "500", "500"))
            .unwrap()
            .draft
            .id
            .unwrap();

        assert!(matches!(
            service.approve(id),
            Err(EngineError::InvalidTransition { .. })
        ));

        service.submit_for_approval(id).unwrap();
        let approved = service.approve(id).unwrap();
        assert_eq!(approved.draft.status, AllocationStatus::Approved);

        assert!(matches!(
            service.reject(id),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_reject_from_pending() {
        let service = service();
        let id = service
            .save_draft(draft_with("1000", "500", "500"))
            .unwrap()
            .draft
            .id
            .unwrap();
        service.submit_for_approval(id).unwrap();

        let rejected = service.reject(id).unwrap();
        assert_eq!(rejected.draft.status, AllocationStatus::Rejected);
    }

    #[test]
    fn test_current_finds_draft_for_todays_period() {
        let service = service();
        let saved = service.save_draft(draft_with("1000", "0", "0")).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        let current = service.current(today).unwrap();
        assert_eq!(current.draft.id, saved.draft.id);

        let next_year = NaiveDate::from_ymd_opt(2027, 1, 5).unwrap();
        match service.current(next_year) {
            Err(EngineError::NoAllocationForPeriod { period }) => assert_eq!(period, "2027-Q1"),
            other => panic!("Expected NoAllocationForPeriod, got {:?}", other),
        }
    }

    #[test]
    fn test_export_unknown_id_is_not_found() {
        let service = service();
        assert!(matches!(
            service.export_allocation(Uuid::new_v4(), ExportFormat::Csv),
            Err(EngineError::AllocationNotFound { .. })
        ));
    }
}
