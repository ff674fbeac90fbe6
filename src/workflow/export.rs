//! Allocation export rendering.
//!
//! Drafts can be downloaded as CSV (one row per line) or as a JSON document
//! carrying the same rows plus summary totals.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{AllocationDraft, AllocationStatus, Department, Period};

/// Supported export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// JSON document.
    Json,
}

impl ExportFormat {
    /// Returns the MIME type for the format.
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    /// Returns the file extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(EngineError::UnsupportedExportFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// A rendered export ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    /// Suggested download file name.
    pub filename: String,
    /// MIME type of `bytes`.
    pub content_type: &'static str,
    /// File contents.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    position: u32,
    department_id: &'a str,
    department_code: &'a str,
    department_name: &'a str,
    category: &'static str,
    priority: &'static str,
    previous_amount: Decimal,
    amount: Decimal,
    change: Decimal,
    notes: &'a str,
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    allocation_id: Option<String>,
    period: Period,
    status: AllocationStatus,
    total_budget: Decimal,
    total_allocated: Decimal,
    remaining: Decimal,
    lines: Vec<ExportRow<'a>>,
}

/// Renders a draft in the requested format.
///
/// Department names and codes are looked up in `departments`; lines for
/// unknown departments are exported with empty name and code.
pub fn render_export(
    draft: &AllocationDraft,
    departments: &[Department],
    format: ExportFormat,
) -> EngineResult<ExportFile> {
    let rows: Vec<ExportRow<'_>> = draft
        .lines
        .iter()
        .map(|line| {
            let department = departments.iter().find(|d| d.id == line.department_id);
            ExportRow {
                position: line.position,
                department_id: &line.department_id,
                department_code: department.map(|d| d.code.as_str()).unwrap_or(""),
                department_name: department.map(|d| d.name.as_str()).unwrap_or(""),
                category: line.category.as_str(),
                priority: line.priority.as_str(),
                previous_amount: line.previous_amount,
                amount: line.amount,
                change: line.change(),
                notes: &line.notes,
            }
        })
        .collect();

    let bytes = match format {
        ExportFormat::Csv => render_csv(&rows)?,
        ExportFormat::Json => {
            let document = ExportDocument {
                allocation_id: draft.id.map(|id| id.to_string()),
                period: draft.period,
                status: draft.status,
                total_budget: draft.total_budget,
                total_allocated: draft.total_allocated(),
                remaining: draft.remaining(),
                lines: rows,
            };
            serde_json::to_vec_pretty(&document).map_err(|e| EngineError::ExportError {
                message: e.to_string(),
            })?
        }
    };

    Ok(ExportFile {
        filename: format!(
            "budget-allocation-{}-{}.{}",
            draft.period.year,
            draft.period.quarter,
            format.extension()
        ),
        content_type: format.content_type(),
        bytes,
    })
}

fn render_csv(rows: &[ExportRow<'_>]) -> EngineResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(|e| EngineError::ExportError {
            message: e.to_string(),
        })?;
    }
    writer.into_inner().map_err(|e| EngineError::ExportError {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AllocationLine, BudgetCategory, DepartmentStatus, Priority, Quarter};
    use uuid::Uuid;

    fn department(id: &str, code: &str, name: &str) -> Department {
        Department {
            id: id.to_string(),
            name: name.to_string(),
            code: code.to_string(),
            head: String::new(),
            current_budget: Decimal::ZERO,
            employee_count: 0,
            status: DepartmentStatus::Active,
        }
    }

    fn sample_draft() -> AllocationDraft {
        let mut draft = AllocationDraft::new(
            Period {
                year: 2026,
                quarter: Quarter::Q4,
            },
            Decimal::new(100_000, 0),
        );
        draft.id = Some(Uuid::nil());
        draft.lines = vec![
            AllocationLine {
                department_id: "dept_eng".to_string(),
                position: 0,
                amount: Decimal::new(60_000, 0),
                category: BudgetCategory::Technology,
                priority: Priority::High,
                notes: "New laptops, cloud".to_string(),
                previous_amount: Decimal::new(50_000, 0),
            },
            AllocationLine {
                department_id: "dept_gone".to_string(),
                position: 1,
                amount: Decimal::new(10_000, 0),
                category: BudgetCategory::Other,
                priority: Priority::Low,
                notes: String::new(),
                previous_amount: Decimal::new(15_000, 0),
            },
        ];
        draft
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(ExportFormat::from_str("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_str("json").unwrap(), ExportFormat::Json);
        match ExportFormat::from_str("xlsx") {
            Err(EngineError::UnsupportedExportFormat { format }) => assert_eq!(format, "xlsx"),
            other => panic!("Expected UnsupportedExportFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_export_has_header_and_rows() {
        let departments = vec![department("dept_eng", "ENG", "Engineering")];
        let file = render_export(&sample_draft(), &departments, ExportFormat::Csv).unwrap();

        assert_eq!(file.filename, "budget-allocation-2026-Q4.csv");
        assert_eq!(file.content_type, "text/csv; charset=utf-8");

        let text = String::from_utf8(file.bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "position,department_id,department_code,department_name,category,priority,previous_amount,amount,change,notes"
        );
        assert_eq!(
            lines[1],
            "0,dept_eng,ENG,Engineering,technology,high,50000,60000,10000,\"New laptops, cloud\""
        );
        assert_eq!(lines[2], "1,dept_gone,,,other,low,15000,10000,-5000,");
    }

    #[test]
    fn test_json_export_includes_totals() {
        let file = render_export(&sample_draft(), &[], ExportFormat::Json).unwrap();
        assert_eq!(file.content_type, "application/json");

        let value: serde_json::Value = serde_json::from_slice(&file.bytes).unwrap();
        assert_eq!(value["total_allocated"], "70000");
        assert_eq!(value["remaining"], "30000");
        assert_eq!(value["status"], "draft");
        assert_eq!(value["lines"].as_array().unwrap().len(), 2);
    }
}
