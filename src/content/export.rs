//! CSV export of form submissions.

use chrono::NaiveDate;

use crate::db::models::FormSubmission;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv flush failed: {0}")]
    Flush(String),
    #[error("csv output is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

const HEADERS: [&str; 9] = [
    "Name", "Email", "Phone", "Service", "Subject", "Message", "Source", "Status", "Date",
];

pub fn submissions_csv(rows: &[FormSubmission]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(vec![]);

    wtr.write_record(HEADERS)?;

    for row in rows {
        wtr.write_record([
            row.full_name.as_str(),
            row.email.as_str(),
            row.phone.as_deref().unwrap_or_default(),
            row.service_type.as_deref().unwrap_or_default(),
            row.subject.as_deref().unwrap_or_default(),
            row.message.as_deref().unwrap_or_default(),
            row.form_source.as_str(),
            row.status.as_str(),
            &row.created_at.format("%Y-%m-%d").to_string(),
        ])?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(data)?)
}

pub fn export_filename(today: NaiveDate) -> String {
    format!("submissions_{}.csv", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{FormSource, SubmissionStatus};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn submission(message: &str) -> FormSubmission {
        let created = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        FormSubmission {
            id: Uuid::new_v4(),
            full_name: "Otieno Ouma".to_string(),
            email: "otieno@example.com".to_string(),
            phone: Some("0700 000000".to_string()),
            message: Some(message.to_string()),
            subject: None,
            service_type: Some("cabinetry".to_string()),
            preferred_date: None,
            form_source: FormSource::Quote,
            status: SubmissionStatus::Contacted,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_csv_has_header_and_quoted_rows() {
        let csv = submissions_csv(&[submission("Kitchen, \"L\" shape")]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            r#""Name","Email","Phone","Service","Subject","Message","Source","Status","Date""#
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""Otieno Ouma","otieno@example.com","0700 000000","cabinetry","","Kitchen, ""L"" shape","quote","contacted","2026-03-14""#
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_export_filename_uses_date() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(export_filename(day), "submissions_2026-10-18.csv");
    }
}
