//! Document Builder: turns a job posting into the text that gets embedded.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::JobRecord;

pub const DEFAULT_TITLE: &str = "No Title";
pub const DEFAULT_COMPANY: &str = "Unknown Company";

/// A job posting ready for the embedding index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: Uuid,
    pub text: String,
    /// The source record, kept so results can be traced back to the provider.
    pub metadata: JobRecord,
}

/// Builds the indexed form of `job`. Never fails; missing fields fall back to
/// the documented defaults. Each call mints a fresh id.
///
/// The location line is always written, even with empty parts, so the
/// geography weighs into the embedding for every posting.
pub fn build_document(job: JobRecord) -> IndexedDocument {
    let title = job.job_title.as_deref().unwrap_or(DEFAULT_TITLE);
    let company = job.employer_name.as_deref().unwrap_or(DEFAULT_COMPANY);
    let city = job.job_city.as_deref().unwrap_or_default();
    let state = job.job_state.as_deref().unwrap_or_default();
    let country = job.job_country.as_deref().unwrap_or_default();
    let description = job.job_description.as_deref().unwrap_or_default();

    let text = format!(
        "Job Title: {title}\n\
         Company: {company}\n\
         Location: {city}, {state}, {country}\n\
         Description: {description}"
    );

    IndexedDocument {
        id: Uuid::new_v4(),
        text,
        metadata: job,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme_job() -> JobRecord {
        JobRecord {
            job_title: Some("Backend Engineer".to_string()),
            employer_name: Some("Acme".to_string()),
            job_city: Some("Austin".to_string()),
            job_state: Some("TX".to_string()),
            job_country: Some("US".to_string()),
            job_description: Some("Build APIs with strong concurrency skills".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_record_layout() {
        let doc = build_document(acme_job());
        assert_eq!(
            doc.text,
            "Job Title: Backend Engineer\n\
             Company: Acme\n\
             Location: Austin, TX, US\n\
             Description: Build APIs with strong concurrency skills"
        );
        assert_eq!(doc.metadata, acme_job());
    }

    #[test]
    fn test_empty_record_uses_defaults() {
        let doc = build_document(JobRecord::default());
        let lines: Vec<&str> = doc.text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Job Title: No Title");
        assert_eq!(lines[1], "Company: Unknown Company");
        assert_eq!(lines[2], "Location: , , ");
        assert_eq!(lines[3], "Description: ");
    }

    #[test]
    fn test_partial_record_keeps_location_line() {
        let job = JobRecord {
            job_title: Some("Data Analyst".to_string()),
            job_country: Some("DE".to_string()),
            ..Default::default()
        };
        let doc = build_document(job);
        assert!(doc.text.contains("Job Title: Data Analyst\n"));
        assert!(doc.text.contains("Company: Unknown Company\n"));
        assert!(doc.text.contains("Location: , , DE\n"));
        assert!(doc.text.ends_with("Description: "));
    }

    #[test]
    fn test_same_record_gets_distinct_ids() {
        let first = build_document(acme_job());
        let second = build_document(acme_job());
        assert_ne!(first.id, second.id);
        assert_eq!(first.text, second.text);
    }

    #[test]
    fn test_extra_fields_stay_in_metadata() {
        let mut job = acme_job();
        job.extra.insert(
            "job_apply_link".to_string(),
            serde_json::json!("https://acme.example/apply"),
        );
        let doc = build_document(job);
        assert_eq!(
            doc.metadata.extra.get("job_apply_link"),
            Some(&serde_json::json!("https://acme.example/apply"))
        );
        assert!(!doc.text.contains("acme.example"));
    }
}
