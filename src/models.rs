use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown status '{}' (expected Applied, Interview, Offer or Rejected)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub company: String,
    pub position: String,
    pub status: JobStatus,
    pub date_applied: NaiveDate,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
}

/// Body of a create request: a job application before the server assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobApplication {
    pub company: String,
    pub position: String,
    pub status: JobStatus,
    pub date_applied: NaiveDate,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
}

impl NewJobApplication {
    pub fn into_job(self, id: impl Into<String>) -> JobApplication {
        JobApplication {
            id: id.into(),
            company: self.company,
            position: self.position,
            status: self.status,
            date_applied: self.date_applied,
            location: self.location,
            salary: self.salary,
            description: self.description,
            notes: self.notes,
            contact_person: self.contact_person,
            contact_email: self.contact_email,
            application_url: self.application_url,
        }
    }
}

/// Partial update. Only the fields that are set go over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_applied: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == JobUpdate::default()
    }
}

impl JobApplication {
    /// Merge a partial update into this record.
    pub fn apply(&mut self, update: &JobUpdate) {
        if let Some(company) = &update.company {
            self.company = company.clone();
        }
        if let Some(position) = &update.position {
            self.position = position.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(date) = update.date_applied {
            self.date_applied = date;
        }
        if let Some(location) = &update.location {
            self.location = location.clone();
        }
        if update.salary.is_some() {
            self.salary = update.salary;
        }
        if update.description.is_some() {
            self.description = update.description.clone();
        }
        if update.notes.is_some() {
            self.notes = update.notes.clone();
        }
        if update.contact_person.is_some() {
            self.contact_person = update.contact_person.clone();
        }
        if update.contact_email.is_some() {
            self.contact_email = update.contact_email.clone();
        }
        if update.application_url.is_some() {
            self.application_url = update.application_url.clone();
        }
    }
}

// json-server style backends hand out numeric ids; keep them as opaque text
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

// --- Display helpers ---

/// `80000` -> `$80K`, `1500` -> `$1.5K`, `950` -> `$950`.
pub fn format_salary(salary: f64) -> String {
    if salary >= 1000.0 {
        let thousands = salary / 1000.0;
        if thousands.fract().abs() < f64::EPSILON {
            format!("${}K", thousands as i64)
        } else {
            format!("${:.1}K", thousands)
        }
    } else {
        format!("${}", salary.round() as i64)
    }
}

/// `2024-01-15` -> `Jan 15, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
