use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::models::{JobUpdate, NewJobApplication};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: constant pattern
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Every rule a job application form broke, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn for_field(&self, field: &str) -> Option<&'static str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message)
    }

    fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn validate_new_job(job: &NewJobApplication) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_required(&mut errors, "company", Some(&job.company), "Company name is required");
    check_required(&mut errors, "position", Some(&job.position), "Position is required");
    check_required(&mut errors, "location", Some(&job.location), "Location is required");
    check_optionals(
        &mut errors,
        job.salary,
        job.contact_email.as_deref(),
        job.application_url.as_deref(),
    );
    errors.into_result()
}

/// Like [`validate_new_job`], but only for the fields the update sets.
pub fn validate_update(update: &JobUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_required(&mut errors, "company", update.company.as_ref(), "Company name is required");
    check_required(&mut errors, "position", update.position.as_ref(), "Position is required");
    check_required(&mut errors, "location", update.location.as_ref(), "Location is required");
    check_optionals(
        &mut errors,
        update.salary,
        update.contact_email.as_deref(),
        update.application_url.as_deref(),
    );
    errors.into_result()
}

fn check_required(errors: &mut ValidationErrors, field: &'static str, value: Option<&String>, message: &'static str) {
    if value.is_some_and(|v| v.trim().is_empty()) {
        errors.push(field, message);
    }
}

fn check_optionals(errors: &mut ValidationErrors, salary: Option<f64>, email: Option<&str>, url: Option<&str>) {
    if salary.is_some_and(|s| !s.is_finite() || s < 0.0) {
        errors.push("salary", "Salary must be a positive number");
    }

    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        if !EMAIL_RE.is_match(email.trim()) {
            errors.push("contactEmail", "Please enter a valid email address");
        }
    }

    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        let valid = Url::parse(url.trim())
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            errors.push("applicationUrl", "Please enter a valid URL");
        }
    }
}
