use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{JobApplication, JobStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    CompanyAsc,
    CompanyDesc,
    SalaryHigh,
    SalaryLow,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::CompanyAsc,
        SortKey::CompanyDesc,
        SortKey::SalaryHigh,
        SortKey::SalaryLow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::CompanyAsc => "company-asc",
            SortKey::CompanyDesc => "company-desc",
            SortKey::SalaryHigh => "salary-high",
            SortKey::SalaryLow => "salary-low",
        }
    }

    /// The key after this one, wrapping around.
    pub fn next(&self) -> SortKey {
        let idx = SortKey::ALL.iter().position(|k| k == self).unwrap_or(0);
        SortKey::ALL[(idx + 1) % SortKey::ALL.len()]
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                format!(
                    "unknown sort '{}' (expected newest, oldest, company-asc, company-desc, salary-high or salary-low)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub status: Option<JobStatus>,
    pub search: Option<String>,
    pub sort: SortKey,
}

impl FilterCriteria {
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Partial filter change. `None` keeps the current value; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub status: Option<Option<JobStatus>>,
    pub search: Option<Option<String>>,
    pub sort: Option<SortKey>,
}

impl FilterUpdate {
    pub fn status(status: Option<JobStatus>) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn search(search: Option<String>) -> Self {
        Self {
            search: Some(search),
            ..Default::default()
        }
    }

    pub fn sort(sort: SortKey) -> Self {
        Self {
            sort: Some(sort),
            ..Default::default()
        }
    }

    /// Merge into `current`. A missing sort falls back to [`SortKey::Newest`].
    pub fn merge_into(self, current: &FilterCriteria) -> FilterCriteria {
        FilterCriteria {
            status: self.status.unwrap_or(current.status),
            search: self.search.unwrap_or_else(|| current.search.clone()),
            sort: self.sort.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub applied: usize,
    pub interview: usize,
    pub offer: usize,
    pub rejected: usize,
    pub total: usize,
}

impl JobCounts {
    pub fn get(&self, status: JobStatus) -> usize {
        match status {
            JobStatus::Applied => self.applied,
            JobStatus::Interview => self.interview,
            JobStatus::Offer => self.offer,
            JobStatus::Rejected => self.rejected,
        }
    }
}

/// Records matching the status and search criteria, in input order.
pub fn filter_jobs<'a>(jobs: &'a [JobApplication], criteria: &FilterCriteria) -> Vec<&'a JobApplication> {
    let term = criteria.search_term();
    jobs.iter()
        .filter(|job| criteria.status.is_none_or(|status| job.status == status))
        .filter(|job| match &term {
            Some(term) => {
                job.company.to_lowercase().contains(term.as_str())
                    || job.position.to_lowercase().contains(term.as_str())
            }
            None => true,
        })
        .collect()
}

/// A sorted copy of `jobs`. Equal keys keep their input order.
pub fn sort_jobs<'a>(jobs: &[&'a JobApplication], sort: SortKey) -> Vec<&'a JobApplication> {
    let mut sorted = jobs.to_vec();
    match sort {
        SortKey::Newest => sorted.sort_by(|a, b| b.date_applied.cmp(&a.date_applied)),
        SortKey::Oldest => sorted.sort_by(|a, b| a.date_applied.cmp(&b.date_applied)),
        SortKey::CompanyAsc => sorted.sort_by(|a, b| locale_cmp(&a.company, &b.company)),
        SortKey::CompanyDesc => sorted.sort_by(|a, b| locale_cmp(&b.company, &a.company)),
        SortKey::SalaryHigh => sorted.sort_by(|a, b| {
            let (a, b) = (a.salary.unwrap_or(0.0), b.salary.unwrap_or(0.0));
            b.total_cmp(&a)
        }),
        SortKey::SalaryLow => sorted.sort_by(|a, b| {
            let (a, b) = (a.salary.unwrap_or(f64::MAX), b.salary.unwrap_or(f64::MAX));
            a.total_cmp(&b)
        }),
    }
    sorted
}

pub fn count_jobs<'a>(jobs: impl IntoIterator<Item = &'a JobApplication>) -> JobCounts {
    jobs.into_iter().fold(JobCounts::default(), |mut counts, job| {
        match job.status {
            JobStatus::Applied => counts.applied += 1,
            JobStatus::Interview => counts.interview += 1,
            JobStatus::Offer => counts.offer += 1,
            JobStatus::Rejected => counts.rejected += 1,
        }
        counts.total += 1;
        counts
    })
}

// Case-folded first so "apple" sorts next to "Apple", raw text breaks ties.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
