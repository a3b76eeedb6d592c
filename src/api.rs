use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::{RepositoryError, Result};
use crate::models::{JobApplication, JobUpdate, NewJobApplication};

/// Remote collection of job applications, keyed by opaque id.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Every job application the service knows about.
    async fn list_jobs(&self) -> Result<Vec<JobApplication>>;
    /// A single job application.
    async fn get_job(&self, id: &str) -> Result<JobApplication>;
    /// Create a job application; the service assigns the id.
    async fn create_job(&self, job: &NewJobApplication) -> Result<JobApplication>;
    /// Apply a partial update and return the stored record.
    async fn update_job(&self, id: &str, updates: &JobUpdate) -> Result<JobApplication>;
    async fn delete_job(&self, id: &str) -> Result<()>;
}

/// [`JobRepository`] over the `/jobs` REST resource.
#[derive(Debug, Clone)]
pub struct HttpJobRepository {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpJobRepository {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RepositoryError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // http(s) only, enforced by config::parse_base_url
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("jobs");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    async fn send(&self, method: Method, url: Url, request: RequestBuilder) -> Result<reqwest::Response> {
        tracing::debug!(%method, %url, "sending request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let err = RepositoryError::from(err);
                tracing::error!(%method, %url, error = %err, "API error");
                return Err(err);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            tracing::error!(%method, %url, status = status.as_u16(), %message, "API error");
            return Err(RepositoryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, method: Method, url: Url, request: RequestBuilder) -> Result<T> {
        let response = self.send(method.clone(), url.clone(), request).await?;
        response.json::<T>().await.map_err(|err| {
            let err = RepositoryError::Decode(err.to_string());
            tracing::error!(%method, %url, error = %err, "API error");
            err
        })
    }
}

#[async_trait]
impl JobRepository for HttpJobRepository {
    async fn list_jobs(&self) -> Result<Vec<JobApplication>> {
        let url = self.endpoint(None);
        let request = self.client.get(url.clone());
        self.send_json(Method::GET, url, request).await
    }

    async fn get_job(&self, id: &str) -> Result<JobApplication> {
        let url = self.endpoint(Some(id));
        let request = self.client.get(url.clone());
        self.send_json(Method::GET, url, request).await
    }

    async fn create_job(&self, job: &NewJobApplication) -> Result<JobApplication> {
        let url = self.endpoint(None);
        let request = self.client.post(url.clone()).json(job);
        self.send_json(Method::POST, url, request).await
    }

    async fn update_job(&self, id: &str, updates: &JobUpdate) -> Result<JobApplication> {
        let url = self.endpoint(Some(id));
        let request = self.client.put(url.clone()).json(updates);
        self.send_json(Method::PUT, url, request).await
    }

    async fn delete_job(&self, id: &str) -> Result<()> {
        let url = self.endpoint(Some(id));
        let request = self.client.delete(url.clone());
        self.send(Method::DELETE, url, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository(base: &str) -> HttpJobRepository {
        HttpJobRepository::new(&ApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn endpoint_appends_jobs_to_root() {
        let repo = repository("http://localhost:3001");
        assert_eq!(repo.endpoint(None).as_str(), "http://localhost:3001/jobs");
        assert_eq!(repo.endpoint(Some("7")).as_str(), "http://localhost:3001/jobs/7");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let repo = repository("https://example.com/api/");
        assert_eq!(repo.endpoint(None).as_str(), "https://example.com/api/jobs");
    }

    #[test]
    fn endpoint_escapes_ids() {
        let repo = repository("http://localhost:3001");
        assert_eq!(
            repo.endpoint(Some("a/b c")).as_str(),
            "http://localhost:3001/jobs/a%2Fb%20c"
        );
    }
}
