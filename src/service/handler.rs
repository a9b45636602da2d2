//! Transport-agnostic request handler
//!
//! Routes:
//! - `/{projectId}/{modId}`: promos and homepage
//! - `/{projectId}/{modId}/references`: promo key to file URL
//! - `/{projectId}/{modId}/expire`: drop both cached answers

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use tracing::{debug, error};

use crate::service::cache::{CachedResponse, ResponseCache};
use crate::service::updates::UpdateService;
use crate::version::aggregator::Feed;
use crate::version::error::UpdateError;
use crate::version::store::VersionStore;
use crate::version::types::Loader;

pub const EXPIRES_AT_HEADER: &str = "MemCache-Expires-At";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub host: String,
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
}

impl Request {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            query: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Parse a request target such as `/123/examplemod?ml=fabric`
    pub fn from_target(host: impl Into<String>, target: &str) -> Self {
        let request = Self::new(host, "");
        match target.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                ..request.with_query(query)
            },
            None => Self {
                path: target.to_string(),
                ..request
            },
        }
    }

    fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    }

    /// Loader named by the host's first label, e.g. `fabric.example.com`
    fn host_loader(&self) -> Option<Loader> {
        let host = self.host.split(':').next()?;
        let (label, rest) = host.split_once('.')?;
        if rest.is_empty() {
            return None;
        }
        label.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Response {
    fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Promos { project: &'a str, mod_id: &'a str },
    References { project: &'a str, mod_id: &'a str },
    Expire { project: &'a str, mod_id: &'a str },
}

impl<'a> Route<'a> {
    fn parse(path: &'a str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        match segments[..] {
            [project, mod_id] => Some(Route::Promos { project, mod_id }),
            [project, mod_id, "references"] => Some(Route::References { project, mod_id }),
            [project, mod_id, "expire"] => Some(Route::Expire { project, mod_id }),
            _ => None,
        }
    }
}

pub struct UpdateHandler<S: VersionStore> {
    service: UpdateService<S>,
    cache: Arc<ResponseCache>,
    default_loader: Loader,
}

impl<S: VersionStore> UpdateHandler<S> {
    pub fn new(service: UpdateService<S>, cache: Arc<ResponseCache>, default_loader: Loader) -> Self {
        Self {
            service,
            cache,
            default_loader,
        }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub async fn handle(&self, request: &Request) -> Response {
        let Some(route) = Route::parse(&request.path) else {
            return Response::empty(404);
        };

        let (project, mod_id, references) = match route {
            Route::Expire { project, mod_id } => {
                self.expire(request, project, mod_id).await;
                return Response::empty(202);
            }
            Route::Promos { project, mod_id } => (project, mod_id, false),
            Route::References { project, mod_id } => (project, mod_id, true),
        };

        let key = cache_key(&request.host, &request.path, request.query.as_deref());
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit for {}", key);
            return self.render(&cached);
        }

        let loader = self.resolve_loader(request);
        let result = match project.parse::<i64>() {
            Ok(project_id) => {
                self.service
                    .get_update_json(project_id, mod_id, &loader)
                    .await
            }
            Err(_) => Err(UpdateError::InvalidProjectId),
        };

        let (status, payload) = match result {
            Ok(feed) if feed.is_empty() => (404, None),
            Ok(feed) => match feed_payload(&feed, references) {
                Ok(payload) => (200, Some(payload)),
                Err(e) => {
                    error!("Failed to encode feed for {}: {}", key, e);
                    (500, Some(json!({"error": e.to_string()})))
                }
            },
            Err(e) if e.is_user_error() => (400, Some(json!({"error": e.to_string()}))),
            Err(e) => {
                error!("Failed to build feed for project {} mod {}: {}", project, mod_id, e);
                (500, Some(json!({"error": e.to_string()})))
            }
        };

        let expire_at = self.cache.put(&key, status, payload.clone()).await;
        let now = Utc::now();
        self.render(&CachedResponse {
            status,
            payload,
            inserted_at: now,
            expire_at,
        })
    }

    async fn expire(&self, request: &Request, project: &str, mod_id: &str) {
        let query = request.query.as_deref();
        for path in [
            format!("/{}/{}", project, mod_id),
            format!("/{}/{}/references", project, mod_id),
        ] {
            self.cache
                .invalidate(&cache_key(&request.host, &path, query))
                .await;
        }
    }

    /// `ml`, then `loader`, then the host subdomain, then the default
    fn resolve_loader(&self, request: &Request) -> String {
        request
            .query_param("ml")
            .or_else(|| request.query_param("loader"))
            .map(|loader| loader.to_lowercase())
            .or_else(|| request.host_loader().map(|l| l.as_str().to_string()))
            .unwrap_or_else(|| self.default_loader.as_str().to_string())
    }

    fn render(&self, cached: &CachedResponse) -> Response {
        let mut response = Response::empty(cached.status);
        response.headers = cache_headers(self.cache.ttl().as_secs(), cached.expire_at, Utc::now());
        if let Some(payload) = &cached.payload {
            response
                .headers
                .push(("Content-Type".to_string(), "application/json".to_string()));
            response.body = Some(payload.to_string());
        }
        response
    }
}

/// Full request identity, compared case-insensitively
pub fn cache_key(host: &str, path: &str, query: Option<&str>) -> String {
    let key = match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{}{}?{}", host, path, query),
        None => format!("{}{}", host, path),
    };
    key.to_lowercase()
}

fn feed_payload(feed: &Feed, references: bool) -> serde_json::Result<serde_json::Value> {
    if references {
        serde_json::to_value(&feed.references)
    } else {
        serde_json::to_value(feed)
    }
}

fn cache_headers(
    ttl_secs: u64,
    expire_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<(String, String)> {
    // Rounded to the nearest second
    let remaining = ((expire_at - now).num_milliseconds().max(0) as u64 + 500) / 1000;
    let age = ttl_secs.saturating_sub(remaining);
    vec![
        (
            "Cache-Control".to_string(),
            format!("max-age={}, public", ttl_secs),
        ),
        ("Age".to_string(), age.to_string()),
        (
            EXPIRES_AT_HEADER.to_string(),
            expire_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
    ]
}
