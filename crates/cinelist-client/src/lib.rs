// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use cinelist_app::{CatalogError, CatalogSource, MovieDetail, MovieId, TitleSummary};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    authorization: HeaderValue,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, authorization: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }

        let base_url = Url::parse(&format!("{trimmed}/"))
            .with_context(|| format!("api.base_url {trimmed:?} is not a valid URL"))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            bail!("api.base_url {trimmed:?} must be an http:// or https:// URL");
        }

        let mut authorization = HeaderValue::from_str(authorization)
            .context("authorization credential contains characters not allowed in a header")?;
        authorization.set_sensitive(true);

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            authorization,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn titles_url(&self) -> Result<Url, CatalogError> {
        self.base_url
            .join("movies/titles/")
            .map_err(|error| CatalogError::Transport(format!("build titles URL: {error}")))
    }

    fn detail_url(&self, id: &MovieId) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::Transport("base URL cannot carry a path".to_owned()))?
            .pop_if_empty()
            .push("movies")
            .push(id.as_str());
        Ok(url)
    }

    fn get(&self, url: &Url) -> Result<Response, CatalogError> {
        debug!(%url, "catalog request");
        self.http
            .get(url.clone())
            .header(AUTHORIZATION, self.authorization.clone())
            .send()
            .map_err(|error| connection_error(self.base_url(), error))
    }
}

impl CatalogSource for Client {
    fn list_titles(&self) -> Result<Vec<TitleSummary>, CatalogError> {
        let response = self.get(&self.titles_url()?)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let titles: Vec<TitleSummary> = response
            .json()
            .map_err(|error| CatalogError::Decode(format!("title list: {error}")))?;
        debug!(count = titles.len(), "catalog titles received");
        Ok(titles)
    }

    fn get_detail(&self, id: &MovieId) -> Result<MovieDetail, CatalogError> {
        let response = self.get(&self.detail_url(id)?)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id.clone()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        response
            .json()
            .map_err(|error| CatalogError::Decode(format!("movie {id}: {error}")))
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> CatalogError {
    if error.is_timeout() {
        return CatalogError::Transport(format!("{base_url} timed out ({error})"));
    }
    CatalogError::Transport(format!(
        "cannot reach {base_url} -- check api.base_url and that the service is running ({error})"
    ))
}

fn clean_error_response(status: StatusCode, body: &str) -> CatalogError {
    if let Ok(parsed) = serde_json::from_str::<Value>(body)
        && let Some(message) = ["error", "message", "detail"]
            .iter()
            .find_map(|key| parsed.get(key).and_then(Value::as_str))
        && !message.is_empty()
    {
        return CatalogError::Transport(format!(
            "server error ({}): {}",
            status.as_u16(),
            message
        ));
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return CatalogError::Transport(format!(
            "server error ({}): {}",
            status.as_u16(),
            trimmed
        ));
    }

    CatalogError::Transport(format!("server returned {}", status.as_u16()))
}
