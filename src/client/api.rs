use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{ClientError, ErrorBody};
use super::interceptor::AuthInterceptor;
use super::store::CredentialStore;
use crate::config::ClientConfig;

/// Whether a call needs a stored token before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Required,
    Public,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    interceptor: AuthInterceptor,
}

impl ApiClient {
    pub fn new(base_url: &str, interceptor: AuthInterceptor) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Self::with_http(http, base_url, interceptor)
    }

    pub fn from_config(config: &ClientConfig, interceptor: AuthInterceptor) -> Result<Self, ClientError> {
        Self::new(&config.api_base_url, interceptor)
    }

    pub fn with_http(
        http: reqwest::Client,
        base_url: &str,
        mut interceptor: AuthInterceptor,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::Invalid(format!("invalid API base URL {base_url}: {e}")))?;
        interceptor.track_origin(&base_url);

        Ok(Self {
            http,
            base_url,
            interceptor,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn interceptor(&self) -> &AuthInterceptor {
        &self.interceptor
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.interceptor.store().as_ref()
    }

    /// `path` is relative to the base URL and starts with `/`.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| ClientError::Invalid(format!("invalid path {path}: {e}")))
    }

    fn request(&self, method: Method, url: Url, auth: AuthMode) -> Result<RequestBuilder, ClientError> {
        if auth == AuthMode::Required && self.store().token().is_none() {
            return Err(ClientError::MissingToken);
        }
        Ok(self.interceptor.prepare(self.http.request(method, url)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        self.execute(self.request(Method::GET, url, AuthMode::Required)?).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        self.execute(self.request(Method::GET, url, AuthMode::Required)?).await
    }

    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        auth: AuthMode,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.execute(self.request(method, url, auth)?.json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        self.execute(self.request(Method::DELETE, url, AuthMode::Required)?).await
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();

        if self.interceptor.inspect(status, &url) {
            let body = read_error(response).await;
            return Err(ClientError::SessionExpired(body.error));
        }

        if !status.is_success() {
            let body = read_error(response).await;
            return Err(ClientError::Api {
                status,
                error: body.error,
                details: body.details,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

async fn read_error(response: reqwest::Response) -> ErrorBody {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body,
        Err(_) => ErrorBody {
            error: status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            details: None,
        },
    }
}
