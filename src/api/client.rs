use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{ApiError, ResourceApi};
use crate::config::ApiConfig;
use crate::model::{
    Comment, CommentPatch, CommentsPage, NewComment, NewPost, Post, PostPatch, PostsPage, Sort,
    Tag, User, UsersPage,
};

/// HTTP implementation of [`ResourceApi`] on top of `reqwest`.
///
/// Stateless apart from the connection pool; cloning shares the pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(
            config.effective_base_url(),
            Duration::from_secs(u64::from(config.timeout_seconds)),
            Duration::from_secs(u64::from(config.connect_timeout_seconds)),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects URLs that cannot carry a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments, query);
        let bytes = self.dispatch(Method::GET, url.clone(), None::<&()>).await?;
        decode(&Method::GET, &url, &bytes)
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments, &[]);
        let bytes = self.dispatch(method.clone(), url.clone(), Some(body)).await?;
        decode(&method, &url, &bytes)
    }

    async fn dispatch<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Vec<u8>, ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let path = describe(&url);
        tracing::debug!(method = %method, path = %path, "Dispatching API request");

        let mut builder = self.client.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| ApiError::Connection {
            method: method.to_string(),
            path: path.clone(),
            source,
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Connection {
                method: method.to_string(),
                path: path.clone(),
                source,
            })?;

        if !status.is_success() {
            let message = error_message(&bytes);
            tracing::warn!(
                method = %method,
                path = %path,
                status = status.as_u16(),
                message = %message,
                "API request rejected"
            );
            return Err(ApiError::Status {
                method: method.to_string(),
                path,
                status: status.as_u16(),
                message,
            });
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ResourceApi for ApiClient {
    async fn posts(&self, limit: u64, skip: u64, sort: Sort) -> Result<PostsPage, ApiError> {
        let mut query = vec![("limit", limit.to_string()), ("skip", skip.to_string())];
        query.extend(sort.query_pairs());
        self.get(&["posts"], &query).await
    }

    async fn search_posts(&self, query: &str, sort: Sort) -> Result<PostsPage, ApiError> {
        let mut params = vec![("q", query.to_string())];
        params.extend(sort.query_pairs());
        self.get(&["posts", "search"], &params).await
    }

    async fn posts_by_tag(&self, tag: &str, sort: Sort) -> Result<PostsPage, ApiError> {
        self.get(&["posts", "tag", tag], &sort.query_pairs()).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.send_json(Method::POST, &["posts", "add"], post).await
    }

    async fn update_post(&self, id: i64, patch: &PostPatch) -> Result<Post, ApiError> {
        let id = id.to_string();
        self.send_json(Method::PUT, &["posts", id.as_str()], patch).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&["posts", id.to_string().as_str()], &[]);
        self.dispatch(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    async fn comments_by_post(&self, post_id: i64) -> Result<CommentsPage, ApiError> {
        let post_id = post_id.to_string();
        self.get(&["comments", "post", post_id.as_str()], &[]).await
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, ApiError> {
        self.send_json(Method::POST, &["comments", "add"], comment).await
    }

    async fn update_comment(&self, id: i64, patch: &CommentPatch) -> Result<Comment, ApiError> {
        let id = id.to_string();
        self.send_json(Method::PUT, &["comments", id.as_str()], patch).await
    }

    async fn delete_comment(&self, id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&["comments", id.to_string().as_str()], &[]);
        self.dispatch(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    async fn users(&self, limit: u64, select: &str) -> Result<UsersPage, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if !select.is_empty() {
            query.push(("select", select.to_string()));
        }
        self.get(&["users"], &query).await
    }

    async fn user(&self, id: i64) -> Result<User, ApiError> {
        self.get(&["users", id.to_string().as_str()], &[]).await
    }

    async fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.get(&["posts", "tags"], &[]).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl {
            url: raw.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(url)
}

fn describe(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn decode<T: DeserializeOwned>(method: &Method, url: &Url, bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|source| ApiError::Decode {
        method: method.to_string(),
        path: describe(url),
        source,
    })
}

/// Extracts `{"message": ...}` from an error body, falling back to raw text.
fn error_message(bytes: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| String::from_utf8_lossy(bytes).trim().to_string())
}
