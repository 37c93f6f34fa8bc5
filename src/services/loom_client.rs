use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::constants::{api, embed};
use crate::errors::ApiError;
use crate::services::credentials::TenantCredentials;
use crate::services::logger::Logger;
use crate::services::models::{
    Analytics, Comment, ConnectionStatus, EmbedHtml, Folder, FolderUpdate, NewComment, NewFolder,
    NewRecordLink, OEmbedResult, PaginatedResult, RecordLink, Space, Transcript, User, Video,
    VideoUpdate, WirePage, WireTranscript, Workspace,
};

/// Cursor pagination parameters, serialized as `per_page` / `next_cursor`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    pub per_page: Option<u32>,
    pub next_cursor: Option<String>,
}

impl PageParams {
    fn append_to(&self, query: &mut Vec<(&'static str, String)>) {
        if let Some(per_page) = self.per_page {
            query.push(("per_page", per_page.to_string()));
        }
        if let Some(cursor) = self.next_cursor.as_ref().filter(|c| !c.is_empty()) {
            query.push(("next_cursor", cursor.clone()));
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub autoplay: bool,
}

/// Adapter over the Loom REST API, bound to one tenant's credentials.
///
/// Every operation issues at most one HTTP request. Nothing is cached
/// between calls; the shared `reqwest::Client` only pools connections.
#[derive(Clone)]
pub struct LoomClient {
    logger: Logger,
    http: Client,
    credentials: TenantCredentials,
    base_url: String,
}

impl LoomClient {
    pub fn new(
        logger: &Logger,
        http: Client,
        credentials: TenantCredentials,
        default_base_url: &str,
    ) -> Self {
        let base_url = credentials
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url.trim_end_matches('/').to_string());
        Self {
            logger: logger.child("client"),
            http,
            credentials,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_current_user(&self) -> Result<User, ApiError> {
        self.get(&["me"], Vec::new()).await
    }

    /// Never fails: any error becomes a not-connected status carrying its message.
    pub async fn test_connection(&self) -> ConnectionStatus {
        match self.get_current_user().await {
            Ok(user) => ConnectionStatus {
                connected: true,
                message: format!("Successfully connected to Loom as {}", user.name),
                user: Some(user),
            },
            Err(err) => ConnectionStatus {
                connected: false,
                message: err.to_string(),
                user: None,
            },
        }
    }

    pub async fn list_videos(&self, page: &PageParams) -> Result<PaginatedResult<Video>, ApiError> {
        self.get_page(&["videos"], page, Vec::new()).await
    }

    pub async fn get_video(&self, video_id: &str) -> Result<Video, ApiError> {
        self.get(&["videos", video_id], Vec::new()).await
    }

    pub async fn update_video(
        &self,
        video_id: &str,
        update: &VideoUpdate,
    ) -> Result<Option<Video>, ApiError> {
        self.send(Method::PATCH, &["videos", video_id], Some(update))
            .await
    }

    pub async fn delete_video(&self, video_id: &str) -> Result<(), ApiError> {
        self.discard(Method::DELETE, &["videos", video_id], None::<&()>)
            .await
    }

    pub async fn search_videos(
        &self,
        query: &str,
        page: &PageParams,
    ) -> Result<PaginatedResult<Video>, ApiError> {
        self.get_page(
            &["videos", "search"],
            page,
            vec![("q", query.to_string())],
        )
        .await
    }

    pub async fn duplicate_video(&self, video_id: &str) -> Result<Option<Video>, ApiError> {
        self.send(Method::POST, &["videos", video_id, "duplicate"], None::<&()>)
            .await
    }

    /// A partial update carrying only `folder_id`.
    pub async fn move_video_to_folder(
        &self,
        video_id: &str,
        folder_id: &str,
    ) -> Result<Option<Video>, ApiError> {
        self.update_video(video_id, &VideoUpdate::move_to_folder(folder_id))
            .await
    }

    pub async fn get_transcript(&self, video_id: &str) -> Result<Transcript, ApiError> {
        let wire: WireTranscript = self
            .get(&["videos", video_id, "transcript"], Vec::new())
            .await?;
        Ok(Transcript::from_segments(video_id, wire.segments))
    }

    pub async fn get_video_analytics(&self, video_id: &str) -> Result<Analytics, ApiError> {
        self.get(&["videos", video_id, "analytics"], Vec::new())
            .await
    }

    pub async fn get_embed_html(
        &self,
        video_id: &str,
        options: EmbedOptions,
    ) -> Result<EmbedHtml, ApiError> {
        let video = self.get_video(video_id).await?;
        Ok(render_embed_html(&video, options))
    }

    pub async fn list_comments(
        &self,
        video_id: &str,
        page: &PageParams,
    ) -> Result<PaginatedResult<Comment>, ApiError> {
        self.get_page(&["videos", video_id, "comments"], page, Vec::new())
            .await
    }

    pub async fn create_comment(
        &self,
        video_id: &str,
        comment: &NewComment,
    ) -> Result<Option<Comment>, ApiError> {
        self.send(Method::POST, &["videos", video_id, "comments"], Some(comment))
            .await
    }

    pub async fn list_folders(
        &self,
        page: &PageParams,
        parent_id: Option<&str>,
    ) -> Result<PaginatedResult<Folder>, ApiError> {
        let extra = parent_id
            .map(|id| vec![("parent_id", id.to_string())])
            .unwrap_or_default();
        self.get_page(&["folders"], page, extra).await
    }

    pub async fn get_folder(&self, folder_id: &str) -> Result<Folder, ApiError> {
        self.get(&["folders", folder_id], Vec::new()).await
    }

    pub async fn create_folder(&self, folder: &NewFolder) -> Result<Option<Folder>, ApiError> {
        self.send(Method::POST, &["folders"], Some(folder)).await
    }

    pub async fn update_folder(
        &self,
        folder_id: &str,
        update: &FolderUpdate,
    ) -> Result<Option<Folder>, ApiError> {
        self.send(Method::PATCH, &["folders", folder_id], Some(update))
            .await
    }

    pub async fn delete_folder(&self, folder_id: &str) -> Result<(), ApiError> {
        self.discard(Method::DELETE, &["folders", folder_id], None::<&()>)
            .await
    }

    pub async fn list_workspaces(
        &self,
        page: &PageParams,
    ) -> Result<PaginatedResult<Workspace>, ApiError> {
        self.get_page(&["workspaces"], page, Vec::new()).await
    }

    pub async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, ApiError> {
        self.get(&["workspaces", workspace_id], Vec::new()).await
    }

    pub async fn list_spaces(&self, page: &PageParams) -> Result<PaginatedResult<Space>, ApiError> {
        self.get_page(&["spaces"], page, Vec::new()).await
    }

    pub async fn get_space(&self, space_id: &str) -> Result<Space, ApiError> {
        self.get(&["spaces", space_id], Vec::new()).await
    }

    pub async fn list_space_videos(
        &self,
        space_id: &str,
        page: &PageParams,
    ) -> Result<PaginatedResult<Video>, ApiError> {
        self.get_page(&["spaces", space_id, "videos"], page, Vec::new())
            .await
    }

    pub async fn add_video_to_space(&self, space_id: &str, video_id: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "video_id": video_id });
        self.discard(Method::POST, &["spaces", space_id, "videos"], Some(&body))
            .await
    }

    pub async fn remove_video_from_space(
        &self,
        space_id: &str,
        video_id: &str,
    ) -> Result<(), ApiError> {
        self.discard(
            Method::DELETE,
            &["spaces", space_id, "videos", video_id],
            None::<&()>,
        )
        .await
    }

    pub async fn get_oembed(
        &self,
        video_url: &str,
        max_width: Option<u32>,
        max_height: Option<u32>,
    ) -> Result<OEmbedResult, ApiError> {
        let mut query = vec![("url", video_url.to_string())];
        if let Some(width) = max_width {
            query.push(("maxwidth", width.to_string()));
        }
        if let Some(height) = max_height {
            query.push(("maxheight", height.to_string()));
        }
        self.get(&["oembed"], query).await
    }

    pub async fn create_record_link(
        &self,
        link: &NewRecordLink,
    ) -> Result<Option<RecordLink>, ApiError> {
        self.send(Method::POST, &["record-links"], Some(link)).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Vec<(&'static str, String)>,
    ) -> Result<T, ApiError> {
        let body = self
            .execute(Method::GET, segments, query, None)
            .await?
            .ok_or_else(|| ApiError::Decode {
                message: "empty response body".to_string(),
            })?;
        decode(body)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        page: &PageParams,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<PaginatedResult<T>, ApiError> {
        page.append_to(&mut query);
        let body = self.execute(Method::GET, segments, query, None).await?;
        let wire: WirePage<T> = match body {
            Some(body) => decode(body)?,
            None => WirePage {
                data: Vec::new(),
                next_cursor: None,
            },
        };
        Ok(wire.into())
    }

    async fn send<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = body.map(encode).transpose()?;
        match self.execute(method, segments, Vec::new(), payload).await? {
            Some(body) => decode(body).map(Some),
            None => Ok(None),
        }
    }

    async fn discard<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let payload = body.map(encode).transpose()?;
        self.execute(method, segments, Vec::new(), payload).await?;
        Ok(())
    }

    fn build_headers(&self) -> Result<HeaderMap, ApiError> {
        let token = self.credentials.require_token()?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ApiError::Authentication {
                message: "Access token contains characters not allowed in an HTTP header"
                    .to_string(),
            }
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_url(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|_| ApiError::InvalidRequest {
            message: format!("Invalid Loom API base URL: {}", self.base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidRequest {
                message: "Only http/https base URLs are supported".to_string(),
            });
        }
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest {
                message: format!("Invalid Loom API base URL: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        segments: &[&str],
        query: Vec<(&'static str, String)>,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        // Credentials are checked before anything touches the network.
        let headers = self.build_headers()?;
        let url = self.build_url(segments, &query)?;
        self.logger.debug(
            "request",
            Some(&serde_json::json!({"method": method.as_str(), "path": url.path()})),
        );

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;
        classify_response(status, retry_after.as_deref(), &text)
    }
}

/// Maps an HTTP status (plus `Retry-After` and body) onto the error taxonomy.
/// `Ok(None)` means success without content.
pub(crate) fn classify_response(
    status: StatusCode,
    retry_after: Option<&str>,
    body: &str,
) -> Result<Option<Value>, ApiError> {
    match status.as_u16() {
        429 => Err(ApiError::RateLimit {
            retry_after_secs: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(api::DEFAULT_RETRY_AFTER_SECS),
        }),
        401 | 403 => Err(ApiError::rejected_token()),
        404 => Err(ApiError::not_found()),
        204 => Ok(None),
        code if !status.is_success() => Err(ApiError::Api {
            status: code,
            message: extract_error_message(body)
                .unwrap_or_else(|| format!("API error: {}", code)),
        }),
        _ => {
            if body.trim().is_empty() {
                return Ok(None);
            }
            serde_json::from_str(body)
                .map(Some)
                .map_err(|err| ApiError::Decode {
                    message: err.to_string(),
                })
        }
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| parsed.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|err| ApiError::Decode {
        message: err.to_string(),
    })
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|err| ApiError::InvalidRequest {
        message: format!("Failed to encode request body: {}", err),
    })
}

/// Builds the iframe snippet. Values are interpolated as-is: ids and embed
/// URLs come from the Loom API, not from free text.
pub fn render_embed_html(video: &Video, options: EmbedOptions) -> EmbedHtml {
    let width = options.width.unwrap_or(embed::DEFAULT_WIDTH);
    let height = options.height.unwrap_or(embed::DEFAULT_HEIGHT);
    let autoplay = if options.autoplay { "?autoplay=1" } else { "" };
    let base = video
        .embed_url
        .clone()
        .unwrap_or_else(|| format!("{}{}", api::EMBED_URL_PREFIX, video.id));
    let embed_url = format!("{}{}", base, autoplay);
    let html = format!(
        r#"<iframe src="{}" width="{}" height="{}" frameborder="0" webkitallowfullscreen mozallowfullscreen allowfullscreen></iframe>"#,
        embed_url, width, height
    );
    EmbedHtml {
        html,
        embed_url,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::models::{VideoPrivacy, VideoStatus};

    fn video(embed_url: Option<&str>) -> Video {
        Video {
            id: "abc123".to_string(),
            title: "Demo".to_string(),
            description: None,
            status: VideoStatus::Ready,
            duration: None,
            thumbnail_url: None,
            embed_url: embed_url.map(str::to_string),
            share_url: None,
            download_url: None,
            view_count: 0,
            privacy: VideoPrivacy::Public,
            created_at: String::new(),
            updated_at: String::new(),
            owner: None,
            workspace: None,
            folder_id: None,
        }
    }

    fn client(credentials: TenantCredentials) -> LoomClient {
        LoomClient::new(
            &Logger::new("test"),
            Client::new(),
            credentials,
            "https://api.loom.com/v1/",
        )
    }

    #[test]
    fn rate_limit_uses_retry_after_header_or_sixty() {
        let err = classify_response(StatusCode::TOO_MANY_REQUESTS, Some("30"), "").unwrap_err();
        assert_eq!(err.retry_after_secs(), Some(30));
        let err = classify_response(StatusCode::TOO_MANY_REQUESTS, None, "").unwrap_err();
        assert_eq!(err.retry_after_secs(), Some(60));
        let err = classify_response(
            StatusCode::TOO_MANY_REQUESTS,
            Some("Wed, 21 Oct 2015 07:28:00 GMT"),
            "",
        )
        .unwrap_err();
        assert_eq!(err.retry_after_secs(), Some(60));
    }

    #[test]
    fn auth_statuses_share_one_message() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = classify_response(status, None, r#"{"message":"nope"}"#).unwrap_err();
            assert!(matches!(err, ApiError::Authentication { .. }));
            assert_eq!(
                err.to_string(),
                "Authentication failed. Please check your access token."
            );
        }
    }

    #[test]
    fn not_found_ignores_body() {
        let err =
            classify_response(StatusCode::NOT_FOUND, None, r#"{"message":"gone"}"#).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Resource not found");
    }

    #[test]
    fn generic_errors_prefer_body_message() {
        let err = classify_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            None,
            r#"{"message":"title too long"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "title too long");

        let err =
            classify_response(StatusCode::BAD_REQUEST, None, r#"{"error":"bad cursor"}"#)
                .unwrap_err();
        assert_eq!(err.to_string(), "bad cursor");

        let err = classify_response(StatusCode::BAD_GATEWAY, None, "<html>").unwrap_err();
        assert_eq!(err.to_string(), "API error: 502");
        assert!(matches!(err, ApiError::Api { status: 502, .. }));

        let err = classify_response(StatusCode::INTERNAL_SERVER_ERROR, None, r#"{"code":1}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "API error: 500");
    }

    #[test]
    fn no_content_is_success_without_body() {
        assert_eq!(
            classify_response(StatusCode::NO_CONTENT, None, "").unwrap(),
            None
        );
        assert_eq!(
            classify_response(StatusCode::OK, None, r#"{"id":"1"}"#).unwrap(),
            Some(serde_json::json!({"id": "1"}))
        );
    }

    #[test]
    fn embed_html_falls_back_to_constructed_url() {
        let out = render_embed_html(
            &video(None),
            EmbedOptions {
                width: Some(800),
                height: Some(450),
                autoplay: true,
            },
        );
        assert!(out.html.contains(
            r#"src="https://www.loom.com/embed/abc123?autoplay=1" width="800" height="450""#
        ));
        assert!(out.html.contains("allowfullscreen"));
        assert_eq!(out.embed_url, "https://www.loom.com/embed/abc123?autoplay=1");
    }

    #[test]
    fn embed_html_defaults_size_and_prefers_video_url() {
        let out = render_embed_html(
            &video(Some("https://www.loom.com/embed/custom")),
            EmbedOptions::default(),
        );
        assert_eq!(out.width, 640);
        assert_eq!(out.height, 360);
        assert!(out
            .html
            .contains(r#"src="https://www.loom.com/embed/custom" width="640" height="360""#));
    }

    #[test]
    fn builds_urls_with_escaped_segments_and_wire_params() {
        let client = client(TenantCredentials::new("tok"));
        let mut query = Vec::new();
        PageParams {
            per_page: Some(10),
            next_cursor: Some("c 2".to_string()),
        }
        .append_to(&mut query);
        let url = client
            .build_url(&["videos", "a/b", "comments"], &query)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.loom.com/v1/videos/a%2Fb/comments?per_page=10&next_cursor=c+2"
        );
        let url = client.build_url(&["me"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.loom.com/v1/me");
    }

    #[test]
    fn tenant_base_url_overrides_default() {
        let client = client(
            TenantCredentials::new("tok").with_base_url("http://127.0.0.1:9000/api"),
        );
        assert_eq!(client.base_url(), "http://127.0.0.1:9000/api");
        let client = super::LoomClient::new(
            &Logger::new("test"),
            Client::new(),
            TenantCredentials::new("tok").with_base_url("ftp://files.example"),
            "https://api.loom.com/v1",
        );
        let err = client.build_url(&["me"], &[]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest { .. }));
    }

    #[test]
    fn headers_require_token() {
        let err = client(TenantCredentials::default())
            .build_headers()
            .unwrap_err();
        assert!(matches!(err, ApiError::Authentication { .. }));

        let headers = client(TenantCredentials::new("tok_1")).build_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok_1");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }
}
