use async_trait::async_trait;
use rolewarden_application::{PlatformSession, SessionIdentity};
use rolewarden_core::{AppError, AppResult};
use rolewarden_domain::{CommunityId, MemberSnapshot, PlatformEvent, RoleId, UserId};
use serde::Deserialize;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};
use url::Url;

mod cache;

use cache::SessionCache;

const AUDIT_LOG_REASON: &str = "rolewarden protected role enforcement";

/// Connection settings for the gateway bridge and the platform REST API.
#[derive(Debug, Clone)]
pub struct GatewayBridgeConfig {
    /// Platform REST API base, for example `https://discord.com/api/v10`.
    pub platform_api_base_url: Url,
    /// Bot token sent as `Authorization: Bot <token>`.
    pub bot_token: String,
    /// Base URL of the gateway bridge command endpoint.
    pub bridge_url: Url,
    /// Shared secret for bridge commands.
    pub bridge_secret: String,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    id: String,
    username: String,
}

/// Platform session backed by a gateway bridge sidecar.
///
/// The bridge owns the websocket and forwards decoded dispatch events to
/// [`GatewayBridgeSession::ingest`]; role changes go straight to the REST API.
pub struct GatewayBridgeSession {
    http_client: reqwest::Client,
    config: GatewayBridgeConfig,
    cache: RwLock<SessionCache>,
    events: mpsc::Sender<PlatformEvent>,
}

impl GatewayBridgeSession {
    /// Creates a session forwarding ingested events into `events`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        config: GatewayBridgeConfig,
        events: mpsc::Sender<PlatformEvent>,
    ) -> Self {
        Self {
            http_client,
            config,
            cache: RwLock::new(SessionCache::default()),
            events,
        }
    }

    /// Applies an event to the cache, then hands it to the event feed.
    ///
    /// A community departure is completed with the roster cached for that
    /// community before the cache forgets it.
    pub async fn ingest(&self, mut event: PlatformEvent) -> AppResult<()> {
        {
            let mut cache = self.cache.write().await;
            if let PlatformEvent::CommunityLeft {
                community_id,
                member_ids,
            } = &mut event
            {
                for member in cache.members(community_id) {
                    if !member_ids.contains(&member.user_id) {
                        member_ids.push(member.user_id);
                    }
                }
            }
            cache.apply(&event);
        }
        debug!(
            event = event.as_str(),
            community_id = ?event.community_id(),
            "ingested gateway event"
        );

        self.events
            .send(event)
            .await
            .map_err(|_| AppError::Internal("platform event feed is closed".to_owned()))
    }

    fn api_endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        endpoint(&self.config.platform_api_base_url, segments)
    }

    fn bot_authorization(&self) -> String {
        format!("Bot {}", self.config.bot_token)
    }

    async fn member_role_request(
        &self,
        method: reqwest::Method,
        community_id: &CommunityId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()> {
        let url = self.api_endpoint(&[
            "guilds",
            community_id.as_str(),
            "members",
            user_id.as_str(),
            "roles",
            role_id.as_str(),
        ])?;
        let action = format!(
            "{method} role '{role_id}' for user '{user_id}' in community '{community_id}'"
        );

        let response = self
            .http_client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, self.bot_authorization())
            .header("X-Audit-Log-Reason", AUDIT_LOG_REASON)
            .send()
            .await
            .map_err(|error| AppError::Platform(format!("{action} transport error: {error}")))?;

        ensure_success(response, action.as_str()).await.map(|_| ())
    }
}

#[async_trait]
impl PlatformSession for GatewayBridgeSession {
    async fn connect(&self) -> AppResult<SessionIdentity> {
        let url = self.api_endpoint(&["users", "@me"])?;
        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.bot_authorization())
            .send()
            .await
            .map_err(|error| {
                AppError::Platform(format!("failed to reach platform API: {error}"))
            })?;

        let bot_user = ensure_success(response, "verify bot credentials")
            .await?
            .json::<BotUser>()
            .await
            .map_err(|error| {
                AppError::Platform(format!("invalid bot identity response: {error}"))
            })?;

        let identity = SessionIdentity {
            user_id: UserId::new(bot_user.id)?,
            username: bot_user.username,
        };
        info!(
            user_id = %identity.user_id,
            username = %identity.username,
            "platform session connected"
        );

        Ok(identity)
    }

    async fn disconnect(&self) -> AppResult<()> {
        self.cache.write().await.clear();
        info!("platform session disconnected");
        Ok(())
    }

    async fn request_membership_chunks(
        &self,
        community_id: &CommunityId,
        nonce: &str,
    ) -> AppResult<()> {
        let url = endpoint(&self.config.bridge_url, &["members", "request"])?;
        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.config.bridge_secret.as_str())
            .json(&serde_json::json!({
                "community_id": community_id,
                "nonce": nonce,
            }))
            .send()
            .await
            .map_err(|error| {
                AppError::Platform(format!("failed to reach gateway bridge: {error}"))
            })?;

        ensure_success(
            response,
            format!("request members of community '{community_id}'").as_str(),
        )
        .await
        .map(|_| ())
    }

    async fn revoke_role(
        &self,
        community_id: &CommunityId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()> {
        self.member_role_request(reqwest::Method::DELETE, community_id, user_id, role_id)
            .await
    }

    async fn grant_role(
        &self,
        community_id: &CommunityId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()> {
        self.member_role_request(reqwest::Method::PUT, community_id, user_id, role_id)
            .await
    }

    async fn cached_members(&self, community_id: &CommunityId) -> AppResult<Vec<MemberSnapshot>> {
        Ok(self.cache.read().await.members(community_id))
    }

}

fn endpoint(base: &Url, segments: &[&str]) -> AppResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| AppError::Validation(format!("URL '{base}' cannot be a base")))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

async fn ensure_success(
    response: reqwest::Response,
    action: &str,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
    Err(AppError::Platform(format!(
        "{action} failed with status {status}: {body}"
    )))
}
