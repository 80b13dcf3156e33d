//! Supabase (GoTrue) identity provider over REST.
//!
//! Without a URL and anon key the provider runs as a stub: every call fails
//! with [`MISSING_ENV`] and there is never a session.

use super::{token_preview, IdentityProvider, Session, SignUpOutcome, User};
use crate::error::AppError;
use anyhow::Context;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub const MISSING_ENV: &str =
    "Missing Supabase environment variables. Set SUPABASE_URL and SUPABASE_ANON_KEY (see .env.example).";

/// Seconds before expiry at which a stored session is refreshed.
const EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug)]
struct GoTrue {
    http_client: Client,
    base_url: Url,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now + secs));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

pub struct SupabaseAuth {
    gotrue: Option<GoTrue>,
    session_path: Option<PathBuf>,
    sender: watch::Sender<Option<Session>>,
}

impl SupabaseAuth {
    /// Build the provider. Blank or missing credentials give the stub;
    /// a malformed URL is an error.
    pub fn new(
        http_client: Client,
        url: Option<&str>,
        anon_key: Option<&str>,
        session_path: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let url = url.map(str::trim).filter(|u| !u.is_empty());
        let anon_key = anon_key.map(str::trim).filter(|k| !k.is_empty());

        let gotrue = match (url, anon_key) {
            (Some(url), Some(anon_key)) => {
                let base_url = Url::parse(url.trim_end_matches('/'))
                    .with_context(|| format!("Invalid Supabase URL: {}", url))?;
                info!("Identity provider: {} (anon key {})", base_url, token_preview(anon_key));
                Some(GoTrue {
                    http_client,
                    base_url,
                    anon_key: anon_key.to_string(),
                })
            }
            _ => {
                warn!("{}", MISSING_ENV);
                None
            }
        };

        let (sender, _) = watch::channel(None);
        Ok(Self {
            gotrue,
            session_path,
            sender,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.gotrue.is_some()
    }

    fn gotrue(&self) -> Result<&GoTrue, AppError> {
        self.gotrue
            .as_ref()
            .ok_or_else(|| AppError::precondition(MISSING_ENV))
    }

    fn publish(&self, session: Option<Session>) -> Result<(), AppError> {
        if let Some(path) = &self.session_path {
            let written = match &session {
                Some(s) => save_session(path, s),
                None => remove_session(path),
            };
            if let Err(e) = written {
                // The in-memory session still changes; only persistence failed.
                error!("Failed to persist session: {:#}", e);
            }
        }
        self.sender.send_replace(session);
        Ok(())
    }

    async fn refresh(&self, gotrue: &GoTrue, refresh_token: &str) -> Result<Session, AppError> {
        let url = gotrue.endpoint(&["token"], Some("refresh_token"));
        debug!("Refreshing session");
        let body = gotrue
            .send(gotrue.http_client.post(url).json(&json!({ "refresh_token": refresh_token })))
            .await?;
        parse_token(body)
    }
}

impl GoTrue {
    fn endpoint(&self, segments: &[&str], grant_type: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["auth", "v1"]).extend(segments);
        }
        if let Some(grant) = grant_type {
            url.query_pairs_mut().append_pair("grant_type", grant);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, AppError> {
        let response = request
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| {
                error!("Identity provider unreachable: {}", e);
                AppError::Unreachable(format!("Failed to reach identity provider: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("Identity provider returned {}", status.as_u16());
            return Err(provider_error(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| AppError::NetworkOrHttp(format!("Unexpected response from identity provider: {}", e)))
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn parse_token(body: Value) -> Result<Session, AppError> {
    serde_json::from_value::<TokenResponse>(body)
        .map(|t| t.into_session(now()))
        .map_err(|e| AppError::NetworkOrHttp(format!("Unexpected response from identity provider: {}", e)))
}

/// Pull the human message out of a GoTrue error body.
fn provider_error(status: u16, body: &str) -> AppError {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = ["error_description", "msg", "message", "error"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(Value::as_str))
            .find(|m| !m.trim().is_empty());
        if let Some(message) = message {
            return AppError::ServerRejected(message.to_string());
        }
    }
    AppError::from_status(status, body)
}

fn parse_sign_up(body: Value) -> Result<SignUpOutcome, AppError> {
    if body.get("access_token").is_some() {
        let session = parse_token(body)?;
        return Ok(SignUpOutcome {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }
    let user_value = body.get("user").cloned().unwrap_or(body);
    let user = serde_json::from_value::<User>(user_value).ok();
    Ok(SignUpOutcome { user, session: None })
}

pub fn load_session(path: &Path) -> anyhow::Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {:?}", path))?;
    let session = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session file: {:?}", path))?;
    Ok(Some(session))
}

fn save_session(path: &Path, session: &Session) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create session directory: {:?}", parent))?;
    }
    let content = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write session file: {:?}", path))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)
            .with_context(|| format!("Failed to get file metadata: {:?}", path))?
            .permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("Failed to set file permissions: {:?}", path))?;
    }
    Ok(())
}

fn remove_session(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        std::fs::remove_file(path).with_context(|| format!("Failed to remove session file: {:?}", path))?;
    }
    Ok(())
}

impl IdentityProvider for SupabaseAuth {
    async fn get_session(&self) -> Result<Option<Session>, AppError> {
        let Some(gotrue) = self.gotrue.as_ref() else {
            return Ok(None);
        };

        let current = self.sender.borrow().clone();
        let stored = match current {
            Some(session) => Some(session),
            None => match &self.session_path {
                Some(path) => load_session(path).unwrap_or_else(|e| {
                    warn!("Ignoring stored session: {:#}", e);
                    None
                }),
                None => None,
            },
        };
        let Some(session) = stored else {
            return Ok(None);
        };

        if !session.is_expired_at(now() + EXPIRY_MARGIN_SECS) {
            if self.sender.borrow().as_ref() != Some(&session) {
                self.sender.send_replace(Some(session.clone()));
            }
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            info!("Stored session expired");
            self.publish(None)?;
            return Ok(None);
        };
        match self.refresh(gotrue, refresh_token).await {
            Ok(fresh) => {
                info!("Session refreshed for {}", fresh.user.label());
                self.publish(Some(fresh.clone()))?;
                Ok(Some(fresh))
            }
            Err(e) => {
                warn!("Session refresh failed: {}", e);
                self.publish(None)?;
                Ok(None)
            }
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let gotrue = self.gotrue()?;
        let url = gotrue.endpoint(&["token"], Some("password"));
        info!("Signing in {}", email);
        let body = gotrue
            .send(
                gotrue
                    .http_client
                    .post(url)
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        let session = parse_token(body)?;
        debug!("Access token {}", token_preview(&session.access_token));
        self.publish(Some(session.clone()))?;
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AppError> {
        let gotrue = self.gotrue()?;
        let url = gotrue.endpoint(&["signup"], None);
        info!("Signing up {}", email);
        let body = gotrue
            .send(
                gotrue
                    .http_client
                    .post(url)
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        let outcome = parse_sign_up(body)?;
        if let Some(session) = &outcome.session {
            self.publish(Some(session.clone()))?;
        }
        Ok(outcome)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        let gotrue = self.gotrue()?;
        let token = self
            .sender
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone());
        if let Some(token) = token {
            let url = gotrue.endpoint(&["logout"], None);
            if let Err(e) = gotrue.send(gotrue.http_client.post(url).bearer_auth(token)).await {
                // The local session is dropped regardless.
                warn!("Remote sign-out failed: {}", e);
            }
        }
        info!("Signed out");
        self.publish(None)
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "access-token-value".into(),
            refresh_token: Some("refresh".into()),
            expires_at,
            user: User {
                id: "u-1".into(),
                email: Some("driver@example.com".into()),
            },
        }
    }

    #[tokio::test]
    async fn test_stub_reports_missing_env() {
        let auth = SupabaseAuth::new(Client::new(), None, Some("key"), None).unwrap();
        assert!(!auth.is_configured());
        let err = auth.sign_in_with_password("a@b.c", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_ENV);
        assert!(auth.sign_up("a@b.c", "pw").await.is_err());
        assert!(auth.sign_out().await.is_err());
        assert_eq!(auth.get_session().await.unwrap(), None);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(SupabaseAuth::new(Client::new(), Some("::nope"), Some("key"), None).is_err());
    }

    #[test]
    fn test_endpoints() {
        let auth = SupabaseAuth::new(Client::new(), Some("https://abc.supabase.co/"), Some("key"), None).unwrap();
        let gotrue = auth.gotrue().unwrap();
        assert_eq!(
            gotrue.endpoint(&["token"], Some("password")).as_str(),
            "https://abc.supabase.co/auth/v1/token?grant_type=password"
        );
        assert_eq!(
            gotrue.endpoint(&["signup"], None).as_str(),
            "https://abc.supabase.co/auth/v1/signup"
        );
    }

    #[tokio::test]
    async fn test_valid_stored_session_is_loaded_and_broadcast() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let stored = session(Some(now() + 3600));
        save_session(&path, &stored).unwrap();

        let auth = SupabaseAuth::new(
            Client::new(),
            Some("http://127.0.0.1:9"),
            Some("key"),
            Some(path.clone()),
        )
        .unwrap();
        let rx = auth.subscribe();
        assert_eq!(auth.get_session().await.unwrap(), Some(stored.clone()));
        assert_eq!(*rx.borrow(), Some(stored));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_expired_session_without_refresh_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut stored = session(Some(now() - 10));
        stored.refresh_token = None;
        save_session(&path, &stored).unwrap();

        let auth = SupabaseAuth::new(Client::new(), Some("http://127.0.0.1:9"), Some("key"), Some(path.clone())).unwrap();
        assert_eq!(auth.get_session().await.unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_provider_error_prefers_description() {
        let err = provider_error(400, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#);
        assert_eq!(err.to_string(), "Invalid login credentials");
        let err = provider_error(422, r#"{"code":422,"msg":"Password should be at least 6 characters"}"#);
        assert_eq!(err.to_string(), "Password should be at least 6 characters");
        assert_eq!(provider_error(500, "").to_string(), "HTTP 500");
    }

    #[test]
    fn test_sign_up_without_session_returns_user() {
        let outcome = parse_sign_up(json!({ "id": "u-9", "email": "new@example.com", "confirmation_sent_at": "x" })).unwrap();
        assert_eq!(outcome.user.unwrap().id, "u-9");
        assert!(outcome.session.is_none());

        let outcome = parse_sign_up(json!({})).unwrap();
        assert!(outcome.user.is_none());
    }
}
