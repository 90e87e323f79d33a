//! OAuth2 implicit-grant consent flow for the calendar provider.
//!
//! This module implements the `echodue_common::auth::ConsentFlow` seam for
//! the real world: it builds the provider's authorization URL
//! (`response_type=token`), opens it in the system browser, and receives
//! the redirect on a loopback HTTP server. The implicit grant returns the
//! access token in the redirect URL *fragment*, which never reaches an HTTP
//! server. The callback page therefore runs a small script that forwards
//! the fragment to a capture endpoint as query parameters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::Query;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use echodue_common::auth::{ConsentError, ConsentFlow, TokenGrant, TokenManagerError};
use echodue_domain::{EchoDueError, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{error, info};
use url::Url;
use uuid::Uuid;

use crate::errors::InfraError;

const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const CALENDAR_EVENTS_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";
const CLIENT_ID_ENV: &str = "GOOGLE_CALENDAR_CLIENT_ID";
const DEFAULT_CONSENT_TIMEOUT_SECS: u64 = 300;

/// Configuration for the calendar OAuth provider.
#[derive(Debug, Clone)]
pub struct CalendarOAuthSettings {
    pub provider: String,
    pub client_id: String,
    pub authorization_endpoint: String,
    pub scopes: Vec<String>,
    pub consent_timeout: Duration,
}

impl CalendarOAuthSettings {
    /// Create Google settings with sensible defaults: the events-only scope
    /// and the standard authorization endpoint.
    pub fn google(client_id: impl Into<String>) -> Self {
        Self {
            provider: "google".to_string(),
            client_id: client_id.into(),
            authorization_endpoint: DEFAULT_AUTHORIZATION_ENDPOINT.to_string(),
            scopes: vec![CALENDAR_EVENTS_SCOPE.to_string()],
            consent_timeout: Duration::from_secs(DEFAULT_CONSENT_TIMEOUT_SECS),
        }
    }

    /// Google settings with the client id taken from the environment.
    ///
    /// # Errors
    /// Returns `Config` when `GOOGLE_CALENDAR_CLIENT_ID` is not set.
    pub fn google_from_env() -> Result<Self> {
        std::env::var(CLIENT_ID_ENV).map(Self::google).map_err(|_| {
            InfraError(EchoDueError::Config(format!("{CLIENT_ID_ENV} not set"))).into()
        })
    }
}

/// Interactive consent through the user's browser.
///
/// One call runs one consent round: loopback server up, browser opened,
/// grant (or denial) captured, server down. Overlap control lives in the
/// token manager, not here.
pub struct ImplicitGrantBrowserFlow {
    settings: CalendarOAuthSettings,
}

impl ImplicitGrantBrowserFlow {
    #[must_use]
    pub fn new(settings: CalendarOAuthSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ConsentFlow for ImplicitGrantBrowserFlow {
    async fn request_access_token(&self) -> std::result::Result<TokenGrant, ConsentError> {
        let server = CallbackServer::start()
            .await
            .map_err(|e| ConsentError::Provider(e.to_string()))?;

        let state = Uuid::new_v4().simple().to_string();
        server.set_expected_state(state.clone());

        let authorize_url =
            build_authorize_url(&self.settings, &server.redirect_uri(), &state)
                .map_err(|e| ConsentError::Provider(e.to_string()))?;

        info!(provider = %self.settings.provider, "opening consent prompt in browser");
        open::that(authorize_url)
            .map_err(|e| ConsentError::Provider(format!("failed to open browser: {e}")))?;

        let outcome = server.wait_for_grant(self.settings.consent_timeout).await;

        if let Err(err) = server.shutdown().await {
            error!(error = %err, "failed to shut down OAuth loopback server");
        }

        outcome
    }
}

/// Build the implicit-grant authorization URL.
fn build_authorize_url(
    settings: &CalendarOAuthSettings,
    redirect_uri: &str,
    state: &str,
) -> Result<String> {
    let mut url = Url::parse(&settings.authorization_endpoint).map_err(|err| {
        InfraError(EchoDueError::Config(format!("invalid authorization endpoint: {err}")))
    })?;

    url.query_pairs_mut()
        .append_pair("client_id", &settings.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "token")
        .append_pair("scope", &settings.scopes.join(" "))
        .append_pair("state", state);

    Ok(url.into())
}

/// Outcome captured from the provider redirect.
#[derive(Debug, Clone)]
enum CapturedOutcome {
    Granted { access_token: String, expires_in: i64 },
    Denied(String),
}

type CapturedSlot = Arc<StdMutex<Option<CapturedOutcome>>>;

/// Loopback HTTP server that receives the OAuth redirect.
struct CallbackServer {
    port: u16,
    captured: CapturedSlot,
    expected_state: Arc<StdMutex<Option<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CallbackServer {
    /// Start the loopback server on an ephemeral port.
    async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await.map_err(|err| {
            InfraError(EchoDueError::Network(format!("failed to bind OAuth loopback server: {err}")))
        })?;

        let port = listener
            .local_addr()
            .map_err(|err| {
                InfraError(EchoDueError::Network(format!("failed to determine port: {err}")))
            })?
            .port();

        let captured: CapturedSlot = Arc::new(StdMutex::new(None));
        let expected_state = Arc::new(StdMutex::new(None));

        let captured_clone = captured.clone();
        let expected_state_clone = expected_state.clone();

        let app = Router::new()
            .route("/callback", get(handle_oauth_callback))
            .route(
                "/capture",
                get(move |query: Query<HashMap<String, String>>| {
                    handle_oauth_capture(query, captured_clone.clone(), expected_state_clone.clone())
                }),
            );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("OAuth callback server error: {}", err);
            }
        });

        Ok(Self {
            port,
            captured,
            expected_state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Redirect URI used in the authorization request.
    fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.port)
    }

    /// Configure the expected OAuth state for CSRF validation.
    fn set_expected_state(&self, state: String) {
        let mut guard = self.expected_state.lock().expect("expected_state poisoned");
        *guard = Some(state);
    }

    /// Await the captured grant with a timeout.
    async fn wait_for_grant(
        &self,
        timeout: Duration,
    ) -> std::result::Result<TokenGrant, ConsentError> {
        let deadline = Instant::now() + timeout;

        loop {
            {
                let guard = self.captured.lock().expect("captured poisoned");
                match guard.clone() {
                    Some(CapturedOutcome::Granted { access_token, expires_in }) => {
                        return Ok(TokenGrant { access_token, expires_in });
                    }
                    Some(CapturedOutcome::Denied(reason)) => {
                        return Err(ConsentError::Declined(reason));
                    }
                    None => {}
                }
            }

            if Instant::now() > deadline {
                return Err(ConsentError::Provider(
                    "timed out waiting for the consent redirect".to_string(),
                ));
            }

            sleep(Duration::from_millis(100)).await;
        }
    }

    /// Shut down the loopback server gracefully.
    async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(InfraError(EchoDueError::Internal(format!(
                        "OAuth callback server panicked: {err}"
                    )))
                    .into());
                }
            }
        }

        Ok(())
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

/// Serve the fragment-forwarding page.
///
/// The token arrives in `location.hash`; this page rewrites it into query
/// parameters for `/capture`, where the server can actually read it.
async fn handle_oauth_callback() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Completing Authorization</title></head>
<body>
<p>Completing authorization&hellip;</p>
<script>
  var fragment = window.location.hash.replace(/^#/, "");
  window.location.replace("/capture?" + fragment);
</script>
</body>
</html>"#,
    )
}

async fn handle_oauth_capture(
    Query(params): Query<HashMap<String, String>>,
    captured: CapturedSlot,
    expected_state: Arc<StdMutex<Option<String>>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        let mut guard = captured.lock().expect("captured poisoned");
        *guard = Some(CapturedOutcome::Denied(error.clone()));

        return Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Authorization Declined</title></head>
<body><h1>Authorization Declined</h1><p>You can close this window.</p></body>
</html>"#,
        );
    }

    let expected = expected_state.lock().expect("expected_state poisoned").clone();
    let access_token = params.get("access_token").cloned();
    let expires_in = params.get("expires_in").and_then(|v| v.parse::<i64>().ok());
    let state = params.get("state").cloned();

    match (access_token, expires_in, state, expected) {
        (Some(access_token), Some(expires_in), Some(state), Some(expected))
            if state == expected =>
        {
            let mut guard = captured.lock().expect("captured poisoned");
            *guard = Some(CapturedOutcome::Granted { access_token, expires_in });

            Html(
                r#"<!DOCTYPE html>
<html>
<head><title>Authorization Complete</title></head>
<body><h1>Authorization Successful</h1><p>You can close this window.</p></body>
</html>"#,
            )
        }
        _ => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Authorization Failed</title></head>
<body><h1>Authorization Failed</h1><p>Invalid or unexpected callback parameters.</p></body>
</html>"#,
        ),
    }
}

/// Map token manager failures into the domain error taxonomy.
///
/// A superseded continuation is reported as a denial: from the caller's
/// perspective its consent cycle ended without a token, and retrying will
/// pick up the cached grant if one landed.
pub fn map_token_manager_error(err: TokenManagerError) -> EchoDueError {
    match err {
        TokenManagerError::Denied(msg) => EchoDueError::AuthDenied(msg),
        TokenManagerError::Superseded => {
            EchoDueError::AuthDenied("token request superseded by a newer sync".to_string())
        }
        TokenManagerError::Store(msg) => EchoDueError::Storage(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_settings_request_the_events_scope_only() {
        let settings = CalendarOAuthSettings::google("client-123");

        assert_eq!(settings.provider, "google");
        assert_eq!(settings.scopes, vec![CALENDAR_EVENTS_SCOPE.to_string()]);
        assert_eq!(settings.authorization_endpoint, DEFAULT_AUTHORIZATION_ENDPOINT);
    }

    #[test]
    fn test_authorize_url_is_an_implicit_grant_request() {
        let settings = CalendarOAuthSettings::google("client-123");
        let url =
            build_authorize_url(&settings, "http://localhost:9999/callback", "state-abc").unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(pairs.get("response_type").map(String::as_str), Some("token"));
        assert_eq!(pairs.get("client_id").map(String::as_str), Some("client-123"));
        assert_eq!(pairs.get("state").map(String::as_str), Some("state-abc"));
        assert_eq!(
            pairs.get("scope").map(String::as_str),
            Some("https://www.googleapis.com/auth/calendar.events")
        );
    }

    #[tokio::test]
    async fn test_capture_endpoint_resolves_a_grant() {
        let server = CallbackServer::start().await.unwrap();
        server.set_expected_state("state-1".to_string());

        let capture_url = format!(
            "http://localhost:{}/capture?access_token=tok-1&expires_in=3599&state=state-1",
            server.port
        );
        reqwest::get(&capture_url).await.unwrap().error_for_status().unwrap();

        let grant = server.wait_for_grant(Duration::from_secs(2)).await.unwrap();
        assert_eq!(grant.access_token, "tok-1");
        assert_eq!(grant.expires_in, 3599);

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_denied_capture_resolves_as_declined() {
        let server = CallbackServer::start().await.unwrap();
        server.set_expected_state("state-1".to_string());

        let capture_url =
            format!("http://localhost:{}/capture?error=access_denied", server.port);
        reqwest::get(&capture_url).await.unwrap().error_for_status().unwrap();

        let outcome = server.wait_for_grant(Duration::from_secs(2)).await;
        assert!(matches!(outcome, Err(ConsentError::Declined(reason)) if reason == "access_denied"));

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_state_mismatch_is_not_captured() {
        let server = CallbackServer::start().await.unwrap();
        server.set_expected_state("state-1".to_string());

        let capture_url = format!(
            "http://localhost:{}/capture?access_token=tok-1&expires_in=3599&state=forged",
            server.port
        );
        reqwest::get(&capture_url).await.unwrap().error_for_status().unwrap();

        let outcome = server.wait_for_grant(Duration::from_millis(300)).await;
        assert!(matches!(outcome, Err(ConsentError::Provider(_))));

        server.shutdown().await.unwrap();
    }
}
