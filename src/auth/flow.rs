//! Installed-application OAuth flow with a loopback redirect listener.

use super::credentials::ClientSecrets;
use super::token::{AuthorizedUser, TokenResponse};
use crate::error::{Error, Result};
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info};
use url::Url;

const SUCCESS_PAGE: &str =
    "The authentication flow has completed. You may close this window.";

pub struct InstalledAppFlow<'a> {
    secrets: &'a ClientSecrets,
    scopes: &'a [&'a str],
}

impl<'a> InstalledAppFlow<'a> {
    pub fn new(secrets: &'a ClientSecrets, scopes: &'a [&'a str]) -> Self {
        Self { secrets, scopes }
    }

    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
        let mut url = Url::parse(&self.secrets.auth_uri)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.secrets.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }

    /// Print the consent URL, wait for the browser redirect on a loopback
    /// port chosen by the OS, and exchange the returned code.
    pub async fn run_local_server(&self, client: &Client) -> Result<AuthorizedUser> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://localhost:{port}/");
        let state = uuid::Uuid::new_v4().simple().to_string();

        let auth_url = self.authorization_url(&redirect_uri, &state)?;
        info!("Waiting for OAuth consent on port {}", port);
        println!("Please visit this URL to authorize this application:\n{auth_url}");

        let code = receive_code(listener, &state).await?;
        self.exchange_code(client, &code, &redirect_uri).await
    }

    pub async fn exchange_code(
        &self,
        client: &Client,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AuthorizedUser> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
        ];
        let response = post_token_request(client, &self.secrets.token_uri, &params).await?;
        Ok(AuthorizedUser::from_response(
            self.secrets,
            self.scopes,
            response,
            Utc::now(),
        ))
    }
}

/// POST a form to the token endpoint and decode the token response.
pub(crate) async fn post_token_request(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = client.post(token_uri).form(params).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Auth(format!(
            "Token endpoint returned {status}: {}",
            oauth_error_message(&body)
        )));
    }
    Ok(response.json().await?)
}

fn oauth_error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct OAuthError {
        error: String,
        error_description: Option<String>,
    }

    match serde_json::from_str::<OAuthError>(body) {
        Ok(err) => match err.error_description {
            Some(desc) => format!("{}: {desc}", err.error),
            None => err.error,
        },
        Err(_) => body.to_string(),
    }
}

#[derive(Clone)]
struct RedirectState {
    expected_state: Arc<str>,
    sender: Arc<Mutex<Option<oneshot::Sender<Result<String>>>>>,
}

/// Serve `GET /` on `listener` until a request carries the OAuth redirect,
/// then stop accepting connections. Other paths get axum's 404.
pub(crate) async fn receive_code(listener: TcpListener, state: &str) -> Result<String> {
    let (code_tx, code_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new()
        .route("/", get(handle_redirect))
        .with_state(RedirectState {
            expected_state: Arc::from(state),
            sender: Arc::new(Mutex::new(Some(code_tx))),
        });

    tokio::spawn(async move {
        let shutdown = async {
            shutdown_rx.await.ok();
        };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            debug!("Redirect listener stopped: {}", e);
        }
    });

    let outcome = code_rx.await.map_err(|_| {
        Error::Auth("Redirect listener stopped before a code was received".to_string())
    })?;
    shutdown_tx.send(()).ok();
    outcome
}

async fn handle_redirect(State(redirect): State<RedirectState>, uri: Uri) -> (StatusCode, String) {
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
    debug!("Redirect request: {}", uri.path());

    let (reply, outcome) = match parse_redirect(target, &redirect.expected_state) {
        Ok(Some(code)) => ((StatusCode::OK, SUCCESS_PAGE.to_string()), Ok(code)),
        Ok(None) => return (StatusCode::NOT_FOUND, "Not found".to_string()),
        Err(e) => ((StatusCode::BAD_REQUEST, e.to_string()), Err(e)),
    };

    // Only the first redirect counts.
    if let Some(sender) = redirect.sender.lock().await.take() {
        sender.send(outcome).ok();
    }
    reply
}

/// Extract the authorization code from a redirect request target.
///
/// Returns `Ok(None)` for requests that are not an OAuth redirect.
pub(crate) fn parse_redirect(target: &str, expected_state: &str) -> Result<Option<String>> {
    let url = Url::parse("http://localhost")?.join(target)?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(Error::Auth(format!("Authorization was denied: {error}")));
    }
    let Some(code) = code else {
        return Ok(None);
    };
    if state.as_deref() != Some(expected_state) {
        return Err(Error::Auth(
            "OAuth state mismatch in redirect; possible CSRF".to_string(),
        ));
    }
    Ok(Some(code))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::http::header;
    use axum::routing::post;
    use std::collections::HashMap;
    use std::time::Duration;

    pub(crate) type RecordedForms = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Local token endpoint answering every POST to `/token` with `status`
    /// and `body`. Returns its URI and the form fields it received.
    pub(crate) async fn token_endpoint(status: StatusCode, body: &'static str) -> (String, RecordedForms) {
        let forms: RecordedForms = Arc::new(Mutex::new(Vec::new()));
        let recorded = forms.clone();
        let app = Router::new().route(
            "/token",
            post(move |Form(form): Form<HashMap<String, String>>| {
                let recorded = recorded.clone();
                async move {
                    recorded.lock().await.push(form);
                    (status, [(header::CONTENT_TYPE, "application/json")], body)
                }
            }),
        );

        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let uri = format!("http://{}/token", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (uri, forms)
    }

    pub(crate) fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }


    fn secrets() -> ClientSecrets {
        ClientSecrets::from_json(r#"{"installed": {"client_id": "cid", "client_secret": "cs"}}"#)
            .unwrap()
    }

    #[test]
    fn test_authorization_url() {
        let secrets = secrets();
        let scopes = ["scope-a", "scope-b"];
        let flow = InstalledAppFlow::new(&secrets, &scopes);
        let url = flow
            .authorization_url("http://localhost:8080/", "xyz")
            .unwrap();

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(pairs["client_id"], "cid");
        assert_eq!(pairs["redirect_uri"], "http://localhost:8080/");
        assert_eq!(pairs["scope"], "scope-a scope-b");
        assert_eq!(pairs["state"], "xyz");
        assert_eq!(pairs["access_type"], "offline");
    }

    #[test]
    fn test_parse_redirect_with_code() {
        let code = parse_redirect("/?state=abc&code=4%2F0Ab&scope=x", "abc").unwrap();
        assert_eq!(code.as_deref(), Some("4/0Ab"));
    }

    #[test]
    fn test_parse_redirect_ignores_other_paths() {
        assert_eq!(parse_redirect("/favicon.ico", "abc").unwrap(), None);
    }

    #[test]
    fn test_parse_redirect_state_mismatch() {
        let err = parse_redirect("/?state=evil&code=c", "abc").unwrap_err();
        assert!(err.to_string().contains("state mismatch"));
    }

    #[test]
    fn test_parse_redirect_access_denied() {
        let err = parse_redirect("/?error=access_denied&state=abc", "abc").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn test_oauth_error_message() {
        let body = r#"{"error": "invalid_grant", "error_description": "Bad Request"}"#;
        assert_eq!(oauth_error_message(body), "invalid_grant: Bad Request");
        assert_eq!(oauth_error_message("plain"), "plain");
    }

    #[tokio::test]
    async fn test_receive_code_with_idle_connection_open() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let waiting = tokio::spawn(async move { receive_code(listener, "s1").await });

        // Browsers open speculative connections that never send a request.
        let _idle = tokio::net::TcpStream::connect(addr).await.unwrap();

        let http = local_client();
        let favicon = http
            .get(format!("http://{addr}/favicon.ico"))
            .send()
            .await
            .unwrap();
        assert_eq!(favicon.status(), StatusCode::NOT_FOUND);

        let reply = http
            .get(format!("http://{addr}/?state=s1&code=the-code"))
            .send()
            .await
            .unwrap();
        assert_eq!(reply.status(), StatusCode::OK);
        assert!(reply.text().await.unwrap().contains("You may close this window"));

        let code = tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .expect("redirect was not received")
            .unwrap()
            .unwrap();
        assert_eq!(code, "the-code");
    }

    #[tokio::test]
    async fn test_receive_code_rejects_wrong_state() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let waiting = tokio::spawn(async move { receive_code(listener, "s1").await });

        let reply = local_client()
            .get(format!("http://{addr}/?state=forged&code=c"))
            .send()
            .await
            .unwrap();
        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);

        let err = tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .unwrap()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, Error::Auth(msg) if msg.contains("state mismatch")));
    }

    #[tokio::test]
    async fn test_exchange_code_posts_authorization_code() {
        let (token_uri, forms) = token_endpoint(
            StatusCode::OK,
            r#"{"access_token": "at-1", "expires_in": 3599, "refresh_token": "rt-1", "token_type": "Bearer"}"#,
        )
        .await;
        let mut secrets = secrets();
        secrets.token_uri = token_uri.clone();
        let scopes = ["scope-a"];

        let user = InstalledAppFlow::new(&secrets, &scopes)
            .exchange_code(&local_client(), "the-code", "http://localhost:4321/")
            .await
            .unwrap();

        assert_eq!(user.access_token().unwrap(), "at-1");
        assert_eq!(user.refresh_token.as_deref(), Some("rt-1"));
        assert_eq!(user.token_uri, token_uri);
        assert_eq!(user.scopes, vec!["scope-a"]);

        let forms = forms.lock().await;
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0]["grant_type"], "authorization_code");
        assert_eq!(forms[0]["code"], "the-code");
        assert_eq!(forms[0]["client_id"], "cid");
        assert_eq!(forms[0]["client_secret"], "cs");
        assert_eq!(forms[0]["redirect_uri"], "http://localhost:4321/");
    }
}
