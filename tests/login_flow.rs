mod common;

use std::sync::{Arc, Mutex};

use common::{dead_address, MockResponse, MockServer};
use sedr::config::DEFAULT_USER_AGENT;
use sedr::cookies::PersistentCookieJar;
use sedr::net::{HttpDebugger, HttpExchange};
use sedr::{AuthState, ClientConfig, ClientError, CompanionClient, LoginOutcome};
use time::OffsetDateTime;
use url::Url;

fn client_for(base_url: Url) -> CompanionClient {
    let config = ClientConfig::default().with_base_url(base_url);
    CompanionClient::new(&config, Arc::new(PersistentCookieJar::in_memory())).unwrap()
}

/// Client that already went through a successful login and awaits the code.
async fn awaiting_verification(server: &MockServer) -> CompanionClient {
    let mut client = client_for(server.base_url());
    let outcome = client.login("cmdr@example.com", "hunter2").await.unwrap();
    assert_eq!(outcome, LoginOutcome::VerificationRequired);
    client
}

#[tokio::test]
async fn login_stops_at_verification_redirect() {
    let server = MockServer::builder()
        .route(
            "POST",
            "/user/login",
            MockResponse::redirect("/user/confirm")
                .header("Set-Cookie", "CompanionApp=pending; Path=/")
                .header("Set-Cookie", "mid=m1; Path=/"),
        )
        .route("GET", "/user/confirm", MockResponse::html("<form>code</form>"))
        .start()
        .await;

    let mut client = client_for(server.base_url());
    assert!(client.need_login());
    assert_eq!(client.state(), AuthState::Unauthenticated);

    let outcome = client.login("cmdr@example.com", "hunter2").await.unwrap();
    assert_eq!(outcome, LoginOutcome::VerificationRequired);
    assert_eq!(client.state(), AuthState::AwaitingVerification);

    // The confirm page must not have been fetched
    let requests = server.requests();
    assert_eq!(requests.len(), 1, "{requests:?}");
    let login = &requests[0];
    assert_eq!(login.method, "POST");
    assert_eq!(login.path, "/user/login");
    assert_eq!(login.header("user-agent"), Some(DEFAULT_USER_AGENT));
    assert_eq!(login.header("content-type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(login.body, "email=cmdr%40example.com&password=hunter2");

    // Cookies from the signal response were captured
    let names: Vec<_> = client
        .session()
        .cookie_jar()
        .all_cookies()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert!(names.contains(&"CompanionApp".to_string()));
    assert!(names.contains(&"mid".to_string()));
}

#[tokio::test]
async fn verify_confirms_session_and_patches_cookie() {
    let server = MockServer::builder()
        .route(
            "POST",
            "/user/login",
            MockResponse::redirect("/user/confirm").header("Set-Cookie", "mid=m1; Path=/"),
        )
        .route(
            "POST",
            "/user/confirm",
            MockResponse::redirect("/").header("Set-Cookie", "CompanionApp=confirmed; Path=/"),
        )
        .route("GET", "/", MockResponse::html("<h1>welcome</h1>"))
        .start()
        .await;

    let mut client = awaiting_verification(&server).await;
    client.verify("12345").await.unwrap();
    assert_eq!(client.state(), AuthState::Authenticated);

    let requests = server.requests();
    assert_eq!(requests.len(), 2, "{requests:?}");
    let confirm = &requests[1];
    assert_eq!(confirm.method, "POST");
    assert_eq!(confirm.path, "/user/confirm");
    assert_eq!(confirm.body, "code=12345");
    assert!(confirm.header("cookie").is_some_and(|c| c.contains("mid=m1")), "{confirm:?}");

    let session = client
        .session()
        .cookie_jar()
        .all_cookies()
        .into_iter()
        .find(|c| c.name == "CompanionApp")
        .expect("session cookie stored");
    assert_eq!(session.value, "confirmed");
    assert!(session.secure);
    let expires = session.expires.expect("session cookie given an expiry");
    assert!(expires > OffsetDateTime::now_utc() + time::Duration::days(1));
}

#[tokio::test]
async fn trusted_device_skips_verification() {
    let server = MockServer::builder()
        .route(
            "POST",
            "/user/login",
            MockResponse::redirect("/").header("Set-Cookie", "CompanionApp=trusted; Path=/"),
        )
        .start()
        .await;

    let mut client = client_for(server.base_url());
    let outcome = client.login("cmdr@example.com", "hunter2").await.unwrap();
    assert_eq!(outcome, LoginOutcome::Authenticated);
    assert_eq!(client.state(), AuthState::Authenticated);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn rerendered_form_rejects_login() {
    let server = MockServer::builder()
        .route("POST", "/user/login", MockResponse::html("<form>wrong password</form>"))
        .start()
        .await;

    let mut client = client_for(server.base_url());
    let err = client.login("cmdr@example.com", "wrong").await.unwrap_err();
    assert!(
        matches!(err, ClientError::AuthRejected { stage: "Login", status: 200 }),
        "{err:?}"
    );
    assert_eq!(client.state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn ordinary_redirects_are_followed() {
    let server = MockServer::builder()
        .route("POST", "/user/login", MockResponse::new(303).header("Location", "/maintenance"))
        .route("GET", "/maintenance", MockResponse::html("<p>down for maintenance</p>"))
        .start()
        .await;

    let mut client = client_for(server.base_url());
    let err = client.login("cmdr@example.com", "hunter2").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRejected { status: 200, .. }), "{err:?}");

    let paths: Vec<_> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/user/login", "/maintenance"]);
}

#[tokio::test]
async fn server_error_is_a_transport_failure() {
    let server = MockServer::builder()
        .route("POST", "/user/login", MockResponse::new(503))
        .start()
        .await;

    let mut client = client_for(server.base_url());
    let err = client.login("cmdr@example.com", "hunter2").await.unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedStatus { status: 503, .. }), "{err:?}");
    assert!(err.is_transport());
    assert_eq!(client.state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn unreachable_server_leaves_state_unchanged() {
    let mut client = client_for(dead_address().await);
    let err = client.login("cmdr@example.com", "hunter2").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
    assert!(err.is_transport());
    assert_eq!(client.state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn failed_verify_can_be_retried() {
    let server = MockServer::builder()
        .route("POST", "/user/login", MockResponse::redirect("/user/confirm"))
        .route("POST", "/user/confirm", MockResponse::new(500))
        .start()
        .await;

    let mut client = awaiting_verification(&server).await;
    let err = client.verify("12345").await.unwrap_err();
    assert!(err.is_transport(), "{err:?}");
    assert_eq!(client.state(), AuthState::AwaitingVerification);
}

#[tokio::test]
async fn verify_bounced_back_to_login_is_unexpected() {
    let server = MockServer::builder()
        .route("POST", "/user/login", MockResponse::redirect("/user/confirm"))
        .route("POST", "/user/confirm", MockResponse::redirect("/user/login"))
        .route("GET", "/user/login", MockResponse::redirect("/user/confirm"))
        .start()
        .await;

    let mut client = awaiting_verification(&server).await;
    let err = client.verify("00000").await.unwrap_err();
    assert!(
        matches!(err, ClientError::UnexpectedRedirect { stage: "Verify", .. }),
        "{err:?}"
    );
    assert_eq!(client.state(), AuthState::AwaitingVerification);
}

#[tokio::test]
async fn interactive_code_is_trimmed() {
    let server = MockServer::builder()
        .route("POST", "/user/login", MockResponse::redirect("/user/confirm"))
        .route("POST", "/user/confirm", MockResponse::redirect("/"))
        .start()
        .await;

    let mut client = awaiting_verification(&server).await;
    client
        .verify_interactive(|| Ok(" 54321\n".to_string()))
        .await
        .unwrap();
    assert_eq!(client.state(), AuthState::Authenticated);
    assert_eq!(server.requests()[1].body, "code=54321");
}

#[tokio::test]
async fn prompt_failure_is_an_input_error() {
    let server = MockServer::builder()
        .route("POST", "/user/login", MockResponse::redirect("/user/confirm"))
        .start()
        .await;

    let mut client = awaiting_verification(&server).await;
    let err = client
        .verify_interactive(|| Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stdin closed")))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Input(_)), "{err:?}");
    assert_eq!(client.state(), AuthState::AwaitingVerification);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn debugger_sees_every_exchange() {
    let server = MockServer::builder()
        .route("POST", "/user/login", MockResponse::redirect("/user/confirm"))
        .start()
        .await;

    let seen: Arc<Mutex<Vec<(String, u16, Option<String>)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let debugger: HttpDebugger = Arc::new(move |exchange: &HttpExchange<'_>| {
        sink.lock().unwrap().push((
            exchange.what.to_string(),
            exchange.status,
            exchange
                .request_headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        ));
    });

    let mut client = client_for(server.base_url()).with_debugger(debugger);
    client.login("cmdr@example.com", "hunter2").await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "Login");
    assert_eq!(seen[0].1, 302);
    assert_eq!(seen[0].2.as_deref(), Some(DEFAULT_USER_AGENT));
}

#[tokio::test]
async fn saved_session_skips_login_next_time() {
    let server = MockServer::builder()
        .route("POST", "/user/login", MockResponse::redirect("/user/confirm"))
        .route(
            "POST",
            "/user/confirm",
            MockResponse::redirect("/").header("Set-Cookie", "CompanionApp=confirmed; Path=/"),
        )
        .start()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cookie_file = dir.path().join(".sedr-cookies");
    let config = ClientConfig::default()
        .with_base_url(server.base_url())
        .with_cookie_file(&cookie_file);

    let jar = PersistentCookieJar::open_file(&config.cookie_file).unwrap();
    let mut client = CompanionClient::new(&config, Arc::new(jar)).unwrap();
    client.login("cmdr@example.com", "hunter2").await.unwrap();
    client.verify("12345").await.unwrap();
    client.save_session().unwrap();
    assert!(cookie_file.exists());

    // The patched cookie is secure-only, so the next run looks at the https origin
    let mut https_base = server.base_url();
    https_base.set_scheme("https").unwrap();
    let config = config.with_base_url(https_base);
    let jar = PersistentCookieJar::open_file(&config.cookie_file).unwrap();
    let client = CompanionClient::new(&config, Arc::new(jar)).unwrap();
    assert!(!client.need_login());
    assert_eq!(client.state(), AuthState::Authenticated);
}

#[tokio::test]
async fn nothing_is_written_before_save() {
    let server = MockServer::builder()
        .route(
            "POST",
            "/user/login",
            MockResponse::redirect("/").header("Set-Cookie", "CompanionApp=trusted; Path=/"),
        )
        .start()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cookie_file = dir.path().join(".sedr-cookies");
    let config = ClientConfig::default()
        .with_base_url(server.base_url())
        .with_cookie_file(&cookie_file);
    let jar = PersistentCookieJar::open_file(&config.cookie_file).unwrap();
    let mut client = CompanionClient::new(&config, Arc::new(jar)).unwrap();

    client.login("cmdr@example.com", "hunter2").await.unwrap();
    assert!(!cookie_file.exists());

    client.save_session().unwrap();
    assert!(cookie_file.exists());
}
