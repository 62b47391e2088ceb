use async_std::task;
use rio_core::GalleryError;
use rio_courier::{HttpRemote, RemoteSource};
use std::time::Duration;

const PAYLOAD: &[u8] = b"\x04\x00\x00\x00fake container bytes";
const AGENT: &str = "rio-test/1.0";

/// Starts a small listing server on `port` and returns its base URL.
///
/// Like the GitHub contents API it refuses requests without a User-Agent.
async fn setup_test_server(port: u16) -> String {
    let base_url = format!("http://127.0.0.1:{}", port);
    let listing = serde_json::json!([
        {"name": "a.rio", "download_url": format!("{}/raw/a.rio", base_url), "sha": "1", "size": 24},
        {"name": "drafts", "download_url": null, "sha": "2", "type": "dir"}
    ])
    .to_string();

    let mut app = tide::new();
    app.at("/contents").get(move |req: tide::Request<()>| {
        let listing = listing.clone();
        async move {
            let agent = req
                .header("User-Agent")
                .map(|v| v.last().as_str().to_string())
                .unwrap_or_default();
            if !agent.starts_with("rio-test") {
                return Ok(tide::Response::builder(403).body("user agent required").build());
            }
            Ok(tide::Response::builder(200)
                .content_type(tide::http::mime::JSON)
                .body(listing)
                .build())
        }
    });
    app.at("/raw/a.rio").get(|_| async {
        Ok(tide::Response::builder(200)
            .body(tide::Body::from_bytes(PAYLOAD.to_vec()))
            .build())
    });
    app.at("/moved/a.rio").get(tide::Redirect::new("/raw/a.rio"));
    app.at("/broken").get(|_| async {
        Ok(tide::Response::builder(500).body("upstream exploded").build())
    });
    app.at("/garbage").get(|_| async { Ok("this is not a listing") });

    let addr = format!("127.0.0.1:{}", port);
    task::spawn(async move {
        let _ = app.listen(addr).await;
    });

    for _ in 0..30 {
        task::sleep(Duration::from_millis(100)).await;
        if surf::get(format!("{}/contents", base_url)).await.is_ok() {
            return base_url;
        }
    }
    panic!("Listing server failed to start within timeout");
}

#[async_std::test]
async fn test_list_decodes_wire_format() {
    let base_url = setup_test_server(9411).await;
    let remote = HttpRemote::new(format!("{}/contents", base_url), AGENT);

    let listing = remote.list().await.unwrap();

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].name, "a.rio");
    assert_eq!(listing[0].content_hash, "1");
    assert_eq!(
        listing[0].download_url.as_deref(),
        Some(format!("{}/raw/a.rio", base_url).as_str())
    );
    assert_eq!(listing[1].download_url, None);
}

#[async_std::test]
async fn test_list_failures_are_remote_unavailable() {
    let base_url = setup_test_server(9412).await;

    let anonymous = HttpRemote::new(format!("{}/contents", base_url), "curl/8.0");
    assert!(matches!(
        anonymous.list().await,
        Err(GalleryError::RemoteUnavailable(_))
    ));

    for path in ["/broken", "/garbage", "/nowhere"] {
        let remote = HttpRemote::new(format!("{}{}", base_url, path), AGENT);
        let result = remote.list().await;
        assert!(
            matches!(result, Err(GalleryError::RemoteUnavailable(_))),
            "{}: {:?}",
            path,
            result
        );
    }
}

#[async_std::test]
async fn test_unreachable_host() {
    // Nothing listens here.
    let remote = HttpRemote::new("http://127.0.0.1:9/contents", AGENT);
    assert!(matches!(
        remote.list().await,
        Err(GalleryError::RemoteUnavailable(_))
    ));
}

#[async_std::test]
async fn test_fetch_streams_to_destination() {
    let base_url = setup_test_server(9413).await;
    let remote = HttpRemote::new(format!("{}/contents", base_url), AGENT);
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.rio");

    let written = remote
        .fetch(&format!("{}/raw/a.rio", base_url), &dest)
        .await
        .unwrap();

    assert_eq!(written, PAYLOAD.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
}

#[async_std::test]
async fn test_fetch_follows_relative_redirect() {
    let base_url = setup_test_server(9414).await;
    let remote = HttpRemote::new(format!("{}/contents", base_url), AGENT);
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.rio");

    remote
        .fetch(&format!("{}/moved/a.rio", base_url), &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
}

#[async_std::test]
async fn test_fetch_error_kinds() {
    let base_url = setup_test_server(9415).await;
    let remote = HttpRemote::new(format!("{}/contents", base_url), AGENT);
    let dir = tempfile::tempdir().unwrap();

    let dest = dir.path().join("missing.rio");
    let err = remote
        .fetch(&format!("{}/raw/missing.rio", base_url), &dest)
        .await
        .unwrap_err();
    assert!(matches!(err, GalleryError::RemoteUnavailable(_)), "{err}");
    assert!(!dest.exists());

    let unwritable = dir.path().join("no-such-dir").join("a.rio");
    let err = remote
        .fetch(&format!("{}/raw/a.rio", base_url), &unwritable)
        .await
        .unwrap_err();
    assert!(matches!(err, GalleryError::LocalWriteFailed { .. }), "{err}");
}
