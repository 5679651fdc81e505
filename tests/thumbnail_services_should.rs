use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use ytproxy::server::error::Error;
use ytproxy::server::services::{
    ThumbnailService, upstream_services::MockUpstreamServiceTrait,
};

// records every probed url and answers 200 only for the listed filenames
fn upstream_with(ok: &'static [&'static str], probed: Arc<Mutex<Vec<String>>>) -> MockUpstreamServiceTrait {
    let mut upstream = MockUpstreamServiceTrait::new();
    upstream.expect_fetch().never();
    upstream.expect_head_status().returning(move |url: &str| {
        probed.lock().unwrap().push(url.to_string());
        if ok.iter().any(|name| url.ends_with(name)) {
            Ok(StatusCode::OK)
        } else {
            Ok(StatusCode::NOT_FOUND)
        }
    });
    upstream
}

#[tokio::test]
async fn test_first_existing_candidate_wins() {
    let probed = Arc::new(Mutex::new(Vec::new()));
    let service = ThumbnailService::new(Arc::new(upstream_with(
        &["sddefault.jpg", "hqdefault.jpg"],
        probed.clone(),
    )));

    let best = service.best_thumbnail("/vi/ID/maxres.jpg").await;

    assert_eq!(best, "/vi/ID/sddefault.jpg");
    assert_eq!(
        *probed.lock().unwrap(),
        vec![
            "https://i.ytimg.com/vi/ID/maxresdefault.jpg".to_string(),
            "https://i.ytimg.com/vi/ID/sddefault.jpg".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_maxres_is_used_when_it_exists() {
    let probed = Arc::new(Mutex::new(Vec::new()));
    let service = ThumbnailService::new(Arc::new(upstream_with(
        &["maxresdefault.jpg"],
        probed.clone(),
    )));

    assert_eq!(
        service.best_thumbnail("/vi/ID/maxres.jpg").await,
        "/vi/ID/maxresdefault.jpg"
    );
    assert_eq!(probed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_falls_back_to_mq_when_nothing_answers() {
    let probed = Arc::new(Mutex::new(Vec::new()));
    let service = ThumbnailService::new(Arc::new(upstream_with(&[], probed.clone())));

    assert_eq!(
        service.best_thumbnail("/vi/ID/maxres.jpg").await,
        "/vi/ID/mqdefault.jpg"
    );
    assert_eq!(probed.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_probe_errors_fall_back_to_mq() {
    let mut upstream = MockUpstreamServiceTrait::new();
    upstream
        .expect_head_status()
        .times(4)
        .returning(|_: &str| Err(Error::BadGateway("connection reset".to_string())));

    let service = ThumbnailService::new(Arc::new(upstream));

    assert_eq!(
        service.best_thumbnail("/vi/ID/maxres.jpg").await,
        "/vi/ID/mqdefault.jpg"
    );
}

#[tokio::test]
async fn test_other_paths_are_not_probed() {
    let mut upstream = MockUpstreamServiceTrait::new();
    upstream.expect_head_status().never();

    let service = ThumbnailService::new(Arc::new(upstream));

    assert!(!ThumbnailService::wants_best("/vi/ID/hqdefault.jpg"));
    assert!(ThumbnailService::wants_best("/vi/ID/maxres.jpg"));
    assert_eq!(
        service.best_thumbnail("/vi/ID/hqdefault.jpg").await,
        "/vi/ID/hqdefault.jpg"
    );
}
