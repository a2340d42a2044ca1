//! Catalog tests against a mock HTTP server.

use serde_json::json;
use std::time::Duration;
use vibewave_catalog::{CatalogConfig, CatalogError, SongCatalog};
use vibewave_core::{TrackId, TrackResolver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_for(server: &MockServer) -> SongCatalog {
    SongCatalog::new(CatalogConfig::new(format!("{}/songs.json", server.uri())))
        .expect("valid catalog url")
}

// =============================================================================
// Fetching
// =============================================================================

mod fetching {
    use super::*;

    #[tokio::test]
    async fn test_get_by_id_after_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "A", "artist": "B", "src": "a.mp3"}
            ])))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        let tracks = catalog.fetch_all().await;
        assert_eq!(tracks.len(), 1);

        let track = catalog.get_by_id("1").expect("track 1");
        assert_eq!(track.url, "a.mp3");
        assert_eq!(track.title, "A");
        assert_eq!(track.artist, "B");
        assert!(catalog.resolve(&TrackId::from(1)).is_some());
    }

    #[tokio::test]
    async fn test_songs_wrapper_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "songs": [
                    {"id": "a", "title": "First", "url": "first.mp3"},
                    {"title": "Second", "audio": "second.mp3"}
                ]
            })))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        let ids: Vec<String> = catalog
            .fetch_all()
            .await
            .iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "song-1"]);
    }

    #[tokio::test]
    async fn test_fetch_is_memoised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        assert_eq!(catalog.fetch_all().await.len(), 1);
        assert_eq!(catalog.fetch_all().await.len(), 1);
        assert!(catalog.is_loaded());
    }

    #[tokio::test]
    async fn test_concurrent_first_fetches_share_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 1}, {"id": 2}]))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        let (a, b) = tokio::join!(catalog.fetch_all(), catalog.fetch_all());
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
    }
}

// =============================================================================
// Failures
// =============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_server_error_yields_empty_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs.json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        assert!(catalog.fetch_all().await.is_empty());
        assert!(!catalog.is_loaded());

        match catalog.try_fetch_all().await {
            Err(CatalogError::ServerError { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected ServerError, got {:?}", other.map(<[_]>::len)),
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs.json"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/songs.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 5}])))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        assert!(catalog.fetch_all().await.is_empty());
        assert_eq!(catalog.fetch_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        assert!(matches!(
            catalog.try_fetch_all().await,
            Err(CatalogError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let catalog = SongCatalog::new(CatalogConfig {
            url: "http://127.0.0.1:1/songs.json".into(),
            timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
        })
        .unwrap();

        assert!(catalog.fetch_all().await.is_empty());
        assert!(matches!(
            catalog.try_fetch_all().await,
            Err(CatalogError::ServerUnreachable(_))
        ));
    }
}
