mod common;

use common::{closed_port_url, http_client, StubResponse, StubServer};
use serde_json::json;
use servicebay::error::{AppError, GEOCODE_FAILED};
use servicebay::geo::fence::{HYDERABAD, HYDERABAD_CENTER};
use servicebay::geo::geocoder::UNKNOWN_LOCATION;
use servicebay::geo::{
    CancelToken, Coordinate, GeolocationResolver, IpLocator, Locator, NominatimGeocoder,
    ReverseGeocoder,
};

#[tokio::test]
async fn test_reverse_returns_display_name() {
    let server = StubServer::start(|_| {
        StubResponse::json(200, json!({ "display_name": "Banjara Hills, Hyderabad, Telangana" }))
    })
    .await;
    let geocoder = NominatimGeocoder::new(http_client(), server.url(), "en");

    let address = geocoder.reverse(Coordinate::new(17.41, 78.44)).await.unwrap();
    assert_eq!(address.as_str(), "Banjara Hills, Hyderabad, Telangana");

    let request = &server.requests()[0];
    assert_eq!(request.path(), "/reverse");
    assert!(request.query().contains("format=jsonv2"));
    assert!(request.query().contains("zoom=18"));
    assert!(request.query().contains("accept-language=en"));
    assert_eq!(request.header("accept"), Some("application/json"));
}

#[tokio::test]
async fn test_nameless_answer_is_unknown_location() {
    let server = StubServer::start(|_| StubResponse::json(200, json!({ "error": "Unable to geocode" }))).await;
    let geocoder = NominatimGeocoder::new(http_client(), server.url(), "en");

    let address = geocoder.reverse(HYDERABAD_CENTER).await.unwrap();
    assert_eq!(address.as_str(), UNKNOWN_LOCATION);
    assert!(address.is_unknown());
}

#[tokio::test]
async fn test_error_status_fails_to_fetch_address() {
    let server = StubServer::start(|_| StubResponse::text(500, "")).await;
    let geocoder = NominatimGeocoder::new(http_client(), server.url(), "en");

    let err = geocoder.reverse(HYDERABAD_CENTER).await.unwrap_err();
    assert_eq!(err.to_string(), GEOCODE_FAILED);
}

#[tokio::test]
async fn test_unreachable_geocoder_fails_to_fetch_location() {
    let geocoder = NominatimGeocoder::new(http_client(), closed_port_url().await, "en");

    let err = geocoder.reverse(HYDERABAD_CENTER).await.unwrap_err();
    assert!(matches!(err, AppError::Unreachable(_)), "got: {:?}", err);
    assert_eq!(err.to_string(), "Unable to fetch location.");
    assert_ne!(err.to_string(), GEOCODE_FAILED);
}

#[tokio::test]
async fn test_api_key_is_sent_when_configured() {
    let server = StubServer::start(|_| StubResponse::json(200, json!({ "display_name": "x" }))).await;
    let geocoder =
        NominatimGeocoder::new(http_client(), server.url(), "te").with_api_key(Some("k-123".into()));

    geocoder.reverse(HYDERABAD_CENTER).await.unwrap();
    let query = server.requests()[0].query().to_string();
    assert!(query.contains("key=k-123"));
    assert!(query.contains("accept-language=te"));
}

#[tokio::test]
async fn test_out_of_area_fix_is_geocoded_at_fallback() {
    let server = StubServer::start(|req| {
        let name = if req.query().contains("lat=17.385") {
            "Hyderabad center"
        } else {
            "somewhere else"
        };
        StubResponse::json(200, json!({ "display_name": name }))
    })
    .await;
    let geocoder = NominatimGeocoder::new(http_client(), server.url(), "en");
    // Bengaluru
    let locator = Locator::Fixed(Coordinate::new(12.97, 77.59));
    let resolver = GeolocationResolver::new(locator, geocoder, HYDERABAD, HYDERABAD_CENTER);

    let detection = resolver.detect_location(&CancelToken::new()).await.unwrap();
    assert!(detection.substituted);
    assert_eq!(detection.resolved, HYDERABAD_CENTER);
    assert_eq!(detection.address.as_str(), "Hyderabad center");
}

#[tokio::test]
async fn test_ip_locator_feeds_the_resolver() {
    let server = StubServer::start(|req| match req.path() {
        "/json/" => StubResponse::json(200, json!({ "latitude": 17.44, "longitude": 78.38 })),
        _ => StubResponse::json(200, json!({ "display_name": "HITEC City, Hyderabad" })),
    })
    .await;
    let locator = Locator::Ip(IpLocator::new(http_client(), format!("{}/json/", server.url())));
    let geocoder = NominatimGeocoder::new(http_client(), server.url(), "en");
    let resolver = GeolocationResolver::new(locator, geocoder, HYDERABAD, HYDERABAD_CENTER);

    let detection = resolver.detect_location(&CancelToken::new()).await.unwrap();
    assert!(!detection.substituted);
    assert_eq!(detection.reported, Coordinate::new(17.44, 78.38));
    assert_eq!(detection.address.as_str(), "HITEC City, Hyderabad");
    // Geocoding starts only after the position is known
    assert_eq!(server.requests()[0].path(), "/json/");
    assert_eq!(server.requests()[1].path(), "/reverse");
}

#[tokio::test]
async fn test_unreachable_ip_lookup_is_a_position_error() {
    let locator = Locator::Ip(IpLocator::new(http_client(), closed_port_url().await));
    let geocoder = NominatimGeocoder::new(http_client(), closed_port_url().await, "en");
    let resolver = GeolocationResolver::new(locator, geocoder, HYDERABAD, HYDERABAD_CENTER);

    let err = resolver.detect_location(&CancelToken::new()).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionOrPosition(_)));
}

#[tokio::test]
async fn test_cancelled_before_start_makes_no_request() {
    let server = StubServer::start(|_| StubResponse::json(200, json!({ "display_name": "x" }))).await;
    let geocoder = NominatimGeocoder::new(http_client(), server.url(), "en");
    let resolver = GeolocationResolver::new(
        Locator::Fixed(HYDERABAD_CENTER),
        geocoder,
        HYDERABAD,
        HYDERABAD_CENTER,
    );

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = resolver.detect_location(&cancel).await.unwrap_err();
    assert_eq!(err, AppError::Cancelled);
    assert!(server.requests().is_empty());
}
