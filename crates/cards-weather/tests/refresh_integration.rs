//! Integration tests for WeatherRefresher using wiremock.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cards_bridge::{AppMessageKey, ChannelBridge, MessageValue, OutboundMessage};
use cards_weather::{
    Coordinates, FixedLocation, LocationError, LocationProvider, Position, PositionOptions,
    RefreshOutcome, UnavailableLocation, WeatherError, WeatherProvider, WeatherRefresher,
    WeatherReport,
};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn weather_body(name: &str, description: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": -0.12, "lat": 51.5 },
        "weather": [{ "id": 500, "main": "Rain", "description": description, "icon": "10d" }],
        "main": { "temp": temp, "humidity": 81 },
        "name": name,
        "cod": 200
    })
}

async fn mount_weather(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn refresher(
    server: &MockServer,
    location: Arc<dyn LocationProvider>,
) -> (WeatherRefresher, UnboundedReceiver<OutboundMessage>) {
    let provider = WeatherProvider::new(&format!("{}/data/2.5/weather", server.uri())).unwrap();
    let (bridge, rx) = ChannelBridge::new();
    (WeatherRefresher::new(location, provider, Arc::new(bridge)), rx)
}

/// Hands out queued coordinates, one per request
struct SequenceLocation {
    queue: Mutex<VecDeque<Coordinates>>,
}

#[async_trait]
impl LocationProvider for SequenceLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        self.queue
            .lock()
            .pop_front()
            .map(Position::now)
            .ok_or(LocationError::ServiceUnavailable)
    }
}

#[tokio::test]
async fn test_first_refresh_sends_weather() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "51.5"))
        .and(query_param("lon", "-0.12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(
            "London",
            "light rain",
            300.15,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let (refresher, mut rx) = refresher(&server, Arc::new(FixedLocation::new(51.5, -0.12)));
    let outcome = refresher.refresh().await.unwrap();

    assert!(matches!(outcome, RefreshOutcome::Sent(_)));
    let msg = rx.try_recv().unwrap();
    assert_eq!(msg, OutboundMessage::weather("London", "Light rain", 27));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_unchanged_weather_is_not_resent() {
    let server = MockServer::start().await;
    mount_weather(&server, weather_body("London", "light rain", 285.0)).await;

    let (refresher, mut rx) = refresher(&server, Arc::new(FixedLocation::new(51.5, -0.12)));

    refresher.refresh().await.unwrap();
    let second = refresher.refresh().await.unwrap();

    assert_eq!(second, RefreshOutcome::Unchanged);
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err(), "identical values must not be resent");
}

#[tokio::test]
async fn test_changed_temperature_is_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(
            "London",
            "light rain",
            285.0,
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_weather(&server, weather_body("London", "light rain", 287.0)).await;

    let (refresher, mut rx) = refresher(&server, Arc::new(FixedLocation::new(51.5, -0.12)));
    refresher.refresh().await.unwrap();
    refresher.refresh().await.unwrap();

    assert_eq!(rx.try_recv().unwrap(), OutboundMessage::weather("London", "Light rain", 12));
    assert_eq!(rx.try_recv().unwrap(), OutboundMessage::weather("London", "Light rain", 14));
    assert!(rx.try_recv().is_err());
    assert_eq!(refresher.last_sent().unwrap().temperature_celsius, 14);
}

#[tokio::test]
async fn test_location_failure_sends_error_signal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (refresher, mut rx) = refresher(&server, Arc::new(UnavailableLocation));
    let outcome = refresher.refresh().await.unwrap();

    assert_eq!(outcome, RefreshOutcome::LocationUnavailable);
    let msg = rx.try_recv().unwrap();
    assert_eq!(
        msg.get(AppMessageKey::RequestTemperature),
        Some(&MessageValue::Text("ERR".to_string()))
    );
    assert_eq!(msg.len(), 1);
    assert!(rx.try_recv().is_err());
    assert!(refresher.last_sent().is_none());
}

#[tokio::test]
async fn test_location_failure_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    mount_weather(&server, weather_body("London", "light rain", 285.0)).await;

    let location = SequenceLocation {
        queue: Mutex::new(VecDeque::from([Coordinates {
            latitude: 51.5,
            longitude: -0.12,
        }])),
    };
    let (refresher, mut rx) = refresher(&server, Arc::new(location));

    let first = refresher.refresh().await.unwrap();
    let second = refresher.refresh().await.unwrap();

    let delivered = WeatherReport {
        location: "London".to_string(),
        conditions: "Light rain".to_string(),
        temperature_celsius: 12,
    };
    assert_eq!(first, RefreshOutcome::Sent(delivered.clone()));
    assert_eq!(second, RefreshOutcome::LocationUnavailable);
    assert_eq!(refresher.last_sent(), Some(delivered));

    assert_eq!(rx.try_recv().unwrap(), OutboundMessage::weather("London", "Light rain", 12));
    assert_eq!(rx.try_recv().unwrap(), OutboundMessage::location_error());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_malformed_response_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let (refresher, mut rx) = refresher(&server, Arc::new(FixedLocation::new(51.5, -0.12)));
    let result = refresher.refresh().await;

    assert!(matches!(result, Err(WeatherError::Parse(_))));
    assert!(rx.try_recv().is_err());
    assert!(refresher.last_sent().is_none());
}

#[tokio::test]
async fn test_missing_fields_is_parse_error() {
    let server = MockServer::start().await;
    mount_weather(&server, serde_json::json!({ "name": "London", "weather": [] })).await;

    let (refresher, mut rx) = refresher(&server, Arc::new(FixedLocation::new(51.5, -0.12)));
    let result = refresher.refresh().await;

    assert!(matches!(result, Err(WeatherError::Parse(_))));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_server_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (refresher, mut rx) = refresher(&server, Arc::new(FixedLocation::new(51.5, -0.12)));
    let result = refresher.refresh().await;

    assert!(matches!(result, Err(WeatherError::Status(503))));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_closed_bridge_does_not_fail_refresh() {
    let server = MockServer::start().await;
    mount_weather(&server, weather_body("London", "light rain", 285.0)).await;

    let (refresher, rx) = refresher(&server, Arc::new(FixedLocation::new(51.5, -0.12)));
    drop(rx);

    let outcome = refresher.refresh().await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Sent(_)));
}

/// Overlapping refreshes are not de-duplicated and may complete out of
/// order. Only the ordering-independent facts are asserted here: both
/// readings are delivered and the snapshot holds the last one delivered.
#[tokio::test]
async fn test_overlapping_refreshes_complete_out_of_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("lat", "10.5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(weather_body("Slowtown", "clear sky", 290.0))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("lat", "20.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(
            "Fastville",
            "clear sky",
            290.0,
        )))
        .mount(&server)
        .await;

    let location = SequenceLocation {
        queue: Mutex::new(VecDeque::from([
            Coordinates {
                latitude: 10.5,
                longitude: 1.5,
            },
            Coordinates {
                latitude: 20.5,
                longitude: 1.5,
            },
        ])),
    };
    let (refresher, mut rx) = refresher(&server, Arc::new(location));

    let (first, second) = tokio::join!(refresher.refresh(), refresher.refresh());
    assert!(matches!(first, Ok(RefreshOutcome::Sent(_))));
    assert!(matches!(second, Ok(RefreshOutcome::Sent(_))));

    let _earlier = rx.try_recv().unwrap();
    let later = rx.try_recv().unwrap();
    let last = refresher.last_sent().unwrap();
    assert_eq!(
        later.get(AppMessageKey::Location),
        Some(&MessageValue::Text(last.location.clone()))
    );
}
