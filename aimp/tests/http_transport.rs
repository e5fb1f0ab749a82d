use aimp::{
    AimpError, AimpProxy, ClientConfig, EventType, MethodNaming, Notification, PlaybackState,
    RpcErrorCode,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use warp::Filter;

/// Fake plugin answering JSON-RPC on `/RPC_JSON`; `/broken` answers garbage.
async fn start_fake_plugin() -> SocketAddr {
    let rpc = warp::post()
        .and(warp::path("RPC_JSON"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and_then(handle_rpc);

    let broken = warp::post().and(warp::path("broken")).map(|| {
        warp::reply::with_status(
            "<html>internal error</html>",
            warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        )
    });

    let (addr, server) = warp::serve(rpc.or(broken)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

async fn handle_rpc(request: Value) -> Result<impl warp::Reply, warp::Rejection> {
    let id = request["id"].clone();
    let params = &request["params"];

    if request["jsonrpc"] != "2.0" {
        return Ok(warp::reply::json(&json!({
            "jsonrpc": "2.0", "id": id, "error": { "code": 1, "message": "bad envelope" }
        })));
    }

    let outcome: Result<Value, (i64, &str)> = match request["method"].as_str().unwrap_or("") {
        "volume" => match params["level"].as_i64() {
            Some(level) if !(0..=100).contains(&level) => {
                Err((15, "Volume level is out of range [0, 100]."))
            }
            Some(level) => Ok(json!({ "volume": level })),
            None => Ok(json!({ "volume": 64 })),
        },
        "GetControlPanelState" => Ok(json!({
            "playback_state": "paused",
            "playlist_id": 2,
            "track_id": 11,
            "volume": 64,
            "mute_mode_on": false,
            "repeat_mode_on": true,
            "shuffle_mode_on": false
        })),
        "stop" => {
            // Slower than the client's request timeout.
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(json!({ "playback_state": "stopped" }))
        }
        "subscribe" => {
            // Long-poll: answer only once the "event" fires.
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(json!({ "playback_state": "playing", "track_position": 3, "track_length": 180 }))
        }
        "enqueue_track" => Ok(Value::Null),
        _ => Err((2, "Method not found")),
    };

    let body = match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => {
            json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
        }
    };
    Ok(warp::reply::json(&body))
}

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(format!("http://{}", addr)).with_request_timeout(Duration::from_millis(200))
}

#[tokio::test]
async fn test_ordinary_call_over_http() {
    let addr = start_fake_plugin().await;
    let proxy = AimpProxy::connect(&config(addr)).unwrap();

    assert_eq!(proxy.volume(None).await.unwrap(), 64);
    assert_eq!(proxy.volume(Some(30)).await.unwrap(), 30);
}

#[tokio::test]
async fn test_server_fault_is_localized() {
    let addr = start_fake_plugin().await;
    let proxy = AimpProxy::connect(&config(addr)).unwrap();

    match proxy.volume(Some(150)).await {
        Err(AimpError::Rpc {
            code,
            message,
            localized,
        }) => {
            assert_eq!(code, RpcErrorCode::VolumeOutOfRange);
            assert!(message.contains("[0, 100]"));
            assert_eq!(localized, "Volume level is out of range");
        }
        other => panic!("Expected RPC fault, got {:?}", other),
    }
}

#[tokio::test]
async fn test_null_result_is_accepted() {
    let addr = start_fake_plugin().await;
    let proxy = AimpProxy::connect(&config(addr)).unwrap();

    proxy
        .enqueue_track(aimp::TrackDescription::new(1, 2), false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_pascal_case_server() {
    let addr = start_fake_plugin().await;
    let proxy = AimpProxy::connect(&config(addr).with_naming(MethodNaming::PascalCase)).unwrap();

    let state = proxy.get_control_panel_state().await.unwrap();
    assert_eq!(state.playback_state, PlaybackState::Paused);
    assert!(state.repeat_mode_on);
}

#[tokio::test]
async fn test_request_timeout_applies_to_ordinary_calls() {
    let addr = start_fake_plugin().await;
    let proxy = AimpProxy::connect(&config(addr)).unwrap();

    let err = proxy.stop().await.unwrap_err();
    assert!(matches!(err, AimpError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_long_poll_outlives_request_timeout() {
    let addr = start_fake_plugin().await;
    let proxy = AimpProxy::connect(&config(addr)).unwrap();

    let notification = proxy.subscribe(EventType::PlayStateChange).await.unwrap();
    match notification {
        Notification::PlayState(change) => {
            assert_eq!(change.playback_state, PlaybackState::Playing);
            assert_eq!(change.track_length, Some(180));
        }
        other => panic!("Expected play state change, got {:?}", other),
    }
}

#[tokio::test]
async fn test_subscription_timeout_when_configured() {
    let addr = start_fake_plugin().await;
    let proxy = AimpProxy::connect(
        &config(addr).with_subscription_timeout(Some(Duration::from_millis(50))),
    )
    .unwrap();

    let err = proxy.subscribe(EventType::PlayStateChange).await.unwrap_err();
    assert!(matches!(err, AimpError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_garbage_body_is_invalid_response() {
    let addr = start_fake_plugin().await;
    let proxy = AimpProxy::connect(&config(addr).with_rpc_path("/broken")).unwrap();

    let err = proxy.volume(None).await.unwrap_err();
    assert!(matches!(err, AimpError::InvalidResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    // Bind then drop a listener to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let proxy = AimpProxy::connect(&config(addr)).unwrap();
    let err = proxy.volume(None).await.unwrap_err();
    assert!(matches!(err, AimpError::Http(_)), "got {:?}", err);
}
