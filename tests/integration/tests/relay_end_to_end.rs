//! End-to-end relay tests: a real client through a real relay against mock
//! upstream gateways on loopback.

use futures::{SinkExt, Stream, StreamExt};
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use voicegate_integration_tests::{
    start_echo_upstream, start_header_capturing_upstream, start_relay, start_relay_with_key,
    start_silent_upstream,
};
use voicegate_relay::Tunables;

/// Tunables that keep tests fast without tripping idle detection.
fn relaxed() -> Tunables {
    Tunables {
        read_deadline: Duration::from_secs(10),
        write_deadline: Duration::from_secs(2),
        ping_interval: Duration::from_secs(60),
    }
}

/// Read data messages from a client stream, skipping control frames, until
/// `count` have arrived or the deadline passes.
async fn collect_data<S>(stream: &mut S, count: usize) -> Vec<Message>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let mut out = Vec::new();
    let deadline = Duration::from_secs(5);
    while out.len() < count {
        match timeout(deadline, stream.next()).await {
            Ok(Some(Ok(msg @ (Message::Text(_) | Message::Binary(_))))) => out.push(msg),
            Ok(Some(Ok(_))) => continue,
            _ => break,
        }
    }
    out
}

#[tokio::test]
async fn test_relays_messages_in_order_byte_for_byte() {
    let (upstream_url, mut received) = start_echo_upstream().await;
    let relay_addr = start_relay(upstream_url, relaxed()).await;

    let (mut client, _) = tokio_tungstenite::connect_async(format!("ws://{relay_addr}/ws"))
        .await
        .expect("client connect");

    let sent = vec![
        Message::Text("{\"type\":\"ping\"}".to_string()),
        Message::Text("one".to_string()),
        Message::Text("two".to_string()),
        Message::Binary(vec![0x00, 0x01, 0xfe, 0xff]),
        Message::Text("three".to_string()),
    ];
    for msg in &sent {
        client.send(msg.clone()).await.unwrap();
    }

    // The upstream saw every message, unmodified and in order.
    for expected in &sent {
        let got = timeout(Duration::from_secs(5), received.recv())
            .await
            .expect("upstream read timed out")
            .expect("upstream channel closed");
        assert_eq!(&got, expected);
    }

    // The echo came back through the relay in the same order.
    let echoed = collect_data(&mut client, sent.len()).await;
    assert_eq!(echoed, sent);
}

#[tokio::test]
async fn test_upstream_dial_carries_bearer_credential() {
    let (upstream_url, auth_rx) = start_header_capturing_upstream().await;
    let relay_addr = start_relay_with_key(upstream_url, relaxed(), "sk-integration").await;

    let (_client, _) = tokio_tungstenite::connect_async(format!("ws://{relay_addr}/ws"))
        .await
        .expect("client connect");

    let auth = timeout(Duration::from_secs(5), auth_rx)
        .await
        .expect("handshake timed out")
        .expect("upstream dropped");
    assert_eq!(auth.as_deref(), Some("Bearer sk-integration"));
}

#[tokio::test]
async fn test_connect_failure_sends_single_error_notice_then_closes() {
    // Nothing listens on port 1; the dial fails with no extra delay.
    let relay_addr = start_relay("ws://127.0.0.1:1/".to_string(), relaxed()).await;

    let (mut client, _) = tokio_tungstenite::connect_async(format!("ws://{relay_addr}/ws"))
        .await
        .expect("client connect");

    let first = timeout(Duration::from_secs(5), client.next())
        .await
        .expect("no notice arrived")
        .expect("stream ended before notice")
        .expect("transport error before notice");
    assert_eq!(
        first,
        Message::Text("{\"error\":\"cannot connect to openai realtime\"}".to_string())
    );

    // Nothing follows but the close.
    loop {
        match timeout(Duration::from_secs(5), client.next()).await {
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) | Ok(Some(Err(_))) => break,
            Ok(Some(Ok(Message::Text(_) | Message::Binary(_)))) => {
                panic!("relayed a message after connect failure")
            }
            Ok(Some(Ok(_))) => continue,
            Err(_) => panic!("connection never closed"),
        }
    }
}

#[tokio::test]
async fn test_idle_session_is_terminated_by_read_deadline() {
    let upstream_url = start_silent_upstream().await;
    let tunables = Tunables {
        read_deadline: Duration::from_millis(300),
        write_deadline: Duration::from_millis(200),
        ping_interval: Duration::from_secs(60),
    };
    let relay_addr = start_relay(upstream_url, tunables).await;

    let (mut client, _) = tokio_tungstenite::connect_async(format!("ws://{relay_addr}/ws"))
        .await
        .expect("client connect");

    // No traffic in either direction: the session must end on its own.
    let ended = timeout(Duration::from_secs(3), async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "idle session was not torn down");
}

#[tokio::test]
async fn test_keepalive_pings_without_disturbing_traffic() {
    let (upstream_url, _received) = start_echo_upstream().await;
    let tunables = Tunables {
        read_deadline: Duration::from_secs(10),
        write_deadline: Duration::from_secs(2),
        ping_interval: Duration::from_millis(150),
    };
    let relay_addr = start_relay(upstream_url, tunables).await;

    let (mut client, _) = tokio_tungstenite::connect_async(format!("ws://{relay_addr}/ws"))
        .await
        .expect("client connect");

    client
        .send(Message::Text("still here".to_string()))
        .await
        .unwrap();

    let mut pings = 0;
    let mut echoes = 0;
    let _ = timeout(Duration::from_millis(800), async {
        while let Some(Ok(msg)) = client.next().await {
            match msg {
                Message::Ping(_) => pings += 1,
                Message::Text(t) if t == "still here" => echoes += 1,
                _ => {}
            }
        }
    })
    .await;

    // Four intervals elapsed; at least three pings, and the echo got through.
    assert!(pings >= 3, "expected >= 3 pings, got {pings}");
    assert_eq!(echoes, 1);
}
