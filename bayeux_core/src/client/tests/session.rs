//! Handshake, publish, and disconnect.

use serde_json::json;
use testresult::TestResult;

use super::common::{init_tracing, payload};
use crate::{
    BayeuxClient, ClientError, ClientId, ProtocolError, channel,
    message::BayeuxMessage,
    test_utils::{MockTransport, MockTransportError},
};

#[tokio::test]
async fn handshake_stores_issued_client_id() -> TestResult {
    init_tracing();
    let transport = MockTransport::new().with_reply(
        channel::HANDSHAKE,
        vec![
            BayeuxMessage::new(channel::HANDSHAKE)
                .with_successful(true)
                .with_client_id(ClientId::new("abc")),
        ],
    );
    let client = BayeuxClient::new(transport);

    let id = client.handshake().await?;

    assert_eq!(id.as_str(), "abc");
    assert_eq!(client.client_id().await, Some(ClientId::new("abc")));
    Ok(())
}

#[tokio::test]
async fn handshake_request_carries_no_client_id() -> TestResult {
    init_tracing();
    let client = BayeuxClient::new(MockTransport::new());
    client.handshake().await?;

    let sent = client.transport().requests_on(channel::HANDSHAKE).await;
    assert_eq!(sent.len(), 1);
    assert!(sent.iter().all(|m| m.client_id.is_none()));
    Ok(())
}

#[tokio::test]
async fn handshake_with_empty_batch_is_a_protocol_error() {
    init_tracing();
    let transport = MockTransport::new().with_reply(channel::HANDSHAKE, Vec::new());
    let client = BayeuxClient::new(transport);

    let result = client.handshake().await;

    assert!(matches!(
        result,
        Err(ClientError::Protocol(ProtocolError::EmptyResponse { .. }))
    ));
    assert_eq!(client.client_id().await, None);
}

#[tokio::test]
async fn handshake_without_client_id_is_a_protocol_error() {
    init_tracing();
    let transport = MockTransport::new().with_reply(
        channel::HANDSHAKE,
        vec![BayeuxMessage::new(channel::HANDSHAKE).with_successful(true)],
    );
    let client = BayeuxClient::new(transport);

    let result = client.handshake().await;

    assert!(matches!(
        result,
        Err(ClientError::Protocol(ProtocolError::MissingClientId))
    ));
    assert_eq!(client.client_id().await, None);
}

#[tokio::test]
async fn rejected_handshake_surfaces_server_error() {
    init_tracing();
    let transport = MockTransport::new().with_reply(
        channel::HANDSHAKE,
        vec![
            BayeuxMessage::new(channel::HANDSHAKE)
                .with_successful(false)
                .with_error("403::denied"),
        ],
    );
    let client = BayeuxClient::new(transport);

    let result = client.handshake().await;

    let server_error = result
        .as_ref()
        .err()
        .and_then(ClientError::as_protocol)
        .and_then(ProtocolError::server_error);
    assert_eq!(server_error, Some("403::denied"));
    assert_eq!(client.client_id().await, None);
}

#[tokio::test]
async fn handshake_transport_failure_is_reported() {
    init_tracing();
    let transport =
        MockTransport::new().with_responder(|_| Err(MockTransportError::Refused));
    let client = BayeuxClient::new(transport);

    let result = client.handshake().await;

    assert!(result.as_ref().is_err_and(ClientError::is_transport));
    assert_eq!(client.client_id().await, None);
}

#[tokio::test]
async fn rehandshake_replaces_client_id() -> TestResult {
    init_tracing();
    let client = BayeuxClient::new(MockTransport::new());
    client.handshake().await?;
    let second = client.handshake().await?;

    assert_eq!(client.client_id().await, Some(second));
    assert_eq!(client.transport().requests_on(channel::HANDSHAKE).await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn publish_sends_channel_data_and_client_id() -> TestResult {
    init_tracing();
    let client = BayeuxClient::new(MockTransport::new());
    let id = client.handshake().await?;

    client
        .publish("/chat", payload(json!({"text": "hi"})))
        .await?;

    let sent = client.transport().requests_on("/chat").await;
    let first = sent.first().ok_or("publish not sent")?;
    assert_eq!(first.client_id, Some(id));
    assert_eq!(first.data, Some(payload(json!({"text": "hi"}))));
    Ok(())
}

#[tokio::test]
async fn unsuccessful_publish_carries_server_error() {
    init_tracing();
    let transport = MockTransport::new().with_reply(
        "/chat",
        vec![BayeuxMessage::new("/chat").with_successful(false).with_error("boom")],
    );
    let client = BayeuxClient::new(transport);

    let result = client.publish("/chat", payload(json!({}))).await;

    let Err(err) = result else {
        unreachable!("publish must fail");
    };
    assert!(matches!(err, ClientError::Protocol(_)));
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn publish_without_successful_flag_is_rejected() {
    init_tracing();
    let transport = MockTransport::new().with_reply("/chat", vec![BayeuxMessage::new("/chat")]);
    let client = BayeuxClient::new(transport);

    let result = client.publish("/chat", payload(json!({}))).await;

    assert!(matches!(
        result,
        Err(ClientError::Protocol(ProtocolError::Unsuccessful { error: None, .. }))
    ));
}

#[tokio::test]
async fn disconnect_without_connect_still_notifies_server() -> TestResult {
    init_tracing();
    let client = BayeuxClient::new(MockTransport::new());
    let id = client.handshake().await?;

    client.disconnect().await?;

    let sent = client.transport().requests_on(channel::DISCONNECT).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent.first().and_then(|m| m.client_id.clone()), Some(id));
    assert!(!client.is_running().await);
    Ok(())
}

#[tokio::test]
async fn rejected_disconnect_is_reported() {
    init_tracing();
    let transport = MockTransport::new().with_reply(
        channel::DISCONNECT,
        vec![BayeuxMessage::new(channel::DISCONNECT).with_successful(false)],
    );
    let client = BayeuxClient::new(transport);

    let result = client.disconnect().await;

    assert!(matches!(result, Err(ClientError::Protocol(_))));
}
