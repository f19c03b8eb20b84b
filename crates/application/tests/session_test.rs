use application::api;
use application::{PrinterSession, SessionClient};
use domain::{PrinterError, TransportDescriptor};
use infrastructure::AppConfig;
use std::sync::Arc;

async fn start_session() -> (SessionClient, tokio::task::JoinHandle<()>, Arc<application::Connection>) {
    let config = AppConfig::default();
    let connection = api::connect(&TransportDescriptor::Simulator, &config)
        .await
        .unwrap();
    let printer = api::open_printer(&connection, &config).await.unwrap();
    let (client, task) = PrinterSession::spawn(connection.clone(), printer);
    (client, task, connection)
}

#[tokio::test]
async fn test_requests_from_several_clients() {
    let (client, task, connection) = start_session().await;
    let other = client.clone();

    let (status, set) = tokio::join!(
        client.status(),
        other.set_setting("media.darkness", "18")
    );
    assert!(status.unwrap().is_ready());
    set.unwrap();

    assert_eq!(client.get_setting("media.darkness").await.unwrap(), "18");
    assert!(client.info().await.unwrap().model.is_some());
    client.send_raw(b"^XA^XZ".to_vec()).await.unwrap();

    client.shutdown().await;
    task.await.unwrap();
    assert!(!connection.is_connected());
}

#[tokio::test]
async fn test_requests_after_shutdown_fail() {
    let (client, task, _connection) = start_session().await;

    client.shutdown().await;
    task.await.unwrap();

    assert!(client.is_closed());
    assert!(matches!(
        client.status().await,
        Err(PrinterError::SessionClosed)
    ));
}

#[tokio::test]
async fn test_cancel_stops_worker() {
    let (client, task, connection) = start_session().await;

    client.cancel();
    task.await.unwrap();

    assert!(!connection.is_connected());
    assert!(matches!(
        client.get_setting("device.languages").await,
        Err(PrinterError::SessionClosed)
    ));
}

#[tokio::test]
async fn test_dropping_all_clients_stops_worker() {
    let (client, task, connection) = start_session().await;

    drop(client);
    task.await.unwrap();
    assert!(!connection.is_connected());
}
