use std::time::Duration;

use domain::transport::Transport;
use domain::{ConnectError, Dialect, TransportDescriptor, TransportKind};
use infrastructure::AppConfig;
use infrastructure::TransportFactory;
use infrastructure::transport::SimulatorConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn read_reply(transport: &mut Box<dyn Transport>) -> Vec<u8> {
    let mut buf = [0u8; 256];
    let n = tokio::time::timeout(Duration::from_millis(500), transport.read(&mut buf))
        .await
        .expect("reply expected")
        .unwrap();
    buf[..n].to_vec()
}

#[tokio::test]
async fn test_factory_network_transport_talks_to_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let printer = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 64];
        let n = socket.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"! U1 getvar \"device.languages\"\r\n");
        socket.write_all(b"\"zpl\"\r\n").await.unwrap();
    });

    let descriptor: TransportDescriptor = format!("tcp://127.0.0.1:{}", port).parse().unwrap();
    let mut transport = TransportFactory::create(&descriptor, &AppConfig::default()).unwrap();
    transport.open().await.unwrap();
    transport
        .write(b"! U1 getvar \"device.languages\"\r\n")
        .await
        .unwrap();

    assert_eq!(read_reply(&mut transport).await, b"\"zpl\"\r\n");
    printer.await.unwrap();
    transport.close().await;
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_factory_simulator_uses_configured_printer() {
    let config = AppConfig {
        simulator: SimulatorConfig {
            dialect: Dialect::Cpcl,
            paper_out: true,
            ..SimulatorConfig::default()
        },
        ..AppConfig::default()
    };
    let mut transport = TransportFactory::create(&TransportDescriptor::Simulator, &config).unwrap();
    assert_eq!(transport.kind(), TransportKind::Simulator);

    transport.open().await.unwrap();
    transport
        .write(b"! U1 getvar \"device.languages\"\r\n")
        .await
        .unwrap();
    assert_eq!(read_reply(&mut transport).await, b"\"line_print\"\r\n");

    transport.write(&[0x1B, 0x68]).await.unwrap();
    assert_eq!(read_reply(&mut transport).await, vec![0x02]);
}

#[tokio::test]
async fn test_bluetooth_without_binding_is_device_not_found() {
    let config = AppConfig {
        bluetooth: infrastructure::transport::BluetoothConfig {
            rfcomm_table: "/nonexistent/rfcomm".to_string(),
            ..Default::default()
        },
        ..AppConfig::default()
    };
    let descriptor = TransportDescriptor::bluetooth("AC:3F:A4:10:20:30");
    let mut transport = TransportFactory::create(&descriptor, &config).unwrap();

    assert!(matches!(
        transport.open().await,
        Err(ConnectError::DeviceNotFound(_))
    ));
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_unreachable_network_printer_times_out_or_fails() {
    let mut config = AppConfig::default();
    config.timeouts.connect_ms = 200;
    // TEST-NET-1 is never routed
    let descriptor = TransportDescriptor::network("192.0.2.1", 9100);
    let mut transport = TransportFactory::create(&descriptor, &config).unwrap();

    let result = transport.open().await;
    assert!(matches!(
        result,
        Err(ConnectError::Timeout) | Err(ConnectError::Unreachable(_))
    ));
}
