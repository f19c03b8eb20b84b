use std::sync::Arc;

use application::api;
use application::{Connection, HandleOptions, PrinterHandle};
use domain::{Dialect, PrinterError, SgdError, TransportDescriptor};
use infrastructure::AppConfig;
use infrastructure::transport::{SimulatorConfig, SimulatorTransport};

fn simulator_config(simulator: SimulatorConfig) -> AppConfig {
    AppConfig {
        simulator,
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_set_then_get_round_trip() {
    let config = AppConfig::default();
    let connection = api::connect(&TransportDescriptor::Simulator, &config)
        .await
        .unwrap();

    api::set_setting(&connection, "media.darkness", "value")
        .await
        .unwrap();
    let value = api::get_setting(&connection, "media.darkness", &config)
        .await
        .unwrap();

    assert_eq!(value, "value");
    api::disconnect(&connection).await;
    assert!(!connection.is_connected());
}

#[tokio::test]
async fn test_unknown_setting_is_an_error() {
    let config = AppConfig::default();
    let connection = api::connect(&TransportDescriptor::Simulator, &config)
        .await
        .unwrap();

    let result = api::get_setting(&connection, "bogus.setting", &config).await;
    assert_eq!(
        result,
        Err(SgdError::UnknownSetting("bogus.setting".to_string()))
    );
}

#[tokio::test]
async fn test_probe_detects_zpl_and_reports_paper_out() {
    let config = simulator_config(SimulatorConfig {
        paper_out: true,
        ..SimulatorConfig::default()
    });
    let connection = api::connect(&TransportDescriptor::Simulator, &config)
        .await
        .unwrap();

    let printer = api::open_printer(&connection, &config).await.unwrap();
    assert_eq!(printer.dialect(), Dialect::Zpl);

    let status = api::get_status(&printer).await.unwrap();
    assert!(status.is_paper_out());
    assert!(!status.is_head_open());
    assert!(!status.is_paused());
}

#[tokio::test]
async fn test_status_queries_reuse_detected_dialect() {
    let config = AppConfig::default();
    let transport = SimulatorTransport::new(config.simulator.clone());
    let printer_state = transport.state();
    let connection = Arc::new(Connection::new(Box::new(transport)));
    connection.open().await.unwrap();

    let printer = api::open_printer(&connection, &config).await.unwrap();
    // A later language change is not picked up by an existing handle
    printer_state
        .lock()
        .unwrap()
        .settings
        .insert("device.languages".to_string(), "epl".to_string());

    for _ in 0..3 {
        assert!(api::get_status(&printer).await.unwrap().is_ready());
    }
    assert_eq!(printer.dialect(), Dialect::Zpl);
}

#[tokio::test]
async fn test_probe_detects_cpcl_head_open() {
    let config = simulator_config(SimulatorConfig {
        dialect: Dialect::Cpcl,
        head_open: true,
        ..SimulatorConfig::default()
    });
    let connection = api::connect(&TransportDescriptor::Simulator, &config)
        .await
        .unwrap();

    let printer = PrinterHandle::open(&connection, HandleOptions::from(&config))
        .await
        .unwrap();
    assert_eq!(printer.dialect(), Dialect::Cpcl);

    let status = printer.current_status().await.unwrap();
    assert!(status.is_head_open());
    assert!(!status.is_paper_out());
    assert!(!status.is_paused());
}

#[tokio::test]
async fn test_unsupported_language_is_unknown_dialect() {
    let config = AppConfig::default();
    let connection = api::connect(&TransportDescriptor::Simulator, &config)
        .await
        .unwrap();
    api::set_setting(&connection, "device.languages", "epl")
        .await
        .unwrap();

    let result = api::open_printer(&connection, &config).await;
    assert!(matches!(result, Err(PrinterError::UnknownDialect(ref l)) if l == "epl"));
}

#[tokio::test]
async fn test_printer_info_and_status_report() {
    let config = AppConfig::default();
    let connection = api::connect(&TransportDescriptor::Simulator, &config)
        .await
        .unwrap();

    let printer = api::open_printer(&connection, &config).await.unwrap();
    let info = api::printer_info(&printer).await.unwrap();
    assert_eq!(info.model.as_deref(), Some("ZD421-203dpi"));
    assert_eq!(info.serial_number.as_deref(), Some("D2J000000001"));
    assert!(info.firmware.is_some());
    assert_eq!(info.dialect, Dialect::Zpl);

    let report = printer.status_report().await.unwrap();
    assert!(report.status.is_ready());
    assert_eq!(report.temperature.as_deref(), Some("24"));
}

#[tokio::test]
async fn test_raw_label_reaches_printer() {
    let config = AppConfig::default();
    let connection = api::connect(&TransportDescriptor::Simulator, &config)
        .await
        .unwrap();

    api::send_raw(&connection, b"^XA^FO20,20^FDok^FS^XZ")
        .await
        .unwrap();
    api::do_action(&connection, "device.reset", "")
        .await
        .unwrap();
    assert!(connection.is_connected());
}
