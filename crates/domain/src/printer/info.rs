use serde::Serialize;

use super::dialect::Dialect;

pub const PRODUCT_NAME_SETTING: &str = "device.product_name";
pub const UNIQUE_ID_SETTING: &str = "device.unique_id";
pub const FIRMWARE_SETTING: &str = "appl.name";
pub const HEAD_TEMPERATURE_SETTING: &str = "head.temperature";

/// Identity of a connected printer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterInfo {
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub firmware: Option<String>,
    pub dialect: Dialect,
}

impl std::fmt::Display for PrinterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| "Unknown".to_string());
        writeln!(f, "Model: {}", or_unknown(&self.model))?;
        writeln!(f, "Serial: {}", or_unknown(&self.serial_number))?;
        writeln!(f, "Firmware: {}", or_unknown(&self.firmware))?;
        write!(f, "Language: {}", self.dialect)
    }
}
