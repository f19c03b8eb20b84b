mod dialect;
mod info;
mod layout;
mod status;

pub mod sgd;

pub use dialect::{Dialect, LANGUAGES_SETTING};
pub use info::{
    FIRMWARE_SETTING, HEAD_TEMPERATURE_SETTING, PRODUCT_NAME_SETTING, PrinterInfo,
    UNIQUE_ID_SETTING,
};
pub use layout::{BinaryStatusLayout, BitRef, FieldRef, StatusLayouts, TextStatusLayout};
pub use sgd::{SettingResult, SgdCommand};
pub use status::{PrinterStatus, StatusReport};
