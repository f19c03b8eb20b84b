use serde::{Deserialize, Serialize};

/// SGD setting reporting which command languages the printer accepts
pub const LANGUAGES_SETTING: &str = "device.languages";

/// Native command language of a printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Zpl,
    Cpcl,
}

impl Dialect {
    /// Interpret a `device.languages` value.
    ///
    /// Hybrid modes such as `hybrid_xml_zpl` or `epl_zpl` count as ZPL;
    /// `line_print` is the CPCL mode on mobile printers.
    pub fn from_languages(languages: &str) -> Option<Self> {
        let languages = languages.to_ascii_lowercase();
        if languages.contains("zpl") {
            Some(Self::Zpl)
        } else if languages.contains("line_print") || languages.contains("cpcl") {
            Some(Self::Cpcl)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zpl => "ZPL",
            Self::Cpcl => "CPCL",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
