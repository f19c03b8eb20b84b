//! SGD (Set-Get-Do) command framing and response parsing.
//!
//! Wire formats:
//! - GET: `! U1 getvar "<name>"\r\n` → `"<value>"\r\n`
//! - SET: `! U1 setvar "<name>" "<value>"\r\n` → no acknowledgement
//! - DO:  `! U1 do "<name>" "<value>"\r\n` → no acknowledgement

use crate::error::SgdError;

/// Outcome of a single GET
pub type SettingResult = Result<String, SgdError>;

/// A single SGD request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SgdCommand {
    Get { name: String },
    Set { name: String, value: String },
    Do { name: String, value: String },
}

fn check(what: &str, text: &str) -> Result<(), SgdError> {
    if text.contains(['"', '\r', '\n']) {
        return Err(SgdError::InvalidArgument(format!(
            "{} must not contain quotes or line breaks: {:?}",
            what, text
        )));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), SgdError> {
    if name.trim().is_empty() {
        return Err(SgdError::InvalidArgument(
            "setting name is empty".to_string(),
        ));
    }
    check("setting name", name)
}

impl SgdCommand {
    pub fn get(name: impl Into<String>) -> Result<Self, SgdError> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self::Get { name })
    }

    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Result<Self, SgdError> {
        let (name, value) = (name.into(), value.into());
        check_name(&name)?;
        check("setting value", &value)?;
        Ok(Self::Set { name, value })
    }

    /// Build a DO command (`do` is a keyword, hence the name)
    pub fn action(name: impl Into<String>, value: impl Into<String>) -> Result<Self, SgdError> {
        let (name, value) = (name.into(), value.into());
        check_name(&name)?;
        check("command value", &value)?;
        Ok(Self::Do { name, value })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Get { name } | Self::Set { name, .. } | Self::Do { name, .. } => name,
        }
    }

    /// Only GET has a framed response; SET and DO are fire-and-forget
    pub fn expects_response(&self) -> bool {
        matches!(self, Self::Get { .. })
    }

    /// Exact bytes to put on the wire
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Get { name } => format!("! U1 getvar \"{}\"\r\n", name),
            Self::Set { name, value } => format!("! U1 setvar \"{}\" \"{}\"\r\n", name, value),
            Self::Do { name, value } => format!("! U1 do \"{}\" \"{}\"\r\n", name, value),
        }
        .into_bytes()
    }
}

/// Index of the quote that closes a GET value
fn closing_quote(bytes: &[u8]) -> Option<usize> {
    bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'"')
        .nth(1)
        .map(|(i, _)| i)
}

/// True once the quoted value has arrived, terminator or not
pub fn value_complete(bytes: &[u8]) -> bool {
    closing_quote(bytes).is_some()
}

/// True once the line ending after the closing quote has arrived.
///
/// Line breaks inside the quotes belong to the value and do not count.
pub fn response_complete(bytes: &[u8]) -> bool {
    closing_quote(bytes).is_some_and(|close| bytes[close + 1..].contains(&b'\n'))
}

/// Extract the quoted value of a GET response.
///
/// An empty value or `?` is how printers answer for settings they do not
/// know, so both become `UnknownSetting`.
pub fn parse_get_response(name: &str, bytes: &[u8]) -> SettingResult {
    let open = bytes
        .iter()
        .position(|&b| b == b'"')
        .ok_or_else(|| SgdError::Malformed("missing opening quote".to_string()))?;
    let body = &bytes[open + 1..];
    let close = body
        .iter()
        .position(|&b| b == b'"')
        .ok_or_else(|| SgdError::Malformed("missing closing quote".to_string()))?;

    let value = std::str::from_utf8(&body[..close])
        .map_err(|_| SgdError::Malformed("value is not valid UTF-8".to_string()))?;

    if value.is_empty() || value == "?" {
        return Err(SgdError::UnknownSetting(name.to_string()));
    }

    Ok(value.to_string())
}

/// Split a multi-line value (e.g. `allcv`) into trimmed, non-empty lines
pub fn split_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_framing() {
        let cmd = SgdCommand::get("device.languages").unwrap();
        assert_eq!(cmd.encode(), b"! U1 getvar \"device.languages\"\r\n");
        assert!(cmd.expects_response());
    }

    #[test]
    fn test_set_framing() {
        let cmd = SgdCommand::set("media.darkness", "25").unwrap();
        assert_eq!(cmd.encode(), b"! U1 setvar \"media.darkness\" \"25\"\r\n");
        assert!(!cmd.expects_response());
    }

    #[test]
    fn test_do_framing() {
        let cmd = SgdCommand::action("device.reset", "").unwrap();
        assert_eq!(cmd.encode(), b"! U1 do \"device.reset\" \"\"\r\n");
        assert_eq!(cmd.name(), "device.reset");
    }

    #[test]
    fn test_rejects_quotes_and_line_breaks() {
        assert!(matches!(
            SgdCommand::get("bad\"name"),
            Err(SgdError::InvalidArgument(_))
        ));
        assert!(matches!(
            SgdCommand::set("name", "two\r\nlines"),
            Err(SgdError::InvalidArgument(_))
        ));
        assert!(matches!(
            SgdCommand::get("  "),
            Err(SgdError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_value() {
        let value = parse_get_response("device.product_name", b"\"ZD421-203dpi\"\r\n").unwrap();
        assert_eq!(value, "ZD421-203dpi");
    }

    #[test]
    fn test_parse_empty_is_unknown_setting() {
        assert_eq!(
            parse_get_response("bogus.setting", b"\"\"\r\n"),
            Err(SgdError::UnknownSetting("bogus.setting".to_string()))
        );
        assert_eq!(
            parse_get_response("bogus.setting", b"\"?\""),
            Err(SgdError::UnknownSetting("bogus.setting".to_string()))
        );
    }

    #[test]
    fn test_parse_missing_quotes_is_malformed() {
        assert!(matches!(
            parse_get_response("x", b"garbage"),
            Err(SgdError::Malformed(_))
        ));
        assert!(matches!(
            parse_get_response("x", b"\"unterminated"),
            Err(SgdError::Malformed(_))
        ));
    }

    #[test]
    fn test_response_complete_needs_terminator_after_closing_quote() {
        assert!(!response_complete(b""));
        assert!(!response_complete(b"\"zp"));
        assert!(!response_complete(b"\"zpl\""));
        assert!(!response_complete(b"\"zpl\"\r"));
        assert!(response_complete(b"\"zpl\"\r\n"));
    }

    #[test]
    fn test_line_breaks_inside_value_do_not_terminate() {
        assert!(!response_complete(b"\"line one\r\nline"));
        assert!(value_complete(b"\"line one\r\nline two\""));
        assert!(!response_complete(b"\"line one\r\nline two\""));
    }

    #[test]
    fn test_multi_line_value() {
        let value = parse_get_response("allcv", b"\"line one\r\n  line two \r\n\r\n\"").unwrap();
        assert_eq!(split_lines(&value), vec!["line one", "line two"]);
    }
}
