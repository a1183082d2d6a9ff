//! Build metadata embedded by `build.rs`

use serde::Serialize;

pub const BUILD_NUMBER: u64 = match option_env!("NUTRILABEL_BUILD_NUMBER") {
    Some(s) => match parse_u64(s) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

/// UTC, `%Y-%m-%dT%H:%M:%SZ`
pub const BUILD_TIMESTAMP: &str = match option_env!("NUTRILABEL_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

const fn parse_u64(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut result: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < b'0' || b > b'9' {
            return None;
        }
        result = result * 10 + (b - b'0') as u64;
        i += 1;
    }
    Some(result)
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub description: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            description: DESCRIPTION,
        }
    }

    /// `nutrilabel 1.0.0 (build 42)`
    pub fn label(&self) -> String {
        format!("{} {} (build {})", self.name, self.version, self.build_number)
    }
}

/// Banner written to stderr before the server starts
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("-- {} --", info.label());
    eprintln!("   {}", info.description);
    eprintln!("   compiled {}", info.build_timestamp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("42"), Some(42));
        assert_eq!(parse_u64("0"), Some(0));
        assert_eq!(parse_u64(""), None);
        assert_eq!(parse_u64("4x2"), None);
    }

    #[test]
    fn test_label() {
        let info = BuildInfo {
            build_number: 7,
            ..BuildInfo::current()
        };
        assert_eq!(info.label(), format!("nutrilabel {} (build 7)", VERSION));
    }
}
