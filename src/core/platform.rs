//! Target platforms.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A native platform autolinking can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Macos,
    Tvos,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 4] = [
        Platform::Android,
        Platform::Ios,
        Platform::Macos,
        Platform::Tvos,
    ];

    /// Name used in module configs and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Macos => "macos",
            Platform::Tvos => "tvos",
        }
    }

    /// Whether this is one of the Apple platforms (CocoaPods based).
    pub fn is_apple(&self) -> bool {
        matches!(self, Platform::Ios | Platform::Macos | Platform::Tvos)
    }

    /// Directory of the native project relative to the app root.
    pub fn native_dir(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios | Platform::Tvos => "ios",
            Platform::Macos => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" | "apple" => Ok(Platform::Ios),
            "macos" => Ok(Platform::Macos),
            "tvos" => Ok(Platform::Tvos),
            _ => Err(format!(
                "unknown platform '{}'; expected 'android', 'ios', 'macos', or 'tvos'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform() {
        assert_eq!("android".parse::<Platform>().unwrap(), Platform::Android);
        assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("apple".parse::<Platform>().unwrap(), Platform::Ios);
        assert!("web".parse::<Platform>().is_err());
    }

    #[test]
    fn test_native_dir() {
        assert_eq!(Platform::Android.native_dir(), "android");
        assert_eq!(Platform::Tvos.native_dir(), "ios");
        assert!(Platform::Macos.is_apple());
        assert!(!Platform::Android.is_apple());
    }
}
