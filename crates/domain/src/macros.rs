//! Macro for implementing Display and FromStr for wire-keyword enums
//!
//! Regions, API families and update operations all travel as short lowercase
//! strings. This macro provides both conversions from a single table so the
//! wire spelling lives in exactly one place.
//!
//! # Example
//!
//! ```rust
//! use mixpanel_domain::impl_wire_str_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Zone {
//!     North,
//!     South,
//! }
//!
//! impl_wire_str_conversions!(Zone {
//!     North => "north",
//!     South => "south",
//! });
//!
//! assert_eq!(Zone::North.to_string(), "north");
//! assert_eq!("SOUTH".parse::<Zone>().unwrap(), Zone::South);
//! ```

/// Implements Display, FromStr and `as_str` for keyword enums
///
/// Parsing is case-insensitive and ignores surrounding whitespace; the error
/// message names the enum so configuration errors point at the bad field.
#[macro_export]
macro_rules! impl_wire_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire spelling of this value.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase();
                $(
                    if normalized == $str.to_lowercase() {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
