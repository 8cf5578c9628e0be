//! Character encodings for `char`, `string`, and `fixed_string`.

use std::fmt;
use std::str::FromStr;

use datashape_common::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    Ascii,
    Utf8,
    Utf16,
    Utf32,
    Ucs2,
}

impl Encoding {
    /// Width of one code unit in bytes.
    #[must_use]
    pub const fn unit(self) -> u64 {
        match self {
            Encoding::Ascii | Encoding::Utf8 => 1,
            Encoding::Utf16 | Encoding::Ucs2 => 2,
            Encoding::Utf32 => 4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::Utf8 => "utf8",
            Encoding::Utf16 => "utf16",
            Encoding::Utf32 => "utf32",
            Encoding::Ucs2 => "ucs2",
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "ascii" => Ok(Encoding::Ascii),
            "utf8" => Ok(Encoding::Utf8),
            "utf16" => Ok(Encoding::Utf16),
            "utf32" => Ok(Encoding::Utf32),
            "ucs2" => Ok(Encoding::Ucs2),
            _ => Err(Error::value(format!("invalid encoding '{s}'"))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
