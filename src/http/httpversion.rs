use std::{
    fmt::{Display, Formatter, Result},
    str::FromStr,
};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    Http09,
    Http10,
    Http11,
    H2,
    H3,
}

impl HttpVersion {
    const ALL: [HttpVersion; 5] = [Self::Http09, Self::Http10, Self::Http11, Self::H2, Self::H3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http09 => "HTTP/0.9",
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
            Self::H2 => "HTTP/2.0",
            Self::H3 => "HTTP/3.0",
        }
    }

    /// Major protocol number, `0` for HTTP/0.9.
    pub fn major(&self) -> u8 {
        match self {
            Self::Http09 => 0,
            Self::Http10 | Self::Http11 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
        }
    }
}

impl Display for HttpVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseError> {
        Self::ALL
            .into_iter()
            .find(|version| version.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnsupportedVersion { version: s.to_string() })
    }
}
