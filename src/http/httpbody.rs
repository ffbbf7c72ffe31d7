use std::{borrow::Cow, str::Utf8Error};

/// Owned, immutable message payload.
///
/// The bytes are owned by the body, so nothing a caller holds can alias them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpBody {
    data: Box<[u8]>,
}

impl HttpBody {
    #[inline]
    pub fn new(data: Vec<u8>) -> HttpBody {
        HttpBody { data: data.into_boxed_slice() }
    }

    #[inline]
    pub fn empty() -> HttpBody {
        HttpBody::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<&[u8]> for HttpBody {
    fn from(data: &[u8]) -> Self {
        HttpBody::new(data.to_vec())
    }
}

impl From<&str> for HttpBody {
    fn from(text: &str) -> Self {
        HttpBody::from(text.as_bytes())
    }
}

impl From<String> for HttpBody {
    fn from(text: String) -> Self {
        HttpBody::new(text.into_bytes())
    }
}
