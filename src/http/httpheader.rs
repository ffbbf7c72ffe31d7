/// Header fields of a message.
///
/// A name maps to every value stored under it, in insertion order. Names are
/// matched case-insensitively and kept in Title-Case, the casing of the first
/// insertion being normalized with [`to_title_case`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeader {
    fields: Vec<(String, Vec<String>)>,
}

impl HttpHeader {
    #[inline]
    pub fn new() -> HttpHeader {
        HttpHeader { fields: Vec::new() }
    }

    //  Appends the value, never overwrites an earlier one
    pub fn put(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(name) {
            Some(index) => self.fields[index].1.push(value),
            None => self.fields.push((to_title_case(name), vec![value])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|index| self.fields[index].1.as_slice())
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(stored, _)| stored.eq_ignore_ascii_case(name))
    }
}

/// Normalizes a header name to Title-Case: `content-type` and `CONTENT-TYPE`
/// both become `Content-Type`.
pub fn to_title_case(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
