use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Wire key of a form field (`nombres_apellidos`, `firma_digital`, ...).
///
/// Built-in schemas borrow their keys from static strings; schemas loaded
/// from JSON own theirs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(Cow<'static, str>);

impl FieldId {
    /// The multipart field that carries the exported signature image.
    pub const SIGNATURE: FieldId = FieldId::from_static("firma_digital");

    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Keys travel as multipart names, so they must be non-blank.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl PartialEq<str> for FieldId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for FieldId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn static_and_owned_keys_compare_equal() {
        assert_eq!(FieldId::from_static("ruta"), FieldId::new("ruta"));
        assert_eq!(FieldId::new(String::from("ruta")), "ruta");
    }

    #[test]
    fn signature_key_matches_wire_name() {
        assert_eq!(FieldId::SIGNATURE.as_str(), "firma_digital");
        assert_eq!(FieldId::SIGNATURE.to_string(), "firma_digital");
    }

    #[test]
    fn serializes_as_bare_string() {
        let id: FieldId = serde_json::from_str(r#""ciudad""#).unwrap();
        assert_eq!(id, "ciudad");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""ciudad""#);
        assert!(FieldId::new("  ").is_blank());
    }
}
