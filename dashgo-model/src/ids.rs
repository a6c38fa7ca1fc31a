use std::fmt;

/// Server-assigned user identifier.
///
/// REST backends disagree on whether ids are strings or integers, so the
/// wire form accepts both and normalizes to a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId(id.to_string())
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct UserIdVisitor;

        impl serde::de::Visitor<'_> for UserIdVisitor {
            type Value = UserId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer user id")
            }

            fn visit_str<E: serde::de::Error>(
                self,
                value: &str,
            ) -> Result<UserId, E> {
                Ok(UserId(value.to_string()))
            }

            fn visit_string<E: serde::de::Error>(
                self,
                value: String,
            ) -> Result<UserId, E> {
                Ok(UserId(value))
            }

            fn visit_u64<E: serde::de::Error>(
                self,
                value: u64,
            ) -> Result<UserId, E> {
                Ok(UserId(value.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(
                self,
                value: i64,
            ) -> Result<UserId, E> {
                Ok(UserId(value.to_string()))
            }
        }

        deserializer.deserialize_any(UserIdVisitor)
    }
}
