//! Value objects of the room domain.
//!
//! Every value object validates itself on construction, so code holding one
//! never re-checks it.

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

const MAX_ID_LENGTH: usize = 64;
const MAX_DISPLAY_NAME_LENGTH: usize = 50;
const MAX_CHAT_LENGTH: usize = 1000;

fn validate_identifier(field: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    if value.chars().count() > MAX_ID_LENGTH {
        return Err(ValueObjectError::TooLong {
            field,
            max: MAX_ID_LENGTH,
        });
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValueObjectError::InvalidCharacters(field));
    }
    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate_identifier($field, &value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Identifier of a collaborative quiz room (e.g. `R1`)
    RoomId,
    "room id"
);

identifier!(
    /// Identifier of a quiz in the quiz store
    QuizId,
    "quiz id"
);

identifier!(
    /// Stable identity of a participant, issued by the identity provider
    ParticipantId,
    "participant id"
);

/// Generates fresh room identifiers
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> RoomId {
        RoomId(uuid::Uuid::new_v4().simple().to_string())
    }
}

/// Identifier of one websocket connection.
///
/// A participant who reconnects gets a new connection id while keeping the
/// same [`ParticipantId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human readable participant name shown to other players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::Empty("display name"));
        }
        if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(ValueObjectError::TooLong {
                field: "display name",
                max: MAX_DISPLAY_NAME_LENGTH,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque bearer credential supplied at connect time
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("auth token"));
        }
        Ok(Self(value))
    }

    /// Extract the token from an `Authorization: Bearer <token>` header value
    pub fn from_bearer_header(header: &str) -> Result<Self, ValueObjectError> {
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ValueObjectError::MissingBearerScheme)?;
        Self::new(token.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens must never end up in logs.
impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Zero-based index of an answer option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionIndex(usize);

impl OptionIndex {
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

/// Body of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatText(String);

impl ChatText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("chat message"));
        }
        if value.chars().count() > MAX_CHAT_LENGTH {
            return Err(ValueObjectError::TooLong {
                field: "chat message",
                max: MAX_CHAT_LENGTH,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ChatText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_accepts_simple_identifier() {
        // given:
        let value = "R1".to_string();

        // when:
        let result = RoomId::new(value);

        // then:
        assert_eq!(result.unwrap().as_str(), "R1");
    }

    #[test]
    fn test_room_id_rejects_empty_and_invalid_values() {
        assert_eq!(
            RoomId::new("   ".to_string()),
            Err(ValueObjectError::Empty("room id"))
        );
        assert_eq!(
            RoomId::new("room 1".to_string()),
            Err(ValueObjectError::InvalidCharacters("room id"))
        );
        assert_eq!(
            RoomId::new("x".repeat(65)),
            Err(ValueObjectError::TooLong {
                field: "room id",
                max: 64
            })
        );
    }

    #[test]
    fn test_generated_room_ids_are_valid_and_unique() {
        // when:
        let first = RoomIdFactory::generate();
        let second = RoomIdFactory::generate();

        // then:
        assert!(RoomId::new(first.as_str().to_string()).is_ok());
        assert_ne!(first, second);
    }

    #[test]
    fn test_display_name_is_trimmed() {
        // when:
        let name = DisplayName::new("  Alice  ".to_string()).unwrap();

        // then:
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn test_auth_token_from_bearer_header() {
        // when:
        let token = AuthToken::from_bearer_header("Bearer secret-1").unwrap();

        // then:
        assert_eq!(token.as_str(), "secret-1");
        assert!(AuthToken::from_bearer_header("Basic abc").is_err());
        assert!(AuthToken::from_bearer_header("Bearer   ").is_err());
    }

    #[test]
    fn test_auth_token_debug_is_redacted() {
        // given:
        let token = AuthToken::new("secret-1".to_string()).unwrap();

        // when:
        let debug = format!("{:?}", token);

        // then:
        assert!(!debug.contains("secret-1"));
    }

    #[test]
    fn test_chat_text_length_limits() {
        assert!(ChatText::new("hi".to_string()).is_ok());
        assert_eq!(
            ChatText::new(" ".to_string()),
            Err(ValueObjectError::Empty("chat message"))
        );
        assert!(ChatText::new("a".repeat(1001)).is_err());
    }
}
