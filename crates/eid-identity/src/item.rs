//! Identity items and authentication states.

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::IdentityError;
use crate::wire;

/// Authentication state of an identity item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuthenticatedState {
    /// Not known whether the user is authenticated
    #[default]
    Ambiguous,
    /// User is authenticated
    Authenticated,
    /// User was authenticated and has logged out
    LoggedOut,
}

impl AuthenticatedState {
    /// Wire name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticatedState::Ambiguous => "ambiguous",
            AuthenticatedState::Authenticated => "authenticated",
            AuthenticatedState::LoggedOut => "loggedOut",
        }
    }

    /// Parse a wire name. Unknown names resolve to `Ambiguous`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "authenticated" => AuthenticatedState::Authenticated,
            "loggedOut" => AuthenticatedState::LoggedOut,
            _ => AuthenticatedState::Ambiguous,
        }
    }
}

impl fmt::Display for AuthenticatedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuthenticatedState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuthenticatedState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(name.map_or(AuthenticatedState::Ambiguous, |n| Self::from_name(&n)))
    }
}

/// A single identity within a namespace.
///
/// Equality and hashing use only the id, compared ASCII case-insensitively.
/// The authenticated state and primary flag are payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityItem {
    id: String,
    #[serde(default)]
    authenticated_state: AuthenticatedState,
    #[serde(default)]
    primary: bool,
}

impl IdentityItem {
    /// Create an ambiguous, non-primary item.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_state(id, AuthenticatedState::Ambiguous, false)
    }

    /// Create an item with an explicit state and primary flag.
    pub fn with_state(id: impl Into<String>, state: AuthenticatedState, primary: bool) -> Self {
        Self {
            id: id.into(),
            authenticated_state: state,
            primary,
        }
    }

    /// Create an item from possibly-absent host input.
    ///
    /// A missing state defaults to `Ambiguous`.
    pub fn try_new(
        id: Option<String>,
        state: Option<AuthenticatedState>,
        primary: bool,
    ) -> Result<Self, IdentityError> {
        let id = id.ok_or(IdentityError::MissingId)?;
        Ok(Self::with_state(id, state.unwrap_or_default(), primary))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn authenticated_state(&self) -> AuthenticatedState {
        self.authenticated_state
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub(crate) fn to_wire(&self) -> Value {
        let mut object = Map::new();
        object.insert(wire::ID.into(), Value::String(self.id.clone()));
        object.insert(
            wire::AUTHENTICATED_STATE.into(),
            Value::String(self.authenticated_state.as_str().into()),
        );
        object.insert(wire::PRIMARY.into(), Value::Bool(self.primary));
        Value::Object(object)
    }

    /// Decode an item from its wire object.
    ///
    /// Returns `None` when the id is missing or not a string, when the
    /// authenticated state is present with a non-string value, or when the
    /// primary flag is present with a non-boolean value.
    pub(crate) fn from_wire(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = match object.get(wire::ID) {
            Some(Value::String(id)) => id.clone(),
            _ => {
                debug!("IdentityItem: skipping entry without a string id");
                return None;
            }
        };

        let state = match object.get(wire::AUTHENTICATED_STATE) {
            None | Some(Value::Null) => AuthenticatedState::Ambiguous,
            Some(Value::String(name)) => AuthenticatedState::from_name(name),
            Some(_) => {
                debug!(id = %id, "IdentityItem: skipping entry with non-string authenticated state");
                return None;
            }
        };

        let primary = match object.get(wire::PRIMARY) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(primary)) => *primary,
            Some(_) => {
                debug!(id = %id, "IdentityItem: skipping entry with non-boolean primary flag");
                return None;
            }
        };

        Some(Self::with_state(id, state, primary))
    }
}

impl PartialEq for IdentityItem {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id)
    }
}

impl Eq for IdentityItem {}

impl Hash for IdentityItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.id.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}
