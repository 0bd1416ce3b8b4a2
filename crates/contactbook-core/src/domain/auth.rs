use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the current process may read the contact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStatus::NotDetermined => "not_determined",
            AuthStatus::Restricted => "restricted",
            AuthStatus::Denied => "denied",
            AuthStatus::Authorized => "authorized",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
