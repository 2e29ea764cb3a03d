use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};
use crate::path::check_segment;

macro_rules! segment_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting values that cannot be used as a
            /// single document path segment.
            pub fn new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                check_segment(&value).map_err(|reason| TypeError::InvalidId {
                    value: value.clone(),
                    reason,
                })?;
                Ok(Self(value))
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeError;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

segment_id! {
    /// Identifier of a profile document, normally the owner's auth uid.
    ProfileId
}

segment_id! {
    /// Identifier of a custom link. Assigned by the document store and used
    /// as the key under `links/custom`; never stored inside the link value.
    LinkId
}
