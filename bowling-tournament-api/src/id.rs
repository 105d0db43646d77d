//! Prefixed string identifiers.
//!
//! Every keyed row is identified by `<prefix>_<32 lowercase hex digits>`, e.g.
//! `tmt_fd99387c33d9c78aba290286576ddce5`. The prefix names the kind of row, which makes
//! mixed up foreign keys detectable without a database roundtrip.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of hex digits following the prefix.
pub const HEX_LEN: usize = 32;

/// Common behavior of all identifier types.
pub trait Identifier: Clone + Display + FromStr<Err = IdError> + PartialEq + Send + Sync {
    /// The prefix of this kind of identifier, without the trailing `_`.
    const PREFIX: &'static str;

    fn as_str(&self) -> &str;

    /// Returns `true` if the identifier has the correct prefix followed by exactly
    /// [`HEX_LEN`] lowercase hex digits.
    fn is_valid(&self) -> bool {
        check(Self::PREFIX, self.as_str()).is_ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("expected id with prefix \"{0}_\"")]
    Prefix(&'static str),
    #[error("expected 32 lowercase hex digits after the prefix")]
    Digits,
}

fn check(prefix: &'static str, s: &str) -> Result<(), IdError> {
    let rem = s
        .strip_prefix(prefix)
        .and_then(|s| s.strip_prefix('_'))
        .ok_or(IdError::Prefix(prefix))?;

    if rem.len() != HEX_LEN {
        return Err(IdError::Digits);
    }

    if !rem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(IdError::Digits);
    }

    Ok(())
}

macro_rules! id {
    ($name:ident, $prefix:expr) => {
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new random identifier.
            pub fn generate() -> Self {
                let bytes: [u8; HEX_LEN / 2] = rand::random();
                Self(format!("{}_{}", $prefix, hex::encode(bytes)))
            }
        }

        impl Identifier for $name {
            const PREFIX: &'static str = $prefix;

            #[inline]
            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            #[inline]
            fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            #[inline]
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        /// Wraps the string without checking its format. Used for values read back from
        /// storage.
        impl From<String> for $name {
            #[inline]
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                check($prefix, s)?;
                Ok(Self(s.to_owned()))
            }
        }
    };
}

id!(UserId, "usr");
id!(BowlId, "bwl");
id!(TmntId, "tmt");
id!(EventId, "evt");
id!(DivId, "div");
id!(SquadId, "sqd");
id!(LaneId, "lan");
id!(PlayerId, "ply");
id!(PotId, "pot");
id!(BrktId, "brk");
id!(OneBrktId, "obk");
id!(ElimId, "elm");
id!(DivEntryId, "den");
id!(PotEntryId, "pen");
id!(BrktEntryId, "ben");
id!(ElimEntryId, "een");
id!(StageId, "stg");

#[cfg(test)]
mod tests {
    use super::{IdError, Identifier, SquadId, TmntId};

    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_id_generate() {
        let id = TmntId::generate();
        assert!(id.as_str().starts_with("tmt_"));
        assert_eq!(id.as_str().len(), 4 + 32);
        assert!(id.is_valid());

        assert_ne!(TmntId::generate(), TmntId::generate());
    }

    #[test]
    fn test_id_parse() {
        let input = "tmt_fd99387c33d9c78aba290286576ddce5";
        assert_eq!(input.parse::<TmntId>().unwrap().as_str(), input);

        assert_eq!(
            "sqd_fd99387c33d9c78aba290286576ddce5"
                .parse::<TmntId>()
                .unwrap_err(),
            IdError::Prefix("tmt")
        );
        assert_eq!(
            "tmtfd99387c33d9c78aba290286576ddce5"
                .parse::<TmntId>()
                .unwrap_err(),
            IdError::Prefix("tmt")
        );
        assert_eq!(
            "tmt_fd99387c33d9c78aba290286576ddce"
                .parse::<TmntId>()
                .unwrap_err(),
            IdError::Digits
        );
        assert_eq!(
            "tmt_FD99387C33D9C78ABA290286576DDCE5"
                .parse::<TmntId>()
                .unwrap_err(),
            IdError::Digits
        );
        assert_eq!(
            "tmt_zd99387c33d9c78aba290286576ddce5"
                .parse::<TmntId>()
                .unwrap_err(),
            IdError::Digits
        );
    }

    #[test]
    fn test_id_is_valid() {
        assert!(!SquadId::from(String::new()).is_valid());
        assert!(!SquadId::from(String::from("tmt_fd99387c33d9c78aba290286576ddce5")).is_valid());
        assert!(SquadId::from(String::from("sqd_fd99387c33d9c78aba290286576ddce5")).is_valid());
    }

    #[test]
    fn test_id_serialize() {
        let id: SquadId = "sqd_0123456789abcdef0123456789abcdef".parse().unwrap();
        assert_tokens(&id, &[Token::Str("sqd_0123456789abcdef0123456789abcdef")]);
    }
}
