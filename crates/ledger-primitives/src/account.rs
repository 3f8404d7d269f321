//! Account identifiers for the fixed five-account ledger.

use std::fmt;
use thiserror::Error;

/// Number of accounts in the ledger. Fixed by the protocol; not configurable.
pub const NUM_ACCOUNTS: u8 = 5;

/// The starting balance of every account at genesis.
pub const GENESIS_BALANCE: u64 = 100;

/// Error returned when an account id falls outside `[1, NUM_ACCOUNTS]`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("account id {0} is out of range 1..={NUM_ACCOUNTS}")]
pub struct AccountIdError(pub u8);

/// An account identifier, always within `[1, 5]`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(u8);

impl AccountId {
    /// Construct an `AccountId`, validating the range.
    pub fn new(id: u8) -> Result<Self, AccountIdError> {
        if (1..=NUM_ACCOUNTS).contains(&id) {
            Ok(AccountId(id))
        } else {
            Err(AccountIdError(id))
        }
    }

    /// All five account ids, in order.
    pub fn all() -> impl Iterator<Item = AccountId> {
        (1..=NUM_ACCOUNTS).map(AccountId)
    }

    /// The raw numeric id.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for AccountId {
    type Error = AccountIdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        AccountId::new(value)
    }
}

impl From<AccountId> for u8 {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::AccountId;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for AccountId {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.0.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for AccountId {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = u8::deserialize(deserializer)?;
            AccountId::new(raw).map_err(D::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_in_range_ids() {
        for id in 1..=5u8 {
            assert_eq!(AccountId::new(id).unwrap().get(), id);
        }
    }

    #[test]
    fn rejects_zero_and_six() {
        assert!(AccountId::new(0).is_err());
        assert!(AccountId::new(6).is_err());
    }

    #[test]
    fn all_yields_five_in_order() {
        let ids: Vec<u8> = AccountId::all().map(|a| a.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
