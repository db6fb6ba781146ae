// ABOUTME: Wallet account identity - the address that partitions workflow storage

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: String,
    #[serde(default)]
    pub public_key: String,
}

impl Account {
    pub fn new(address: impl Into<String>, public_key: Option<String>) -> Self {
        Self {
            address: address.into(),
            public_key: public_key.unwrap_or_default(),
        }
    }

    /// Shortened form for display, e.g. `0x1234...abcd`
    pub fn short_address(&self) -> String {
        if self.address.len() <= 12 || !self.address.is_ascii() {
            return self.address.clone();
        }
        format!(
            "{}...{}",
            &self.address[..6],
            &self.address[self.address.len() - 4..]
        )
    }
}
