use serde::{Deserialize, Serialize};

/// A stake-program account owned by the tracked address, as fetched from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStakeAccount {
    /// Stake account address (base58).
    pub pubkey: String,
    /// Epoch in which the delegation became active, if delegated.
    pub activation_epoch: Option<u64>,
    /// Next epoch at which rent is collected from the account.
    pub rent_epoch: Option<u64>,
    /// Current balance, principal plus credited rewards.
    pub lamports: u64,
}

/// A parsed instruction inside a transaction message.
///
/// `kind` and `info` mirror the `parsed.type` / `parsed.info` pair of the
/// ledger's `jsonParsed` encoding. Instructions the node could not parse carry
/// neither.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawInstruction {
    /// Program that was invoked, if reported.
    #[serde(default, rename = "programId")]
    pub program_id: Option<String>,
    /// Parsed instruction type tag (e.g. `"transfer"`, `"createAccount"`).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Type-specific payload.
    #[serde(default)]
    pub info: Option<serde_json::Value>,
}

impl RawInstruction {
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Field lookup into `info`; `None` when the payload or field is absent.
    pub fn info_field(&self, name: &str) -> Option<&serde_json::Value> {
        self.info.as_ref()?.get(name)
    }
}

/// One confirmed transaction touching the tracked address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionRecord {
    /// Slot in which the transaction landed.
    pub slot: u64,
    /// Estimated production time (unix seconds), if the node knows it.
    #[serde(default)]
    pub block_time: Option<i64>,
    /// Top-level instructions in message order.
    #[serde(default)]
    pub instructions: Vec<RawInstruction>,
    /// Execution error from the transaction meta; `None` or JSON `null` on success.
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}

impl RawTransactionRecord {
    pub fn is_failed(&self) -> bool {
        self.err.as_ref().is_some_and(|e| !e.is_null())
    }
}

/// Inflation reward credited to one address for one epoch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardEntry {
    pub epoch: u64,
    pub effective_slot: u64,
    /// Reward amount in lamports.
    pub amount: u64,
    /// Account balance after the reward was credited.
    pub post_balance: u64,
    #[serde(default)]
    pub commission: Option<u8>,
}

/// Reads an unsigned integer from either a JSON number or a decimal string.
///
/// Token-program payloads encode amounts as strings; system-program payloads
/// use plain numbers. Floats and negatives yield `None`.
pub fn value_as_u64(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Checks that `address` is a well-formed base58 public key.
#[cfg(feature = "native")]
pub fn validate_address(address: &str) -> Result<(), crate::Error> {
    use std::str::FromStr;

    solana_pubkey::Pubkey::from_str(address)
        .map(|_| ())
        .map_err(|e| crate::Error::Parse {
            reason: format!("invalid address {address:?}: {e}"),
        })
}

/// Without the native feature only emptiness is checked.
#[cfg(not(feature = "native"))]
pub fn validate_address(address: &str) -> Result<(), crate::Error> {
    if address.trim().is_empty() {
        return Err(crate::Error::Parse {
            reason: "empty address".into(),
        });
    }
    Ok(())
}
