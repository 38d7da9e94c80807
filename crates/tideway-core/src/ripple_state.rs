//! Ripple-state entry to trust-line translation.
//!
//! A ripple-state ledger entry stores one bidirectional balance-and-limit
//! relationship shared by two accounts, the "low" and "high" sides (by
//! address ordering). Callers think in one-sided trust lines, so this module
//! re-expresses an entry from the perspective of one queried account.
//!
//! An entry is only a real, listable trust line for a given side when that
//! side's reserve flag is set; entries in default state are not trust lines
//! at all and are filtered out, never returned as zero-limit lines. The same
//! function serves the single-pair lookup and the bulk paginated listing so
//! the two paths cannot disagree.

use serde::{Deserialize, Serialize};

/// Ledger flag bits on a ripple-state entry.
pub mod flags {
    /// The low side contributes to its owner reserve (line is non-default
    /// for the low account).
    pub const LOW_RESERVE: u32 = 0x0001_0000;
    /// The high side contributes to its owner reserve.
    pub const HIGH_RESERVE: u32 = 0x0002_0000;
    /// The low side has authorized the line.
    pub const LOW_AUTH: u32 = 0x0004_0000;
    /// The high side has authorized the line.
    pub const HIGH_AUTH: u32 = 0x0008_0000;
    /// Rippling disabled on the low side.
    pub const LOW_NO_RIPPLE: u32 = 0x0010_0000;
    /// Rippling disabled on the high side.
    pub const HIGH_NO_RIPPLE: u32 = 0x0020_0000;
    /// The low side has frozen the line.
    pub const LOW_FREEZE: u32 = 0x0040_0000;
    /// The high side has frozen the line.
    pub const HIGH_FREEZE: u32 = 0x0080_0000;
}

/// An issued-asset amount: currency, issuer, decimal value as text.
///
/// Values stay textual; the ledger's decimal range exceeds `f64` and this
/// runtime never does arithmetic on them beyond sign normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedAmount {
    /// Currency code.
    pub currency: String,
    /// Issuer address. On ripple-state limits this doubles as the owning
    /// side's account address.
    pub issuer: String,
    /// Decimal value as text, possibly negative.
    pub value: String,
}

/// A raw ripple-state ledger entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RippleState {
    /// Shared balance, stored from the low side's perspective.
    #[serde(rename = "Balance")]
    pub balance: IssuedAmount,
    /// Entry flag bits.
    #[serde(rename = "Flags")]
    pub flags: u32,
    /// The low side's limit; its issuer field is the low account address.
    #[serde(rename = "LowLimit")]
    pub low_limit: IssuedAmount,
    /// The high side's limit; its issuer field is the high account address.
    #[serde(rename = "HighLimit")]
    pub high_limit: IssuedAmount,
    /// Inbound quality set by the low side.
    #[serde(rename = "LowQualityIn", default)]
    pub low_quality_in: Option<u32>,
    /// Outbound quality set by the low side.
    #[serde(rename = "LowQualityOut", default)]
    pub low_quality_out: Option<u32>,
    /// Inbound quality set by the high side.
    #[serde(rename = "HighQualityIn", default)]
    pub high_quality_in: Option<u32>,
    /// Outbound quality set by the high side.
    #[serde(rename = "HighQualityOut", default)]
    pub high_quality_out: Option<u32>,
}

/// A trust line seen from one account's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustLine {
    /// The queried account.
    pub account: String,
    /// The counterpart account.
    pub issuer: String,
    /// Currency code of the line.
    pub currency: String,
    /// Balance from the queried account's perspective (positive means the
    /// counterpart owes the queried account).
    pub balance: String,
    /// The queried account's limit toward the counterpart.
    pub limit: String,
    /// The counterpart's limit toward the queried account.
    pub limit_peer: String,
    /// Inbound quality set by the queried account (0 = face value).
    pub quality_in: u32,
    /// Outbound quality set by the queried account (0 = face value).
    pub quality_out: u32,
    /// The queried account has authorized the line.
    pub authorized: bool,
    /// The counterpart has frozen the line.
    pub frozen: bool,
    /// The line represents an issuer obligation rather than a holding.
    /// Never set by this translator; obligations come from the gateway
    /// balances query.
    pub obligation: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Low,
    High,
}

/// Translate a ripple-state entry into the queried account's trust line.
///
/// Returns `None` when the account is not a party to the entry, or when the
/// account's side of the entry is in default state (its reserve flag is
/// unset) and therefore not a listable trust line.
pub fn trust_line(entry: &RippleState, account: &str) -> Option<TrustLine> {
    let side = if entry.low_limit.issuer == account {
        Side::Low
    } else if entry.high_limit.issuer == account {
        Side::High
    } else {
        return None;
    };

    let reserve_flag = match side {
        Side::Low => flags::LOW_RESERVE,
        Side::High => flags::HIGH_RESERVE,
    };
    if entry.flags & reserve_flag == 0 {
        // Default state: no trust line from this side's point of view.
        return None;
    }

    let (own_limit, peer_limit) = match side {
        Side::Low => (&entry.low_limit, &entry.high_limit),
        Side::High => (&entry.high_limit, &entry.low_limit),
    };

    let balance = match side {
        Side::Low => entry.balance.value.clone(),
        Side::High => negated(&entry.balance.value),
    };

    let (quality_in, quality_out) = match side {
        Side::Low => (entry.low_quality_in, entry.low_quality_out),
        Side::High => (entry.high_quality_in, entry.high_quality_out),
    };

    let (auth_flag, peer_freeze_flag) = match side {
        Side::Low => (flags::LOW_AUTH, flags::HIGH_FREEZE),
        Side::High => (flags::HIGH_AUTH, flags::LOW_FREEZE),
    };

    Some(TrustLine {
        account: account.to_owned(),
        issuer: peer_limit.issuer.clone(),
        currency: entry.balance.currency.clone(),
        balance,
        limit: own_limit.value.clone(),
        limit_peer: peer_limit.value.clone(),
        quality_in: quality_in.unwrap_or(0),
        quality_out: quality_out.unwrap_or(0),
        authorized: entry.flags & auth_flag != 0,
        frozen: entry.flags & peer_freeze_flag != 0,
        obligation: false,
    })
}

/// Flip the sign of a textual decimal, leaving zero untouched.
fn negated(value: &str) -> String {
    if let Some(positive) = value.strip_prefix('-') {
        return positive.to_owned();
    }
    if value.chars().all(|c| matches!(c, '0' | '.')) {
        return value.to_owned();
    }
    format!("-{value}")
}
