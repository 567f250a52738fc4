//! Plan allowances and the usage gate policy.
//!
//! Plans carry their limits as string metadata on the billing product:
//! `credits` bounds generated sessions, `brand_limit` bounds active brands.
//! Either may be the sentinel `"Unlimited"`.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::providers::PlanProduct;

pub const CREDITS_KEY: &str = "credits";
pub const BRAND_LIMIT_KEY: &str = "brand_limit";
pub const UNLIMITED: &str = "Unlimited";

// ---------------------------------------------------------------------------
// Allowance
// ---------------------------------------------------------------------------

/// How many of something a plan permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditAllowance {
    Limited(u64),
    Unlimited,
}

impl CreditAllowance {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        if raw == UNLIMITED {
            return Ok(Self::Unlimited);
        }
        raw.parse::<u64>().map(Self::Limited).map_err(|_| {
            CoreError::Validation(format!(
                "Invalid allowance '{raw}': expected a non-negative integer or '{UNLIMITED}'"
            ))
        })
    }

    /// Units left after `used`. `None` when unlimited.
    pub fn remaining(self, used: u64) -> Option<u64> {
        match self {
            Self::Limited(limit) => Some(limit.saturating_sub(used)),
            Self::Unlimited => None,
        }
    }
}

impl Serialize for CreditAllowance {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Limited(limit) => serializer.serialize_u64(*limit),
            Self::Unlimited => serializer.serialize_str(UNLIMITED),
        }
    }
}

/// Limits read from a plan's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanMetadata {
    pub credits: CreditAllowance,
    pub brand_limit: CreditAllowance,
}

impl PlanMetadata {
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Result<Self, CoreError> {
        Ok(Self {
            credits: required_allowance(metadata, CREDITS_KEY)?,
            brand_limit: required_allowance(metadata, BRAND_LIMIT_KEY)?,
        })
    }
}

fn required_allowance(
    metadata: &HashMap<String, String>,
    key: &str,
) -> Result<CreditAllowance, CoreError> {
    let raw = metadata
        .get(key)
        .ok_or_else(|| CoreError::Validation(format!("Plan metadata is missing '{key}'")))?;
    CreditAllowance::parse(raw)
}

/// The plan whose price matches `price_id`.
pub fn find_plan<'a>(plans: &'a [PlanProduct], price_id: &str) -> Option<&'a PlanProduct> {
    plans.iter().find(|plan| plan.price_id == price_id)
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The customer has no active subscription.
    NoSubscription,
    /// The plan allowance is used up.
    LimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageDecision {
    Allow,
    Deny(DenyReason),
}

impl UsageDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Allow while `used` is strictly below the limit.
pub fn evaluate(allowance: CreditAllowance, used: u64) -> UsageDecision {
    match allowance {
        CreditAllowance::Unlimited => UsageDecision::Allow,
        CreditAllowance::Limited(limit) if used < limit => UsageDecision::Allow,
        CreditAllowance::Limited(_) => UsageDecision::Deny(DenyReason::LimitReached),
    }
}

/// Credit usage as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub plan_name: String,
    pub allowance: CreditAllowance,
    pub used: u64,
    /// `null` for unlimited plans.
    pub remaining: Option<u64>,
}

impl UsageSummary {
    pub fn new(plan_name: impl Into<String>, allowance: CreditAllowance, used: u64) -> Self {
        Self {
            plan_name: plan_name.into(),
            allowance,
            used,
            remaining: allowance.remaining(used),
        }
    }
}
