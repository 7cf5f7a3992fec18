//! QoS policy rates and their lookup seam.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sros_ir::{Line, extract_block};
use tracing::trace;

use crate::model::QosReference;
use crate::patterns::{LEADING_NUMBER, PIR, QOS_POLICY_OPEN, RATE, capture};

/// Direction a QoS policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QosDirection {
    Ingress,
    Egress,
}

/// Rate granted by a QoS policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyRate {
    pub rate_kbps: Option<u64>,
    /// The policy only sets `rate max` (unbounded).
    pub rate_max: bool,
}

/// Source of policy rates used to resolve [`QosReference`]s.
pub trait QosPolicyLookup {
    fn policy_rate(&self, direction: QosDirection, policy_id: u32) -> Option<PolicyRate>;

    /// Fill in the rate of `reference` when the policy is known.
    fn resolve(&self, direction: QosDirection, reference: &mut QosReference) {
        if let Some(rate) = self.policy_rate(direction, reference.policy_id) {
            reference.rate_kbps = rate.rate_kbps;
            reference.rate_max = rate.rate_max;
        }
    }
}

/// Lookup that knows no policies.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoQosPolicies;

impl QosPolicyLookup for NoQosPolicies {
    fn policy_rate(&self, _direction: QosDirection, _policy_id: u32) -> Option<PolicyRate> {
        None
    }
}

/// Policy rates read from `sap-ingress` / `sap-egress` definitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QosPolicyTable {
    policies: HashMap<(QosDirection, u32), PolicyRate>,
}

impl QosPolicyTable {
    /// Scan `sap-ingress <id> create` and `sap-egress <id> create` blocks.
    ///
    /// The policy rate is the largest `rate` found in the block, taken from
    /// its `pir` value or its leading number. A policy whose only rates are
    /// `max` is recorded as unbounded. The first definition of an id wins.
    pub fn from_lines(lines: &[Line]) -> Self {
        let mut table = Self::default();

        for (idx, line) in lines.iter().enumerate() {
            let Some(caps) = QOS_POLICY_OPEN.captures(&line.raw) else {
                continue;
            };
            let direction = if caps[1].eq_ignore_ascii_case("ingress") {
                QosDirection::Ingress
            } else {
                QosDirection::Egress
            };
            let Ok(policy_id) = caps[2].parse::<u32>() else {
                continue;
            };
            let Some(block) = extract_block(lines, idx) else {
                continue;
            };

            let mut max_rate = 0u64;
            let mut is_max = false;
            for line in &block.lines()[1..] {
                let Some(rest) = capture(&RATE, line.trimmed()) else {
                    continue;
                };
                if rest.to_ascii_lowercase().contains("max") {
                    is_max = true;
                }
                let value = capture(&PIR, rest)
                    .or_else(|| capture(&LEADING_NUMBER, rest))
                    .and_then(|value| value.parse::<u64>().ok());
                if let Some(value) = value {
                    max_rate = max_rate.max(value);
                }
            }

            let rate = if max_rate > 0 {
                PolicyRate {
                    rate_kbps: Some(max_rate),
                    rate_max: false,
                }
            } else if is_max {
                PolicyRate {
                    rate_kbps: None,
                    rate_max: true,
                }
            } else {
                continue;
            };
            trace!(?direction, policy_id, ?rate, "qos policy rate");
            table.policies.entry((direction, policy_id)).or_insert(rate);
        }

        table
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Add or replace one policy rate.
    pub fn insert(&mut self, direction: QosDirection, policy_id: u32, rate: PolicyRate) {
        self.policies.insert((direction, policy_id), rate);
    }
}

impl QosPolicyLookup for QosPolicyTable {
    fn policy_rate(&self, direction: QosDirection, policy_id: u32) -> Option<PolicyRate> {
        self.policies.get(&(direction, policy_id)).copied()
    }
}
