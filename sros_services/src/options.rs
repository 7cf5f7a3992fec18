use serde::{Deserialize, Serialize};

/// Switches controlling which optional passes run while parsing.
///
/// Every field has a default, so a partial JSON object is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Resolve QoS policy references against the policy definitions.
    pub resolve_qos_rates: bool,
    /// Copy port descriptions and ethernet settings onto access points and interfaces.
    pub attach_port_details: bool,
    /// Emit the synthetic base-router record.
    pub include_base_router: bool,
    /// Leave administratively down services out of the result.
    pub drop_admin_down_services: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            resolve_qos_rates: true,
            attach_port_details: true,
            include_base_router: true,
            drop_admin_down_services: false,
        }
    }
}

impl ParseOptions {
    pub fn with_qos_rates(mut self, enabled: bool) -> Self {
        self.resolve_qos_rates = enabled;
        self
    }

    pub fn with_port_details(mut self, enabled: bool) -> Self {
        self.attach_port_details = enabled;
        self
    }

    pub fn with_base_router(mut self, enabled: bool) -> Self {
        self.include_base_router = enabled;
        self
    }

    pub fn with_admin_down_dropped(mut self, enabled: bool) -> Self {
        self.drop_admin_down_services = enabled;
        self
    }
}
