//! C8 — AuthPrincipal: a validated caller presented to the core. The core
//! does not re-authenticate; it only gates operations by the variant tag.

use secret_store::types::ClientId;

/// An authenticated principal, either an automation client (mTLS) or an
/// operator (login). Tagged variant, not inheritance (spec.md §4.8 / §9).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthPrincipal {
    /// Asserted by mutual-TLS CN matching a row in `clients` with
    /// `automation = true`.
    AutomationClient { id: ClientId, name: String },
    /// Operator-auth principal; only the name is consumed by the core.
    OperatorUser { name: String },
}

impl AuthPrincipal {
    pub fn name(&self) -> &str {
        match self {
            Self::AutomationClient { name, .. } => name,
            Self::OperatorUser { name } => name,
        }
    }

    pub fn client_id(&self) -> Option<ClientId> {
        match self {
            Self::AutomationClient { id, .. } => Some(*id),
            Self::OperatorUser { .. } => None,
        }
    }

    pub fn is_automation_client(&self) -> bool {
        matches!(self, Self::AutomationClient { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_available_for_both_variants() {
        let automation = AuthPrincipal::AutomationClient { id: ClientId(1), name: "shuttle".into() };
        let operator = AuthPrincipal::OperatorUser { name: "admin".into() };
        assert_eq!(automation.name(), "shuttle");
        assert_eq!(operator.name(), "admin");
    }

    #[test]
    fn only_automation_clients_carry_a_client_id() {
        let automation = AuthPrincipal::AutomationClient { id: ClientId(7), name: "shuttle".into() };
        let operator = AuthPrincipal::OperatorUser { name: "admin".into() };
        assert_eq!(automation.client_id(), Some(ClientId(7)));
        assert_eq!(operator.client_id(), None);
        assert!(automation.is_automation_client());
        assert!(!operator.is_automation_client());
    }
}
