//! The delegation payload carried in a transaction.
//!
//! Wire format is a JSON object with two named fields:
//!
//! ```json
//! {"Action":"do","Delegatee":"dpos_..."}
//! ```
//!
//! `"do"` delegates, `"undo"` revokes. Decoding only checks structure; the
//! delegatee address and candidate membership are checked at execution.

use dpos_types::Gas;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DelegationError;

/// Fixed gas charged for every delegation action, whatever its outcome.
pub const BASE_GAS: Gas = Gas::new(1);

/// What the delegator wants to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ActionKind {
    #[serde(rename = "do")]
    Delegate,
    #[serde(rename = "undo")]
    Undelegate,
}

impl ActionKind {
    pub const DELEGATE_TAG: &'static str = "do";
    pub const UNDELEGATE_TAG: &'static str = "undo";

    /// The literal tag used on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Delegate => Self::DELEGATE_TAG,
            Self::Undelegate => Self::UNDELEGATE_TAG,
        }
    }

    /// Map a wire tag to a kind. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Result<Self, DelegationError> {
        match tag {
            Self::DELEGATE_TAG => Ok(Self::Delegate),
            Self::UNDELEGATE_TAG => Ok(Self::Undelegate),
            other => Err(DelegationError::InvalidActionKind(other.to_string())),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A delegate or undelegate request naming a candidate by its address string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DelegationAction {
    #[serde(rename = "Action")]
    kind: ActionKind,
    #[serde(rename = "Delegatee")]
    delegatee: String,
}

/// Wire shape before the action tag is checked.
#[derive(Deserialize)]
struct RawPayload {
    #[serde(rename = "Action")]
    action: String,
    #[serde(rename = "Delegatee")]
    delegatee: String,
}

impl DelegationAction {
    /// Build an action for a new transaction. No validation is performed.
    pub fn new(kind: ActionKind, delegatee: impl Into<String>) -> Self {
        Self {
            kind,
            delegatee: delegatee.into(),
        }
    }

    pub fn delegate(delegatee: impl Into<String>) -> Self {
        Self::new(ActionKind::Delegate, delegatee)
    }

    pub fn undelegate(delegatee: impl Into<String>) -> Self {
        Self::new(ActionKind::Undelegate, delegatee)
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// The delegatee address exactly as supplied, not yet parsed.
    pub fn delegatee(&self) -> &str {
        &self.delegatee
    }

    /// Decode a payload.
    ///
    /// Structurally invalid input or missing fields yield `MalformedPayload`;
    /// a well-formed payload with an unknown action tag yields
    /// `InvalidActionKind`.
    pub fn decode(bytes: &[u8]) -> Result<Self, DelegationError> {
        let raw: RawPayload = serde_json::from_slice(bytes)
            .map_err(|e| DelegationError::MalformedPayload(e.to_string()))?;
        let kind = ActionKind::from_tag(&raw.action)?;
        Ok(Self {
            kind,
            delegatee: raw.delegatee,
        })
    }

    /// Encode the payload for inclusion in a transaction.
    pub fn encode(&self) -> Result<Vec<u8>, DelegationError> {
        serde_json::to_vec(self).map_err(|e| DelegationError::MalformedPayload(e.to_string()))
    }

    /// Gas charged for executing this payload.
    pub fn base_gas(&self) -> Gas {
        BASE_GAS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATE: &str = "dpos_candidate";

    #[test]
    fn encodes_named_fields_in_order() {
        let action = DelegationAction::delegate(CANDIDATE);
        assert_eq!(
            action.encode().unwrap(),
            br#"{"Action":"do","Delegatee":"dpos_candidate"}"#.to_vec()
        );
        let action = DelegationAction::undelegate(CANDIDATE);
        assert_eq!(
            action.encode().unwrap(),
            br#"{"Action":"undo","Delegatee":"dpos_candidate"}"#.to_vec()
        );
    }

    #[test]
    fn encode_escapes_delegatee() {
        let action = DelegationAction::delegate("quote\" and \\ back\nslash");
        let bytes = action.encode().unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(DelegationAction::decode(&bytes).unwrap(), action);
    }

    #[test]
    fn decode_roundtrip() {
        for kind in [ActionKind::Delegate, ActionKind::Undelegate] {
            let action = DelegationAction::new(kind, CANDIDATE);
            assert_eq!(DelegationAction::decode(&action.encode().unwrap()).unwrap(), action);
        }
    }

    #[test]
    fn decode_ignores_field_order_and_whitespace() {
        let bytes = br#" { "Delegatee" : "x", "Action" : "undo" } "#;
        let action = DelegationAction::decode(bytes).unwrap();
        assert_eq!(action.kind(), ActionKind::Undelegate);
        assert_eq!(action.delegatee(), "x");
    }

    #[test]
    fn garbage_is_malformed() {
        let cases: [&[u8]; 4] = [b"", b"not json", b"[]", br#"{"Action":1,"Delegatee":"x"}"#];
        for bytes in cases {
            assert!(matches!(
                DelegationAction::decode(bytes),
                Err(DelegationError::MalformedPayload(_))
            ));
        }
    }

    #[test]
    fn missing_field_is_malformed() {
        assert!(matches!(
            DelegationAction::decode(br#"{"Action":"do"}"#),
            Err(DelegationError::MalformedPayload(_))
        ));
        assert!(matches!(
            DelegationAction::decode(br#"{"Delegatee":"x"}"#),
            Err(DelegationError::MalformedPayload(_))
        ));
    }

    #[test]
    fn unknown_tag_is_invalid_action_kind() {
        assert_eq!(
            DelegationAction::decode(br#"{"Action":"redo","Delegatee":"x"}"#),
            Err(DelegationError::InvalidActionKind("redo".into()))
        );
        // Tags are case-sensitive.
        assert_eq!(
            DelegationAction::decode(br#"{"Action":"DO","Delegatee":"x"}"#),
            Err(DelegationError::InvalidActionKind("DO".into()))
        );
    }

    #[test]
    fn construction_does_not_validate() {
        let action = DelegationAction::delegate("");
        assert_eq!(action.delegatee(), "");
        assert_eq!(DelegationAction::decode(&action.encode().unwrap()).unwrap(), action);
    }

    #[test]
    fn base_gas_is_action_independent() {
        assert_eq!(DelegationAction::delegate("a").base_gas(), BASE_GAS);
        assert_eq!(DelegationAction::undelegate("b").base_gas(), BASE_GAS);
    }
}
