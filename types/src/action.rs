//! Typed interaction protocol.
//!
//! Buttons carry a versioned token `v1:<kind>:<request-id>[:<arg>]` and the
//! live-results link carries `r1_<request-id>`. Both are decoded once, at the
//! router boundary, into [`CallbackAction`] / [`DeepLink`].

use crate::error::DecodeError;
use crate::id::RequestId;
use crate::vote::{AdminAction, VoteChoice};

const CALLBACK_VERSION: &str = "v1";
const DEEP_LINK_PREFIX: &str = "r1_";

/// An action encoded in an inline button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Approve / Reject / Ban on the request card.
    Admin { id: RequestId, action: AdminAction },
    /// A yes/no button on a per-voter ballot.
    Vote { id: RequestId, choice: VoteChoice },
    /// "Status" on the request card.
    Status { id: RequestId },
}

impl CallbackAction {
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Admin { id, .. } | Self::Vote { id, .. } | Self::Status { id } => *id,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Admin { id, action } => {
                format!("{CALLBACK_VERSION}:a:{}:{}", id.to_simple(), action.as_str())
            }
            Self::Vote { id, choice } => {
                format!("{CALLBACK_VERSION}:v:{}:{}", id.to_simple(), choice.as_str())
            }
            Self::Status { id } => format!("{CALLBACK_VERSION}:s:{}", id.to_simple()),
        }
    }

    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        let mut parts = data.split(':');
        let version = parts.next().ok_or(DecodeError::Malformed)?;
        if version != CALLBACK_VERSION {
            return Err(DecodeError::UnsupportedVersion(version.to_string()));
        }
        let kind = parts.next().ok_or(DecodeError::Malformed)?;
        let raw_id = parts.next().ok_or(DecodeError::Malformed)?;
        let id = RequestId::parse(raw_id)
            .ok_or_else(|| DecodeError::InvalidRequestId(raw_id.to_string()))?;
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(DecodeError::Malformed);
        }

        match (kind, arg) {
            ("a", Some(arg)) => AdminAction::parse(arg)
                .map(|action| Self::Admin { id, action })
                .ok_or_else(|| DecodeError::InvalidArgument(arg.to_string())),
            ("v", Some(arg)) => VoteChoice::parse(arg)
                .map(|choice| Self::Vote { id, choice })
                .ok_or_else(|| DecodeError::InvalidArgument(arg.to_string())),
            ("s", None) => Ok(Self::Status { id }),
            ("a", None) | ("v", None) | ("s", Some(_)) => Err(DecodeError::Malformed),
            (other, _) => Err(DecodeError::UnknownKind(other.to_string())),
        }
    }
}

/// A `/start` payload understood by the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeepLink {
    LiveResult(RequestId),
}

impl DeepLink {
    pub fn encode(&self) -> String {
        match self {
            Self::LiveResult(id) => format!("{DEEP_LINK_PREFIX}{}", id.to_simple()),
        }
    }

    pub fn decode(payload: &str) -> Result<Self, DecodeError> {
        let raw_id = payload
            .strip_prefix(DEEP_LINK_PREFIX)
            .ok_or_else(|| DecodeError::UnknownKind(payload.to_string()))?;
        RequestId::parse(raw_id)
            .map(Self::LiveResult)
            .ok_or_else(|| DecodeError::InvalidRequestId(raw_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_tokens_fit_platform_limit() {
        let id = RequestId::new();
        let longest = CallbackAction::Admin {
            id,
            action: AdminAction::Approve,
        };
        assert!(longest.encode().len() <= 64);
    }

    #[test]
    fn admin_token_decodes() {
        let id = RequestId::new();
        let data = format!("v1:a:{}:ban", id.to_simple());
        assert_eq!(
            CallbackAction::decode(&data),
            Ok(CallbackAction::Admin {
                id,
                action: AdminAction::Ban
            })
        );
    }

    #[test]
    fn status_token_takes_no_argument() {
        let id = RequestId::new();
        let data = format!("v1:s:{}:extra", id.to_simple());
        assert_eq!(CallbackAction::decode(&data), Err(DecodeError::Malformed));
    }

    #[test]
    fn rejects_unknown_versions_and_kinds() {
        let id = RequestId::new().to_simple();
        assert!(matches!(
            CallbackAction::decode(&format!("v2:a:{id}:approve")),
            Err(DecodeError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            CallbackAction::decode(&format!("v1:x:{id}:approve")),
            Err(DecodeError::UnknownKind(_))
        ));
        assert!(matches!(
            CallbackAction::decode(&format!("v1:v:{id}:maybe")),
            Err(DecodeError::InvalidArgument(_))
        ));
        assert!(matches!(
            CallbackAction::decode("v1:v:zzz:yes"),
            Err(DecodeError::InvalidRequestId(_))
        ));
        assert!(matches!(
            CallbackAction::decode("jr 123 approve"),
            Err(DecodeError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn deep_link_decodes_live_result() {
        let id = RequestId::new();
        let link = DeepLink::LiveResult(id);
        assert_eq!(DeepLink::decode(&link.encode()), Ok(link));
        assert!(DeepLink::decode("hello").is_err());
    }
}
