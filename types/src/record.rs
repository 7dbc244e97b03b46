//! The durable audit record of one join request.

use crate::id::{ChatId, RequestId, UserId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// One join request and, once resolved, its outcome.
///
/// Created with `waiting = true` and resolved exactly once. Records are never
/// deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequestRecord {
    pub id: RequestId,
    pub group_id: ChatId,
    pub user_id: UserId,
    pub request_time: Timestamp,
    /// `true` until the request is resolved.
    pub waiting: bool,
    /// `Some(true)` if admitted, `Some(false)` if denied, `None` while waiting.
    pub result: Option<bool>,
    /// The admin who resolved the request manually, if any.
    pub admin: Option<UserId>,
    pub yes_votes: Option<u32>,
    pub no_votes: Option<u32>,
}

/// The fields written when a record is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub result: bool,
    pub admin: Option<UserId>,
    pub yes_votes: Option<u32>,
    pub no_votes: Option<u32>,
}

impl JoinRequestRecord {
    /// A fresh, waiting record.
    pub fn new(id: RequestId, group_id: ChatId, user_id: UserId, request_time: Timestamp) -> Self {
        Self {
            id,
            group_id,
            user_id,
            request_time,
            waiting: true,
            result: None,
            admin: None,
            yes_votes: None,
            no_votes: None,
        }
    }

    /// Apply a resolution if the record is still waiting.
    ///
    /// Returns `false` and leaves the record untouched if it was already resolved.
    /// Vote counts that are `None` keep their previous value.
    pub fn resolve(&mut self, resolution: &Resolution) -> bool {
        if !self.waiting {
            return false;
        }
        self.waiting = false;
        self.result = Some(resolution.result);
        self.admin = resolution.admin;
        if resolution.yes_votes.is_some() {
            self.yes_votes = resolution.yes_votes;
        }
        if resolution.no_votes.is_some() {
            self.no_votes = resolution.no_votes;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> JoinRequestRecord {
        JoinRequestRecord::new(RequestId::new(), ChatId(-100), UserId(7), Timestamp::new(1000))
    }

    #[test]
    fn new_record_is_waiting() {
        let r = record();
        assert!(r.waiting);
        assert_eq!(r.result, None);
        assert_eq!(r.admin, None);
    }

    #[test]
    fn resolve_applies_once() {
        let mut r = record();
        let first = Resolution {
            result: true,
            admin: None,
            yes_votes: Some(2),
            no_votes: Some(0),
        };
        assert!(r.resolve(&first));
        assert!(!r.waiting);
        assert_eq!(r.result, Some(true));
        assert_eq!(r.yes_votes, Some(2));

        let second = Resolution {
            result: false,
            admin: Some(UserId(1)),
            yes_votes: None,
            no_votes: None,
        };
        assert!(!r.resolve(&second));
        assert_eq!(r.result, Some(true));
        assert_eq!(r.admin, None);
    }
}
