//! Chat membership as reported by the platform.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Creator,
    Administrator { can_invite_users: bool },
    Member,
    /// Restricted users may or may not still be in the chat.
    Restricted { is_member: bool },
    Left,
    Kicked,
}

impl MemberStatus {
    /// Owner, or an admin holding the invite permission.
    pub fn can_invite(&self) -> bool {
        match self {
            MemberStatus::Creator => true,
            MemberStatus::Administrator { can_invite_users } => *can_invite_users,
            _ => false,
        }
    }

    /// Anyone still in the chat, including restricted users who are.
    pub fn is_member(&self) -> bool {
        match self {
            MemberStatus::Restricted { is_member } => *is_member,
            MemberStatus::Left | MemberStatus::Kicked => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_permission() {
        assert!(MemberStatus::Creator.can_invite());
        assert!(MemberStatus::Administrator { can_invite_users: true }.can_invite());
        assert!(!MemberStatus::Administrator { can_invite_users: false }.can_invite());
        assert!(!MemberStatus::Member.can_invite());
    }

    #[test]
    fn membership() {
        assert!(MemberStatus::Member.is_member());
        assert!(MemberStatus::Restricted { is_member: true }.is_member());
        assert!(!MemberStatus::Restricted { is_member: false }.is_member());
        assert!(!MemberStatus::Left.is_member());
        assert!(!MemberStatus::Kicked.is_member());
    }
}
