use crate::core::error::{LedgerError, LedgerResult};
use crate::core::event::GroupEvent;
use crate::core::group::{Group, GroupId};
use crate::core::member::MemberId;
use log::info;

/// Membership transitions for a single group.
///
/// Per identity: `NonMember → PendingRequest → Member`, or back from
/// `PendingRequest` to `NonMember` on rejection. Every check runs before
/// the group is touched.
pub struct MembershipManager;

impl MembershipManager {
    /// Build a new group. The creator comes first, followed by the invitees
    /// in the order given, without duplicates and without the creator.
    /// Everyone starts as a full member.
    pub fn create_group(
        id: GroupId,
        creator: MemberId,
        name: impl Into<String>,
        invitees: &[MemberId],
    ) -> Group {
        let name = name.into();
        let mut members = vec![creator.clone()];
        for invitee in invitees {
            if !members.contains(invitee) {
                members.push(invitee.clone());
            }
        }

        let mut group = Group::new(id, name.clone(), members.clone());
        group.record(GroupEvent::GroupCreated {
            group: id,
            name: name.clone(),
            creator: creator.clone(),
        });
        for member in members {
            group.record(GroupEvent::UserApproved { group: id, member });
        }
        info!(
            "group {} \"{}\" created by {} with {} members",
            id,
            name,
            creator,
            group.members().len()
        );
        group
    }

    /// Ask to join `group`.
    pub fn request_to_join(group: &mut Group, identity: &MemberId) -> LedgerResult<()> {
        if group.is_member(identity) {
            return Err(LedgerError::AlreadyMember {
                group: group.id(),
                member: identity.clone(),
            });
        }
        if group.has_pending_request(identity) {
            return Err(LedgerError::AlreadyRequested {
                group: group.id(),
                member: identity.clone(),
            });
        }

        group.add_pending(identity.clone());
        group.record(GroupEvent::RequestToJoin {
            group: group.id(),
            member: identity.clone(),
        });
        info!("{} requested to join group {}", identity, group.id());
        Ok(())
    }

    /// Accept a pending request. Any member may approve.
    pub fn approve(
        group: &mut Group,
        approver: &MemberId,
        identity: &MemberId,
    ) -> LedgerResult<()> {
        Self::check_decision(group, approver, identity)?;

        group.take_pending(identity);
        group.admit(identity.clone());
        group.record(GroupEvent::UserApproved {
            group: group.id(),
            member: identity.clone(),
        });
        info!("{} approved {} into group {}", approver, identity, group.id());
        Ok(())
    }

    /// Drop a pending request without admitting. Any member may reject.
    pub fn reject(group: &mut Group, approver: &MemberId, identity: &MemberId) -> LedgerResult<()> {
        Self::check_decision(group, approver, identity)?;

        group.take_pending(identity);
        group.record(GroupEvent::UserRejected {
            group: group.id(),
            member: identity.clone(),
        });
        info!("{} rejected {} from group {}", approver, identity, group.id());
        Ok(())
    }

    fn check_decision(group: &Group, approver: &MemberId, identity: &MemberId) -> LedgerResult<()> {
        group.ensure_member(approver)?;
        if !group.has_pending_request(identity) {
            return Err(LedgerError::NoSuchRequest {
                group: group.id(),
                member: identity.clone(),
            });
        }
        Ok(())
    }
}
