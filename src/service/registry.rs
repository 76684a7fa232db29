use crate::core::error::{LedgerError, LedgerResult};
use crate::core::group::{Group, GroupId};
use crate::core::member::MemberId;
use crate::membership::manager::MembershipManager;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;

struct Groups {
    by_id: BTreeMap<GroupId, Arc<Mutex<Group>>>,
    next_id: u64,
}

/// Owns every group and hands out group ids.
///
/// Each group sits behind its own mutex. The registry lock is only held
/// long enough to look a group up or insert one, never while a group is
/// locked, so operations on different groups run in parallel.
pub struct GroupRegistry {
    groups: RwLock<Groups>,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(Groups {
                by_id: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Create a group under the next free id.
    pub fn create(&self, creator: &MemberId, name: &str, invitees: &[MemberId]) -> GroupId {
        let mut groups = self.groups.write();
        let id = GroupId::new(groups.next_id);
        groups.next_id += 1;
        let group = MembershipManager::create_group(id, creator.clone(), name, invitees);
        groups.by_id.insert(id, Arc::new(Mutex::new(group)));
        id
    }

    pub fn get(&self, id: GroupId) -> LedgerResult<Arc<Mutex<Group>>> {
        self.groups
            .read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(LedgerError::GroupNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.groups.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of the groups `identity` belongs to, ascending.
    pub fn groups_of(&self, identity: &MemberId) -> Vec<GroupId> {
        let handles: Vec<(GroupId, Arc<Mutex<Group>>)> = self
            .groups
            .read()
            .by_id
            .iter()
            .map(|(id, group)| (*id, Arc::clone(group)))
            .collect();

        handles
            .into_iter()
            .filter(|(_, group)| group.lock().is_member(identity))
            .map(|(id, _)| id)
            .collect()
    }
}
