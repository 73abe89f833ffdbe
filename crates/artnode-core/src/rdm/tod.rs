use super::Uid;

/// UIDs one TOD holds, one ArtTodData block
pub const TOD_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TodEntry {
    uid: Uid,
    muted: bool,
}

/// Table of Devices for one port
///
/// Insertion ordered and unique. The mute flag is only used when the node
/// answers discovery on behalf of the devices in the table.
#[derive(Debug, Clone, Default)]
pub struct Tod {
    entries: Vec<TodEntry>,
}

impl Tod {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a UID; false when already present or the table is full
    pub fn add_uid(&mut self, uid: Uid) -> bool {
        if self.exists(&uid) || self.entries.len() >= TOD_CAPACITY {
            return false;
        }
        self.entries.push(TodEntry { uid, muted: false });
        true
    }

    pub fn remove_uid(&mut self, uid: &Uid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.uid != *uid);
        self.entries.len() != before
    }

    pub fn exists(&self, uid: &Uid) -> bool {
        self.entries.iter().any(|entry| entry.uid == *uid)
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= TOD_CAPACITY
    }

    pub fn uids(&self) -> impl Iterator<Item = Uid> + '_ {
        self.entries.iter().map(|entry| entry.uid)
    }

    pub fn to_vec(&self) -> Vec<Uid> {
        self.uids().collect()
    }

    pub fn mute(&mut self, uid: &Uid) -> bool {
        match self.entries.iter_mut().find(|entry| entry.uid == *uid) {
            Some(entry) => {
                entry.muted = true;
                true
            }
            None => false,
        }
    }

    pub fn unmute(&mut self, uid: &Uid) -> bool {
        match self.entries.iter_mut().find(|entry| entry.uid == *uid) {
            Some(entry) => {
                entry.muted = false;
                true
            }
            None => false,
        }
    }

    pub fn unmute_all(&mut self) {
        for entry in &mut self.entries {
            entry.muted = false;
        }
    }

    /// Unmuted UIDs inside `[lower, upper]`
    pub fn unmuted_in_range(&self, lower: u64, upper: u64) -> impl Iterator<Item = Uid> + '_ {
        self.entries
            .iter()
            .filter(move |entry| {
                let value = entry.uid.as_u64();
                !entry.muted && value >= lower && value <= upper
            })
            .map(|entry| entry.uid)
    }
}
