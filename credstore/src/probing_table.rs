use std::fmt::{Debug, Formatter};

use sha1hash::Sha1Hash;
use tracing::{debug, trace};

use crate::constants::{DEFAULT_TABLE_CAPACITY, GOLDEN_RATIO_FRACTION};
use crate::error::{Result, StoreError};
use crate::error_printer::ErrorPrinter;
use crate::login_key::LoginKey;
use crate::metrics::{
    LOOKUPS, PROBE_LENGTH, REASON_EXHAUSTED, REASON_LOAD, REASON_TOMBSTONES, REHASHES, STATUS_HIT,
    STATUS_MISS,
};

/// Smallest capacity a table can be built with. With a single slot the
/// table could not stay at most half full after growing once.
pub const MIN_TABLE_CAPACITY: usize = 2;

/// The table that backs the credential service: login -> password hash.
pub type CredentialTable = ProbingTable<Sha1Hash>;

/// One cell of the backing array.
enum Slot<V> {
    /// Never used. Ends every probe sequence that reaches it.
    Empty,
    /// Holds a live entry and owns its value.
    Occupied { key: LoginKey, value: V },
    /// Previously occupied. Probing walks past it, insertion may reuse it.
    Tombstone,
}

/// Snapshot of the table counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub capacity: usize,
    pub live: usize,
    pub tombstones: usize,
}

/// An open addressing hash table keyed by [LoginKey].
///
/// ## Placement
/// The base index of a key is the fractional part of
/// `sum(key bytes) * 0.6180339887`, scaled to the capacity. Collisions are
/// resolved with quadratic probing: the i-th candidate is
/// `(base + i * i) % capacity` for `i` in `0..capacity`.
///
/// ## Deletion
/// Deleting an entry drops its value and leaves a tombstone behind so that
/// entries placed further along the same probe sequence stay reachable.
/// Lookups skip tombstones and stop at the first empty slot.
///
/// ## Growth
/// Before every insertion of a new key the table is rehashed into twice
/// the capacity when it is at least half full, or when tombstones are at
/// least as many as the live entries. The second condition holds on an
/// empty table, so the first insertion always doubles it. An insertion
/// whose probe sequence finds no free slot grows the table and retries.
/// Rehashing moves each value into the new array; no value is cloned or
/// dropped, and no tombstone survives it.
///
/// ## Other Notes
/// Mutation needs `&mut self`. Callers sharing a table between threads have
/// to wrap it in a lock themselves, since a rehash rebuilds the whole array.
pub struct ProbingTable<V> {
    slots: Vec<Slot<V>>,
    live: usize,
    tombstones: usize,
}

impl<V> Default for ProbingTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Debug for ProbingTable<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbingTable")
            .field("capacity", &self.capacity())
            .field("live", &self.live)
            .field("tombstones", &self.tombstones)
            .finish()
    }
}

impl<V> ProbingTable<V> {
    /// Builds an empty table with [DEFAULT_TABLE_CAPACITY] slots.
    pub fn new() -> Self {
        Self {
            slots: (0..DEFAULT_TABLE_CAPACITY).map(|_| Slot::Empty).collect(),
            live: 0,
            tombstones: 0,
        }
    }

    /// Builds an empty table with `capacity` slots. The capacity has to be a
    /// power of two, and at least [MIN_TABLE_CAPACITY].
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity < MIN_TABLE_CAPACITY || !capacity.is_power_of_two() {
            return Err(StoreError::InvalidCapacity(capacity));
        }
        Ok(Self {
            slots: allocate_slots(capacity)?,
            live: 0,
            tombstones: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            capacity: self.capacity(),
            live: self.live,
            tombstones: self.tombstones,
        }
    }

    /// Inserts `value` under `key`, replacing (and dropping) the value
    /// already stored for that key if there is one.
    ///
    /// Only fails if the table needs to grow and the new backing array
    /// cannot be allocated; the table is left untouched in that case.
    pub fn add(&mut self, key: LoginKey, value: V) -> Result<()> {
        if let Some(idx) = self.locate(&key) {
            if let Slot::Occupied { value: stored, .. } = &mut self.slots[idx] {
                *stored = value;
            }
            return Ok(());
        }

        self.rebuild_if_needed()?;

        let mut pending = (key, value);
        loop {
            match self.place(pending.0, pending.1) {
                Ok(_) => return Ok(()),
                Err(returned) => {
                    trace!(
                        "No free slot on the probe sequence of {:?} at capacity {}",
                        returned.0,
                        self.capacity()
                    );
                    pending = returned;
                    self.rehash(self.grown_capacity()?, REASON_EXHAUSTED)?;
                }
            }
        }
    }

    /// Returns the value stored under `key`, if any.
    pub fn find(&self, key: &LoginKey) -> Option<&V> {
        let found = self.locate(key);
        LOOKUPS
            .with_label_values(&[if found.is_some() { STATUS_HIT } else { STATUS_MISS }])
            .inc();
        match &self.slots[found?] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn find_mut(&mut self, key: &LoginKey) -> Option<&mut V> {
        let idx = self.locate(key)?;
        match &mut self.slots[idx] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &LoginKey) -> bool {
        self.locate(key).is_some()
    }

    /// Removes the entry for `key`, dropping its value. Returns whether an
    /// entry was removed; deleting an absent key is a no-op.
    pub fn del(&mut self, key: &LoginKey) -> bool {
        let Some(idx) = self.locate(key) else {
            return false;
        };
        self.slots[idx] = Slot::Tombstone;
        self.live -= 1;
        self.tombstones += 1;
        true
    }

    /// Drops every value and resets all slots to empty. Keeps the capacity.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.live = 0;
        self.tombstones = 0;
    }

    /// Iterates over the live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&LoginKey, &V)> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        })
    }

    /// Index of the live slot holding `key`.
    fn locate(&self, key: &LoginKey) -> Option<usize> {
        let mut steps = 0;
        let mut found = None;
        for idx in ProbeSequence::new(placement(key, self.capacity()), self.capacity()) {
            steps += 1;
            match &self.slots[idx] {
                Slot::Empty => break,
                Slot::Occupied { key: k, .. } if k == key => {
                    found = Some(idx);
                    break;
                }
                _ => {}
            }
        }
        PROBE_LENGTH.observe(steps as f64);
        found
    }

    /// Puts the entry into the first empty or tombstone slot of its probe
    /// sequence. Does not check whether `key` is already present. Hands the
    /// entry back if the whole sequence is occupied.
    fn place(&mut self, key: LoginKey, value: V) -> std::result::Result<usize, (LoginKey, V)> {
        let capacity = self.capacity();
        for (step, idx) in ProbeSequence::new(placement(&key, capacity), capacity).enumerate() {
            match self.slots[idx] {
                Slot::Occupied { .. } => continue,
                Slot::Tombstone => self.tombstones -= 1,
                Slot::Empty => {}
            }
            self.slots[idx] = Slot::Occupied { key, value };
            self.live += 1;
            PROBE_LENGTH.observe((step + 1) as f64);
            return Ok(idx);
        }
        PROBE_LENGTH.observe(capacity as f64);
        Err((key, value))
    }

    /// Doubles the table if it is at least half full or if tombstones are at
    /// least as many as the live entries.
    pub(crate) fn rebuild_if_needed(&mut self) -> Result<()> {
        let reason = if 2 * self.live >= self.capacity() {
            REASON_LOAD
        } else if self.tombstones >= self.live {
            REASON_TOMBSTONES
        } else {
            return Ok(());
        };
        self.rehash(self.grown_capacity()?, reason)
    }

    fn grown_capacity(&self) -> Result<usize> {
        self.capacity()
            .checked_mul(2)
            .ok_or(StoreError::CapacityOverflow(self.capacity()))
    }

    /// Moves every live entry into a fresh array of at least `capacity` slots.
    ///
    /// The final capacity is settled with a dry run over the keys alone, and
    /// the new array is allocated before anything moves, so an allocation
    /// failure leaves the table as it was.
    fn rehash(&mut self, capacity: usize, reason: &str) -> Result<()> {
        let old_capacity = self.capacity();
        self.rehash_into(capacity, reason).log_error(|| {
            format!("Could not rehash table of capacity {old_capacity} to {capacity} ({reason})")
        })
    }

    fn rehash_into(&mut self, capacity: usize, reason: &str) -> Result<()> {
        let mut keys = Vec::new();
        keys.try_reserve_exact(self.live)?;
        keys.extend(self.iter().map(|(key, _)| *key));

        let mut capacity = capacity;
        while !fits(&keys, capacity)? {
            capacity = capacity
                .checked_mul(2)
                .ok_or(StoreError::CapacityOverflow(capacity))?;
        }

        let old = std::mem::replace(&mut self.slots, allocate_slots(capacity)?);
        let old_capacity = old.len();
        self.live = 0;
        self.tombstones = 0;

        for slot in old {
            if let Slot::Occupied { key, value } = slot {
                if let Err((key, _)) = self.place(key, value) {
                    return Err(StoreError::InvariantViolated(format!(
                        "rehash: {key:?} did not fit into capacity {capacity} after the dry run"
                    )));
                }
            }
        }

        REHASHES.with_label_values(&[reason]).inc();
        debug!(
            "Rehashed table from capacity {old_capacity} to {capacity} ({reason}), moved {} entries",
            self.live
        );
        Ok(())
    }
}

/// Base index of `key` in a table of `capacity` slots.
fn placement(key: &LoginKey, capacity: usize) -> usize {
    let frac = (key.byte_sum() as f64 * GOLDEN_RATIO_FRACTION).fract();
    ((capacity as f64 * frac) as usize).min(capacity - 1)
}

/// Whether every key in `keys`, placed in order, finds a free slot in a
/// table of `capacity` slots.
fn fits(keys: &[LoginKey], capacity: usize) -> Result<bool> {
    let mut taken = Vec::new();
    taken.try_reserve_exact(capacity)?;
    taken.resize(capacity, false);

    for key in keys {
        match ProbeSequence::new(placement(key, capacity), capacity).find(|&idx| !taken[idx]) {
            Some(idx) => taken[idx] = true,
            None => return Ok(false),
        }
    }
    Ok(true)
}

fn allocate_slots<V>(capacity: usize) -> Result<Vec<Slot<V>>> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity)?;
    slots.resize_with(capacity, || Slot::Empty);
    Ok(slots)
}

/// Quadratic probe sequence `(base + i * i) % capacity` for `i` in
/// `0..capacity`. The square is kept incrementally as
/// `(i + 1)^2 = i^2 + 2i + 1` reduced modulo the capacity.
struct ProbeSequence {
    base: usize,
    offset: usize,
    step: usize,
    capacity: usize,
}

impl ProbeSequence {
    fn new(base: usize, capacity: usize) -> Self {
        Self {
            base,
            offset: 0,
            step: 0,
            capacity,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.step >= self.capacity {
            return None;
        }
        let idx = (self.base + self.offset) % self.capacity;
        self.offset = (self.offset + 2 * self.step + 1) % self.capacity;
        self.step += 1;
        Some(idx)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use rand::prelude::*;
    use sha1hash::compute_sha1_hash;
    use tracing_test::traced_test;

    use super::*;

    fn key(login: &str) -> LoginKey {
        LoginKey::try_from(login).unwrap()
    }

    /// Counts how many times values built from it were dropped.
    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    /// A table with the given slots; counters are derived from the slots.
    fn table_from_slots<V>(slots: Vec<Slot<V>>) -> ProbingTable<V> {
        let live = slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied { .. }))
            .count();
        let tombstones = slots
            .iter()
            .filter(|s| matches!(s, Slot::Tombstone))
            .count();
        ProbingTable {
            slots,
            live,
            tombstones,
        }
    }

    #[test]
    fn test_new_table() {
        let table = CredentialTable::new();
        assert_eq!(
            table.stats(),
            TableStats {
                capacity: DEFAULT_TABLE_CAPACITY,
                live: 0,
                tombstones: 0
            }
        );
        assert!(table.is_empty());
        assert!(table.find(&key("user")).is_none());
    }

    #[test]
    fn test_with_capacity() {
        assert_eq!(CredentialTable::with_capacity(16).unwrap().capacity(), 16);
        assert_eq!(CredentialTable::with_capacity(2).unwrap().capacity(), 2);
        for bad in [0, 1, 3, 12, 100] {
            assert_eq!(
                CredentialTable::with_capacity(bad).unwrap_err(),
                StoreError::InvalidCapacity(bad)
            );
        }
    }

    #[test]
    fn test_probe_sequence_is_quadratic() {
        let seq: Vec<usize> = ProbeSequence::new(3, 16).collect();
        let expected: Vec<usize> = (0..16).map(|i| (3 + i * i) % 16).collect();
        assert_eq!(seq, expected);

        let seq: Vec<usize> = ProbeSequence::new(7, 8).collect();
        assert_eq!(seq, vec![7, 0, 3, 0, 7, 0, 3, 0]);
    }

    #[test]
    fn test_placement_in_range() {
        for capacity in [2, 8, 16, 1024] {
            for login in ["", "a", "user", "abcdefghij", "~~~~~~~~~~"] {
                assert!(placement(&key(login), capacity) < capacity);
            }
            assert!(placement(&LoginKey::from_raw([0xff; 10]), capacity) < capacity);
        }
        // 'a' = 97, 97 * 0.6180339887 = 59.9493 -> 0.9493 * 8 = 7.59
        assert_eq!(placement(&key("a"), 8), 7);
        assert_eq!(placement(&key(""), 8), 0);
    }

    #[test]
    fn test_add_find_round_trip() {
        let mut table = CredentialTable::new();
        table.add(key("user"), compute_sha1_hash(b"1234")).unwrap();
        table.add(key("admin"), compute_sha1_hash(b"hunter2")).unwrap();

        assert_eq!(table.find(&key("user")), Some(&compute_sha1_hash(b"1234")));
        assert_eq!(
            table.find(&key("admin")),
            Some(&compute_sha1_hash(b"hunter2"))
        );
        assert!(table.find(&key("guest")).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_overwrite() {
        let mut table = CredentialTable::new();
        table.add(key("user"), compute_sha1_hash(b"old")).unwrap();
        table.add(key("user"), compute_sha1_hash(b"new")).unwrap();

        assert_eq!(table.find(&key("user")), Some(&compute_sha1_hash(b"new")));
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().filter(|(k, _)| **k == key("user")).count(), 1);
    }

    #[test]
    fn test_find_mut() {
        let mut table = CredentialTable::new();
        table.add(key("user"), compute_sha1_hash(b"old")).unwrap();
        *table.find_mut(&key("user")).unwrap() = compute_sha1_hash(b"new");
        assert_eq!(table.find(&key("user")), Some(&compute_sha1_hash(b"new")));
        assert!(table.find_mut(&key("nobody")).is_none());
    }

    #[test]
    fn test_del() {
        let mut table = CredentialTable::new();
        table.add(key("user"), compute_sha1_hash(b"1234")).unwrap();

        assert!(table.del(&key("user")));
        assert!(table.find(&key("user")).is_none());
        assert!(!table.contains_key(&key("user")));
        assert_eq!(table.len(), 0);
        assert_eq!(table.tombstones(), 1);

        // absent keys are a no-op
        assert!(!table.del(&key("user")));
        assert!(!table.del(&key("other")));
        assert_eq!(table.tombstones(), 1);
    }

    #[test]
    fn test_lookup_skips_tombstones() {
        // "ab" and "ba" share a byte sum, so they share a probe sequence.
        let mut table = CredentialTable::with_capacity(16).unwrap();
        table.add(key("ab"), compute_sha1_hash(b"1")).unwrap();
        table.add(key("ba"), compute_sha1_hash(b"2")).unwrap();
        table.add(key("user"), compute_sha1_hash(b"3")).unwrap();

        assert!(table.del(&key("ab")));
        assert_eq!(table.find(&key("ba")), Some(&compute_sha1_hash(b"2")));

        // the freed slot is reused by the next colliding key
        table.add(key("ab"), compute_sha1_hash(b"4")).unwrap();
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.find(&key("ab")), Some(&compute_sha1_hash(b"4")));
        assert_eq!(table.find(&key("ba")), Some(&compute_sha1_hash(b"2")));
    }

    #[test]
    fn test_nine_logins_from_capacity_eight() {
        let mut table = CredentialTable::new();
        assert_eq!(table.capacity(), 8);

        let logins: Vec<String> = (0..9).map(|i| format!("user{i}")).collect();
        for login in logins.iter() {
            table.add(key(login), compute_sha1_hash(login.as_bytes())).unwrap();
        }

        assert!(table.capacity() >= 16);
        assert_eq!(table.len(), 9);
        for login in logins.iter() {
            assert_eq!(
                table.find(&key(login)),
                Some(&compute_sha1_hash(login.as_bytes())),
                "{login}"
            );
        }
    }

    #[test]
    fn test_rebuild_on_load() {
        let mut table = ProbingTable::<u32>::with_capacity(8).unwrap();
        table.add(key("a"), 0).unwrap();
        assert_eq!(table.capacity(), 16);

        // 8 live entries in 16 slots: the 8th add still saw 7 < 8
        for (i, login) in ["b", "c", "d", "e", "f", "g", "h"].into_iter().enumerate() {
            table.add(key(login), i as u32 + 1).unwrap();
        }
        assert_eq!(table.stats(), TableStats { capacity: 16, live: 8, tombstones: 0 });

        table.rebuild_if_needed().unwrap();
        let stats = table.stats();
        assert_eq!(stats.capacity, 32);
        assert!(2 * stats.live < stats.capacity);
        assert_eq!(stats.tombstones, 0);

        // nothing to do the second time
        table.rebuild_if_needed().unwrap();
        assert_eq!(table.capacity(), 32);
    }

    #[test]
    fn test_rebuild_on_tombstones() {
        let mut table = ProbingTable::<u32>::with_capacity(16).unwrap();
        for (i, login) in ["a", "b", "c", "d"].into_iter().enumerate() {
            table.add(key(login), i as u32).unwrap();
        }
        for login in ["a", "b"] {
            assert!(table.del(&key(login)));
        }
        // two tombstones, two live entries: tombstones rival the live count
        let before = table.stats();
        assert_eq!(before.tombstones, 2);
        assert_eq!(before.live, 2);
        assert!(2 * before.live < before.capacity);

        table.add(key("e"), 4).unwrap();

        let stats = table.stats();
        assert_eq!(stats.capacity, 2 * before.capacity);
        assert_eq!(stats.tombstones, 0);
        assert_eq!(stats.live, 3);
        for (login, v) in [("c", 2), ("d", 3), ("e", 4)] {
            assert_eq!(table.find(&key(login)), Some(&v));
        }
        assert!(table.find(&key("a")).is_none());
        assert!(table.find(&key("b")).is_none());
    }

    #[test]
    fn test_first_add_doubles_empty_table() {
        let mut table = ProbingTable::<u32>::new();
        table.add(key("a"), 1).unwrap();
        assert_eq!(
            table.stats(),
            TableStats {
                capacity: 2 * DEFAULT_TABLE_CAPACITY,
                live: 1,
                tombstones: 0
            }
        );

        let mut table = ProbingTable::<u32>::with_capacity(16).unwrap();
        table.add(key("a"), 1).unwrap();
        assert_eq!(table.capacity(), 32);

        // an emptied table counts as empty again
        assert!(table.del(&key("a")));
        table.add(key("b"), 2).unwrap();
        assert_eq!(table.stats(), TableStats { capacity: 64, live: 1, tombstones: 0 });
    }

    #[test]
    fn test_overwrite_does_not_rebuild() {
        let mut table = ProbingTable::<u32>::new();
        table.add(key("a"), 1).unwrap();
        table.add(key("b"), 2).unwrap();
        assert!(table.del(&key("a")));
        let capacity = table.capacity();

        // one tombstone, one live entry, but "b" is already present
        table.add(key("b"), 3).unwrap();
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.find(&key("b")), Some(&3));
    }

    #[test]
    fn test_find_terminates_without_empty_slots() {
        let table: ProbingTable<u32> = table_from_slots((0..8).map(|_| Slot::Tombstone).collect());
        assert!(table.find(&key("user")).is_none());

        let mut table: ProbingTable<u32> = table_from_slots(
            (0..8u8)
                .map(|i| Slot::Occupied {
                    key: LoginKey::new(&[b'a' + i]).unwrap(),
                    value: i as u32,
                })
                .collect(),
        );
        assert!(table.find(&key("missing")).is_none());
        assert!(!table.del(&key("missing")));
    }

    #[test]
    fn test_add_into_all_tombstones() {
        let mut table: ProbingTable<u32> =
            table_from_slots((0..8).map(|_| Slot::Tombstone).collect());
        table.add(key("user"), 7).unwrap();
        assert_eq!(table.find(&key("user")), Some(&7));
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn test_add_grows_when_probe_sequence_is_exhausted() {
        // At capacity 8 a probe sequence only visits base + {0, 1, 4}.
        let new_key = key("user");
        let base = placement(&new_key, 8);
        let blocked = [base, (base + 1) % 8, (base + 4) % 8];

        let slots = (0..8)
            .map(|idx| {
                if blocked.contains(&idx) {
                    Slot::Occupied {
                        key: LoginKey::new(format!("k{idx}").as_bytes()).unwrap(),
                        value: idx as u32,
                    }
                } else {
                    Slot::Empty
                }
            })
            .collect();
        let mut table = table_from_slots(slots);
        assert_eq!(table.len(), 3);

        table.add(new_key, 100).unwrap();

        assert!(table.capacity() >= 16);
        assert_eq!(table.len(), 4);
        assert_eq!(table.find(&new_key), Some(&100));
        for idx in blocked {
            assert_eq!(
                table.find(&LoginKey::new(format!("k{idx}").as_bytes()).unwrap()),
                Some(&(idx as u32))
            );
        }
    }

    #[test]
    fn test_values_dropped_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let mut table = ProbingTable::new();

        for i in 0..50 {
            table
                .add(key(&format!("u{i}")), DropCounter(drops.clone()))
                .unwrap();
        }
        // many rehashes, but rehashing moves values
        assert!(table.capacity() >= 128);
        assert_eq!(drops.get(), 0);

        for i in 0..10 {
            assert!(table.del(&key(&format!("u{i}"))));
        }
        assert_eq!(drops.get(), 10);

        for i in 10..15 {
            table
                .add(key(&format!("u{i}")), DropCounter(drops.clone()))
                .unwrap();
        }
        assert_eq!(drops.get(), 15);

        // 40 live values left
        table.clear();
        assert_eq!(drops.get(), 55);
        assert!(table.is_empty());

        table.add(key("last"), DropCounter(drops.clone())).unwrap();
        drop(table);
        assert_eq!(drops.get(), 56);
    }

    #[test]
    fn test_iter() {
        let mut table = ProbingTable::new();
        for (i, login) in ["a", "b", "c"].into_iter().enumerate() {
            table.add(key(login), i).unwrap();
        }
        table.del(&key("b"));

        let mut entries: Vec<(String, usize)> =
            table.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        entries.sort();
        assert_eq!(entries, vec![("a".to_string(), 0), ("c".to_string(), 2)]);
    }

    #[test]
    fn test_random_operations_against_model() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut table = ProbingTable::new();
        let mut model = HashMap::new();

        for round in 0..5000u32 {
            let login = format!("u{}", rng.gen_range(0..200));
            let k = key(&login);
            match rng.gen_range(0..3) {
                0 | 1 => {
                    let old_capacity = table.capacity();
                    let was_present = table.contains_key(&k);
                    table.add(k, round).unwrap();
                    model.insert(login, round);

                    if table.capacity() != old_capacity {
                        assert!(!was_present);
                        // the new entry went in after the rehash
                        assert!(2 * (table.len() - 1) < table.capacity());
                        assert_eq!(table.tombstones(), 0);
                    }
                }
                _ => {
                    assert_eq!(table.del(&k), model.remove(&login).is_some());
                }
            }

            let stats = table.stats();
            assert!(stats.live + stats.tombstones <= stats.capacity);
            assert_eq!(stats.live, model.len());
        }

        for (login, v) in model.iter() {
            assert_eq!(table.find(&key(login)), Some(v));
        }
        assert_eq!(table.iter().count(), model.len());
    }

    #[test]
    #[traced_test]
    fn test_failed_rehash_leaves_table_intact() {
        let mut table = ProbingTable::<u32>::new();
        for (i, login) in ["a", "b", "c"].into_iter().enumerate() {
            table.add(key(login), i as u32).unwrap();
        }
        let before = table.stats();

        // the dry run cannot reserve this many slots
        let huge = 1usize << (usize::BITS - 1);
        assert!(matches!(
            table.rehash(huge, REASON_LOAD),
            Err(StoreError::OutOfMemory(_))
        ));
        assert!(logs_contain("Could not rehash table of capacity 16"));

        assert_eq!(table.stats(), before);
        for (i, login) in ["a", "b", "c"].into_iter().enumerate() {
            assert_eq!(table.find(&key(login)), Some(&(i as u32)));
        }
    }

    #[test]
    #[traced_test]
    fn test_rehash_is_logged() {
        let mut table = ProbingTable::<u32>::new();
        for i in 0..5 {
            table.add(key(&format!("u{i}")), i).unwrap();
        }
        // the first insertion doubles the empty table
        assert!(logs_contain("Rehashed table from capacity 8 to 16 (tombstones)"));
        assert!(logs_contain("moved 0 entries"));
    }
}
