use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value, json};
use tracing::debug;

use crate::error::StoreError;
use crate::model::{Kind, Record};
use crate::util::time::{now_ms, timestamp};

const ID: &str = "id";
const CREATED_AT: &str = "created_at";
const UPDATED_AT: &str = "updated_at";

/// In-memory record store, one ordered collection per kind
pub struct Store {
    collections: [RwLock<Vec<Record>>; Kind::COUNT],
    next_id: AtomicU64,
}

impl Store {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            collections: Default::default(),
            next_id: AtomicU64::new(now_ms()),
        }
    }

    /// Create a store holding the example profile and workout
    pub fn seeded() -> Self {
        let store = Self::new();
        let created_at = timestamp();

        let profile = json!({
            "id": "1",
            "email": "user1@example.com",
            "username": "john_doe",
            "age": 28,
            "location": "New York",
            "goal": "Weight Loss",
            "workout": "Gym",
            "weight": 85,
            "height": 180,
            "target_weight": 75,
            "avatar_url": null,
            "latitude": 40.7128,
            "longitude": -74.0060,
            "created_at": created_at,
        });
        let workout = json!({
            "id": "1",
            "user_id": "1",
            "type": "Running",
            "duration": 30,
            "distance": 5,
            "calories": 300,
            "notes": "Morning jog",
            "created_at": created_at,
        });

        for (kind, seed) in [(Kind::Profile, profile), (Kind::Workout, workout)] {
            if let (Value::Object(record), Ok(mut records)) = (seed, store.collection(kind).write()) {
                records.push(record);
            }
        }

        store
    }

    fn collection(&self, kind: Kind) -> &RwLock<Vec<Record>> {
        &self.collections[kind.index()]
    }

    fn read<T>(&self, kind: Kind, f: impl FnOnce(&[Record]) -> T) -> Result<T, StoreError> {
        let records = self
            .collection(kind)
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&records))
    }

    fn write<T>(&self, kind: Kind, f: impl FnOnce(&mut Vec<Record>) -> T) -> Result<T, StoreError> {
        let mut records = self
            .collection(kind)
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&mut records))
    }

    /// Next id not already taken in `records`. Caller holds the write lock.
    fn generate_id(&self, records: &[Record]) -> String {
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
            if position(records, ID, &id).is_none() {
                return id;
            }
        }
    }

    /// Append a new record built from `payload` and return it
    pub fn insert(&self, kind: Kind, payload: Record) -> Result<Record, StoreError> {
        self.write(kind, |records| {
            let mut record = Record::new();
            record.insert(ID.to_string(), Value::String(self.generate_id(records)));
            record.extend(payload.into_iter().filter(|(key, _)| key != ID));
            record.insert(CREATED_AT.to_string(), Value::String(timestamp()));

            records.push(record.clone());
            record
        })
    }

    /// All records of a kind, in insertion order
    pub fn all(&self, kind: Kind) -> Result<Vec<Record>, StoreError> {
        self.read(kind, |records| records.to_vec())
    }

    /// Record with the given id
    pub fn get(&self, kind: Kind, id: &str) -> Result<Record, StoreError> {
        self.find_by(kind, ID, id)
    }

    /// First record whose `field` equals `value`
    pub fn find_by(&self, kind: Kind, field: &str, value: &str) -> Result<Record, StoreError> {
        self.read(kind, |records| {
            records
                .iter()
                .find(|record| field_matches(record, field, value))
                .cloned()
        })?
        .ok_or(StoreError::NotFound(kind))
    }

    /// Every record whose `field` equals `value`, possibly none
    pub fn filter_by(&self, kind: Kind, field: &str, value: &str) -> Result<Vec<Record>, StoreError> {
        self.read(kind, |records| {
            records
                .iter()
                .filter(|record| field_matches(record, field, value))
                .cloned()
                .collect()
        })
    }

    /// Pending buddy requests where `user_id` is either party
    pub fn pending_buddy_requests(&self, user_id: &str) -> Result<Vec<Record>, StoreError> {
        self.read(Kind::Buddy, |records| {
            records
                .iter()
                .filter(|record| {
                    (field_matches(record, "user_id", user_id)
                        || field_matches(record, "buddy_id", user_id))
                        && field_matches(record, "status", "pending")
                })
                .cloned()
                .collect()
        })
    }

    /// Shallow-merge `patch` over the record with the given id.
    ///
    /// An `id` inside the patch is ignored, the primary key never changes.
    pub fn update(&self, kind: Kind, id: &str, patch: Record) -> Result<Record, StoreError> {
        self.write(kind, |records| {
            let index = position(records, ID, id)?;
            let record = &mut records[index];

            for (key, value) in patch {
                if key == ID {
                    debug!("Ignoring id in {} update for {}", kind, id);
                    continue;
                }
                record.insert(key, value);
            }
            record.insert(UPDATED_AT.to_string(), Value::String(timestamp()));

            Some(record.clone())
        })?
        .ok_or(StoreError::NotFound(kind))
    }

    /// Remove the record with the given id and return it
    pub fn delete(&self, kind: Kind, id: &str) -> Result<Record, StoreError> {
        self.write(kind, |records| {
            position(records, ID, id).map(|index| records.remove(index))
        })?
        .ok_or(StoreError::NotFound(kind))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

fn field_matches(record: &Record, field: &str, value: &str) -> bool {
    matches!(record.get(field), Some(Value::String(s)) if s == value)
}

fn position(records: &[Record], field: &str, value: &str) -> Option<usize> {
    records
        .iter()
        .position(|record| field_matches(record, field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected JSON object"),
        }
    }

    #[test]
    fn test_seeded_store() {
        let store = Store::seeded();

        let profiles = store.all(Kind::Profile).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["username"], "john_doe");

        let workout = store.get(Kind::Workout, "1").unwrap();
        assert_eq!(workout["notes"], "Morning jog");
        assert!(workout.contains_key("created_at"));

        for kind in [Kind::Buddy, Kind::Goal, Kind::Achievement, Kind::Challenge] {
            assert!(store.all(kind).unwrap().is_empty());
        }
    }

    #[test]
    fn test_insert_generates_unique_ids() {
        let store = Store::new();
        let mut ids = HashSet::new();

        for _ in 0..100 {
            let created = store.insert(Kind::Goal, Record::new()).unwrap();
            let id = created["id"].as_str().unwrap().to_string();
            assert!(!id.is_empty());
            assert!(ids.insert(id));
        }
    }

    #[test]
    fn test_insert_stamps_created_at_and_keeps_payload() {
        let store = Store::new();
        let created = store
            .insert(Kind::Workout, record(json!({"user_id": "7", "type": "Swim"})))
            .unwrap();

        assert_eq!(created["user_id"], "7");
        assert_eq!(created["type"], "Swim");
        assert!(created["created_at"].is_string());
        assert!(!created.contains_key("updated_at"));
    }

    #[test]
    fn test_insert_ignores_payload_id() {
        let store = Store::seeded();
        let created = store
            .insert(Kind::Profile, record(json!({"id": "1", "username": "dup"})))
            .unwrap();

        assert_ne!(created["id"], "1");
        assert_eq!(store.get(Kind::Profile, "1").unwrap()["username"], "john_doe");
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = Store::new();
        assert_eq!(
            store.get(Kind::Workout, "999"),
            Err(StoreError::NotFound(Kind::Workout))
        );
    }

    #[test]
    fn test_inserted_record_is_immediately_visible() {
        let store = Store::new();
        let created = store.insert(Kind::Achievement, Record::new()).unwrap();
        let id = created["id"].as_str().unwrap();

        assert_eq!(store.get(Kind::Achievement, id).unwrap(), created);
    }

    #[test]
    fn test_find_by_returns_first_match() {
        let store = Store::new();
        let first = store
            .insert(Kind::Profile, record(json!({"email": "a@x.com", "n": 1})))
            .unwrap();
        store
            .insert(Kind::Profile, record(json!({"email": "a@x.com", "n": 2})))
            .unwrap();

        assert_eq!(store.find_by(Kind::Profile, "email", "a@x.com").unwrap(), first);
        assert_eq!(
            store.find_by(Kind::Profile, "username", "nobody"),
            Err(StoreError::NotFound(Kind::Profile))
        );
    }

    #[test]
    fn test_field_match_is_exact_string_equality() {
        let store = Store::new();
        store
            .insert(Kind::Goal, record(json!({"user_id": 1})))
            .unwrap();

        assert!(store.filter_by(Kind::Goal, "user_id", "1").unwrap().is_empty());
    }

    #[test]
    fn test_filter_by_preserves_order_and_allows_empty() {
        let store = Store::new();
        let a = store.insert(Kind::Goal, record(json!({"user_id": "1"}))).unwrap();
        store.insert(Kind::Goal, record(json!({"user_id": "2"}))).unwrap();
        let c = store.insert(Kind::Goal, record(json!({"user_id": "1"}))).unwrap();

        assert_eq!(store.filter_by(Kind::Goal, "user_id", "1").unwrap(), vec![a, c]);
        assert!(store.filter_by(Kind::Goal, "user_id", "3").unwrap().is_empty());
    }

    #[test]
    fn test_pending_buddy_requests() {
        let store = Store::new();
        let sent = store
            .insert(
                Kind::Buddy,
                record(json!({"user_id": "1", "buddy_id": "2", "status": "pending"})),
            )
            .unwrap();
        let received = store
            .insert(
                Kind::Buddy,
                record(json!({"user_id": "3", "buddy_id": "1", "status": "pending"})),
            )
            .unwrap();
        store
            .insert(
                Kind::Buddy,
                record(json!({"user_id": "1", "buddy_id": "4", "status": "accepted"})),
            )
            .unwrap();
        store
            .insert(
                Kind::Buddy,
                record(json!({"user_id": "5", "buddy_id": "6", "status": "pending"})),
            )
            .unwrap();

        assert_eq!(store.pending_buddy_requests("1").unwrap(), vec![sent.clone(), received]);
        assert_eq!(store.pending_buddy_requests("2").unwrap(), vec![sent]);
        assert!(store.pending_buddy_requests("4").unwrap().is_empty());
    }

    #[test]
    fn test_update_merges_fields() {
        let store = Store::new();
        let created = store
            .insert(Kind::Goal, record(json!({"progress": 0, "target": 100})))
            .unwrap();
        let id = created["id"].as_str().unwrap();

        let updated = store
            .update(Kind::Goal, id, record(json!({"progress": 50})))
            .unwrap();

        assert_eq!(updated["id"], id);
        assert_eq!(updated["progress"], 50);
        assert_eq!(updated["target"], 100);
        assert_eq!(updated["created_at"], created["created_at"]);
        assert!(updated["updated_at"].is_string());
        assert_eq!(store.get(Kind::Goal, id).unwrap(), updated);
    }

    #[test]
    fn test_update_is_idempotent() {
        let store = Store::new();
        let created = store
            .insert(Kind::Challenge, record(json!({"name": "10k", "days": 30})))
            .unwrap();
        let id = created["id"].as_str().unwrap();
        let patch = record(json!({"days": 14}));

        let mut first = store.update(Kind::Challenge, id, patch.clone()).unwrap();
        let mut second = store.update(Kind::Challenge, id, patch).unwrap();
        first.remove("updated_at");
        second.remove("updated_at");

        assert_eq!(first, second);
    }

    #[test]
    fn test_update_ignores_id_in_patch() {
        let store = Store::seeded();
        let updated = store
            .update(Kind::Profile, "1", record(json!({"id": "42", "age": 29})))
            .unwrap();

        assert_eq!(updated["id"], "1");
        assert_eq!(updated["age"], 29);
        assert!(store.get(Kind::Profile, "42").is_err());
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = Store::new();
        assert_eq!(
            store.update(Kind::Buddy, "nope", Record::new()),
            Err(StoreError::NotFound(Kind::Buddy))
        );
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let store = Store::seeded();

        let removed = store.delete(Kind::Workout, "1").unwrap();
        assert_eq!(removed["type"], "Running");

        assert_eq!(
            store.get(Kind::Workout, "1"),
            Err(StoreError::NotFound(Kind::Workout))
        );
        assert_eq!(
            store.delete(Kind::Workout, "1"),
            Err(StoreError::NotFound(Kind::Workout))
        );
    }

    #[test]
    fn test_kinds_are_independent() {
        let store = Store::seeded();
        assert!(store.get(Kind::Goal, "1").is_err());
        assert!(store.get(Kind::Profile, "1").is_ok());
    }
}
