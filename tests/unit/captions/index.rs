use std::sync::Arc;

use super::*;
use crate::captions::persist::{InMemoryStore, JsonFileStore};
use crate::captions::record::CaptionDocument;

fn vid(s: &str) -> VideoId {
    VideoId::new(s).unwrap()
}

struct Shared(Arc<InMemoryStore>);

impl CaptionPersistence for Shared {
    fn load(&self) -> BurninResult<CaptionDocument> {
        self.0.load()
    }

    fn save(&self, doc: &CaptionDocument) -> BurninResult<()> {
        self.0.save(doc)
    }
}

#[test]
fn repeated_identical_upsert_keeps_one_record() {
    let index = CaptionIndex::new(InMemoryStore::new());
    let v = vid("clip");
    index.upsert(&v, 1, 3, "hello").unwrap();
    index.upsert(&v, 1, 3, "hello").unwrap();
    assert_eq!(
        index.lookup(&v).unwrap(),
        vec![CaptionRecord::new(1, 3, "hello").unwrap()]
    );
}

#[test]
fn new_text_for_same_range_replaces() {
    let index = CaptionIndex::new(InMemoryStore::new());
    let v = vid("clip");
    assert_eq!(
        index.upsert(&v, 1, 3, "hello").unwrap(),
        UpsertOutcome::Inserted
    );
    assert_eq!(
        index.upsert(&v, 1, 3, "world").unwrap(),
        UpsertOutcome::Updated
    );
    let records = index.lookup(&v).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "world");
}

#[test]
fn every_write_is_persisted_immediately() {
    let store = Arc::new(InMemoryStore::new());
    let index = CaptionIndex::new(Shared(store.clone()));
    let v = vid("clip");

    index.upsert(&v, 0, 0, "a").unwrap();
    assert_eq!(store.save_count(), 1);
    index.upsert(&v, 5, 9, "b").unwrap();
    assert_eq!(store.save_count(), 2);
    assert_eq!(store.load().unwrap().records(&v).len(), 2);
}

#[test]
fn inverted_range_fails_without_touching_the_store() {
    let store = Arc::new(InMemoryStore::new());
    let index = CaptionIndex::new(Shared(store.clone()));
    let err = index.upsert(&vid("clip"), 4, 1, "x").unwrap_err();
    assert!(matches!(err, BurninError::Validation(_)));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn lookup_of_unknown_video_is_empty_not_error() {
    let index = CaptionIndex::new(InMemoryStore::new());
    assert!(index.lookup(&vid("ghost")).unwrap().is_empty());
}

#[test]
fn videos_are_independent_and_share_one_document() {
    let dir = std::env::temp_dir().join(format!(
        "burnin_index_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let path = dir.join("captions.json");
    let index = CaptionIndex::new(JsonFileStore::new(&path));

    index.upsert(&vid("a"), 0, 2, "X").unwrap();
    index.upsert(&vid("b"), 0, 2, "Y").unwrap();

    // A second index over the same file sees both entries: no state is cached.
    let again = CaptionIndex::new(JsonFileStore::new(&path));
    assert_eq!(again.lookup(&vid("a")).unwrap()[0].text, "X");
    assert_eq!(again.lookup(&vid("b")).unwrap()[0].text, "Y");
}

#[test]
fn concurrent_upserts_through_one_index_are_not_lost() {
    let index = Arc::new(CaptionIndex::new(InMemoryStore::new()));
    let v = vid("clip");

    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let index = index.clone();
            let v = v.clone();
            std::thread::spawn(move || {
                for j in 0..10u64 {
                    let start = i * 100 + j;
                    index.upsert(&v, start, start, "t").unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(index.lookup(&v).unwrap().len(), 80);
}

#[test]
fn poisoned_index_lock_is_not_a_serde_error() {
    let index = CaptionIndex::new(InMemoryStore::new());
    let _ = std::thread::scope(|s| {
        s.spawn(|| {
            let _held = index.write_lock.lock().unwrap();
            panic!("writer died");
        })
        .join()
    });
    let v = vid("clip");
    assert!(matches!(index.lookup(&v).unwrap_err(), BurninError::Other(_)));
    assert!(matches!(
        index.upsert(&v, 0, 1, "x").unwrap_err(),
        BurninError::Other(_)
    ));
}
