use super::*;
use crate::captions::record::CaptionRecord;
use crate::foundation::core::VideoId;

fn tmp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "burnin_persist_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample_doc() -> CaptionDocument {
    let mut doc = CaptionDocument::new();
    doc.upsert(
        &VideoId::new("clip").unwrap(),
        CaptionRecord::new(0, 2, "héllo").unwrap(),
    );
    doc
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tmp_dir("missing");
    let store = JsonFileStore::new(dir.join("captions.json"));
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn save_then_load_returns_same_document() {
    let dir = tmp_dir("roundtrip");
    let store = JsonFileStore::new(dir.join("nested").join("captions.json"));
    let doc = sample_doc();

    store.save(&doc).unwrap();
    assert_eq!(store.load().unwrap(), doc);

    let leftovers: Vec<_> = std::fs::read_dir(dir.join("nested"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn non_ascii_text_is_written_unescaped() {
    let dir = tmp_dir("utf8");
    let store = JsonFileStore::new(dir.join("captions.json"));
    store.save(&sample_doc()).unwrap();
    let raw = std::fs::read_to_string(&store.path).unwrap();
    assert!(raw.contains("héllo"));
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tmp_dir("corrupt");
    let path = dir.join("captions.json");
    std::fs::write(&path, b"{not json").unwrap();
    let err = JsonFileStore::new(&path).load().unwrap_err();
    assert!(matches!(err, BurninError::Serde(_)));
}

#[test]
fn in_memory_store_counts_saves() {
    let store = InMemoryStore::new();
    assert!(store.load().unwrap().is_empty());
    store.save(&sample_doc()).unwrap();
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.load().unwrap(), sample_doc());
}

#[test]
fn temp_files_are_unique_per_save() {
    let dir = tmp_dir("tmpname");
    let store = JsonFileStore::new(dir.join("captions.json"));
    let (a, b) = (store.temp_path(), store.temp_path());
    assert_ne!(a, b);
    assert_eq!(a.parent(), Some(dir.as_path()));
    assert!(a.to_string_lossy().ends_with(".tmp"));
}

#[test]
fn two_stores_on_one_file_save_concurrently() {
    let dir = tmp_dir("two_stores");
    let path = dir.join("captions.json");
    let stores = [JsonFileStore::new(&path), JsonFileStore::new(&path)];
    std::thread::scope(|s| {
        for store in &stores {
            s.spawn(move || {
                for _ in 0..20 {
                    store.save(&sample_doc()).unwrap();
                }
            });
        }
    });
    assert_eq!(stores[0].load().unwrap(), sample_doc());
    let leftovers = std::fs::read_dir(&dir)
        .unwrap()
        .filter(|e| e.as_ref().unwrap().path() != path)
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn poisoned_in_memory_store_is_not_a_serde_error() {
    let store = InMemoryStore::new();
    let _ = std::thread::scope(|s| {
        s.spawn(|| {
            let _held = store.doc.lock().unwrap();
            panic!("writer died");
        })
        .join()
    });
    assert!(matches!(store.load().unwrap_err(), BurninError::Other(_)));
    assert!(matches!(
        store.save(&sample_doc()).unwrap_err(),
        BurninError::Other(_)
    ));
}
