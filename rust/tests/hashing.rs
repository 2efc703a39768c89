use std::fs;
use std::time::{Duration, Instant};

use paragraph_hash::config::HasherConfig;
use paragraph_hash::crypto::{EncodedHash, HashError, PasswordHasher};
use paragraph_hash::input::read_input;
use tempfile::NamedTempFile;

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog.\nIt was not amused.\n";

fn paragraph_file(text: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    fs::write(file.path(), text).expect("write paragraph");
    file
}

#[test]
fn hashes_file_contents_end_to_end() {
    let file = paragraph_file(PARAGRAPH);
    let hasher = HasherConfig::default()
        .with_cost(4)
        .build_hasher()
        .expect("hasher should build");

    let input = read_input(file.path()).expect("input should load");
    let encoded = hasher.hash(input.as_bytes()).expect("hashing should succeed").to_string();

    assert!(encoded.starts_with("$2b$04$"));
    assert_eq!(encoded.len(), 60);
    assert!(hasher.verify(PARAGRAPH.as_bytes(), &encoded).unwrap());
    assert!(!hasher.verify(b"A different paragraph entirely.", &encoded).unwrap());
}

#[test]
fn encoded_hash_survives_storage_and_reparse() {
    let hasher = PasswordHasher::new(4).unwrap();
    let original = hasher.hash(b"stored value").unwrap();

    let stored = paragraph_file(&format!("{original}\n"));
    let reread = fs::read_to_string(stored.path()).unwrap();
    let parsed: EncodedHash = reread.trim().parse().expect("stored hash should parse");

    assert_eq!(parsed, original);
    assert!(hasher.verify_encoded(b"stored value", &parsed).unwrap());
}

#[test]
fn hashes_concurrently_without_shared_state() {
    let hasher = PasswordHasher::new(4).unwrap();
    let results: Vec<(String, String)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                scope.spawn(move || {
                    let input = format!("thread input {i}");
                    let encoded = hasher.hash(input.as_bytes()).unwrap().to_string();
                    (input, encoded)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (input, encoded) in &results {
        assert!(hasher.verify(input.as_bytes(), encoded).unwrap());
    }
    for (other, _) in results.iter().skip(1) {
        assert!(!hasher.verify(other.as_bytes(), &results[0].1).unwrap());
    }
}

#[test]
fn verify_reports_malformed_hashes() {
    let hasher = PasswordHasher::default();
    for bad in ["", "$2b$", "$2b$10$", "plain text", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"] {
        assert!(matches!(
            hasher.verify(b"hello world", bad),
            Err(HashError::MalformedHash(_))
        ));
    }
}

fn fastest_of_three(hasher: PasswordHasher) -> Duration {
    (0..3)
        .map(|_| {
            let start = Instant::now();
            hasher.hash(b"timing input").unwrap();
            start.elapsed()
        })
        .min()
        .unwrap()
}

#[test]
fn cost_scales_work_exponentially() {
    // Three extra steps should cost about 8x; allow plenty of scheduler noise.
    let low = fastest_of_three(PasswordHasher::new(6).unwrap());
    let high = fastest_of_three(PasswordHasher::new(9).unwrap());
    assert!(high > low * 3, "cost 9 took {high:?}, cost 6 took {low:?}");
}
