//! Integration tests for fieldseal with the file-based key store.

use std::sync::Arc;

use fieldseal::db_crypto::DatabaseCrypto;
use fieldseal::error::Error;
use fieldseal::manager::CryptoManager;
use fieldseal::value::FieldValue;
use fieldseal_key_file::FileKeyStore;
use serde_json::json;
use tempfile::TempDir;

fn engine_from_fresh_key(dir: &TempDir, name: &str) -> CryptoManager {
    let store = FileKeyStore::new(dir.path().join(name));
    let key = store.generate().expect("key generation failed");
    CryptoManager::new(key)
}

#[test]
fn test_end_to_end_encryption_with_file_key() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileKeyStore::new(temp_dir.path().join("instance").join(".master.key"));

    // Provision once, then load the way a process start does.
    store.generate().expect("Failed to generate key");
    let key = store.load().expect("Failed to load key");

    let engine = CryptoManager::new(key);
    let value = FieldValue::from("alice@example.com");

    let token = engine.encrypt(&value).expect("Encryption failed");
    let decrypted = engine.decrypt(&token).expect("Decryption failed");

    assert_eq!(decrypted, value);
}

#[test]
fn test_generated_and_loaded_keys_are_token_compatible() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileKeyStore::new(temp_dir.path().join(".master.key"));

    let writer = CryptoManager::new(store.generate().expect("generate failed"));
    let reader = CryptoManager::new(store.load().expect("load failed"));

    let value = FieldValue::Json(json!({"equipment": "boiler_2", "reading": 451.0}));
    let token = writer.encrypt(&value).expect("Encryption failed");

    assert_eq!(reader.decrypt(&token).expect("Decryption failed"), value);
}

#[test]
fn test_concrete_scenario_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_from_fresh_key(&temp_dir, "scenario.key");

    let structured = FieldValue::Json(json!({"a": 1, "b": [1, 2, 3]}));
    let token = engine.encrypt(&structured).unwrap();
    assert_eq!(engine.decrypt(&token).unwrap(), structured);

    let token = engine.encrypt(&FieldValue::from("hello")).unwrap();
    assert_eq!(engine.decrypt(&token).unwrap(), FieldValue::Text("hello".to_string()));

    // Integer 7 stays integer 7 — the typed token carries its tag.
    let token = engine.encrypt(&FieldValue::Int(7)).unwrap();
    assert_eq!(engine.decrypt(&token).unwrap(), FieldValue::Int(7));
}

#[test]
fn test_wrong_key_always_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let engine_a = engine_from_fresh_key(&temp_dir, "a.key");
    let engine_b = engine_from_fresh_key(&temp_dir, "b.key");

    for _ in 0..16 {
        let token = engine_a.encrypt(&FieldValue::from("cross-key")).unwrap();
        assert!(matches!(engine_b.decrypt(&token), Err(Error::SecurityValidation)));
    }
}

#[test]
fn test_size_scaling_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine_from_fresh_key(&temp_dir, "sizes.key");

    for size in [1024, 1024 * 1024] {
        let value = FieldValue::Bytes(vec![0x5A; size]);
        let token = engine.encrypt(&value).unwrap();
        match engine.decrypt(&token).unwrap() {
            FieldValue::Bytes(data) => assert_eq!(data.len(), size),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}

#[test]
fn test_adapter_with_file_key() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileKeyStore::new(temp_dir.path().join(".master.key"));
    let engine = Arc::new(CryptoManager::new(store.generate().unwrap()));

    let db_crypto = DatabaseCrypto::unbound();
    assert!(matches!(db_crypto.encrypt_value("early"), Err(Error::NotInitialized)));

    db_crypto.bind(engine).expect("bind failed");

    let token = db_crypto.encrypt_value(json!({"tag": "PT-101", "value": 12.5})).unwrap();
    let value = db_crypto.decrypt_value(&token).unwrap();
    assert_eq!(value, FieldValue::Json(json!({"tag": "PT-101", "value": 12.5})));
}

#[test]
fn test_regenerated_key_invalidates_old_tokens() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileKeyStore::new(temp_dir.path().join(".master.key"));

    let old_engine = CryptoManager::new(store.generate().unwrap());
    let token = old_engine.encrypt(&FieldValue::from("pre-rotation")).unwrap();

    // Explicit regeneration destroys the old key; old tokens must fail
    // loudly, never decrypt to garbage.
    let new_engine = CryptoManager::new(store.generate().unwrap());
    assert!(matches!(new_engine.decrypt(&token), Err(Error::SecurityValidation)));
}
