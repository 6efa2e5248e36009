use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const KEY_A: &str = "0101010101010101010101010101010101010101010101010101010101010101";
const KEY_B: &str = "0202020202020202020202020202020202020202020202020202020202020202";

fn bin() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keyset"));
    cmd.env_remove("KEYSET_KEYS")
        .env_remove("KEYSET_PASSPHRASE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn keygen_prints_256_bit_hex_key() {
    let out = bin().arg("keygen").assert().success().get_output().stdout.clone();
    let line = String::from_utf8(out).unwrap();
    let key = line.trim();

    assert_eq!(key.len(), 64);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn keygen_keys_differ() {
    let a = bin().arg("keygen").assert().success().get_output().stdout.clone();
    let b = bin().arg("keygen").assert().success().get_output().stdout.clone();
    assert_ne!(a, b);
}

#[test]
fn hash_is_deterministic_sha256() {
    bin()
        .env("KEYSET_PASSPHRASE", "pw")
        .arg("hash")
        .assert()
        .success()
        .stdout(predicate::str::is_match("^[0-9a-f]{64}\n$").unwrap());

    let a = bin().env("KEYSET_PASSPHRASE", "pw").arg("hash").output().unwrap();
    let b = bin().write_stdin("pw\n").arg("hash").output().unwrap();
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn encrypt_decrypt_roundtrip() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("plain.txt");
    let sealed = dir.path().join("sealed.hex");
    let opened = dir.path().join("opened.txt");
    fs::write(&plain, b"the quick brown fox").unwrap();

    bin()
        .args(["--key", KEY_A, "encrypt", "--input"])
        .arg(&plain)
        .arg("--output")
        .arg(&sealed)
        .assert()
        .success();

    let encoded = fs::read_to_string(&sealed).unwrap();
    assert!(!encoded.contains("quick"));

    bin()
        .args(["--key", KEY_A, "decrypt", "--input"])
        .arg(&sealed)
        .arg("--output")
        .arg(&opened)
        .assert()
        .success();

    assert_eq!(fs::read(&opened).unwrap(), b"the quick brown fox");
}

#[test]
fn decrypt_with_rotated_keys_falls_back_to_old_key() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("plain.txt");
    let sealed = dir.path().join("sealed.hex");
    fs::write(&plain, b"sealed under the old key").unwrap();

    bin()
        .args(["--key", KEY_A, "encrypt", "--input"])
        .arg(&plain)
        .arg("--output")
        .arg(&sealed)
        .assert()
        .success();

    bin()
        .env("KEYSET_KEYS", format!("{KEY_B},{KEY_A}"))
        .arg("decrypt")
        .arg("--input")
        .arg(&sealed)
        .assert()
        .success()
        .stdout("sealed under the old key");
}

#[test]
fn decrypt_with_unknown_key_fails() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("plain.txt");
    let sealed = dir.path().join("sealed.hex");
    fs::write(&plain, b"secret").unwrap();

    bin()
        .args(["--key", KEY_A, "encrypt", "--input"])
        .arg(&plain)
        .arg("--output")
        .arg(&sealed)
        .assert()
        .success();

    bin()
        .args(["--key", KEY_B, "decrypt", "--input"])
        .arg(&sealed)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid decryption key"));
}

#[test]
fn passphrase_roundtrip() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("plain.txt");
    let sealed = dir.path().join("sealed.hex");
    fs::write(&plain, b"from a passphrase").unwrap();

    bin()
        .env("KEYSET_PASSPHRASE", "correct horse")
        .arg("encrypt")
        .arg("--input")
        .arg(&plain)
        .arg("--output")
        .arg(&sealed)
        .assert()
        .success();

    bin()
        .env("KEYSET_PASSPHRASE", "correct horse")
        .arg("decrypt")
        .arg("--input")
        .arg(&sealed)
        .assert()
        .success()
        .stdout("from a passphrase");

    bin()
        .env("KEYSET_PASSPHRASE", "wrong horse")
        .arg("decrypt")
        .arg("--input")
        .arg(&sealed)
        .assert()
        .failure();
}

#[test]
fn invalid_key_is_rejected() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("plain.txt");
    fs::write(&plain, b"secret").unwrap();

    bin()
        .args(["--key", "abcd", "encrypt", "--input"])
        .arg(&plain)
        .assert()
        .failure()
        .stderr(predicate::str::contains("key must be 32 bytes"));

    bin()
        .args(["--key", "not-hex", "encrypt", "--input"])
        .arg(&plain)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid hex"));
}

#[test]
fn tampered_ciphertext_is_rejected() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("plain.txt");
    let sealed = dir.path().join("sealed.hex");
    fs::write(&plain, b"secret").unwrap();

    bin()
        .args(["--key", KEY_A, "encrypt", "--input"])
        .arg(&plain)
        .arg("--output")
        .arg(&sealed)
        .assert()
        .success();

    let mut encoded = fs::read_to_string(&sealed).unwrap().trim().to_string();
    let last = encoded.pop().unwrap();
    encoded.push(if last == '0' { '1' } else { '0' });
    fs::write(&sealed, encoded).unwrap();

    bin()
        .args(["--key", KEY_A, "decrypt", "--input"])
        .arg(&sealed)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid decryption key"));
}
