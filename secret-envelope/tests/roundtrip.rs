use secret_envelope::{Cryptographer, RootKey};

fn setup() -> Cryptographer {
    Cryptographer::new(RootKey::new("kid-1", [11u8; 32]))
}

#[test]
fn roundtrip_basic() {
    let c = setup();
    let env = c.encrypt("SECRET_NAME", b"hunter2").unwrap();
    assert_eq!(c.decrypt("SECRET_NAME", &env).unwrap(), b"hunter2");
}

#[test]
fn wrong_name_fails_aad_check() {
    let c = setup();
    let env = c.encrypt("ORIGINAL_NAME", b"payload").unwrap();
    assert!(c.decrypt("DIFFERENT_NAME", &env).is_err());
}

#[test]
fn two_cryptographers_different_root_keys_are_incompatible() {
    let a = Cryptographer::new(RootKey::new("kid-a", [1u8; 32]));
    let b = Cryptographer::new(RootKey::new("kid-b", [2u8; 32]));
    let env = a.encrypt("NAME", b"data").unwrap();
    assert!(b.decrypt("NAME", &env).is_err());
}

#[test]
fn envelope_is_base64_dot_kid() {
    let c = setup();
    let env = c.encrypt("NAME", b"data").unwrap();
    let parts: Vec<&str> = env.rsplitn(2, '.').collect();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], "kid-1");
}

#[test]
fn truncated_envelope_fails() {
    let c = setup();
    let env = c.encrypt("NAME", b"data").unwrap();
    let truncated = &env[..env.len() / 2];
    assert!(c.decrypt("NAME", truncated).is_err());
}
