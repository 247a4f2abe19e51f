use proptest::prelude::*;
use tipline_crypto::{
    decrypt_field, encrypt_field, looks_encrypted, CryptoError, DataKey, ENVELOPE_PREFIX,
};

fn key_from(seed: [u8; 32]) -> DataKey {
    DataKey::from_bytes(seed)
}

proptest! {
    #[test]
    fn roundtrip_any_string(s in any::<String>(), seed in any::<[u8; 32]>()) {
        let key = key_from(seed);
        let env = encrypt_field(&s, &key).unwrap();
        prop_assert_eq!(decrypt_field(&env, &key).unwrap(), s);
    }

    #[test]
    fn wrong_key_always_errors(
        s in any::<String>(),
        a in any::<[u8; 32]>(),
        b in any::<[u8; 32]>(),
    ) {
        prop_assume!(a != b);
        let env = encrypt_field(&s, &key_from(a)).unwrap();
        let result = decrypt_field(&env, &key_from(b));
        prop_assert!(matches!(result, Err(CryptoError::Decryption(_))));
    }

    #[test]
    fn human_text_is_never_ciphertext(s in "[ -~\\n\\t]{0,200}") {
        prop_assert!(!looks_encrypted(&s));
    }

    #[test]
    fn envelopes_are_always_recognised(s in any::<String>()) {
        let env = encrypt_field(&s, &DataKey::generate()).unwrap();
        prop_assert!(looks_encrypted(&env));
    }
}

#[test]
fn truncated_envelope_fails() {
    let key = DataKey::generate();
    let env = encrypt_field("a reasonably long piece of report content", &key).unwrap();
    let truncated = &env[..env.len() - 4];
    assert!(decrypt_field(truncated, &key).is_err());
}

#[test]
fn flipped_character_fails_authentication() {
    let key = DataKey::generate();
    let env = encrypt_field("integrity matters", &key).unwrap();

    let mut chars: Vec<char> = env.chars().collect();
    let idx = ENVELOPE_PREFIX.len() + 20;
    chars[idx] = if chars[idx] == 'A' { 'B' } else { 'A' };
    let tampered: String = chars.into_iter().collect();

    assert!(looks_encrypted(&tampered));
    assert!(decrypt_field(&tampered, &key).is_err());
}

#[test]
fn prefix_with_garbage_body_is_not_ciphertext() {
    assert!(!looks_encrypted("enc:v1:!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!"));
    assert!(!looks_encrypted("enc:v1:hello world, this is my complaint"));
}

#[test]
fn unicode_content_roundtrips() {
    let key = DataKey::generate();
    let text = "Beschwerde über den Vorgesetzten — 上司への苦情 📎";
    let env = encrypt_field(text, &key).unwrap();
    assert_eq!(decrypt_field(&env, &key).unwrap(), text);
}
