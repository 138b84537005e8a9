mod common;

use std::collections::HashSet;

use base64ct::{Base64UrlUnpadded, Encoding};
use proptest::prelude::*;
use vapid::{generate_vapid, validate_keys, KeyValidationError, VapidKeyPair};

#[test]
fn generated_key_pairs_are_unique() {
    let mut public = HashSet::new();
    let mut private = HashSet::new();

    for _ in 0..1000 {
        let keys = generate_vapid().unwrap();

        assert_eq!(keys.public_key.len(), 87);
        assert_eq!(keys.private_key.len(), 43);

        let point = Base64UrlUnpadded::decode_vec(&keys.public_key).unwrap();
        assert_eq!(point.len(), 65);
        assert_eq!(point[0], 0x04);
        assert_eq!(
            Base64UrlUnpadded::decode_vec(&keys.private_key).unwrap().len(),
            32
        );

        assert!(public.insert(keys.public_key.clone()));
        assert!(private.insert(keys.private_key.to_string()));
    }
}

#[test]
fn validation_is_repeatable() {
    let keys = generate_vapid().unwrap();
    let broken = VapidKeyPair::new("x", keys.private_key.as_str());

    for _ in 0..3 {
        assert_eq!(validate_keys(&keys), Ok(()));
        assert_eq!(
            validate_keys(&broken),
            Err(KeyValidationError::PublicKeyLength(1))
        );
    }
}

proptest! {
    #[test]
    fn rejects_public_keys_of_other_lengths(key in "[A-Za-z0-9_-]{0,120}") {
        prop_assume!(key.len() != 87);
        let keys = generate_vapid().unwrap();

        let keys = VapidKeyPair::new(key.clone(), keys.private_key.as_str());
        prop_assert_eq!(
            validate_keys(&keys),
            Err(KeyValidationError::PublicKeyLength(key.len()))
        );
    }

    #[test]
    fn rejects_private_keys_of_other_lengths(key in "[A-Za-z0-9_-]{0,80}") {
        prop_assume!(key.len() != 43);
        let keys = generate_vapid().unwrap();

        let keys = VapidKeyPair::new(keys.public_key.clone(), key.clone());
        prop_assert_eq!(
            validate_keys(&keys),
            Err(KeyValidationError::PrivateKeyLength(key.len()))
        );
    }

    #[test]
    fn rejects_keys_outside_the_alphabet(idx in 0usize..87, c in "[+/=. ]") {
        let keys = generate_vapid().unwrap();

        let mut public = keys.public_key.clone();
        public.replace_range(idx..idx + 1, &c);

        let keys = VapidKeyPair::new(public, keys.private_key.as_str());
        prop_assert_eq!(
            validate_keys(&keys),
            Err(KeyValidationError::PublicKeyEncoding)
        );
    }

    #[test]
    fn accepts_any_well_formed_pair(
        public in proptest::collection::vec(any::<u8>(), 65),
        private in proptest::collection::vec(any::<u8>(), 32),
    ) {
        let keys = VapidKeyPair::new(
            Base64UrlUnpadded::encode_string(&public),
            Base64UrlUnpadded::encode_string(&private),
        );

        prop_assert_eq!(validate_keys(&keys), Ok(()));
    }
}
