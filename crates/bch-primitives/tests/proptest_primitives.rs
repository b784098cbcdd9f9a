use proptest::prelude::*;

use bch_primitives::chainhash::Hash;
use bch_primitives::ec::private_key::PrivateKey;
use bch_primitives::ec::public_key::PublicKey;
use bch_primitives::hash::sha256;
use bch_primitives::util::{VarInt, WireReader, WireWriter};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn varint_decode_inverts_encode(v in any::<u64>()) {
        let encoded = VarInt(v).to_bytes();
        let (decoded, used) = VarInt::from_bytes(&encoded).unwrap();
        prop_assert_eq!(decoded.value(), v);
        prop_assert_eq!(used, encoded.len());
    }

    #[test]
    fn hash_reverse_is_involution(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        prop_assert_eq!(hash.reverse().reverse(), hash);
        prop_assert_eq!(hash.is_empty(), bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn hash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        let parsed = Hash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(parsed, hash);
    }

    #[test]
    fn var_bytes_roundtrip(data in prop::collection::vec(any::<u8>(), 0..600)) {
        let mut w = WireWriter::new();
        w.write_var_bytes(&data);
        let bytes = w.into_bytes();
        let mut r = WireReader::new(&bytes);
        prop_assert_eq!(r.read_var_bytes().unwrap(), &data[..]);
        prop_assert!(r.is_empty());
    }

    #[test]
    fn truncated_varint_never_panics(data in prop::collection::vec(any::<u8>(), 0..9)) {
        // Short buffers either decode or fail; they never panic.
        let _ = VarInt::from_bytes(&data);
    }

    #[test]
    fn ecdsa_sign_verify_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let sig = pk.sign(&hash).unwrap();
            prop_assert!(pk.pub_key().verify(&hash, &sig));
            let reparsed = PublicKey::from_bytes(&pk.pub_key().to_compressed()).unwrap();
            prop_assert!(reparsed.verify(&hash, &sig));
        }
    }
}
