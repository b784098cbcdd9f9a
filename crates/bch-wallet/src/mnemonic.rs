//! BIP39 mnemonics: generation, parsing and seed stretching.

use std::str::FromStr;

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::DerivationError;

/// Words in a freshly generated mnemonic (256 bits of entropy).
pub const MNEMONIC_WORD_COUNT: usize = 24;

/// Generate a new English mnemonic from OS entropy.
pub fn generate_mnemonic() -> Result<String, DerivationError> {
    let mnemonic = Mnemonic::generate_in_with(&mut OsRng, Language::English, MNEMONIC_WORD_COUNT)
        .map_err(|e| DerivationError::InvalidMnemonic(format!("failed to generate mnemonic: {}", e)))?;
    Ok(mnemonic.to_string())
}

/// Parse `phrase`, checking the word list and checksum.
pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic, DerivationError> {
    Mnemonic::from_str(phrase.trim()).map_err(|e| DerivationError::InvalidMnemonic(e.to_string()))
}

/// The 64-byte BIP39 seed of `phrase` with an empty passphrase.
pub fn seed_from_mnemonic(phrase: &str) -> Result<Zeroizing<[u8; 64]>, DerivationError> {
    let mnemonic = parse_mnemonic(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "caught before prosper fiscal glimpse verb badge animal dress property kiss analyst wrist bachelor panda view range either develop advice hidden impulse tail volcano";

    #[test]
    fn test_seed_from_mnemonic() {
        let seed = seed_from_mnemonic(PHRASE).unwrap();
        assert_eq!(
            hex::encode(seed.as_slice()),
            "68216e1334e4a9f5c91dff40fbd4adc4d9ceccdcc9a8501dba1d3606fdf6a13a079693cf5beb5f9a5f403d18aca5baf6266eecb2cbf4c9fec69f06ee69b401b1"
        );
    }

    #[test]
    fn test_generate_is_24_valid_words() {
        let phrase = generate_mnemonic().unwrap();
        assert_eq!(phrase.split_whitespace().count(), MNEMONIC_WORD_COUNT);
        assert!(parse_mnemonic(&phrase).is_ok());
        assert_ne!(phrase, generate_mnemonic().unwrap());
    }

    #[test]
    fn test_rejects_bad_phrases() {
        assert!(matches!(
            parse_mnemonic("not a real mnemonic"),
            Err(DerivationError::InvalidMnemonic(_))
        ));
        let short = PHRASE.rsplit_once(' ').unwrap().0;
        assert!(parse_mnemonic(short).is_err());
        assert!(parse_mnemonic(&format!("  {}\n", PHRASE)).is_ok());
    }
}
