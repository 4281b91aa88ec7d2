// src/decoders/anchor.rs

//! Outils communs aux comptes Anchor : discriminator de 8 octets puis payload borsh.

use super::DecodeError;
use borsh::BorshDeserialize;
use solana_sdk::hash::hash;

pub const DISCRIMINATOR_LEN: usize = 8;

/// `sha256("account:<Name>")[..8]`, exactement comme Anchor le calcule.
pub fn account_discriminator(account_name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = hash(format!("account:{}", account_name).as_bytes()).to_bytes();
    let mut discriminator = [0u8; DISCRIMINATOR_LEN];
    discriminator.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    discriminator
}

/// Vérifie le discriminator et renvoie le reste des données.
pub fn strip_discriminator<'a>(data: &'a [u8], account_name: &str) -> Result<&'a [u8], DecodeError> {
    let expected = account_discriminator(account_name);
    match data.get(..DISCRIMINATOR_LEN) {
        Some(found) if found == expected => Ok(&data[DISCRIMINATOR_LEN..]),
        Some(found) => Err(DecodeError::InvalidDiscriminator {
            expected: hex::encode(expected),
            found: hex::encode(found),
        }),
        None => Err(DecodeError::TooShort { expected: DISCRIMINATOR_LEN, actual: data.len() }),
    }
}

/// Désérialise un préfixe borsh : les comptes sont souvent plus grands que leur contenu
/// (espace réservé), on ignore donc les octets restants.
pub fn deserialize_prefix<T: BorshDeserialize>(data: &[u8]) -> Result<T, DecodeError> {
    let mut cursor = data;
    Ok(T::deserialize(&mut cursor)?)
}

#[cfg(test)]
pub(crate) fn with_discriminator(account_name: &str, payload: &[u8]) -> Vec<u8> {
    let mut data = account_discriminator(account_name).to_vec();
    data.extend_from_slice(payload);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_is_stable_and_name_dependent() {
        assert_eq!(account_discriminator("TokenManager"), account_discriminator("TokenManager"));
        assert_ne!(account_discriminator("TokenManager"), account_discriminator("TimeInvalidator"));
    }

    #[test]
    fn wrong_discriminator_is_rejected() {
        let data = with_discriminator("TimeInvalidator", &[1, 2, 3]);
        let err = strip_discriminator(&data, "TokenManager").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDiscriminator { .. }));
        assert_eq!(strip_discriminator(&data, "TimeInvalidator").unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn short_data_is_rejected() {
        assert!(matches!(
            strip_discriminator(&[1, 2], "TokenManager"),
            Err(DecodeError::TooShort { expected: 8, actual: 2 })
        ));
    }

    #[test]
    fn trailing_padding_is_ignored() {
        let value: (u8, u64) = deserialize_prefix(&[7, 1, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff]).unwrap();
        assert_eq!(value, (7, 1));
    }
}
