//! secp256k1 public keys, P2PKH addresses and WIF encoding

use std::collections::HashMap;

use k256::{elliptic_curve::sec1::ToEncodedPoint, SecretKey};
use zeroize::Zeroizing;

use super::{network::Network, recovered_key::RecoveredKey};
use crate::{
    crypto::{decode_base58check, encode_base58check, hash160},
    errors::KeyError,
};

pub const PRIVATE_KEY_LEN: usize = 32;
pub const COMPRESSED_PUBKEY_LEN: usize = 33;
pub const UNCOMPRESSED_PUBKEY_LEN: usize = 65;

const WIF_COMPRESSION_FLAG: u8 = 0x01;

/// Public key material derived from one private scalar
pub struct DerivedKeyPair {
    secret: Zeroizing<[u8; PRIVATE_KEY_LEN]>,
    uncompressed: [u8; UNCOMPRESSED_PUBKEY_LEN],
    compressed: [u8; COMPRESSED_PUBKEY_LEN],
}

impl DerivedKeyPair {
    /// Multiply the secp256k1 base point by `secret`.
    ///
    /// Rejects zero and scalars at or above the curve order.
    pub fn from_secret(secret: &[u8]) -> Result<Self, KeyError> {
        let secret: [u8; PRIVATE_KEY_LEN] =
            secret.try_into().map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&secret).map_err(|_| KeyError::InvalidPrivateKey)?;

        let point = secret_key.public_key().to_encoded_point(false);
        let uncompressed: [u8; UNCOMPRESSED_PUBKEY_LEN] = point
            .as_bytes()
            .try_into()
            .map_err(|_| KeyError::InvalidPrivateKey)?;
        let compressed = compress_public_key(&uncompressed);

        Ok(Self {
            secret: Zeroizing::new(secret),
            uncompressed,
            compressed,
        })
    }

    pub fn secret(&self) -> &[u8; PRIVATE_KEY_LEN] {
        &self.secret
    }

    pub fn uncompressed(&self) -> &[u8; UNCOMPRESSED_PUBKEY_LEN] {
        &self.uncompressed
    }

    pub fn compressed(&self) -> &[u8; COMPRESSED_PUBKEY_LEN] {
        &self.compressed
    }

    /// Public key in the requested encoding
    pub fn public_key(&self, compressed: bool) -> &[u8] {
        if compressed {
            &self.compressed
        } else {
            &self.uncompressed
        }
    }

    pub fn address(&self, compressed: bool, network: Network) -> String {
        address_from_public_key(self.public_key(compressed), network)
    }

    pub fn wif(&self, compressed: bool, network: Network) -> String {
        private_key_to_wif(&self.secret, compressed, network)
    }

    fn to_recovered_key(&self, compressed: bool, network: Network, label: String) -> RecoveredKey {
        RecoveredKey::new(
            self.address(compressed, network),
            hex::encode(&self.secret[..]),
            self.wif(compressed, network),
            hex::encode(self.public_key(compressed)),
            compressed,
            label,
        )
    }
}

/// x-coordinate with a 0x02/0x03 prefix chosen by the parity of y
pub fn compress_public_key(uncompressed: &[u8; UNCOMPRESSED_PUBKEY_LEN]) -> [u8; COMPRESSED_PUBKEY_LEN] {
    let mut compressed = [0u8; COMPRESSED_PUBKEY_LEN];
    compressed[0] = if uncompressed[64] & 1 == 1 { 0x03 } else { 0x02 };
    compressed[1..].copy_from_slice(&uncompressed[1..33]);
    compressed
}

/// `base58check(version ‖ hash160(public_key))`
pub fn address_from_public_key(public_key: &[u8], network: Network) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(network.p2pkh_version());
    payload.extend_from_slice(&hash160(public_key));
    encode_base58check(&payload)
}

/// `base58check(version ‖ key [‖ 0x01])`
pub fn private_key_to_wif(secret: &[u8; PRIVATE_KEY_LEN], compressed: bool, network: Network) -> String {
    let mut payload = Zeroizing::new(Vec::with_capacity(34));
    payload.push(network.wif_version());
    payload.extend_from_slice(secret);
    if compressed {
        payload.push(WIF_COMPRESSION_FLAG);
    }
    encode_base58check(&payload)
}

/// Decode a P2PKH address into its version byte and hash160
pub fn decode_address(address: &str) -> Result<(u8, [u8; 20]), KeyError> {
    let payload = decode_base58check(address)?;
    if payload.len() != 21 {
        return Err(KeyError::invalid_payload(
            "address",
            format!("expected 21 bytes, got {}", payload.len()),
        ));
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok((payload[0], hash))
}

/// A decoded WIF private key
pub struct DecodedWif {
    pub network: Network,
    pub secret: Zeroizing<[u8; PRIVATE_KEY_LEN]>,
    pub compressed: bool,
}

pub fn decode_wif(wif: &str) -> Result<DecodedWif, KeyError> {
    let payload = Zeroizing::new(decode_base58check(wif)?);

    let compressed = match payload.len() {
        33 => false,
        34 if payload[33] == WIF_COMPRESSION_FLAG => true,
        34 => {
            return Err(KeyError::invalid_payload(
                "wif",
                format!("unexpected compression flag {:#04x}", payload[33]),
            ))
        }
        n => {
            return Err(KeyError::invalid_payload(
                "wif",
                format!("expected 33 or 34 bytes, got {n}"),
            ))
        }
    };

    let network = Network::from_wif_version(payload[0]).ok_or_else(|| {
        KeyError::invalid_payload("wif", format!("unknown version byte {:#04x}", payload[0]))
    })?;

    let mut secret = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
    secret.copy_from_slice(&payload[1..33]);

    Ok(DecodedWif {
        network,
        secret,
        compressed,
    })
}

/// Build the recovered key entries for one private scalar.
///
/// The compressed entry comes first. The uncompressed entry follows when its
/// address differs. Labels are looked up by address, so each entry gets the
/// label recorded for its own address.
pub fn derive_recovered_keys(
    secret: &[u8],
    network: Network,
    labels: &HashMap<String, String>,
) -> Result<Vec<RecoveredKey>, KeyError> {
    let pair = DerivedKeyPair::from_secret(secret)?;

    let label_for = |address: &str| labels.get(address).cloned().unwrap_or_default();

    let compressed_address = pair.address(true, network);
    let mut keys = vec![pair.to_recovered_key(true, network, label_for(&compressed_address))];

    let uncompressed_address = pair.address(false, network);
    if uncompressed_address != compressed_address {
        keys.push(pair.to_recovered_key(false, network, label_for(&uncompressed_address)));
    }

    Ok(keys)
}
