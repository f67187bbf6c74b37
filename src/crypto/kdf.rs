//! Password key derivation

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::Zeroizing;

use super::cipher::KEY_LEN;

/// Iteration count assumed when a master-key record carries none
pub const DEFAULT_DERIVE_ITERATIONS: u32 = 25_000;

/// Derive a 32-byte symmetric key from a password with PBKDF2-HMAC-SHA512.
///
/// An iteration count of zero is treated as [`DEFAULT_DERIVE_ITERATIONS`].
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; KEY_LEN]> {
    let rounds = if iterations == 0 {
        DEFAULT_DERIVE_ITERATIONS
    } else {
        iterations
    };

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, rounds, key.as_mut());
    key
}
