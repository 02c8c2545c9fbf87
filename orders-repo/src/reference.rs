//! Merchant reference generation.

use rand::Rng;

use orders_types::MerchantRef;
use orders_types::domain::order::{MERCHANT_REF_PREFIX, MERCHANT_REF_RANDOM_LEN};

/// How many references a store mints before giving up on collisions.
pub const MAX_REFERENCE_ATTEMPTS: u32 = 5;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Mints a fresh `PO-` reference from the thread-local CSPRNG.
///
/// Uniqueness is not guaranteed here; the store enforces it with a unique
/// constraint and retries on collision.
pub fn generate() -> MerchantRef {
    let mut rng = rand::rng();
    let mut reference = String::with_capacity(MERCHANT_REF_PREFIX.len() + MERCHANT_REF_RANDOM_LEN);
    reference.push_str(MERCHANT_REF_PREFIX);
    for _ in 0..MERCHANT_REF_RANDOM_LEN {
        let idx = rng.random_range(0..CHARSET.len());
        reference.push(CHARSET[idx] as char);
    }
    reference
        .parse()
        .expect("generated reference matches the required format")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_format() {
        for _ in 0..100 {
            let reference = generate();
            let s = reference.as_str();
            assert!(s.starts_with("PO-"));
            assert_eq!(s.len(), 13);
            assert!(
                s["PO-".len()..]
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_generated_references_distinct() {
        let refs: HashSet<String> = (0..1000).map(|_| generate().into_string()).collect();
        assert_eq!(refs.len(), 1000);
    }
}
