/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a human-readable order ID: `GB-` + 6 random digits.
///
/// Readable enough to quote over the phone. Uniqueness is the caller's
/// responsibility (re-draw on collision against the order store).
pub fn order_id() -> String {
    use rand::Rng;
    let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    format!("GB-{n}")
}

/// Generate a payment reference: `pay_` + 10 random alphanumerics
pub fn payment_reference() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let token: String = (0..10)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("pay_{token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_shape() {
        let id = order_id();
        assert!(id.starts_with("GB-"));
        assert_eq!(id.len(), 9);
        assert!(id[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn payment_reference_shape() {
        let r = payment_reference();
        assert!(r.starts_with("pay_"));
        assert_eq!(r.len(), 14);
    }
}
