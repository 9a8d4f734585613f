use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Алфавит полезной нагрузки: строчные латинские буквы и цифры.
pub const PAYLOAD_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// RNG для генерации payload. `seed == 0` — случайный seed из ОС.
pub fn seeded_rng(seed: u64) -> StdRng {
    if seed == 0 {
        StdRng::from_os_rng()
    } else {
        StdRng::seed_from_u64(seed)
    }
}

pub fn random_payload<R: Rng + ?Sized>(rng: &mut R, size: usize) -> String {
    (0..size)
        .map(|_| PAYLOAD_CHARSET[rng.random_range(0..PAYLOAD_CHARSET.len())] as char)
        .collect()
}

pub fn is_payload(s: &str) -> bool {
    s.bytes().all(|b| PAYLOAD_CHARSET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_matches_size() {
        let mut rng = seeded_rng(7);
        for size in [0, 1, 5, 32, 4096] {
            assert_eq!(random_payload(&mut rng, size).len(), size);
        }
    }

    #[test]
    fn only_lowercase_and_digits() {
        let mut rng = seeded_rng(0);
        let data = random_payload(&mut rng, 2048);
        assert!(is_payload(&data), "unexpected char in {data}");
        assert!(!is_payload("abcD"));
        assert!(!is_payload("a-b"));
    }

    #[test]
    fn same_seed_same_payload() {
        let a = random_payload(&mut seeded_rng(42), 64);
        let b = random_payload(&mut seeded_rng(42), 64);
        let c = random_payload(&mut seeded_rng(43), 64);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
