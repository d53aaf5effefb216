use rand::seq::IndexedRandom;

/// Alphabet for room codes. Uppercase letters and digits only so codes are
/// easy to read aloud and type on a phone.
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const CODE_LENGTH: usize = 6;

/// Generates a random 6-character room code. Uniqueness is the caller's
/// problem; the repository retries on collision.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| {
            // CODE_CHARS is a non-empty constant.
            *CODE_CHARS.choose(&mut rng).unwrap_or(&b'A') as char
        })
        .collect()
}

/// Normalizes user-typed codes so `" abc123 "` finds room `ABC123`.
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_CHARS.contains(&b))
}
