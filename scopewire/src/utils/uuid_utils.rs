//! UUID helpers for snapshot correlation.

use uuid::Uuid;

/// Generates a new random UUID (v4).
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Returns the first segment of a UUID, for compact log fields.
#[must_use]
pub fn short_id(id: &Uuid) -> String {
    let full = id.to_string();
    full.split('-').next().unwrap_or(&full).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uuid_unique() {
        assert_ne!(generate_uuid(), generate_uuid());
    }

    #[test]
    fn test_short_id_length() {
        let id = generate_uuid();
        assert_eq!(short_id(&id).len(), 8);
    }
}
