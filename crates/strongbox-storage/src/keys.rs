//! Shared key generation for storage backends.

use uuid::Uuid;

/// Generate the storage key for an owner's file: `files/{owner_id}/{stored_name}`.
pub fn file_key(owner_id: Uuid, stored_name: &str) -> String {
    format!("files/{}/{}", owner_id, stored_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_owner_scoped() {
        let owner = Uuid::new_v4();
        let key = file_key(owner, "abc.pdf");
        assert_eq!(key, format!("files/{}/abc.pdf", owner));
    }
}
