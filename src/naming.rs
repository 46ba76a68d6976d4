//! Canonical names for fields, resources, listings and actions.

/// Canonical field name: lower-case, with `-`, `.` and spaces mapped to `_`.
pub fn field_name(wire: &str) -> String {
    wire.chars()
        .map(|c| match c {
            '-' | '.' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// `pool.dataset` → `pool_dataset`.
pub fn resource_name(base: &str) -> String {
    field_name(base)
}

/// Listing name: the resource name pluralised with `s`.
pub fn listing_name(base: &str) -> String {
    format!("{}s", resource_name(base))
}

/// `pool.scrub.run` → `pool_scrub_run`.
pub fn action_name(method: &str) -> String {
    field_name(method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_lowercased() {
        assert_eq!(field_name("CSR"), "csr");
        assert_eq!(field_name("key-type"), "key_type");
        assert_eq!(field_name("cert extensions"), "cert_extensions");
        assert_eq!(field_name("already_fine"), "already_fine");
    }

    #[test]
    fn resource_and_listing() {
        assert_eq!(resource_name("pool.dataset"), "pool_dataset");
        assert_eq!(listing_name("pool.dataset"), "pool_datasets");
        assert_eq!(listing_name("vm"), "vms");
    }

    #[test]
    fn action_names() {
        assert_eq!(action_name("pool.scrub.run"), "pool_scrub_run");
        assert_eq!(action_name("app.redeploy"), "app_redeploy");
    }
}
