// -----------------------------------------------------------------------------
// NamingStrategy

/// Maps an in-memory field name to its default serialized name.
///
/// Applied during metadata resolution; a field's explicit
/// `#[facet(name = "...")]` override always wins over the strategy.
pub trait NamingStrategy: Send + Sync {
    fn translate(&self, field_name: &str) -> String;
}

/// Serialized names are the field names, unchanged. The default.
pub struct IdenticalNaming;

impl NamingStrategy for IdenticalNaming {
    #[inline]
    fn translate(&self, field_name: &str) -> String {
        field_name.to_owned()
    }
}

/// `snake_case` field names become `camelCase` serialized names.
pub struct CamelCaseNaming;

impl NamingStrategy for CamelCaseNaming {
    fn translate(&self, field_name: &str) -> String {
        let mut out = String::with_capacity(field_name.len());
        let mut upper_next = false;
        for ch in field_name.chars() {
            if ch == '_' {
                upper_next = true;
            } else if upper_next {
                out.extend(ch.to_uppercase());
                upper_next = false;
            } else {
                out.push(ch);
            }
        }
        out
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{CamelCaseNaming, IdenticalNaming, NamingStrategy};

    #[test]
    fn identical_keeps_names() {
        assert_eq!(IdenticalNaming.translate("release_year"), "release_year");
    }

    #[test]
    fn camel_case_translation() {
        assert_eq!(CamelCaseNaming.translate("release_year"), "releaseYear");
        assert_eq!(CamelCaseNaming.translate("id"), "id");
        assert_eq!(CamelCaseNaming.translate("a_b_c"), "aBC");
    }
}
