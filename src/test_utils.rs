//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a build slug (lowercase hex, like the API hands out)
    pub fn build_slug() -> impl Strategy<Value = String> {
        "[0-9a-f]{16}"
    }

    /// Generate a workflow name
    pub fn workflow_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,20}"
    }

    /// Generate an environment variable name
    pub fn env_key() -> impl Strategy<Value = String> {
        "[A-Z_][A-Z0-9_]{0,15}"
    }

    /// Generate a known wire status code
    pub fn status_code() -> impl Strategy<Value = i64> {
        0i64..=4
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::api::models::BuildStatus;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_build_slug_generator(slug in build_slug()) {
            prop_assert_eq!(slug.len(), 16);
            prop_assert!(slug.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn test_workflow_name_generator(name in workflow_name()) {
            prop_assert!(!name.is_empty());
            prop_assert_eq!(name.trim(), name.as_str());
        }

        #[test]
        fn test_env_key_generator(key in env_key()) {
            prop_assert!(!key.starts_with('$'));
            prop_assert!(key.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
        }

        #[test]
        fn test_status_code_generator(code in status_code()) {
            prop_assert!(BuildStatus::from_code(code).is_some());
        }
    }
}
