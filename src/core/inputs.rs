//! Step input list parsing
//!
//! Workflow and environment-key inputs arrive as newline separated lists.

use crate::api::models::Environment;
use crate::config::defaults;

/// Parse the newline separated workflow list
///
/// Names are trimmed and blank lines skipped. Duplicates are kept, each one
/// starts its own build.
pub fn parse_workflows(list: &str) -> Vec<String> {
    list.lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse the newline separated environment key list
///
/// Keys are trimmed, a leading `$` is stripped and blank lines are skipped.
pub fn parse_environment_keys(list: &str) -> Vec<String> {
    list.lines()
        .map(str::trim)
        .map(|key| key.strip_prefix('$').unwrap_or(key))
        .filter(|key| !key.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Resolve keys to environment entries, preserving order
///
/// Keys the lookup does not know resolve to an empty value.
pub fn collect_environments<F>(keys: &[String], lookup: F) -> Vec<Environment>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .map(|key| Environment::new(key.as_str(), lookup(key).unwrap_or_default()))
        .collect()
}

/// Resolve keys against the current process environment
pub fn environments_from_process(keys: &[String]) -> Vec<Environment> {
    collect_environments(keys, |key| std::env::var(key).ok())
}

/// Entries injected into every child build
///
/// The source build number always comes first, followed by `forwarded`.
pub fn injected_environments(source_build_number: &str, forwarded: &[Environment]) -> Vec<Environment> {
    let mut environments = Vec::with_capacity(forwarded.len() + 1);
    environments.push(Environment::new(
        defaults::SOURCE_BUILD_NUMBER_KEY,
        source_build_number,
    ));
    environments.extend_from_slice(forwarded);
    environments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use crate::test_utils::generators::{env_key, workflow_name};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_workflows() {
        assert!(parse_workflows("").is_empty());
        assert!(parse_workflows("\n  \n").is_empty());
        assert_eq!(
            parse_workflows("build-android\n  build-ios \n\nbuild-android"),
            vec!["build-android", "build-ios", "build-android"]
        );
        assert_eq!(parse_workflows("deploy\r\n"), vec!["deploy"]);
    }

    #[test]
    fn test_parse_environment_keys() {
        assert!(parse_environment_keys("").is_empty());
        assert_eq!(parse_environment_keys("ENV_1"), vec!["ENV_1"]);
        assert_eq!(
            parse_environment_keys("ENV_1\n$ENV_2\nENV_3\n$ENV_4"),
            vec!["ENV_1", "ENV_2", "ENV_3", "ENV_4"]
        );
        assert_eq!(parse_environment_keys(" $TOKEN \n\n$\n"), vec!["TOKEN"]);
    }

    #[test]
    fn test_collect_environments_missing_is_empty() {
        let env: HashMap<&str, &str> = HashMap::from([("STAGE", "prod")]);
        let result = collect_environments(&parse_environment_keys("$TOKEN\nSTAGE"), |key| {
            env.get(key).map(ToString::to_string)
        });
        assert_eq!(
            result,
            vec![Environment::new("TOKEN", ""), Environment::new("STAGE", "prod")]
        );
    }

    #[test]
    fn test_environments_from_process() {
        let result = environments_from_process(&keys(&[
            "BUILD_ROUTER_TEST_SURELY_UNSET_VARIABLE",
        ]));
        assert_eq!(
            result,
            vec![Environment::new("BUILD_ROUTER_TEST_SURELY_UNSET_VARIABLE", "")]
        );
    }

    #[test]
    fn test_injected_environments_source_number_first() {
        let forwarded = vec![Environment::new("A", "1"), Environment::new("B", "2")];
        let result = injected_environments("42", &forwarded);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0], Environment::new("SOURCE_BITRISE_BUILD_NUMBER", "42"));
        assert_eq!(&result[1..], forwarded.as_slice());
    }

    #[test]
    fn test_injected_environments_without_forwarded() {
        let result = injected_environments("7", &[]);
        assert_eq!(result, vec![Environment::new("SOURCE_BITRISE_BUILD_NUMBER", "7")]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        /// Markers are stripped and order is preserved
        #[test]
        fn prop_environment_keys_order_and_marker(
            entries in proptest::collection::vec((env_key(), any::<bool>()), 0..8),
        ) {
            let list = entries
                .iter()
                .map(|(key, marked)| if *marked { format!("${key}") } else { key.clone() })
                .collect::<Vec<_>>()
                .join("\n");
            let parsed = parse_environment_keys(&list);
            let expected: Vec<String> = entries.iter().map(|(key, _)| key.clone()).collect();
            prop_assert_eq!(parsed, expected);
        }

        /// Every non-blank line becomes one workflow, trimmed
        #[test]
        fn prop_workflows_trimmed(
            names in proptest::collection::vec(workflow_name(), 0..8),
            pad in 0usize..3,
        ) {
            let padding = " ".repeat(pad);
            let list = names
                .iter()
                .map(|name| format!("{padding}{name}{padding}"))
                .collect::<Vec<_>>()
                .join("\n");
            prop_assert_eq!(parse_workflows(&list), names);
        }

        /// Each key resolves to exactly one entry, missing values are empty
        #[test]
        fn prop_collect_one_entry_per_key(
            keys in proptest::collection::vec(env_key(), 0..8),
        ) {
            let result = collect_environments(&keys, |_| None);
            prop_assert_eq!(result.len(), keys.len());
            for (env, key) in result.iter().zip(&keys) {
                prop_assert_eq!(&env.mapped_to, key);
                prop_assert_eq!(env.value.as_str(), "");
            }
        }
    }
}
