use std::path::PathBuf;

/// Directory override from an environment variable; blank values count
/// as unset.
#[must_use]
pub fn dir_override(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::dir_override;

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let previous = std::env::var(key).ok();
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(previous) = &self.previous {
                std::env::set_var(self.key, previous);
            } else {
                std::env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn reads_the_override() {
        let _guard = EnvGuard::set("TICKERTERM_PATH_ENV_TEST", Some("/tmp/data"));
        assert_eq!(
            dir_override("TICKERTERM_PATH_ENV_TEST"),
            Some(std::path::PathBuf::from("/tmp/data"))
        );
    }

    #[test]
    fn ignores_empty_values() {
        let _guard = EnvGuard::set("TICKERTERM_PATH_ENV_TEST_EMPTY", Some("   "));
        assert!(dir_override("TICKERTERM_PATH_ENV_TEST_EMPTY").is_none());
    }
}
