// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Where variables are read from.
#[derive(Debug, Clone)]
enum Source {
    Process,
    Fixed(HashMap<String, String>),
}

/// Environment variable loader
///
/// Keys are upper-cased and joined to the prefix with `_`, so
/// `EnvLoader::new(Some("SMTP".into())).load_var("host")` reads `SMTP_HOST`.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
    source: Source,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix,
            source: Source::Process,
        }
    }

    /// Create a loader over a fixed set of variables instead of the process environment.
    pub fn from_map<I, K, V>(prefix: Option<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix,
            source: Source::Fixed(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Load variables from a `.env` file into the process environment.
    ///
    /// With no path, a missing `.env` in the working directory is not an error.
    pub fn load_dotenv(path: Option<&str>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Ok(())
    }

    /// Full variable name for a key, prefix included.
    pub fn key_name(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = self.key_name(key);

        match &self.source {
            Source::Process => env::var(&full_key).map_err(|e| match e {
                env::VarError::NotPresent => ConfigError::KeyNotFound(full_key),
                other => ConfigError::EnvError(other),
            }),
            Source::Fixed(vars) => vars
                .get(&full_key)
                .cloned()
                .ok_or(ConfigError::KeyNotFound(full_key)),
        }
    }

    /// Load a variable, treating absence as `None`.
    pub fn load_optional(&self, key: &str) -> Result<Option<String>> {
        match self.load_var(key) {
            Ok(value) => Ok(Some(value)),
            Err(ConfigError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load with default value
    ///
    /// Only absence falls back to `default`; a value that is present but
    /// unreadable is still an error.
    pub fn load_var_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .load_optional(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Load and parse a variable, falling back to `default` when it is unset.
    pub fn load_parsed_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.load_optional(key)? {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
                key: self.key_name(key),
                message: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // std::env::set_var is unsafe in edition 2024, so these tests go through
    // `from_map` or read variables that already exist, except where a
    // non-UTF-8 value is needed.

    #[test]
    fn test_env_loader_with_default() {
        let loader = EnvLoader::new(None);
        let value = loader.load_var_or("NONEXISTENT_VAR_12345", "default").unwrap();

        assert_eq!(value, "default");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_value_is_not_defaulted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        // Name is unique to this test, so no other test observes the write
        unsafe {
            env::set_var("COURIER_TEST_NON_UNICODE_PASS", OsStr::from_bytes(b"pa\xffss"));
        }

        let loader = EnvLoader::new(Some("COURIER_TEST".to_string()));
        let err = loader.load_var_or("non_unicode_pass", "").unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(env::VarError::NotUnicode(_))));
        assert!(loader.load_optional("non_unicode_pass").is_err());
    }

    #[test]
    fn test_env_loader_missing_var() {
        let loader = EnvLoader::new(Some("COURIER_TEST".to_string()));
        let result = loader.load_var("MISSING_VAR_67890");

        assert!(matches!(
            result,
            Err(ConfigError::KeyNotFound(key)) if key == "COURIER_TEST_MISSING_VAR_67890"
        ));
    }

    #[test]
    fn test_env_loader_path_exists() {
        let loader = EnvLoader::new(None);
        let result = loader.load_var("PATH");

        if std::env::var("PATH").is_ok() {
            assert!(result.is_ok());
        }
    }

    #[test]
    fn test_prefix_applied() {
        let loader =
            EnvLoader::from_map(Some("SMTP".to_string()), [("SMTP_HOST", "mail.example.com")]);

        assert_eq!(loader.key_name("host"), "SMTP_HOST");
        assert_eq!(loader.load_var("host").unwrap(), "mail.example.com");
        assert_eq!(loader.load_optional("user").unwrap(), None);
    }

    #[test]
    fn test_load_parsed_or() {
        let loader = EnvLoader::from_map(Some("SMTP".to_string()), [("SMTP_PORT", " 2525 ")]);
        assert_eq!(loader.load_parsed_or::<u16>("port", 587).unwrap(), 2525);
        assert_eq!(loader.load_parsed_or::<u16>("other", 587).unwrap(), 587);

        let loader = EnvLoader::from_map(Some("SMTP".to_string()), [("SMTP_PORT", "70000")]);
        let err = loader.load_parsed_or::<u16>("port", 587).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "SMTP_PORT"));
    }

    #[test]
    fn test_missing_dotenv_path_is_error() {
        assert!(EnvLoader::load_dotenv(Some("/nonexistent/courier/.env")).is_err());
        assert!(EnvLoader::load_dotenv(None).is_ok());
    }
}
