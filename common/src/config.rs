use std::{collections::HashMap, fmt::Display, path::Path, str::FromStr};

use anyhow::{anyhow, ensure, Context, Result};
use hocon::{Hocon, HoconLoader};

/// Resolves configuration values from, in order of precedence, the environment, the scoped
/// section of a hocon file and the root of that file.
///
/// Environment variables are looked up as `<SCOPE>_<NAME>` in upper case, so `pool_size` in the
/// `stress` scope is overridden by `STRESS_POOL_SIZE`.
#[derive(Debug)]
pub struct ConfigLoader {
    hocon: Option<Hocon>,
    env: HashMap<String, String>,
    scope: String,
}

impl ConfigLoader {
    pub fn new(path: impl AsRef<Path>, scope: String) -> Result<Self> {
        let path = path.as_ref();
        ensure!(path.is_file(), "The config file {:?} was not found", path);

        let hocon = HoconLoader::new()
            .load_file(path)
            .with_context(|| format!("Failed to find or load config file at: {:?}", path))?
            .hocon()
            .with_context(|| format!("Failed to parse config file at: {:?}", path))?;

        Ok(Self {
            hocon: Some(hocon),
            env: std::env::vars().collect(),
            scope,
        })
    }

    /// A loader without a backing file. Only environment overrides apply.
    pub fn from_env(scope: String) -> Self {
        Self {
            hocon: None,
            env: std::env::vars().collect(),
            scope,
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.env.get(&self.env_key(name)) {
            return Some(Value::String(value.clone()));
        }

        let hocon = self.hocon.as_ref()?;

        let scope = &hocon[self.scope.as_str()];
        if matches!(scope, Hocon::Hash(_)) {
            if let Some(value) = Self::map_hocon(scope, name) {
                return Some(value);
            }
        }

        Self::map_hocon(hocon, name)
    }

    /// Parses the value under `name`. A missing value is `None`, a value that fails to parse is an
    /// error rather than being silently replaced by a default.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(name)
            .and_then(|value| value.as_string())
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|err| anyhow!("Invalid value {:?} for {}: {}", value, name, err))
            })
            .transpose()
    }

    pub fn load<T: Config>(&self) -> Result<T> {
        let res = T::load(self)?;
        Ok(res)
    }

    fn env_key(&self, name: &str) -> String {
        format!("{}_{}", self.scope, name).to_uppercase()
    }

    fn map_hocon(hocon: &Hocon, name: &str) -> Option<Value> {
        match &hocon[name] {
            Hocon::Real(f64) => Some(Value::Float(*f64)),
            Hocon::Integer(i64) => Some(Value::Integer(*i64)),
            Hocon::String(string) => Some(Value::String(string.clone())),
            Hocon::Boolean(bool) => Some(Value::Boolean(*bool)),
            _ => None,
        }
    }

    #[cfg(test)]
    fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

#[derive(Debug)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::String(val) => Some(val.clone()),
            Value::Boolean(true) => Some("true".to_string()),
            Value::Boolean(false) => Some("false".to_string()),
            Value::Float(val) => Some(val.to_string()),
            Value::Integer(val) => Some(val.to_string()),
        }
    }
}

pub trait Config {
    fn load(config: &ConfigLoader) -> Result<Self>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".conf")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_scope_takes_precedence_over_root() {
        let file = write_config("pool_size = 10\nstress { pool_size = 20 }\n");
        let config = ConfigLoader::new(file.path(), "stress".to_string())
            .unwrap()
            .with_env(HashMap::new());

        assert_eq!(config.parse::<usize>("pool_size").unwrap(), Some(20));
    }

    #[test]
    fn test_falls_back_to_root() {
        let file = write_config("seed = 5\nstress { pool_size = 20 }\n");
        let config = ConfigLoader::new(file.path(), "stress".to_string())
            .unwrap()
            .with_env(HashMap::new());

        assert_eq!(config.parse::<u64>("seed").unwrap(), Some(5));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("stress { pool_size = 20 }\n");
        let env = HashMap::from([("STRESS_POOL_SIZE".to_string(), "30".to_string())]);
        let config = ConfigLoader::new(file.path(), "stress".to_string())
            .unwrap()
            .with_env(env);

        assert_eq!(config.parse::<usize>("pool_size").unwrap(), Some(30));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ConfigLoader::new("./does-not-exist.conf", "stress".to_string());

        assert!(result.is_err());
    }

    #[test]
    fn test_from_env_without_file() {
        let config = ConfigLoader::from_env("stress".to_string()).with_env(HashMap::new());

        assert!(config.get("pool_size").is_none());
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let file = write_config("stress { readers = many, reports_after_writers = 2 }\n");
        let config = ConfigLoader::new(file.path(), "stress".to_string())
            .unwrap()
            .with_env(HashMap::new());

        assert!(config.parse::<usize>("readers").is_err());
        assert_eq!(config.parse::<usize>("reports_after_writers").unwrap(), Some(2));
    }

    #[test]
    fn test_negative_integer_is_not_a_usize() {
        let file = write_config("stress { writers = -1 }\n");
        let config = ConfigLoader::new(file.path(), "stress".to_string())
            .unwrap()
            .with_env(HashMap::new());

        assert!(config.parse::<usize>("writers").is_err());
    }
}
