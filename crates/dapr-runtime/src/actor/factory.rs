use dapr_client::InvocationClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use super::definition::ProxyDefinitions;
use super::descriptor::InterfaceDescriptor;
use super::generators::{
    CachedGenerator, DynamicGenerator, ExistingOnlyGenerator, FileGenerator, GenerateProxy,
    GeneratorTarget,
};
use crate::errors::ConfigError;

/// Which strategy the factory uses to produce proxy definitions.
///
/// Configured by name (`generated`, `generated-cached`, `dynamic`,
/// `only-existing`) or by the numeric codes `0`, `1`, `2` and `4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "ProxyModeRepr", into = "String")]
pub enum ProxyMode {
    #[default]
    Generated,
    GeneratedCached,
    Dynamic,
    OnlyExisting,
}

impl ProxyMode {
    pub fn name(&self) -> &'static str {
        match self {
            ProxyMode::Generated => "generated",
            ProxyMode::GeneratedCached => "generated-cached",
            ProxyMode::Dynamic => "dynamic",
            ProxyMode::OnlyExisting => "only-existing",
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ProxyMode::Generated => 0,
            ProxyMode::GeneratedCached => 1,
            ProxyMode::Dynamic => 2,
            ProxyMode::OnlyExisting => 4,
        }
    }
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProxyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "generated" => Ok(ProxyMode::Generated),
            "generated-cached" => Ok(ProxyMode::GeneratedCached),
            "dynamic" => Ok(ProxyMode::Dynamic),
            "only-existing" => Ok(ProxyMode::OnlyExisting),
            other => match other.parse::<u8>() {
                Ok(code) => ProxyMode::try_from(code),
                Err(_) => Err(ConfigError::InvalidProxyMode(s.to_string())),
            },
        }
    }
}

impl TryFrom<u8> for ProxyMode {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ProxyMode::Generated),
            1 => Ok(ProxyMode::GeneratedCached),
            2 => Ok(ProxyMode::Dynamic),
            4 => Ok(ProxyMode::OnlyExisting),
            other => Err(ConfigError::InvalidProxyMode(other.to_string())),
        }
    }
}

impl From<ProxyMode> for String {
    fn from(mode: ProxyMode) -> Self {
        mode.name().to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProxyModeRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<ProxyModeRepr> for ProxyMode {
    type Error = ConfigError;

    fn try_from(repr: ProxyModeRepr) -> Result<Self, Self::Error> {
        match repr {
            ProxyModeRepr::Code(code) => ProxyMode::try_from(code),
            ProxyModeRepr::Name(name) => name.parse(),
        }
    }
}

/// # ProxyFactory
///
/// Chooses the proxy generator for the configured [`ProxyMode`].
///
/// All generators built by one factory share its [`ProxyDefinitions`], so a
/// definition generated once is visible to every later request, including
/// those made in existing-only mode.
pub struct ProxyFactory {
    mode: ProxyMode,
    client: Arc<dyn InvocationClient>,
    definitions: Arc<ProxyDefinitions>,
    cache_dir: Option<PathBuf>,
}

impl ProxyFactory {
    pub fn new(mode: ProxyMode, client: Arc<dyn InvocationClient>) -> Self {
        Self {
            mode,
            client,
            definitions: Arc::new(ProxyDefinitions::new()),
            cache_dir: None,
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_definitions(mut self, definitions: Arc<ProxyDefinitions>) -> Self {
        self.definitions = definitions;
        self
    }

    pub fn mode(&self) -> ProxyMode {
        self.mode
    }

    pub fn definitions(&self) -> &Arc<ProxyDefinitions> {
        &self.definitions
    }

    /// Directory used by the generated-cached strategy. Falls back to
    /// `dapr-proxies` under the system temp directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("dapr-proxies"))
    }

    pub fn client(&self) -> &Arc<dyn InvocationClient> {
        &self.client
    }

    pub fn get_generator(
        &self,
        interface: Arc<InterfaceDescriptor>,
        dapr_type: &str,
    ) -> Box<dyn GenerateProxy> {
        let target = GeneratorTarget {
            interface,
            dapr_type: dapr_type.to_string(),
            client: self.client.clone(),
        };
        match self.mode {
            ProxyMode::Dynamic => Box::new(DynamicGenerator::new(target)),
            ProxyMode::Generated => {
                Box::new(FileGenerator::new(target, self.definitions.clone()))
            }
            ProxyMode::GeneratedCached => Box::new(CachedGenerator::new(
                target,
                self.definitions.clone(),
                self.cache_dir(),
            )),
            ProxyMode::OnlyExisting => Box::new(ExistingOnlyGenerator::new(
                target,
                self.definitions.clone(),
                self.cache_dir.clone(),
            )),
        }
    }
}
