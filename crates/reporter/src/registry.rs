//! Named reporter factories, resolved once at startup.

use std::collections::HashMap;
use std::fmt::{self, Debug};

use serde::Deserialize;
use tracing::info;

use crate::{ConsoleReporter, Error, InfluxConfig, InfluxReporter, Reporter, Reporters};

/// Settings handed to every reporter factory.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ReporterConfig {
    /// InfluxDB reporter settings.
    #[serde(default)]
    pub influx: InfluxConfig,
}

/// Builds a reporter from the shared settings.
pub type ReporterFactory = fn(&ReporterConfig) -> Result<Box<dyn Reporter>, Error>;

/// Maps configuration names to reporter factories.
#[derive(Clone, Default)]
pub struct ReporterRegistry {
    factories: HashMap<String, ReporterFactory>,
}

impl ReporterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `stdout` and `influx` reporters.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("stdout", |_| Ok(Box::new(ConsoleReporter::stdout())));
        registry.register("influx", |config| {
            Ok(Box::new(InfluxReporter::new(&config.influx)?))
        });
        registry
    }

    /// Registers a factory, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, factory: ReporterFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Builds the named reporters in order.
    ///
    /// # Errors
    ///
    /// Returns an error for the first name with no factory, or the first
    /// factory that fails.
    pub fn build<S: AsRef<str>>(
        &self,
        names: &[S],
        config: &ReporterConfig,
    ) -> Result<Reporters, Error> {
        let mut reporters = Reporters::new();

        for name in names {
            let name = name.as_ref();
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| Error::UnknownReporter(name.to_string()))?;

            reporters.add(name, factory(config)?);
            info!(reporter = %name, "reporter configured");
        }

        Ok(reporters)
    }
}

impl Debug for ReporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ReporterRegistry")
            .field("factories", &names)
            .finish()
    }
}
