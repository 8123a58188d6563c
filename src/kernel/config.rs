use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{ConfigError, Precision, Real};

/// Settings a kernel is specialized against. Immutable once a kernel has been built from it.
///
/// ```toml
/// precision = "double"
/// dimension = 2
/// fixed_extents = [130, 130]
/// threads = 4
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelConfig {
    pub precision: Precision,
    /// Number of spatial axes of every field the kernel touches.
    pub dimension: usize,
    /// Per-axis extents baked into the kernel. `None` accepts any extents at call time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_extents: Option<Vec<usize>>,
    /// Size of the worker pool used for each sweep. `None` sweeps on the calling thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl KernelConfig {
    /// A serial configuration accepting any extents.
    pub fn new(precision: Precision, dimension: usize) -> Self {
        Self {
            precision,
            dimension,
            fixed_extents: None,
            threads: None,
        }
    }

    /// A serial configuration whose precision matches `T`.
    pub fn for_real<T: Real>(dimension: usize) -> Self {
        Self::new(T::PRECISION, dimension)
    }

    pub fn with_fixed_extents(mut self, extents: impl Into<Vec<usize>>) -> Self {
        self.fixed_extents = Some(extents.into());
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Checks the configuration is self-consistent, independent of any formula.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=3).contains(&self.dimension) {
            return Err(ConfigError::UnsupportedDimension(self.dimension));
        }

        if self.threads == Some(0) {
            return Err(ConfigError::InvalidThreadCount);
        }

        if let Some(extents) = &self.fixed_extents {
            if extents.len() != self.dimension || extents.contains(&0) {
                return Err(ConfigError::MalformedExtents {
                    extents: extents.clone(),
                    dimension: self.dimension,
                });
            }
        }

        Ok(())
    }

    /// Parses a configuration from a toml string.
    pub fn from_toml_str(string: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(string)
    }

    /// Deserialize configuration from toml file.
    pub fn import_toml(path: &Path) -> std::io::Result<Self> {
        let string = std::fs::read_to_string(path)?;
        Self::from_toml_str(&string).map_err(std::io::Error::other)
    }

    /// Serialize configuration to toml file.
    pub fn export_toml(&self, path: &Path) -> std::io::Result<()> {
        let string = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert_eq!(KernelConfig::new(Precision::Double, 2).validate(), Ok(()));
        assert_eq!(
            KernelConfig::new(Precision::Single, 4).validate(),
            Err(ConfigError::UnsupportedDimension(4))
        );
        assert_eq!(
            KernelConfig::new(Precision::Single, 1).validate(),
            Err(ConfigError::UnsupportedDimension(1))
        );
        assert_eq!(
            KernelConfig::new(Precision::Double, 3)
                .with_threads(0)
                .validate(),
            Err(ConfigError::InvalidThreadCount)
        );
        assert_eq!(
            KernelConfig::new(Precision::Double, 3)
                .with_fixed_extents([8, 8])
                .validate(),
            Err(ConfigError::MalformedExtents {
                extents: vec![8, 8],
                dimension: 3
            })
        );
        assert!(KernelConfig::new(Precision::Double, 2)
            .with_fixed_extents([8, 0])
            .validate()
            .is_err());
        assert_eq!(
            KernelConfig::for_real::<f32>(3)
                .with_fixed_extents([4, 5, 6])
                .with_threads(2)
                .validate(),
            Ok(())
        );
    }

    #[test]
    fn precision_names() {
        assert_eq!("f32".parse::<Precision>(), Ok(Precision::Single));
        assert_eq!("float64".parse::<Precision>(), Ok(Precision::Double));
        assert_eq!(
            "f16".parse::<Precision>(),
            Err(ConfigError::UnsupportedPrecision("f16".to_string()))
        );
        assert_eq!(Precision::Single.to_string(), "single");
    }

    #[test]
    fn toml() {
        let config = KernelConfig::from_toml_str(
            r#"
            precision = "float32"
            dimension = 3
            fixed_extents = [16, 16, 32]
            threads = 4
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            KernelConfig::new(Precision::Single, 3)
                .with_fixed_extents([16, 16, 32])
                .with_threads(4)
        );

        let minimal = KernelConfig::from_toml_str("precision = \"double\"\ndimension = 2").unwrap();
        assert_eq!(minimal, KernelConfig::new(Precision::Double, 2));

        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(KernelConfig::from_toml_str(&text).unwrap(), config);

        assert!(KernelConfig::from_toml_str("precision = \"half\"\ndimension = 2").is_err());
    }

    #[test]
    fn toml_files() {
        let path =
            std::env::temp_dir().join(format!("eulerian-config-{}.toml", std::process::id()));

        let config = KernelConfig::for_real::<f64>(2)
            .with_fixed_extents([130, 66])
            .with_threads(3);
        config.export_toml(&path).unwrap();

        let imported = KernelConfig::import_toml(&path);
        std::fs::write(&path, "precision = \"double\"\ndimension = ").unwrap();
        let malformed = KernelConfig::import_toml(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(imported.unwrap(), config);
        assert_eq!(malformed.unwrap_err().kind(), std::io::ErrorKind::Other);
        assert!(KernelConfig::import_toml(&path).is_err());
    }
}
