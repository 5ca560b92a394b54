use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{Catalog, CatalogError};
use crate::domain::material::{Material, Origin};

/// Catalog compiled into the binary, used when no external file is configured.
pub const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.toml");

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    materials: Vec<Material>,
    #[serde(default)]
    origins: BTreeMap<String, Origin>,
}

impl Catalog {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUNDLED_CATALOG, "bundled")
    }

    pub fn from_toml_str(raw: &str, origin: &str) -> Result<Self, CatalogError> {
        let file = toml::from_str::<CatalogFile>(raw)
            .map_err(|source| CatalogError::Parse { origin: origin.to_string(), source })?;
        Self::new(file.materials, file.origins)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw, &path.display().to_string())
    }

    /// External file when a path is given, bundled data otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::Catalog;
    use crate::catalog::CatalogError;
    use crate::domain::material::{Field, TransportMode};

    const SMALL_CATALOG: &str = r#"
[[materials]]
key = "peek"
name = "PEEK"
category = "polymer"
applications = ["spine"]
co2_kg_per_kg = 30.0
elastic_modulus_gpa = 3.6
recyclable = false
biodegradable = false
service_life_years = 20
success_rate_pct = 94.0
biocompatibility = 5
mechanical_resistance = 4
integration = 3
infection_risk = 1
allergy_risk = 0
mri_compatible = true
price_tier = 4
availability = 4

[origins.peek]
country = "UK"
city = "Thornton-Cleveleys"
latitude = 53.87
longitude = -3.02
distance_km = 1200.0
mode = "road"
"#;

    #[test]
    fn bundled_catalog_loads_and_validates() {
        let catalog = Catalog::bundled().expect("bundled catalog");
        assert!(catalog.len() >= 50);
        assert!(catalog.find("titanium_grade5").is_some());
        assert!(catalog.origin_count() > 0);
        assert!(catalog.for_field(Field::Architecture).count() > 0);
        assert!(catalog.for_field(Field::Aerospace).count() > 0);
    }

    #[test]
    fn optional_attributes_take_defaults() {
        let catalog = Catalog::from_toml_str(SMALL_CATALOG, "inline").expect("catalog");
        let peek = catalog.find("peek").expect("peek");
        assert!(peek.fields.is_empty());
        assert!(peek.sterilization.is_empty());
        assert_eq!(peek.reference, "");
        assert_eq!(catalog.origin("peek").map(|o| o.mode), Some(TransportMode::Road));
    }

    #[test]
    fn external_file_overrides_bundled_catalog() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.toml");
        fs::write(&path, SMALL_CATALOG).expect("write catalog");

        let catalog = Catalog::load(Some(&path)).expect("catalog");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn missing_and_malformed_files_report_their_origin() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        assert!(matches!(Catalog::load(Some(&missing)), Err(CatalogError::ReadFile { .. })));

        let error = Catalog::from_toml_str("[[materials]]\nkey = 3", "inline")
            .expect_err("malformed catalog");
        assert!(matches!(error, CatalogError::Parse { ref origin, .. } if origin == "inline"));
    }
}
