//! Immutable material catalog.
//!
//! Loaded once at start-up, validated, then shared read-only (usually behind
//! an `Arc`). Iteration follows file order; ranking ties rely on it.

mod loader;

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::material::{Field, Material, Origin};

pub use loader::BUNDLED_CATALOG;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog `{origin}`: {source}")]
    Parse { origin: String, source: toml::de::Error },
    #[error("catalog contains no materials")]
    Empty,
    #[error("material at position {0} has an empty key or name")]
    MissingIdentity(usize),
    #[error("duplicate material key `{0}`")]
    DuplicateKey(String),
    #[error("material `{key}`: `{attribute}` = {value} is outside {expected}")]
    OutOfRange { key: String, attribute: &'static str, value: f64, expected: &'static str },
    #[error("origin `{0}` does not refer to a catalog material")]
    OrphanOrigin(String),
}

#[derive(Debug, Default)]
pub struct Catalog {
    materials: Vec<Material>,
    index: HashMap<String, usize>,
    origins: HashMap<String, Origin>,
}

impl Catalog {
    pub fn new(
        materials: Vec<Material>,
        origins: impl IntoIterator<Item = (String, Origin)>,
    ) -> Result<Self, CatalogError> {
        if materials.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(materials.len());
        for (position, material) in materials.iter().enumerate() {
            if material.key.trim().is_empty() || material.name.trim().is_empty() {
                return Err(CatalogError::MissingIdentity(position));
            }
            validate_ranges(material)?;
            if index.insert(material.key.clone(), position).is_some() {
                return Err(CatalogError::DuplicateKey(material.key.clone()));
            }
        }

        let mut by_key = HashMap::new();
        for (key, origin) in origins {
            if !index.contains_key(&key) {
                return Err(CatalogError::OrphanOrigin(key));
            }
            by_key.insert(key, origin);
        }

        Ok(Self { materials, index, origins: by_key })
    }

    pub fn find(&self, key: &str) -> Option<&Material> {
        self.index.get(key).map(|position| &self.materials[*position])
    }

    pub fn origin(&self, key: &str) -> Option<&Origin> {
        self.origins.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &Material> {
        self.materials.iter().filter(move |material| material.serves(field))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn origin_count(&self) -> usize {
        self.origins.len()
    }
}

fn validate_ranges(material: &Material) -> Result<(), CatalogError> {
    let out_of_range = |attribute: &'static str, value: f64, expected: &'static str| {
        CatalogError::OutOfRange { key: material.key.clone(), attribute, value, expected }
    };

    let ratings = [
        ("biocompatibility", material.biocompatibility),
        ("mechanical_resistance", material.mechanical_resistance),
        ("integration", material.integration),
        ("infection_risk", material.infection_risk),
        ("allergy_risk", material.allergy_risk),
        ("stress_shielding", material.stress_shielding),
    ];
    for (attribute, value) in ratings {
        if value > 5 {
            return Err(out_of_range(attribute, f64::from(value), "0..=5"));
        }
    }

    for (attribute, value) in
        [("price_tier", material.price_tier), ("availability", material.availability)]
    {
        if !(1..=5).contains(&value) {
            return Err(out_of_range(attribute, f64::from(value), "1..=5"));
        }
    }

    if !(0.0..=100.0).contains(&material.success_rate_pct) {
        return Err(out_of_range("success_rate_pct", material.success_rate_pct, "0..=100"));
    }
    if !material.co2_kg_per_kg.is_finite() {
        return Err(out_of_range("co2_kg_per_kg", material.co2_kg_per_kg, "a finite number"));
    }
    if !material.elastic_modulus_gpa.is_finite() || material.elastic_modulus_gpa < 0.0 {
        return Err(out_of_range(
            "elastic_modulus_gpa",
            material.elastic_modulus_gpa,
            "a finite non-negative number",
        ));
    }

    Ok(())
}
