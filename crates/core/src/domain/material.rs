use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Metal,
    Polymer,
    Ceramic,
    Biosourced,
    Composite,
    Superalloy,
    LightAlloy,
    Wood,
    Natural,
}

impl MaterialCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Metal => "Metal",
            Self::Polymer => "Polymer",
            Self::Ceramic => "Ceramic",
            Self::Biosourced => "Biosourced",
            Self::Composite => "Composite",
            Self::Superalloy => "Superalloy",
            Self::LightAlloy => "Light Alloy",
            Self::Wood => "Wood",
            Self::Natural => "Natural",
        }
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Engineering domain a material is offered for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    #[default]
    #[serde(alias = "Medicine")]
    Medicine,
    #[serde(alias = "Architecture")]
    Architecture,
    #[serde(alias = "Mechanics")]
    Mechanics,
    #[serde(alias = "Aerospace")]
    Aerospace,
}

impl Field {
    pub const ALL: [Field; 4] =
        [Field::Medicine, Field::Architecture, Field::Mechanics, Field::Aerospace];

    /// Parses a user-supplied field name, falling back to [`Field::Medicine`].
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medicine => "medicine",
            Self::Architecture => "architecture",
            Self::Mechanics => "mechanics",
            Self::Aerospace => "aerospace",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Medicine => "Medicine",
            Self::Architecture => "Architecture",
            Self::Mechanics => "Mechanics",
            Self::Aerospace => "Aerospace",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Field {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "medicine" | "medical" => Ok(Self::Medicine),
            "architecture" | "construction" => Ok(Self::Architecture),
            "mechanics" | "mechanical" => Ok(Self::Mechanics),
            "aerospace" => Ok(Self::Aerospace),
            other => Err(DomainError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sterilization {
    Autoclave,
    Eto,
    Gamma,
    FreezeDrying,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Air,
    Sea,
    Road,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Sea => "sea",
            Self::Road => "road",
        }
    }
}

/// A catalog entry. Bounded ratings use a 0-5 scale, price tier and
/// availability use 1-5, success rate is a percentage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub key: String,
    pub name: String,
    pub category: MaterialCategory,
    /// Empty means the material is offered for medicine only.
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub applications: Vec<String>,
    /// May be negative for carbon-sequestering materials.
    pub co2_kg_per_kg: f64,
    #[serde(default)]
    pub co2_range: Option<[f64; 2]>,
    pub elastic_modulus_gpa: f64,
    #[serde(default)]
    pub stress_shielding: u8,
    pub recyclable: bool,
    pub biodegradable: bool,
    pub service_life_years: u32,
    pub success_rate_pct: f64,
    #[serde(default)]
    pub success_rate_source: String,
    pub biocompatibility: u8,
    pub mechanical_resistance: u8,
    pub integration: u8,
    pub infection_risk: u8,
    pub allergy_risk: u8,
    #[serde(default)]
    pub radio_opaque: bool,
    pub mri_compatible: bool,
    #[serde(default)]
    pub sterilization: Vec<Sterilization>,
    #[serde(default)]
    pub standard: String,
    pub price_tier: u8,
    pub availability: u8,
    #[serde(default)]
    pub reference: String,
}

impl Material {
    pub fn applies_to(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.applications.iter().any(|application| application.to_lowercase() == tag)
    }

    pub fn serves(&self, field: Field) -> bool {
        if self.fields.is_empty() {
            return field == Field::Medicine;
        }
        self.fields.contains(&field)
    }
}

/// Where a material is sourced from and how it travels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub mode: TransportMode,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{Material, MaterialCategory};

    pub fn material(key: &str, name: &str) -> Material {
        Material {
            key: key.to_string(),
            name: name.to_string(),
            category: MaterialCategory::Metal,
            fields: Vec::new(),
            applications: vec!["orthopedics".to_string()],
            co2_kg_per_kg: 10.0,
            co2_range: None,
            elastic_modulus_gpa: 20.0,
            stress_shielding: 1,
            recyclable: false,
            biodegradable: false,
            service_life_years: 20,
            success_rate_pct: 90.0,
            success_rate_source: String::new(),
            biocompatibility: 4,
            mechanical_resistance: 4,
            integration: 4,
            infection_risk: 1,
            allergy_risk: 1,
            radio_opaque: false,
            mri_compatible: true,
            sterilization: Vec::new(),
            standard: String::new(),
            price_tier: 3,
            availability: 3,
            reference: String::new(),
        }
    }
}
