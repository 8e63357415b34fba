use std::fs;
use std::path::Path;

use pestscan_types::{Agrovet, Pest, Treatment, Treatments};
use serde::{Deserialize, Serialize};

/// Read-only catalog the store starts with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub pests: Vec<Pest>,
    #[serde(default)]
    pub agrovets: Vec<Agrovet>,
}

impl Seed {
    /// Load a YAML catalog (`pests:` and `agrovets:` lists).
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)?;
        let seed: Seed = serde_yaml::from_str(&text)?;
        Ok(seed)
    }
}

fn treatment(organic: &str, chemical: &str) -> Treatment {
    Treatment {
        organic: organic.into(),
        chemical: chemical.into(),
    }
}

impl Default for Seed {
    fn default() -> Self {
        let pests = vec![
            Pest {
                id: 1,
                name: "Fall Armyworm".into(),
                description: "Common pest affecting maize crops".into(),
                treatments: Treatments {
                    low: treatment(
                        "Use natural predators like birds and beneficial insects. Apply neem oil or garlic spray. Practice crop monitoring.",
                        "Spot treatment with low-toxicity insecticides like Spinosad. Use pheromone traps for monitoring.",
                    ),
                    medium: treatment(
                        "Intensive use of biological controls (Bacillus thuringiensis). Introduce parasitic wasps. Apply botanical pesticides.",
                        "Targeted application of pyrethroid insecticides. Use systemic insecticides for better control.",
                    ),
                    high: treatment(
                        "Mass trapping using pheromone traps. Apply microbial pesticides at maximum rate. Consider crop rotation.",
                        "Immediate application of broad-spectrum insecticides. Use combination of contact and systemic pesticides.",
                    ),
                },
                confidence: 90,
            },
            Pest {
                id: 2,
                name: "Leaf Blight".into(),
                description: "Fungal disease affecting crop leaves".into(),
                treatments: Treatments {
                    low: treatment(
                        "Improve air circulation. Remove affected leaves. Apply compost tea or neem oil.",
                        "Apply preventive copper-based fungicides at minimum rate.",
                    ),
                    medium: treatment(
                        "Use potassium bicarbonate sprays. Apply biological fungicides. Adjust plant spacing.",
                        "Apply systemic fungicides. Use strobilurin fungicides for control.",
                    ),
                    high: treatment(
                        "Intensive application of biological fungicides. Complete removal of affected plants. Soil solarization.",
                        "Emergency treatment with strong systemic fungicides. Combine protectant and systemic fungicides.",
                    ),
                },
                confidence: 85,
            },
        ];

        let agrovets = vec![
            Agrovet {
                id: 1,
                name: "FarmCare Agrovet".into(),
                location: "123 Main Street, Town".into(),
                contact: "+254700000000".into(),
                latitude: -1.2921,
                longitude: 36.8219,
            },
            Agrovet {
                id: 2,
                name: "Green Solutions".into(),
                location: "456 Market Road, City".into(),
                contact: "+254711111111".into(),
                latitude: -1.2980,
                longitude: 36.8148,
            },
            Agrovet {
                id: 3,
                name: "AgriCare Plus".into(),
                location: "789 Farm Avenue".into(),
                contact: "+254722222222".into(),
                latitude: -1.2864,
                longitude: 36.8172,
            },
        ];

        Self { pests, agrovets }
    }
}
