use pestscan_types::{DetectionResult, Pest, Treatment};

/// General guidance printed under every set of treatment recommendations.
pub const TREATMENT_GUIDELINES: [&str; 6] = [
    "Always follow the recommended dosage",
    "Use appropriate protective equipment",
    "Consider environmental factors before treatment",
    "Monitor progress after application",
    "For chemical treatments, follow safety precautions strictly",
    "Consider integrated pest management approaches",
];

/// A detection joined with its catalog entry and the treatment for its severity.
#[derive(Clone, Debug)]
pub struct Recommendation<'a> {
    pub result: &'a DetectionResult,
    pub pest: Option<&'a Pest>,
}

impl<'a> Recommendation<'a> {
    pub fn treatment(&self) -> Option<&'a Treatment> {
        self.pest
            .map(|p| p.treatments.for_severity(self.result.severity))
    }
}

/// Pair each result with the pest of the same name, if the catalog has one.
pub fn recommend<'a>(results: &'a [DetectionResult], pests: &'a [Pest]) -> Vec<Recommendation<'a>> {
    results
        .iter()
        .map(|result| Recommendation {
            result,
            pest: pests.iter().find(|p| p.name == result.name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pestscan_types::{BoundingBox, Severity, Treatments};

    fn pest(name: &str) -> Pest {
        let t = |s: &str| Treatment {
            organic: format!("{s} organic"),
            chemical: format!("{s} chemical"),
        };
        Pest {
            id: 1,
            name: name.into(),
            description: String::new(),
            treatments: Treatments {
                low: t("low"),
                medium: t("medium"),
                high: t("high"),
            },
            confidence: 90,
        }
    }

    fn detection(name: &str, severity: Severity) -> DetectionResult {
        DetectionResult {
            name: name.into(),
            confidence: 90,
            description: String::new(),
            severity,
            bounding_box: BoundingBox { x1: 0.0, y1: 0.0, x2: 1.0, y2: 1.0 },
        }
    }

    #[test]
    fn treatment_follows_severity() {
        let pests = vec![pest("Leaf Blight")];
        let results = vec![detection("Leaf Blight", Severity::Medium)];
        let recs = recommend(&results, &pests);
        assert_eq!(recs[0].treatment().unwrap().organic, "medium organic");
    }

    #[test]
    fn unknown_pest_has_no_treatment() {
        let pests = vec![pest("Leaf Blight")];
        let results = vec![detection("Aphid", Severity::High)];
        let recs = recommend(&results, &pests);
        assert!(recs[0].pest.is_none());
        assert!(recs[0].treatment().is_none());
    }
}
