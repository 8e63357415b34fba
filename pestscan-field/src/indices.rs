use pestscan_types::VegetationIndices;

/// Static advice shown next to the farm analysis.
pub const RECOMMENDATIONS: [&str; 4] = [
    "Soil moisture is optimal for planting",
    "Consider irrigation in the next 3 days",
    "Nitrogen levels are slightly low",
    "Good conditions for pest monitoring",
];

/// Placeholder index snapshot until real multispectral imagery is wired in.
pub fn mock_indices() -> VegetationIndices {
    VegetationIndices {
        ndvi: 0.76,
        msavi: 0.82,
        reci: 1.23,
        ndmi: 0.45,
    }
}
