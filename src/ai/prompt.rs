use serde::{Deserialize, Serialize};

/// The plant the user is currently looking at, taken from an
/// identification result. Read-only for the engine; the shell may
/// replace it at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantContext {
    pub scientific_name: String,
    pub common_names: Vec<String>,
}

const PREAMBLE: &str = "You are a helpful plant care assistant with extensive knowledge \
about plant identification, care, diseases, and gardening. Provide accurate, practical \
advice for plant care. Be friendly and encouraging. If asked about plant identification, \
suggest they use the plant identification feature.";

/// Builds the system turn sent with every request. Never stored in the
/// conversation history; synthesized fresh from the current context.
pub fn system_preamble(plant: Option<&PlantContext>) -> String {
    match plant {
        Some(plant) => format!(
            "{} The user is currently viewing information about: {} ({}).",
            PREAMBLE,
            plant.scientific_name,
            plant.common_names.join(", ")
        ),
        None => PREAMBLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_without_context_has_no_plant_sentence() {
        let preamble = system_preamble(None);
        assert!(preamble.contains("plant care assistant"));
        assert!(!preamble.contains("currently viewing"));
    }

    #[test]
    fn preamble_with_context_names_the_plant() {
        let plant = PlantContext {
            scientific_name: "Monstera deliciosa".to_string(),
            common_names: vec![
                "Swiss Cheese Plant".to_string(),
                "Split-leaf Philodendron".to_string(),
            ],
        };
        let preamble = system_preamble(Some(&plant));
        assert!(preamble.contains("Monstera deliciosa"));
        assert!(preamble.contains("Swiss Cheese Plant, Split-leaf Philodendron"));
    }

    #[test]
    fn empty_common_names_join_is_safe() {
        let plant = PlantContext {
            scientific_name: "Monstera deliciosa".to_string(),
            common_names: vec![],
        };
        let preamble = system_preamble(Some(&plant));
        assert!(preamble.contains("Monstera deliciosa ()"));
    }
}
