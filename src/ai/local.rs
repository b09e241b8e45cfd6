use crate::ai::prompt::PlantContext;

/// Rule-based plant advice used whenever the remote model cannot answer.
pub struct LocalAdvisor;

impl LocalAdvisor {
    /// Picks a canned care tip from keywords in the utterance. Priority
    /// order is fixed; the first matching topic wins. No I/O, no state.
    pub fn classify(utterance: &str, plant: Option<&PlantContext>) -> String {
        let input = utterance.to_lowercase();

        let mut response = String::from(
            "I'm currently experiencing technical difficulties, but I can still help \
             with basic plant care questions! ",
        );

        if input.contains("water") || input.contains("watering") {
            response.push_str(
                "For watering: Most plants need water when the top inch of soil is dry. \
                 Water thoroughly until it drains from the bottom.",
            );
        } else if input.contains("light") || input.contains("sun") {
            response.push_str(
                "For light requirements: Most houseplants prefer bright, indirect light. \
                 Avoid direct sunlight which can burn leaves.",
            );
        } else if input.contains("fertiliz") || input.contains("feed") {
            response.push_str(
                "For fertilizing: Use a balanced liquid fertilizer during growing season \
                 (spring/summer) every 2-4 weeks.",
            );
        } else if input.contains("repot") || input.contains("pot") {
            response.push_str(
                "For repotting: Repot when roots are crowded or growing through drainage \
                 holes. Use fresh potting mix and a slightly larger pot.",
            );
        } else if input.contains("problem") || input.contains("issue") || input.contains("sick") {
            response.push_str(
                "For plant problems: Check for overwatering (yellow leaves), underwatering \
                 (drooping), or pests (spots/webs). Adjust care accordingly.",
            );
        } else if let Some(plant) = plant {
            response.push_str(&format!(
                "For {}: This is a beautiful plant! Make sure it gets appropriate light \
                 and water for its species.",
                plant.scientific_name
            ));
        } else {
            response.push_str(
                "Try asking about watering, lighting, fertilizing, or common plant \
                 problems. I'm here to help!",
            );
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monstera() -> PlantContext {
        PlantContext {
            scientific_name: "Monstera deliciosa".to_string(),
            common_names: vec![],
        }
    }

    #[test]
    fn water_keyword_yields_watering_advice() {
        let reply = LocalAdvisor::classify("How often should I WATER my plant?", None);
        assert!(reply.contains("For watering"));
    }

    #[test]
    fn water_wins_over_light_in_priority_order() {
        let reply = LocalAdvisor::classify("does low light change how I water?", None);
        assert!(reply.contains("For watering"));
        assert!(!reply.contains("For light requirements"));
    }

    #[test]
    fn light_keyword_yields_lighting_advice() {
        let reply = LocalAdvisor::classify("how much sun does it need", None);
        assert!(reply.contains("For light requirements"));
    }

    #[test]
    fn fertilize_and_feed_both_match_feeding_advice() {
        assert!(LocalAdvisor::classify("when to fertilize?", None).contains("For fertilizing"));
        assert!(LocalAdvisor::classify("what should I feed it?", None).contains("For fertilizing"));
    }

    #[test]
    fn repot_keyword_yields_repotting_advice() {
        let reply = LocalAdvisor::classify("is this pot too small", None);
        assert!(reply.contains("For repotting"));
    }

    #[test]
    fn sick_keyword_yields_diagnostic_advice() {
        let reply = LocalAdvisor::classify("my plant looks sick", None);
        assert!(reply.contains("For plant problems"));
    }

    #[test]
    fn no_keyword_with_context_names_the_plant() {
        let reply = LocalAdvisor::classify("hello", Some(&monstera()));
        assert!(reply.contains("Monstera deliciosa"));
    }

    #[test]
    fn no_keyword_without_context_lists_topics() {
        let reply = LocalAdvisor::classify("hello", None);
        assert!(reply.contains("watering"));
        assert!(reply.contains("fertilizing"));
    }

    #[test]
    fn input_is_not_mutated_and_output_is_deterministic() {
        let utterance = "Watering SCHEDULE?";
        let first = LocalAdvisor::classify(utterance, None);
        let second = LocalAdvisor::classify(utterance, None);
        assert_eq!(first, second);
        assert_eq!(utterance, "Watering SCHEDULE?");
    }
}
