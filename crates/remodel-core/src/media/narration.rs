//! Narration script and video tour prompt, both derived from the plan alone.

use crate::models::Plan;

/// Deterministic narration script: the plan title, then each step's title
/// and instruction in order.
pub fn narration_script(plan: &Plan) -> String {
    let mut script = format!("Here is your renovation plan: {}.", plan.title.trim());
    for step in &plan.steps {
        script.push_str(&format!(
            " Step {}: {}. {}",
            step.step_number,
            step.title.trim().trim_end_matches('.'),
            step.instruction.trim()
        ));
    }
    script
}

/// Prompt for the cinematic walkthrough of the finished room.
pub fn tour_prompt(plan: &Plan) -> String {
    let style = if plan.style_summary.trim().is_empty() {
        plan.title.trim()
    } else {
        plan.style_summary.trim()
    };
    format!(
        "A slow, smooth cinematic camera glide through this newly renovated room in \
         {style} style. Keep the room exactly as shown. Warm, inviting natural light."
    )
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{Difficulty, Step};

    fn plan() -> Plan {
        Plan {
            title: "Coastal Bedroom".to_string(),
            description: String::new(),
            style_summary: "Light coastal".to_string(),
            estimated_cost: String::new(),
            estimated_time: String::new(),
            steps: vec![
                Step {
                    step_number: 1,
                    title: "Paint.".to_string(),
                    instruction: "Paint the walls pale blue.".to_string(),
                    substeps: vec![],
                    safety_warning: None,
                    tip: None,
                    visualization_prompt: String::new(),
                    difficulty: Difficulty::Easy,
                    estimated_time: String::new(),
                },
                Step {
                    step_number: 2,
                    title: "Linen".to_string(),
                    instruction: "Swap bedding for white linen.".to_string(),
                    substeps: vec![],
                    safety_warning: None,
                    tip: None,
                    visualization_prompt: String::new(),
                    difficulty: Difficulty::Easy,
                    estimated_time: String::new(),
                },
            ],
            materials: vec![],
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_script_is_deterministic_and_ordered() {
        let script = narration_script(&plan());
        assert_eq!(
            script,
            "Here is your renovation plan: Coastal Bedroom. \
             Step 1: Paint. Paint the walls pale blue. \
             Step 2: Linen. Swap bedding for white linen."
        );
        assert_eq!(script, narration_script(&plan()));
    }

    #[test]
    fn test_tour_prompt_prefers_style_summary() {
        assert!(tour_prompt(&plan()).contains("Light coastal style"));

        let mut untitled = plan();
        untitled.style_summary.clear();
        assert!(tour_prompt(&untitled).contains("Coastal Bedroom style"));
    }
}
