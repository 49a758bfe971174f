use tally_core::Intent;

/// Rules are listed in evaluation order; the first matching rule wins.
pub fn run() -> String {
    let mut lines = vec!["intent rules (first match wins):".to_string()];

    for (position, intent) in Intent::ALL.iter().enumerate() {
        lines.push(format!(
            "{}. {} - matches {}",
            position + 1,
            intent.label(),
            intent.trigger_description()
        ));
        if let Some(example) = intent.example_question() {
            lines.push(format!("   e.g. \"{example}\""));
        }
    }

    lines.join("\n")
}
