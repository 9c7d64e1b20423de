//! Outcome reporting: indented, optionally coloured text and JSON.

use super::{HostConfig, Outcome, Status};

// Color constants for terminal output
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

impl HostConfig {
    /// Apply color formatting to text if colors are enabled.
    pub fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Renders the outcome tree followed by a summary line.
///
/// ```text
/// FAIL table
///   PASS table/first
///   FAIL table/second
///       equals: values are not equal:
///       ...
/// summary: total 3, passed 1, failed 2, skipped 0
/// ```
pub fn render(outcome: &Outcome, config: &HostConfig) -> String {
    let mut lines = Vec::new();
    render_node(outcome, config, 0, &mut lines);
    let counts = outcome.counts();
    lines.push(format!(
        "summary: total {}, {} {}, {} {}, {} {}",
        counts.passed + counts.failed + counts.skipped,
        config.colorize("passed", GREEN),
        counts.passed,
        config.colorize("failed", RED),
        counts.failed,
        config.colorize("skipped", YELLOW),
        counts.skipped,
    ));
    lines.join("\n")
}

fn render_node(outcome: &Outcome, config: &HostConfig, depth: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(depth);
    let label = match outcome.status {
        Status::Passed => config.colorize("PASS", GREEN),
        Status::Failed => config.colorize("FAIL", RED),
        Status::Skipped => config.colorize("SKIP", YELLOW),
    };
    lines.push(format!("{pad}{label} {}", outcome.name));
    for failure in &outcome.failures {
        for line in failure.lines() {
            lines.push(format!("{pad}    {line}"));
        }
    }
    for sub in &outcome.subtests {
        render_node(sub, config, depth + 1, lines);
    }
}

/// Serializes the outcome tree as pretty-printed JSON.
pub fn to_json(outcome: &Outcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Outcome {
        Outcome {
            name: "table".into(),
            status: Status::Failed,
            failures: vec![],
            subtests: vec![
                Outcome {
                    name: "table/first".into(),
                    status: Status::Passed,
                    failures: vec![],
                    subtests: vec![],
                },
                Outcome {
                    name: "table/second".into(),
                    status: Status::Failed,
                    failures: vec!["is_true: expected true, got false".into()],
                    subtests: vec![],
                },
            ],
        }
    }

    #[test]
    fn renders_tree_and_summary() {
        let text = render(&sample(), &HostConfig::plain());
        assert_eq!(
            text,
            [
                "FAIL table",
                "  PASS table/first",
                "  FAIL table/second",
                "      is_true: expected true, got false",
                "summary: total 3, passed 1, failed 2, skipped 0",
            ]
            .join("\n")
        );
    }

    #[test]
    fn colours_only_when_enabled() {
        let config = HostConfig {
            use_colors: true,
            ..HostConfig::plain()
        };
        assert!(render(&sample(), &config).contains(RED));
        assert!(!render(&sample(), &HostConfig::plain()).contains(RED));
    }

    #[test]
    fn json_round_trips() {
        let json = to_json(&sample()).expect("serializable");
        assert!(json.contains("\"status\": \"failed\""));
        let back: Outcome = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, sample());
    }
}
