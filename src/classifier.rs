//! Rule-based trait classification
//!
//! Traits and the insight sentence are selected by two ordered rule tables.
//! Trait rules are independent: every rule whose predicate holds contributes
//! its trait, in table order. Insight rules are exclusive: the first match wins,
//! and the last row always matches.

use serde::Serialize;

use crate::types::{Insight, InsightKind, MetricsSnapshot, Trait, TraitStyle};

/// Trait emitted when no trait rule fires
pub const FALLBACK_TRAIT: Trait = Trait::new("Balanced", TraitStyle::Confident);

pub const GOAL_DRIVEN_INSIGHT: Insight = Insight {
    kind: InsightKind::GoalDriven,
    text: "You show an energetic, goal-driven style: fast, purposeful movement paired with frequent clicks.",
};

pub const METHODICAL_INSIGHT: Insight = Insight {
    kind: InsightKind::Methodical,
    text: "You appear methodical and detail-oriented, moving deliberately and steadily through the page.",
};

pub const INTUITIVE_INSIGHT: Insight = Insight {
    kind: InsightKind::Intuitive,
    text: "Your rapid succession of clicks points to fast, intuitive decision-making.",
};

pub const BALANCED_INSIGHT: Insight = Insight {
    kind: InsightKind::Balanced,
    text: "You display an adaptive, balanced style, adjusting your pace to the content in front of you.",
};

/// A (predicate, trait) row
#[derive(Clone, Copy)]
pub struct TraitRule {
    pub condition: &'static str,
    pub predicate: fn(&MetricsSnapshot) -> bool,
    pub label: Trait,
}

/// A (predicate, insight) row
#[derive(Clone, Copy)]
pub struct InsightRule {
    pub condition: &'static str,
    pub predicate: fn(&MetricsSnapshot) -> bool,
    pub insight: Insight,
}

fn fast_pointer(m: &MetricsSnapshot) -> bool {
    m.avg_speed > 500.0
}

// Disjoint from `fast_pointer` by construction. A zero average means no
// pointer data yet, not slow movement.
fn slow_pointer(m: &MetricsSnapshot) -> bool {
    m.avg_speed > 0.0 && m.avg_speed < 200.0
}

fn frequent_clicks(m: &MetricsSnapshot) -> bool {
    m.click_frequency_per_minute > 5.0
}

fn consistent_movement(m: &MetricsSnapshot) -> bool {
    m.movement_consistency > 0.7
}

fn quick_decisions(m: &MetricsSnapshot) -> bool {
    m.decision_speed > 0.8
}

fn intense_scrolling(m: &MetricsSnapshot) -> bool {
    m.scroll_intensity > 100.0
}

fn goal_driven(m: &MetricsSnapshot) -> bool {
    m.avg_speed > 600.0 && m.click_frequency_per_minute > 8.0
}

fn methodical(m: &MetricsSnapshot) -> bool {
    m.avg_speed < 300.0 && m.movement_consistency > 0.8
}

fn intuitive(m: &MetricsSnapshot) -> bool {
    m.decision_speed > 0.9
}

fn always(_: &MetricsSnapshot) -> bool {
    true
}

/// Trait rules in evaluation order
pub const TRAIT_RULES: &[TraitRule] = &[
    TraitRule {
        condition: "avg_speed > 500",
        predicate: fast_pointer,
        label: Trait::new("Decisive", TraitStyle::Confident),
    },
    TraitRule {
        condition: "0 < avg_speed < 200",
        predicate: slow_pointer,
        label: Trait::new("Attentive", TraitStyle::Cautious),
    },
    TraitRule {
        condition: "click_frequency_per_minute > 5",
        predicate: frequent_clicks,
        label: Trait::new("Active", TraitStyle::Impulsive),
    },
    TraitRule {
        condition: "movement_consistency > 0.7",
        predicate: consistent_movement,
        label: Trait::new("Systematic", TraitStyle::Confident),
    },
    TraitRule {
        condition: "decision_speed > 0.8",
        predicate: quick_decisions,
        label: Trait::new("Quick-reacting", TraitStyle::Impulsive),
    },
    TraitRule {
        condition: "scroll_intensity > 100",
        predicate: intense_scrolling,
        label: Trait::new("Energetic", TraitStyle::Impulsive),
    },
];

/// Insight rules in priority order; the last row is the default
pub const INSIGHT_RULES: &[InsightRule] = &[
    InsightRule {
        condition: "avg_speed > 600 && click_frequency_per_minute > 8",
        predicate: goal_driven,
        insight: GOAL_DRIVEN_INSIGHT,
    },
    InsightRule {
        condition: "avg_speed < 300 && movement_consistency > 0.8",
        predicate: methodical,
        insight: METHODICAL_INSIGHT,
    },
    InsightRule {
        condition: "decision_speed > 0.9",
        predicate: intuitive,
        insight: INTUITIVE_INSIGHT,
    },
    InsightRule {
        condition: "otherwise",
        predicate: always,
        insight: BALANCED_INSIGHT,
    },
];

/// Result of classifying one metrics snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub traits: Vec<Trait>,
    pub insight: Insight,
}

/// Stateless evaluator over the rule tables
pub struct TraitClassifier;

impl TraitClassifier {
    /// Classify a snapshot with the built-in rule tables
    pub fn classify(metrics: &MetricsSnapshot) -> Classification {
        Self::classify_with(TRAIT_RULES, INSIGHT_RULES, metrics)
    }

    /// Classify a snapshot against arbitrary rule tables
    pub fn classify_with(
        trait_rules: &[TraitRule],
        insight_rules: &[InsightRule],
        metrics: &MetricsSnapshot,
    ) -> Classification {
        let mut traits: Vec<Trait> = trait_rules
            .iter()
            .filter(|rule| (rule.predicate)(metrics))
            .map(|rule| rule.label)
            .collect();

        if traits.is_empty() {
            traits.push(FALLBACK_TRAIT);
        }

        let insight = insight_rules
            .iter()
            .find(|rule| (rule.predicate)(metrics))
            .map(|rule| rule.insight)
            .unwrap_or(BALANCED_INSIGHT);

        Classification { traits, insight }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot(
        avg_speed: f64,
        click_frequency_per_minute: f64,
        scroll_intensity: f64,
        movement_consistency: f64,
        decision_speed: f64,
    ) -> MetricsSnapshot {
        MetricsSnapshot {
            avg_speed,
            click_frequency_per_minute,
            scroll_intensity,
            movement_consistency,
            decision_speed,
        }
    }

    fn names(classification: &Classification) -> Vec<&'static str> {
        classification.traits.iter().map(|t| t.name).collect()
    }

    #[test]
    fn test_neutral_metrics_fall_back_to_balanced() {
        let result = TraitClassifier::classify(&snapshot(0.0, 0.0, 0.0, 0.5, 0.5));
        assert_eq!(result.traits, vec![FALLBACK_TRAIT]);
        assert_eq!(result.insight, BALANCED_INSIGHT);

        let result = TraitClassifier::classify(&MetricsSnapshot::neutral());
        assert_eq!(result.traits, vec![FALLBACK_TRAIT]);
    }

    #[test]
    fn test_slow_pointer_is_attentive() {
        let result = TraitClassifier::classify(&snapshot(120.0, 0.0, 0.0, 0.5, 0.5));
        assert_eq!(
            result.traits,
            vec![Trait::new("Attentive", TraitStyle::Cautious)]
        );
        assert_eq!(result.insight.kind, InsightKind::Balanced);
    }

    #[test]
    fn test_fast_and_active() {
        let result = TraitClassifier::classify(&snapshot(650.0, 9.0, 0.0, 0.5, 0.5));

        assert_eq!(result.insight, GOAL_DRIVEN_INSIGHT);
        assert!(result
            .traits
            .contains(&Trait::new("Decisive", TraitStyle::Confident)));
        assert!(result
            .traits
            .contains(&Trait::new("Active", TraitStyle::Impulsive)));
        assert!(!names(&result).contains(&"Attentive"));
    }

    #[test]
    fn test_traits_follow_table_order() {
        let result = TraitClassifier::classify(&snapshot(100.0, 6.0, 150.0, 0.9, 0.95));
        assert_eq!(
            names(&result),
            vec!["Attentive", "Active", "Systematic", "Quick-reacting", "Energetic"]
        );
    }

    #[test]
    fn test_speed_traits_are_exclusive() {
        for speed in [0.0, 150.0, 199.9, 200.0, 350.0, 500.0, 500.1, 900.0] {
            let result = TraitClassifier::classify(&snapshot(speed, 0.0, 0.0, 0.5, 0.5));
            let names = names(&result);
            assert!(!(names.contains(&"Decisive") && names.contains(&"Attentive")));
        }
    }

    #[test]
    fn test_insight_priority() {
        // Goal-driven beats intuitive
        let result = TraitClassifier::classify(&snapshot(700.0, 10.0, 0.0, 0.5, 1.0));
        assert_eq!(result.insight.kind, InsightKind::GoalDriven);

        // Methodical beats intuitive
        let result = TraitClassifier::classify(&snapshot(250.0, 0.0, 0.0, 0.85, 1.0));
        assert_eq!(result.insight.kind, InsightKind::Methodical);

        let result = TraitClassifier::classify(&snapshot(400.0, 0.0, 0.0, 0.5, 0.95));
        assert_eq!(result.insight.kind, InsightKind::Intuitive);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let result = TraitClassifier::classify(&snapshot(500.0, 5.0, 100.0, 0.7, 0.8));
        assert_eq!(result.traits, vec![FALLBACK_TRAIT]);
    }

    #[test]
    fn test_custom_tables() {
        let rules = [TraitRule {
            condition: "always",
            predicate: always,
            label: Trait::new("Present", TraitStyle::Cautious),
        }];
        let result = TraitClassifier::classify_with(&rules, &[], &MetricsSnapshot::neutral());
        assert_eq!(names(&result), vec!["Present"]);
        assert_eq!(result.insight, BALANCED_INSIGHT);
    }

    #[test]
    fn test_insight_table_ends_with_default() {
        let last = INSIGHT_RULES.last().unwrap();
        assert!((last.predicate)(&MetricsSnapshot::neutral()));
        assert_eq!(last.insight, BALANCED_INSIGHT);
    }
}
