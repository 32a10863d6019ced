//! Dry-run complexity analysis.
//!
//! The score is an additive heuristic over the submitted source/target
//! configs; it drives the estimated duration and the recommendation band
//! shown by the dashboard before a real run is started.

/// Inputs the formula looks at. Everything else in the configs is ignored.
#[derive(Debug, Clone, Default)]
pub struct ScoringInput {
    pub source_type: String,
    pub target_type: String,
    pub estimated_tables: u32,
    pub has_json_fields: bool,
    pub has_blob_fields: bool,
}

#[derive(Debug, Clone)]
pub struct DryRunAnalysis {
    pub complexity_score: u8,
    pub estimated_time: String,
    pub recommendations: Vec<String>,
}

/// Additive score, clamped to [0, 100]:
/// +30 cross-engine, +40 for >50 tables (else +20 for >20),
/// +15 for JSON columns, +25 for BLOB columns.
pub fn complexity_score(input: &ScoringInput) -> u8 {
    let mut score: u32 = 0;

    if input.source_type != input.target_type {
        score += 30;
    }

    if input.estimated_tables > 50 {
        score += 40;
    } else if input.estimated_tables > 20 {
        score += 20;
    }

    if input.has_json_fields {
        score += 15;
    }
    if input.has_blob_fields {
        score += 25;
    }

    score.min(100) as u8
}

/// 30 minutes scaled by (1 + score/100), rendered as minutes below one hour
/// and as hours from 60 minutes up.
pub fn estimated_time(score: u8) -> String {
    let minutes = 30.0 * (1.0 + f64::from(score) / 100.0);
    if minutes < 60.0 {
        format!("{} minutes", minutes.round() as u32)
    } else {
        let hours = minutes / 60.0;
        if (hours - 1.0).abs() < f64::EPSILON {
            "1 hour".to_string()
        } else {
            format!("{hours:.1} hours")
        }
    }
}

/// Fixed advice lists per score band. Never empty.
pub fn recommendations(score: u8) -> Vec<String> {
    let picks: &[&str] = if score > 70 {
        &[
            "Schedule the migration during a maintenance window",
            "Enable validation to catch type conversion issues",
            "Reduce batch size to limit lock contention on large tables",
            "Take a full backup of the source before starting",
        ]
    } else if score > 50 {
        &[
            "Run against a staging copy before migrating production",
            "Enable validation for business-critical tables",
        ]
    } else {
        &["Migration is expected to run smoothly"]
    };

    picks.iter().map(|s| s.to_string()).collect()
}

/// Full dry-run analysis for a submission.
pub fn analyze(input: &ScoringInput) -> DryRunAnalysis {
    let score = complexity_score(input);
    DryRunAnalysis {
        complexity_score: score,
        estimated_time: estimated_time(score),
        recommendations: recommendations(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(
        source: &str,
        target: &str,
        tables: u32,
        json: bool,
        blob: bool,
    ) -> ScoringInput {
        ScoringInput {
            source_type: source.to_string(),
            target_type: target.to_string(),
            estimated_tables: tables,
            has_json_fields: json,
            has_blob_fields: blob,
        }
    }

    #[test]
    fn test_trivial_migration_scores_zero() {
        let i = input("postgresql", "postgresql", 20, false, false);
        assert_eq!(complexity_score(&i), 0);
    }

    #[test]
    fn test_engine_mismatch_adds_thirty() {
        let i = input("postgresql", "mongodb", 0, false, false);
        assert_eq!(complexity_score(&i), 30);
    }

    #[test]
    fn test_table_count_bands() {
        assert_eq!(complexity_score(&input("a", "a", 20, false, false)), 0);
        assert_eq!(complexity_score(&input("a", "a", 21, false, false)), 20);
        assert_eq!(complexity_score(&input("a", "a", 50, false, false)), 20);
        assert_eq!(complexity_score(&input("a", "a", 51, false, false)), 40);
    }

    #[test]
    fn test_field_type_terms() {
        assert_eq!(complexity_score(&input("a", "a", 0, true, false)), 15);
        assert_eq!(complexity_score(&input("a", "a", 0, false, true)), 25);
        assert_eq!(complexity_score(&input("a", "a", 0, true, true)), 40);
    }

    #[test]
    fn test_score_clamped_to_100() {
        // All terms: 30 + 40 + 15 + 25 = 110, clamped.
        let i = input("mysql", "mongodb", 200, true, true);
        assert_eq!(complexity_score(&i), 100);
    }

    #[test]
    fn test_score_in_range_for_all_band_combinations() {
        for (src, tgt) in [("a", "a"), ("a", "b")] {
            for tables in [0, 21, 51] {
                for json in [false, true] {
                    for blob in [false, true] {
                        let s = complexity_score(&input(src, tgt, tables, json, blob));
                        assert!(s <= 100, "score {s} out of range");
                    }
                }
            }
        }
    }

    #[test]
    fn test_estimated_time_zero_score() {
        assert_eq!(estimated_time(0), "30 minutes");
    }

    #[test]
    fn test_estimated_time_example_scenario() {
        // postgresql -> mongodb, nothing else: score 30, 30 * 1.3 = 39.
        let i = input("postgresql", "mongodb", 0, false, false);
        let analysis = analyze(&i);
        assert_eq!(analysis.complexity_score, 30);
        assert_eq!(analysis.estimated_time, "39 minutes");
    }

    #[test]
    fn test_estimated_time_hour_boundary() {
        // Score 100 lands exactly on 60 minutes, which takes the hours branch.
        assert_eq!(estimated_time(100), "1 hour");
    }

    #[test]
    fn test_estimated_time_just_under_boundary() {
        // Score 99: 59.7 minutes, still rendered in minutes.
        assert_eq!(estimated_time(99), "60 minutes");
    }

    #[test]
    fn test_recommendations_never_empty() {
        for score in 0..=100u8 {
            assert!(
                !recommendations(score).is_empty(),
                "empty recommendations at score {score}"
            );
        }
    }

    #[test]
    fn test_recommendation_bands() {
        assert_eq!(recommendations(0).len(), 1);
        assert_eq!(recommendations(50).len(), 1);
        assert!(recommendations(51).len() > 1);
        assert!(recommendations(71).len() > recommendations(51).len());
    }
}
