//! Ranking of scored candidates

use crate::llm::scoring::CandidateRecord;
use serde::{Deserialize, Serialize};

/// Candidate records ordered by `match_score`, highest first. Equal scores
/// keep the order in which they were collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedResultSet {
    records: Vec<CandidateRecord>,
}

impl RankedResultSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn top(&self) -> Option<&CandidateRecord> {
        self.records.first()
    }

    pub fn into_vec(self) -> Vec<CandidateRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a RankedResultSet {
    type Item = &'a CandidateRecord;
    type IntoIter = std::slice::Iter<'a, CandidateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

pub struct RankingAggregator;

impl RankingAggregator {
    pub fn rank(mut records: Vec<CandidateRecord>) -> RankedResultSet {
        // sort_by is stable, which gives the tie-break on input order
        records.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        RankedResultSet { records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, score: u8) -> CandidateRecord {
        CandidateRecord {
            candidate_name: name.to_string(),
            match_score: score,
            strengths: vec![],
            missing_skills: vec![],
            summary: String::new(),
            source_filename: format!("{}.pdf", name),
        }
    }

    #[test]
    fn test_descending_with_stable_ties() {
        let ranked = RankingAggregator::rank(vec![
            record("a", 40),
            record("b", 90),
            record("c", 40),
            record("d", 100),
            record("e", 90),
            record("f", 0),
        ]);

        let names: Vec<_> = ranked.iter().map(|r| r.candidate_name.as_str()).collect();
        assert_eq!(names, vec!["d", "b", "e", "a", "c", "f"]);
        assert_eq!(ranked.top().map(|r| r.match_score), Some(100));
    }

    #[test]
    fn test_sorted_for_every_score_pattern() {
        // every score in range, interleaved so ties and reversals both occur
        let records: Vec<_> = (0..=100u8)
            .flat_map(|s| [record(&format!("x{}", s), s), record(&format!("y{}", s), 100 - s)])
            .collect();
        let ranked = RankingAggregator::rank(records.clone());

        assert_eq!(ranked.len(), records.len());
        assert!(ranked
            .as_slice()
            .windows(2)
            .all(|w| w[0].match_score >= w[1].match_score));

        // relative order of equal scores matches input order
        for score in 0..=100u8 {
            let input: Vec<_> = records.iter().filter(|r| r.match_score == score).collect();
            let output: Vec<_> = ranked.iter().filter(|r| r.match_score == score).collect();
            assert_eq!(input, output);
        }
    }

    #[test]
    fn test_empty_is_a_normal_result() {
        let ranked = RankingAggregator::rank(vec![]);
        assert!(ranked.is_empty());
        assert!(ranked.top().is_none());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let ranked = RankingAggregator::rank(vec![record("a", 10)]);
        let json = serde_json::to_value(&ranked).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["source_filename"], "a.pdf");
    }
}
