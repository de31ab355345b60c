use serde::{Deserialize, Serialize};

/// Matches a transcribed response against a set of accepted answers.
///
/// Comparison is on trimmed, lowercased text: an exact match or substring
/// containment in either direction is accepted. With `fuzzy` enabled, an
/// edit distance of at most `max(2, 30% of the expected length)` also passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerChecker {
    pub fuzzy: bool,
}

impl Default for AnswerChecker {
    fn default() -> Self {
        Self { fuzzy: true }
    }
}

impl AnswerChecker {
    pub fn strict() -> Self {
        Self { fuzzy: false }
    }

    pub fn check<S: AsRef<str>>(&self, response: &str, expected: &[S]) -> bool {
        let response = normalize(response);
        if response.is_empty() {
            return false;
        }
        let answers: Vec<String> = expected
            .iter()
            .map(|answer| normalize(answer.as_ref()))
            .filter(|answer| !answer.is_empty())
            .collect();

        if answers.iter().any(|answer| {
            *answer == response || answer.contains(&response) || response.contains(answer.as_str())
        }) {
            return true;
        }
        self.fuzzy
            && answers.iter().any(|answer| {
                let limit = 2.max(answer.chars().count() * 3 / 10);
                edit_distance(&response, answer) <= limit
            })
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Levenshtein distance over Unicode scalar values, single-row DP.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}
