//! Three-parameter logistic item response model.

/// Probability of a correct answer under the 3PL model.
///
/// `discrimination` is `a`, `guessing` is the lower asymptote `c`.
pub fn probability(ability: f64, difficulty: f64, discrimination: f64, guessing: f64) -> f64 {
    guessing + (1.0 - guessing) / (1.0 + (-discrimination * (ability - difficulty)).exp())
}

/// Fisher information contributed by an item answered with probability `p`.
///
/// Returns NaN when the denominator vanishes; callers skip non-finite values.
pub fn information_at(p: f64, discrimination: f64, guessing: f64) -> f64 {
    let denom = p - guessing * (1.0 - p);
    discrimination.powi(2) * (p - guessing) * (1.0 - p) / denom.powi(2)
}

pub fn information(ability: f64, difficulty: f64, discrimination: f64, guessing: f64) -> f64 {
    information_at(
        probability(ability, difficulty, discrimination, guessing),
        discrimination,
        guessing,
    )
}
