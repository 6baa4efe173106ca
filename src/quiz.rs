use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::db::Question;

/// Category id that asks for questions from every category.
pub const ANY_CATEGORY: i64 = 0;

/// Picks a random question the player has not seen yet.
///
/// Returns `None` once every candidate is in `previous`.
pub fn select_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &[i64],
    rng: &mut R,
) -> Option<Question> {
    let seen: HashSet<i64> = previous.iter().copied().collect();
    let mut remaining: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !seen.contains(&q.id))
        .collect();
    remaining.shuffle(rng);
    remaining.pop()
}

/// Random source shared by quiz handlers.
#[derive(Clone)]
pub struct QuizRng(Arc<Mutex<StdRng>>);

impl QuizRng {
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        QuizRng(Arc::new(Mutex::new(rng)))
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64) -> Question {
        Question {
            id,
            question: format!("Question {id}"),
            answer: format!("Answer {id}"),
            category: 1,
            difficulty: 1,
        }
    }

    fn pool(ids: &[i64]) -> Vec<Question> {
        ids.iter().copied().map(question).collect()
    }

    #[test]
    fn never_returns_previous_questions() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let picked = select_question(pool(&[1, 2, 3, 4, 5]), &[1, 3, 5], &mut rng).unwrap();
            assert!(picked.id == 2 || picked.id == 4, "picked {}", picked.id);
        }
    }

    #[test]
    fn exhausted_pool_returns_none() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(select_question(pool(&[1, 2]), &[2, 1], &mut rng), None);
        assert_eq!(select_question(vec![], &[], &mut rng), None);
    }

    #[test]
    fn repeated_rounds_serve_every_question_once() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut previous = Vec::new();
        while let Some(q) = select_question(pool(&[10, 20, 30, 40]), &previous, &mut rng) {
            assert!(!previous.contains(&q.id));
            previous.push(q.id);
        }
        previous.sort();
        assert_eq!(previous, vec![10, 20, 30, 40]);
    }

    #[test]
    fn every_candidate_can_be_picked() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut picked = HashSet::new();
        for _ in 0..200 {
            picked.insert(select_question(pool(&[1, 2, 3]), &[], &mut rng).unwrap().id);
        }
        assert_eq!(picked, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn seeded_source_is_deterministic() {
        let a = QuizRng::seeded(3);
        let b = QuizRng::seeded(3);
        let pick = |rng: &QuizRng| rng.with(|r| select_question(pool(&[1, 2, 3, 4, 5, 6]), &[], r));
        assert_eq!(pick(&a), pick(&b));
    }
}
