//! Selection of the next quiz question.
use std::collections::HashSet;

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::db::Question;

/// Which questions a quiz draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizScope {
    All,
    Category(i64),
}

impl QuizScope {
    /// Category id 0 is what clients send for "all categories".
    pub fn from_category_id(id: Option<i64>) -> Self {
        match id {
            None | Some(0) => QuizScope::All,
            Some(id) => QuizScope::Category(id),
        }
    }

    pub fn label(&self) -> String {
        match self {
            QuizScope::All => "all".to_owned(),
            QuizScope::Category(id) => id.to_string(),
        }
    }
}

/// Picks uniformly among the in-scope questions whose id is not in `previous`.
/// `None` means every question of the scope has already been asked.
pub fn pick_next_question<R>(
    in_scope: Vec<Question>,
    previous: &HashSet<i64>,
    rng: &mut R,
) -> Option<Question>
where
    R: Rng + ?Sized,
{
    in_scope
        .into_iter()
        .filter(|question| !previous.contains(&question.id))
        .choose(rng)
}
