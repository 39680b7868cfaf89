use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Category;

/// One processed answer, as seen by observers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub correct: bool,
    pub response_ms: f64,
    pub level: u32,
    pub round: u32,
    pub category: Category,
    pub timestamp: DateTime<Utc>,
}

/// Subscriber to per-answer events. The engine notifies every registered
/// observer after each `process_answer`, so session-logging collaborators
/// subscribe instead of wrapping engine methods.
pub trait AnswerObserver {
    fn on_answer(&mut self, record: &AnswerRecord);
}

// Lets a caller keep a handle to an observer it registered.
impl<T: AnswerObserver> AnswerObserver for Rc<RefCell<T>> {
    fn on_answer(&mut self, record: &AnswerRecord) {
        self.borrow_mut().on_answer(record);
    }
}

/// Default recorder: keeps every answer of the session and derives the
/// aggregates the progress tracker and session reports need.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionLog {
    records: Vec<AnswerRecord>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionReport {
    pub total_answers: usize,
    pub correct_answers: usize,
    pub accuracy_percent: f64,
    pub average_response_ms: f64,
    pub duration_secs: f64,
    pub categories: BTreeSet<Category>,
}

impl AnswerObserver for SessionLog {
    fn on_answer(&mut self, record: &AnswerRecord) {
        self.records.push(record.clone());
    }
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.records.iter().filter(|r| r.correct).count()
    }

    pub fn accuracy_percent(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.correct_count() as f64 / self.records.len() as f64 * 100.0
    }

    pub fn average_response_ms(&self) -> f64 {
        let correct: Vec<f64> = self
            .records
            .iter()
            .filter(|r| r.correct)
            .map(|r| r.response_ms)
            .collect();
        if correct.is_empty() {
            return 0.0;
        }
        correct.iter().sum::<f64>() / correct.len() as f64
    }

    pub fn categories_played(&self) -> BTreeSet<Category> {
        self.records.iter().map(|r| r.category).collect()
    }

    /// Correct answers faster than the threshold.
    pub fn fast_matches(&self, threshold_ms: f64) -> u32 {
        self.records
            .iter()
            .filter(|r| r.correct && r.response_ms < threshold_ms)
            .count() as u32
    }

    /// Rounds played without a single wrong answer. Keyed by (level, round)
    /// since round indices restart at each level.
    pub fn perfect_rounds(&self) -> u32 {
        let mut clean: BTreeSet<(u32, u32)> = BTreeSet::new();
        let mut spoiled: BTreeSet<(u32, u32)> = BTreeSet::new();
        for record in &self.records {
            let key = (record.level, record.round);
            if record.correct {
                clean.insert(key);
            } else {
                spoiled.insert(key);
            }
        }
        clean.difference(&spoiled).count() as u32
    }

    pub fn report(&self) -> SessionReport {
        let duration_secs = match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp)
                .num_milliseconds()
                .max(0) as f64
                / 1000.0,
            _ => 0.0,
        };
        SessionReport {
            total_answers: self.records.len(),
            correct_answers: self.correct_count(),
            accuracy_percent: self.accuracy_percent(),
            average_response_ms: self.average_response_ms(),
            duration_secs,
            categories: self.categories_played(),
        }
    }
}
