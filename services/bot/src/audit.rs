//! Question bank audit.
//!
//! Loads every unit a user can reach from the menus and sorts the outcomes,
//! so a broken data file is found before a student runs into it.

use quiz_core::{
    bank::{BankError, QuestionBank, UnitKey},
    menu::{Grade, Subject, UNIT_COUNT},
};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct AuditReport {
    /// Units that loaded, with their question counts.
    pub loaded: Vec<(UnitKey, usize)>,
    pub missing: Vec<UnitKey>,
    pub empty: Vec<UnitKey>,
    /// Malformed or unreadable units.
    pub broken: Vec<BankError>,
}

impl AuditReport {
    /// Missing and empty units are expected while a bank is being filled in;
    /// only broken files make a bank unhealthy.
    pub fn is_healthy(&self) -> bool {
        self.broken.is_empty()
    }

    pub fn total_questions(&self) -> usize {
        self.loaded.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} units loaded ({} questions), {} missing, {} empty, {} broken",
            self.loaded.len(),
            self.total_questions(),
            self.missing.len(),
            self.empty.len(),
            self.broken.len()
        )?;
        for (key, count) in &self.loaded {
            writeln!(f, "  ok      {key} ({count} questions)")?;
        }
        for key in &self.empty {
            writeln!(f, "  empty   {key}")?;
        }
        for err in &self.broken {
            writeln!(f, "  broken  {err}")?;
        }
        Ok(())
    }
}

/// Every unit offered by the menus, in menu order.
pub fn reachable_units() -> impl Iterator<Item = UnitKey> {
    Grade::ALL.into_iter().flat_map(|grade| {
        Subject::all().flat_map(move |subject| {
            (1..=UNIT_COUNT).map(move |unit| UnitKey::new(grade, subject, unit))
        })
    })
}

pub async fn audit_bank(bank: &dyn QuestionBank) -> AuditReport {
    let mut report = AuditReport::default();
    for key in reachable_units() {
        match bank.load_unit(&key).await {
            Ok(questions) => {
                debug!(unit = %key, count = questions.len(), "Unit loaded");
                report.loaded.push((key, questions.len()));
            }
            Err(BankError::NotFound(key)) => report.missing.push(key),
            Err(BankError::Empty(key)) => report.empty.push(key),
            Err(err) => {
                warn!(error = %err, "Unit could not be loaded");
                report.broken.push(err);
            }
        }
    }
    report
}
