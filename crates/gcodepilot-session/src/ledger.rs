//! The job ledger: the session's ordered operation list plus current
//! stock. Insertion order is program order.

use gcodepilot_core::model::{Operation, Stock};
use serde::{Deserialize, Serialize};

/// How a new analysis result mutates the ledger. Chosen per turn by the
/// caller, not by the ledger itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobMode {
    /// Append the result's operations to the job; stock is overwritten
    /// last-write-wins.
    Accumulate,
    /// Discard the job and keep only the result's primary operation and
    /// stock.
    Replace,
}

/// Ordered operations and current stock for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLedger {
    operations: Vec<Operation>,
    stock: Stock,
}

impl JobLedger {
    /// Creates an empty ledger with the given starting stock.
    pub fn new(stock: Stock) -> Self {
        Self {
            operations: Vec::new(),
            stock,
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn stock(&self) -> &Stock {
        &self.stock
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Applies an analysis result according to the turn's mode.
    ///
    /// Accumulate appends every operation from the result and takes the
    /// result's stock (stock should not change mid-job, but the latest
    /// value wins). Replace keeps only the result's first operation; the
    /// ledger is a singleton in that mode by contract.
    pub fn apply(&mut self, mut operations: Vec<Operation>, stock: Stock, mode: JobMode) {
        match mode {
            JobMode::Accumulate => {
                self.operations.append(&mut operations);
            }
            JobMode::Replace => {
                operations.truncate(1);
                self.operations = operations;
            }
        }
        self.stock = stock;
    }

    /// Empties the ledger and restores a caller-supplied default stock.
    pub fn clear(&mut self, default_stock: Stock) {
        self.operations.clear();
        self.stock = default_stock;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodepilot_core::model::{CutParams, OpKind, Point};

    fn drill(x: f64) -> Operation {
        Operation::new(
            OpKind::Drill {
                at: Point::new(x, 0.0),
                diameter: 5.0,
            },
            CutParams::default(),
        )
    }

    #[test]
    fn accumulate_appends_in_submission_order() {
        let mut ledger = JobLedger::new(Stock::default());
        for i in 0..4 {
            ledger.apply(vec![drill(i as f64)], Stock::default(), JobMode::Accumulate);
        }
        assert_eq!(ledger.len(), 4);
        let xs: Vec<f64> = ledger
            .operations()
            .iter()
            .map(|op| match op.kind {
                OpKind::Drill { at, .. } => at.x,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn accumulate_overwrites_stock_last_write_wins() {
        let mut ledger = JobLedger::new(Stock::default());
        let mut taller = Stock::default();
        taller.height = 35.0;
        ledger.apply(vec![drill(0.0)], taller.clone(), JobMode::Accumulate);
        assert_eq!(ledger.stock(), &taller);
    }

    #[test]
    fn replace_keeps_a_singleton() {
        let mut ledger = JobLedger::new(Stock::default());
        for i in 0..3 {
            ledger.apply(
                vec![drill(i as f64), drill(100.0)],
                Stock::default(),
                JobMode::Replace,
            );
            assert_eq!(ledger.len(), 1);
        }
        match ledger.operations()[0].kind {
            OpKind::Drill { at, .. } => assert_eq!(at.x, 2.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn clear_restores_default_stock() {
        let mut ledger = JobLedger::new(Stock::default());
        ledger.apply(vec![drill(1.0)], Stock::default(), JobMode::Accumulate);
        let mut fresh = Stock::default();
        fresh.material = "steel".to_string();
        ledger.clear(fresh.clone());
        assert!(ledger.is_empty());
        assert_eq!(ledger.stock(), &fresh);
    }
}
