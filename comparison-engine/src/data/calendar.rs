use chrono::NaiveDate;
use common::{DateRange, Result};

/// Walks an inclusive date range one calendar day at a time
#[derive(Debug, Clone)]
pub struct DateRangeWalker {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DateRangeWalker {
    pub fn new(range: &DateRange) -> Result<Self> {
        range.validate()?;
        Ok(Self {
            next: Some(range.start),
            end: range.end,
        })
    }
}

impl Iterator for DateRangeWalker {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = if current < self.end {
            current.succ_opt()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(current) => (self.end - current).num_days() as usize + 1,
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateRangeWalker {}

/// Fresh walker over `range`; call again to restart
pub fn walk(range: &DateRange) -> Result<DateRangeWalker> {
    DateRangeWalker::new(range)
}
