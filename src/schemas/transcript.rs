use std::fmt::{self, Display};

use super::{Message, Step};

/// Ordered, append-only history of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    steps: Vec<Step>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Every step rendered as prompt messages, oldest first.
    pub fn to_messages(&self) -> Vec<Message> {
        self.steps.iter().flat_map(Step::to_messages).collect()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// The audit trace: numbered THOUGHT / ACTION / OBSERVATION blocks.
impl Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "STEP {}", i + 1)?;
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}
