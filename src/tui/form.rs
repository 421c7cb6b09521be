//! Form state for the interactive scorer.
//!
//! Kept free of terminal types so key handling can be tested directly.

use crate::domain::{ApplicantInput, ContractType};

/// Form rows, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Income,
    Expenses,
    Requested,
    Dependents,
    Contract,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Income,
        Field::Expenses,
        Field::Requested,
        Field::Dependents,
        Field::Contract,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Income => "Monthly income",
            Field::Expenses => "Monthly expenses",
            Field::Requested => "Requested credit",
            Field::Dependents => "Dependents",
            Field::Contract => "Contract type",
        }
    }

    /// Left/Right increment; `None` for the contract selector.
    pub fn step(self) -> Option<u64> {
        match self {
            Field::Income | Field::Expenses => Some(200_000),
            Field::Requested => Some(500_000),
            Field::Dependents => Some(1),
            Field::Contract => None,
        }
    }

    pub fn is_currency(self) -> bool {
        matches!(self, Field::Income | Field::Expenses | Field::Requested)
    }
}

/// Digit limit per numeric field; keeps parsed values inside `u64`.
const MAX_DIGITS: usize = 15;

#[derive(Debug, Clone)]
pub struct Form {
    selected: usize,
    /// Digit buffers for the four numeric fields.
    buffers: [String; 4],
    contract: ContractType,
    /// Set whenever an input changes; cleared by the caller after scoring.
    dirty: bool,
}

impl Default for Form {
    fn default() -> Self {
        Self::from_input(&ApplicantInput::default())
    }
}

impl Form {
    pub fn from_input(input: &ApplicantInput) -> Self {
        Self {
            selected: 0,
            buffers: [
                format!("{:.0}", input.income),
                format!("{:.0}", input.expenses),
                format!("{:.0}", input.requested_amount),
                input.dependents.to_string(),
            ],
            contract: input.contract_type,
            dirty: true,
        }
    }

    pub fn selected(&self) -> Field {
        Field::ALL[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < Field::ALL.len() {
            self.selected += 1;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn buffer_index(field: Field) -> Option<usize> {
        match field {
            Field::Income => Some(0),
            Field::Expenses => Some(1),
            Field::Requested => Some(2),
            Field::Dependents => Some(3),
            Field::Contract => None,
        }
    }

    /// Raw text shown for a field.
    pub fn text(&self, field: Field) -> String {
        match Self::buffer_index(field) {
            Some(idx) => self.buffers[idx].clone(),
            None => self.contract.display_name().to_string(),
        }
    }

    fn number(&self, field: Field) -> u64 {
        Self::buffer_index(field)
            .and_then(|idx| self.buffers[idx].parse().ok())
            .unwrap_or(0)
    }

    pub fn push_digit(&mut self, c: char) {
        let Some(idx) = Self::buffer_index(self.selected()) else {
            return;
        };
        if !c.is_ascii_digit() {
            return;
        }
        let buf = &mut self.buffers[idx];
        if buf.as_str() == "0" {
            buf.clear();
        }
        if buf.len() < MAX_DIGITS {
            buf.push(c);
            self.dirty = true;
        }
    }

    pub fn backspace(&mut self) {
        if let Some(idx) = Self::buffer_index(self.selected()) {
            self.buffers[idx].pop();
            self.dirty = true;
        }
    }

    /// Step the selected field up (`delta > 0`) or down; amounts stop at 0.
    pub fn adjust(&mut self, delta: i32) {
        let field = self.selected();
        match (field.step(), Self::buffer_index(field)) {
            (Some(step), Some(idx)) => {
                let cur = self.number(field);
                let next = if delta >= 0 {
                    cur.saturating_add(step)
                } else {
                    cur.saturating_sub(step)
                };
                self.buffers[idx] = next.to_string();
            }
            _ => {
                self.contract = if delta >= 0 {
                    self.contract.next()
                } else {
                    self.contract.prev()
                };
            }
        }
        self.dirty = true;
    }

    /// Current inputs; empty numeric fields count as 0.
    pub fn applicant(&self) -> ApplicantInput {
        ApplicantInput {
            income: self.number(Field::Income) as f64,
            expenses: self.number(Field::Expenses) as f64,
            requested_amount: self.number(Field::Requested) as f64,
            dependents: u32::try_from(self.number(Field::Dependents)).unwrap_or(u32::MAX),
            contract_type: self.contract,
        }
    }
}
