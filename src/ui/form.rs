use crate::models::transaction::TransactionType;
use crate::operations::add::{TransactionDraft, ValidationError, parse_amount, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Type,
    Description,
    Amount,
    Date,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Type => FormField::Description,
            FormField::Description => FormField::Amount,
            FormField::Amount => FormField::Date,
            FormField::Date => FormField::Type,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Type => FormField::Date,
            FormField::Description => FormField::Type,
            FormField::Amount => FormField::Description,
            FormField::Date => FormField::Amount,
        }
    }
}

/// Text buffers behind the add/edit dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub editing: bool,
    id: Option<String>,
    pub transaction_type: TransactionType,
    pub description: String,
    pub amount: String,
    pub date: String,
    pub focus: FormField,
    pub error: Option<String>,
}

impl FormState {
    pub fn new(draft: TransactionDraft, editing: bool) -> Self {
        Self {
            editing,
            id: draft.id,
            transaction_type: draft.transaction_type,
            description: draft.description,
            amount: draft.amount.map(|a| a.to_string()).unwrap_or_default(),
            date: draft
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            focus: FormField::Type,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing {
            "Edit Transaction"
        } else {
            "Add Transaction"
        }
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn toggle_type(&mut self) {
        self.transaction_type = self.transaction_type.toggle();
    }

    pub fn input_char(&mut self, ch: char) {
        match self.focus {
            FormField::Type => match ch {
                ' ' => self.toggle_type(),
                'i' | 'I' => self.transaction_type = TransactionType::Income,
                'e' | 'E' => self.transaction_type = TransactionType::Expense,
                _ => {}
            },
            FormField::Description => self.description.push(ch),
            FormField::Amount => {
                if ch.is_ascii_digit() || ch == '.' || ch == ',' {
                    self.amount.push(ch);
                }
            }
            FormField::Date => {
                if (ch.is_ascii_digit() || ch == '-') && self.date.len() < 10 {
                    self.date.push(ch);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::Type => {}
            FormField::Description => {
                self.description.pop();
            }
            FormField::Amount => {
                self.amount.pop();
            }
            FormField::Date => {
                self.date.pop();
            }
        }
    }

    pub fn to_draft(&self) -> Result<TransactionDraft, ValidationError> {
        Ok(TransactionDraft {
            id: self.id.clone(),
            transaction_type: self.transaction_type,
            description: self.description.clone(),
            amount: parse_amount(&self.amount)?,
            date: parse_date(&self.date)?,
        })
    }
}
