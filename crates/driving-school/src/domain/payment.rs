use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{PaymentId, StudentId};
use super::Amount;

/// Settlement channels accepted on the payment ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerMethod {
    #[serde(alias = "Efectivo")]
    Cash,
    #[serde(alias = "Tarjeta")]
    Card,
    #[serde(alias = "Transferencia")]
    Transfer,
}

impl LedgerMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Transfer => "Transfer",
        }
    }
}

/// Raw ledger entry. Billing reads class records, not this collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub student_id: StudentId,
    pub amount: Amount,
    pub date: NaiveDate,
    pub method: LedgerMethod,
    #[serde(default)]
    pub concept: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub student_id: StudentId,
    pub amount: Amount,
    pub date: NaiveDate,
    pub method: LedgerMethod,
    #[serde(default)]
    pub concept: String,
}

impl NewPayment {
    pub fn into_payment(self, id: PaymentId) -> Payment {
        Payment {
            id,
            student_id: self.student_id,
            amount: self.amount,
            date: self.date,
            method: self.method,
            concept: self.concept,
        }
    }
}
