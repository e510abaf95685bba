use serde::{Deserialize, Serialize};

/// Category of identifying field used for relational clustering.
///
/// Declaration order is the enumeration order used when emitting link
/// reasons, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierKind {
    BankAccount,
    AccountNumber,
    Phone,
    Mobile,
    NationalId,
    Address,
}

/// Values that never form an identifier cluster.
pub const SENTINEL_VALUES: &[&str] = &["", "unknown", "null", "none", "nan"];

impl IdentifierKind {
    pub const ALL: [IdentifierKind; 6] = [
        IdentifierKind::BankAccount,
        IdentifierKind::AccountNumber,
        IdentifierKind::Phone,
        IdentifierKind::Mobile,
        IdentifierKind::NationalId,
        IdentifierKind::Address,
    ];

    /// Column name written when a canonical record is re-expressed as a row.
    pub fn column_name(&self) -> &'static str {
        self.column_synonyms()[0]
    }

    /// Normalized column names recognised for this kind, in priority order.
    pub fn column_synonyms(&self) -> &'static [&'static str] {
        match self {
            IdentifierKind::BankAccount => &["bank account", "bank_account"],
            IdentifierKind::AccountNumber => {
                &["account no", "account number", "account_no", "account_number"]
            }
            IdentifierKind::Phone => &["phone", "phone number", "phone_number"],
            IdentifierKind::Mobile => &["mobile", "mobile number", "mobile_number"],
            IdentifierKind::NationalId => &["national id", "national_id", "aadhaar", "pan"],
            IdentifierKind::Address => &["address"],
        }
    }
}

/// True for empty or placeholder identifier values.
pub fn is_sentinel(value: &str) -> bool {
    SENTINEL_VALUES.contains(&value)
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::BankAccount => write!(f, "BANK ACCOUNT"),
            IdentifierKind::AccountNumber => write!(f, "ACCOUNT NUMBER"),
            IdentifierKind::Phone => write!(f, "PHONE"),
            IdentifierKind::Mobile => write!(f, "MOBILE"),
            IdentifierKind::NationalId => write!(f, "NATIONAL ID"),
            IdentifierKind::Address => write!(f, "ADDRESS"),
        }
    }
}
