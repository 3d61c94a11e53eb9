// Accounts: self-service registration, role profiles, the payment ledger
// and administrator account management.

pub mod admin;
pub mod payments;
pub mod profiles;
pub mod registration;
