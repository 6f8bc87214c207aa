//! Data models for the invoicing backend.
//!
//! - `Identity`: profile of the signed-in user, as returned by the authority
//! - `Template`, `TemplateDraft`: mail templates and the editor's payload
//! - `UnpaidBills`, `CompanyBills`, `Bill`: unpaid bills grouped by company

pub mod bill;
pub mod identity;
pub mod template;

pub use bill::{Bill, CompanyBills, UnpaidBills};
pub use identity::Identity;
pub use template::{Template, TemplateDraft};
