//! Exam module - the printable exam and the values that parameterize its export.

mod copy_label;
#[allow(clippy::module_inception)]
mod exam;
pub mod file_names;
mod quantity;

pub use copy_label::CopyLabel;
pub use exam::Exam;
pub use quantity::{BatchQuantity, QuantityError};
