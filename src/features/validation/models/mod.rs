mod validated;

pub use validated::{GroupRef, ValidatedAssignment, ValidatedAttributes};
