mod assignment_validator;

pub use assignment_validator::AssignmentValidator;
