//! Rule sets for signup, profile updates and login.

use crate::validation::{FieldRules, Rule, RuleSet};

pub const NAME_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 8;

pub mod messages {
    pub const NAME_REQUIRED: &str = "Name is required";
    pub const NAME_STRING: &str = "The name field must be a string.";
    pub const NAME_MAX: &str = "Name cannot exceed 255 characters";
    pub const EMAIL_REQUIRED: &str = "Email is required";
    pub const EMAIL_INVALID: &str = "Please provide a valid email address";
    pub const EMAIL_UNIQUE: &str = "This email is already registered";
    pub const PASSWORD_REQUIRED: &str = "Password is required";
    pub const PASSWORD_STRING: &str = "The password field must be a string.";
    pub const PASSWORD_MIN: &str = "Password must be at least 8 characters";
    pub const PASSWORD_CONFIRMED: &str = "Password confirmation does not match";
    pub const CONFIRMATION_REQUIRED: &str = "Password confirmation is required";
    pub const CONFIRMATION_STRING: &str = "The password confirmation field must be a string.";
}

fn name() -> FieldRules {
    FieldRules::new("name")
        .rule(Rule::Required, messages::NAME_REQUIRED)
        .rule(Rule::String, messages::NAME_STRING)
        .rule(Rule::Max(NAME_MAX), messages::NAME_MAX)
}

fn email() -> FieldRules {
    FieldRules::new("email")
        .rule(Rule::Required, messages::EMAIL_REQUIRED)
        .rule(Rule::Email, messages::EMAIL_INVALID)
        .rule(Rule::Unique, messages::EMAIL_UNIQUE)
}

fn password() -> FieldRules {
    FieldRules::new("password")
        .rule(Rule::Required, messages::PASSWORD_REQUIRED)
        .rule(Rule::String, messages::PASSWORD_STRING)
        .rule(Rule::Min(PASSWORD_MIN), messages::PASSWORD_MIN)
        .rule(Rule::Confirmed, messages::PASSWORD_CONFIRMED)
}

pub fn signup_rules() -> RuleSet {
    RuleSet::new()
        .field(name())
        .field(email())
        .field(password())
        .field(
            FieldRules::new("password_confirmation")
                .rule(Rule::Required, messages::CONFIRMATION_REQUIRED)
                .rule(Rule::String, messages::CONFIRMATION_STRING),
        )
}

/// Same constraints as signup, applied only to fields that were sent.
pub fn update_rules() -> RuleSet {
    RuleSet::new()
        .field(name())
        .field(email())
        .field(password())
        .field(
            FieldRules::new("password_confirmation")
                .rule(Rule::String, messages::CONFIRMATION_STRING),
        )
        .partial()
}

pub fn login_rules() -> RuleSet {
    RuleSet::new()
        .field(
            FieldRules::new("email")
                .rule(Rule::Required, messages::EMAIL_REQUIRED)
                .rule(Rule::Email, messages::EMAIL_INVALID),
        )
        .field(
            FieldRules::new("password")
                .rule(Rule::Required, messages::PASSWORD_REQUIRED)
                .rule(Rule::String, messages::PASSWORD_STRING),
        )
}
