pub mod email_change;
pub mod login;

pub use email_change::{EmailChangeFlow, EmailChangeState, EmailChangeStep};
pub use login::AuthFlows;
