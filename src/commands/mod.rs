pub mod login;
pub mod lookup;
