pub mod scopes;
pub mod trade;
pub mod users;
