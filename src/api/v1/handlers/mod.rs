pub mod health;
pub mod scopes;
pub mod trade;
pub mod users;
