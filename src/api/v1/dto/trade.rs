use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TradeAccessResponse {
    pub user_id: String,
    pub scopes: Vec<String>,
    pub admin: bool,
}
