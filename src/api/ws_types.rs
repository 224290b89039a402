use serde::Serialize;
use uuid::Uuid;

use crate::models::{ResponseStatus, Trade, TradeStatus};

/// Messages broadcast to all connected WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "trade_proposed")]
    TradeProposed(Trade),

    #[serde(rename = "trade_response")]
    TradeResponse(ResponseUpdate),

    #[serde(rename = "trade_executed")]
    TradeExecuted(Trade),

    #[serde(rename = "trade_reverted")]
    TradeReverted(Trade),

    #[serde(rename = "trade_cancelled")]
    TradeCancelled(Trade),
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseUpdate {
    pub trade_id: Uuid,
    pub participant_id: Uuid,
    pub team_id: Uuid,
    pub response_status: ResponseStatus,
    pub trade_status: TradeStatus,
}
