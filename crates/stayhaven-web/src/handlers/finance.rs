//! Payout bank details.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use stayhaven_common::ApiError;
use stayhaven_db::BankUpdate;
use tracing::info;

use super::non_blank;
use crate::session::Session;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankRequest {
    pub bank_name: Option<String>,
    pub bank_branch_code: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_name: Option<String>,
    pub bank_currency: Option<String>,
}

impl BankRequest {
    /// Name, account number and account name are required.
    pub fn into_update(self) -> Result<BankUpdate, ApiError> {
        match (
            non_blank(self.bank_name),
            non_blank(self.bank_account_number),
            non_blank(self.bank_account_name),
        ) {
            (Some(bank_name), Some(bank_account_number), Some(bank_account_name)) => Ok(BankUpdate {
                bank_name,
                bank_branch_code: non_blank(self.bank_branch_code),
                bank_account_number,
                bank_account_name,
                bank_currency: non_blank(self.bank_currency),
            }),
            _ => Err(ApiError::bad_request("Fill out all the missing fields")),
        }
    }
}

/// POST /api/finance/bank
pub async fn save_bank(
    State(state): State<SharedState>,
    session: Session,
    Json(req): Json<BankRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = req.into_update()?;
    let bank = state
        .users
        .update_bank(session.user_id(), &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("NotFound".into()))?;
    info!("Bank details saved for {}", session.user_id());
    Ok(Json(json!({ "ok": true, "user": bank })))
}
