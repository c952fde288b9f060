//! Maps community form responses onto the handful of outcomes the state
//! machine understands.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::common::{
    error::OfferError,
    serde_helpers,
    types::{OfferIdString, TradeIdString},
};
use crate::interface::WebResponse;

#[derive(Debug, Default, Deserialize)]
struct FormReplyBody {
    #[serde(default, rename = "strError")]
    str_error: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::opt_id_string")]
    tradeofferid: Option<OfferIdString>,
    #[serde(default, deserialize_with = "serde_helpers::opt_id_string")]
    tradeid: Option<TradeIdString>,
    #[serde(default, deserialize_with = "serde_helpers::flag")]
    needs_email_confirmation: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SendReply {
    pub offer_id: Option<OfferIdString>,
    pub needs_email_confirmation: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AcceptReply {
    Pending,
    Accepted(TradeIdString),
}

fn unrecognized(body: &Value) -> OfferError {
    warn!("Unrecognized trade offer response body - {}", body);
    OfferError::UnrecognizedResponse(body.to_string())
}

// Non-200 first, then an explicit remote error, then the success fields
fn reply_body(response: WebResponse) -> Result<(FormReplyBody, Value), OfferError> {
    if response.status != 200 {
        return Err(OfferError::HttpStatus(response.status));
    }

    let body = match &response.body {
        Value::Object(_) => FormReplyBody::deserialize(&response.body)
            .map_err(|_| unrecognized(&response.body))?,
        _ => FormReplyBody::default(),
    };

    if let Some(str_error) = body.str_error.clone() {
        warn!("Trade offer request rejected by remote - {}", str_error);
        return Err(OfferError::RemoteRejected(str_error));
    }
    Ok((body, response.body))
}

pub(crate) fn parse_send_reply(response: WebResponse) -> Result<SendReply, OfferError> {
    let (body, raw) = reply_body(response)?;

    if body.tradeofferid.is_none() && !body.needs_email_confirmation {
        return Err(unrecognized(&raw));
    }

    Ok(SendReply {
        offer_id: body.tradeofferid,
        needs_email_confirmation: body.needs_email_confirmation,
    })
}

pub(crate) fn parse_accept_reply(response: WebResponse) -> Result<AcceptReply, OfferError> {
    let (body, raw) = reply_body(response)?;

    if body.needs_email_confirmation {
        Ok(AcceptReply::Pending)
    } else if let Some(trade_id) = body.tradeid {
        Ok(AcceptReply::Accepted(trade_id))
    } else {
        Err(unrecognized(&raw))
    }
}
