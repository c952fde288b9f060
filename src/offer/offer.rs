use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, IntoStaticStr};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    record::{ApiEnvelope, OfferRecord, TradeStatusResponse},
    request::{AcceptOfferRequest, SendOfferRequest},
    response::{parse_accept_reply, parse_send_reply, AcceptReply, SendReply},
    Item,
};
use crate::common::{
    error::OfferError,
    types::{OfferIdString, SteamId, TradeIdString, TradeOfferState},
    utils,
};
use crate::config::ManagerConfig;
use crate::interface::{CommunitySession, HttpMethod, WebApi};

const CANCEL_ENDPOINT: &str = "CancelTradeOffer";
const DECLINE_ENDPOINT: &str = "DeclineTradeOffer";
const TRADE_STATUS_ENDPOINT: &str = "GetTradeStatus";
const SEND_PATH: &str = "tradeoffer/new/send";

// Shared collaborators an offer needs to reach the remote service
#[derive(Clone)]
pub struct OfferBackend {
    pub(crate) api: Arc<dyn WebApi>,
    pub(crate) community: Arc<dyn CommunitySession>,
    pub(crate) config: Arc<ManagerConfig>,
}

impl OfferBackend {
    pub fn new(
        api: Arc<dyn WebApi>,
        community: Arc<dyn CommunitySession>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            api,
            community,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }
}

impl fmt::Debug for OfferBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfferBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
pub enum SendOutcome {
    #[strum(serialize = "sent")]
    Sent,
    #[strum(serialize = "pending")]
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
pub enum AcceptOutcome {
    #[strum(serialize = "accepted")]
    Accepted,
    #[strum(serialize = "pending")]
    Pending,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfferSnapshot {
    pub local_uuid: Uuid,
    pub id: Option<OfferIdString>,
    pub partner: SteamId,
    pub message: Option<String>,
    pub state: TradeOfferState,
    pub items_to_give: Vec<Item>,
    pub items_to_receive: Vec<Item>,
    pub is_our_offer: bool,
    pub from_real_time_trade: bool,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub trade_id: Option<TradeIdString>,
}

/// A single trade offer and the state machine that governs it.
///
/// Content (message and item lists) may only change while the offer is
/// unsent. Remote operations check their preconditions locally before any
/// request goes out, so a usage mistake never costs a round trip.
#[derive(Debug)]
pub struct Offer {
    backend: OfferBackend,
    local_uuid: Uuid,
    partner: SteamId,
    id: Option<OfferIdString>,
    message: Option<String>,
    state: TradeOfferState,
    items_to_give: Vec<Item>,
    items_to_receive: Vec<Item>,
    is_our_offer: bool,
    from_real_time_trade: bool,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    expires: Option<DateTime<Utc>>,
    trade_id: Option<TradeIdString>,
}

impl Offer {
    pub(crate) fn new(backend: OfferBackend, partner: SteamId) -> Self {
        Offer {
            backend,
            local_uuid: Uuid::new_v4(),
            partner,
            id: None,
            message: None,
            state: TradeOfferState::Invalid,
            items_to_give: Vec::new(),
            items_to_receive: Vec::new(),
            is_our_offer: true,
            from_real_time_trade: false,
            created: None,
            updated: None,
            expires: None,
            trade_id: None,
        }
    }

    pub(crate) fn from_record(
        backend: OfferBackend,
        record: OfferRecord,
    ) -> Result<Self, OfferError> {
        // Only an accepted offer carries a settlement id
        let trade_id = match record.trade_offer_state {
            TradeOfferState::Accepted => record.tradeid,
            _ => None,
        };

        Ok(Offer {
            backend,
            local_uuid: Uuid::new_v4(),
            partner: SteamId::from_account_id(record.accountid_other),
            id: Some(record.tradeofferid),
            message: record.message,
            state: record.trade_offer_state,
            items_to_give: record.items_to_give,
            items_to_receive: record.items_to_receive,
            is_our_offer: record.is_our_offer,
            from_real_time_trade: record.from_real_time_trade,
            created: Some(utils::from_epoch_secs(record.time_created)?),
            updated: Some(utils::from_epoch_secs(record.time_updated)?),
            expires: Some(utils::from_epoch_secs(record.expiration_time)?),
            trade_id,
        })
    }

    // Getters

    pub fn local_uuid(&self) -> Uuid {
        self.local_uuid
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn partner(&self) -> SteamId {
        self.partner
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn state(&self) -> TradeOfferState {
        self.state
    }

    pub fn items_to_give(&self) -> &[Item] {
        &self.items_to_give
    }

    pub fn items_to_receive(&self) -> &[Item] {
        &self.items_to_receive
    }

    pub fn is_our_offer(&self) -> bool {
        self.is_our_offer
    }

    pub fn from_real_time_trade(&self) -> bool {
        self.from_real_time_trade
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    pub fn trade_id(&self) -> Option<&str> {
        self.trade_id.as_deref()
    }

    /// An offer is sealed once it has been submitted, whether or not the
    /// remote handed back an id yet.
    pub fn is_sealed(&self) -> bool {
        self.id.is_some() || self.state != TradeOfferState::Invalid
    }

    pub fn snapshot(&self) -> OfferSnapshot {
        OfferSnapshot {
            local_uuid: self.local_uuid,
            id: self.id.clone(),
            partner: self.partner,
            message: self.message.clone(),
            state: self.state,
            items_to_give: self.items_to_give.clone(),
            items_to_receive: self.items_to_receive.clone(),
            is_our_offer: self.is_our_offer,
            from_real_time_trade: self.from_real_time_trade,
            created: self.created,
            updated: self.updated,
            expires: self.expires,
            trade_id: self.trade_id.clone(),
        }
    }

    // Content mutators, only while unsent

    pub fn set_message(&mut self, message: impl Into<String>) -> Result<(), OfferError> {
        self.check_unsealed()?;
        self.message = Some(message.into());
        Ok(())
    }

    pub fn add_my_item(&mut self, item: Item) -> Result<(), OfferError> {
        self.check_unsealed()?;
        self.items_to_give.push(item);
        Ok(())
    }

    pub fn add_my_items(&mut self, items: impl IntoIterator<Item = Item>) -> Result<(), OfferError> {
        self.check_unsealed()?;
        self.items_to_give.extend(items);
        Ok(())
    }

    pub fn add_their_item(&mut self, item: Item) -> Result<(), OfferError> {
        self.check_unsealed()?;
        self.items_to_receive.push(item);
        Ok(())
    }

    pub fn add_their_items(
        &mut self,
        items: impl IntoIterator<Item = Item>,
    ) -> Result<(), OfferError> {
        self.check_unsealed()?;
        self.items_to_receive.extend(items);
        Ok(())
    }

    /// Returns whether the item was present.
    pub fn remove_my_item(&mut self, item: &Item) -> Result<bool, OfferError> {
        self.check_unsealed()?;
        Ok(Self::remove_item(&mut self.items_to_give, item))
    }

    /// Returns whether the item was present.
    pub fn remove_their_item(&mut self, item: &Item) -> Result<bool, OfferError> {
        self.check_unsealed()?;
        Ok(Self::remove_item(&mut self.items_to_receive, item))
    }

    pub fn clear_items(&mut self) -> Result<(), OfferError> {
        self.check_unsealed()?;
        self.items_to_give.clear();
        self.items_to_receive.clear();
        Ok(())
    }

    fn remove_item(items: &mut Vec<Item>, item: &Item) -> bool {
        match items.iter().position(|i| i.is_same_asset(item)) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        }
    }

    // Guards

    fn check_unsealed(&self) -> Result<(), OfferError> {
        if self.is_sealed() {
            return Err(OfferError::AlreadySent);
        }
        Ok(())
    }

    fn active_id(&self) -> Result<OfferIdString, OfferError> {
        let Some(id) = self.id.clone() else {
            return Err(OfferError::Unsent);
        };
        if !self.state.is_active() {
            return Err(OfferError::NotActive {
                id,
                state: self.state,
            });
        }
        Ok(id)
    }

    // Remote operations

    /// Submits the offer. Without an explicit message, whatever was set with
    /// [`Offer::set_message`] is sent, or nothing.
    pub async fn send(
        &mut self,
        message: Option<&str>,
        token: Option<&str>,
    ) -> Result<SendOutcome, OfferError> {
        self.check_unsealed()?;

        let message = message
            .map(str::to_string)
            .or_else(|| self.message.clone())
            .unwrap_or_default();
        let config = &self.backend.config;
        let request = SendOfferRequest {
            partner: self.partner,
            message: &message,
            token,
            items_to_give: &self.items_to_give,
            items_to_receive: &self.items_to_receive,
        };
        let url = config.community_endpoint(SEND_PATH)?;
        let headers = vec![(
            "referer".to_string(),
            request.referer(config.community_url.as_str()),
        )];
        let form = request.form(self.backend.community.session_id())?;

        debug!(
            "Offer w/ LocalUUID {} sending to partner {} - {} to give, {} to receive",
            self.local_uuid,
            self.partner,
            self.items_to_give.len(),
            self.items_to_receive.len()
        );

        let response = self.backend.community.post(url, headers, form).await?;
        let reply = parse_send_reply(response)?;
        Ok(self.apply_send_reply(message, reply))
    }

    fn apply_send_reply(&mut self, message: String, reply: SendReply) -> SendOutcome {
        if let Some(id) = reply.offer_id {
            let now = Utc::now();
            self.id = Some(id);
            self.message = Some(message);
            self.state = TradeOfferState::Active;
            self.created = Some(now);
            self.updated = Some(now);
            self.expires = Some(utils::offer_expiry_from(now));
        }

        if reply.needs_email_confirmation {
            self.state = TradeOfferState::EmailPending;
            info!(
                "Offer w/ LocalUUID {} sent, pending email confirmation",
                self.local_uuid
            );
            return SendOutcome::Pending;
        }

        info!(
            "Offer w/ LocalUUID {} sent as #{}",
            self.local_uuid,
            self.id.as_deref().unwrap_or_default()
        );
        SendOutcome::Sent
    }

    /// Cancels our offer, or declines theirs. Local state is left for the
    /// caller to refresh.
    pub async fn cancel(&self) -> Result<(), OfferError> {
        let id = self.active_id()?;
        let endpoint = if self.is_our_offer {
            CANCEL_ENDPOINT
        } else {
            DECLINE_ENDPOINT
        };

        debug!("Offer #{} calling {}", id, endpoint);
        self.backend
            .api
            .call(
                HttpMethod::Post,
                endpoint,
                1,
                vec![("tradeofferid".to_string(), id.clone())],
            )
            .await?;

        info!("Offer #{} {} succeeded", id, endpoint);
        Ok(())
    }

    pub async fn decline(&self) -> Result<(), OfferError> {
        self.cancel().await
    }

    pub async fn accept(&mut self) -> Result<AcceptOutcome, OfferError> {
        if self.is_our_offer {
            return Err(OfferError::CannotAcceptOwnOffer {
                id: self.id.clone().unwrap_or_default(),
            });
        }
        let id = self.active_id()?;

        let config = &self.backend.config;
        let request = AcceptOfferRequest {
            id: &id,
            partner: self.partner,
        };
        let url = config.community_endpoint(&request.path())?;
        let headers = vec![(
            "referer".to_string(),
            request.referer(config.community_url.as_str()),
        )];
        let form = request.form(self.backend.community.session_id());

        debug!("Offer #{} accepting", id);
        let response = self.backend.community.post(url, headers, form).await?;

        match parse_accept_reply(response)? {
            AcceptReply::Pending => {
                info!("Offer #{} accepted, pending email confirmation", id);
                Ok(AcceptOutcome::Pending)
            }
            AcceptReply::Accepted(trade_id) => {
                info!("Offer #{} accepted as trade {}", id, trade_id);
                self.state = TradeOfferState::Accepted;
                self.trade_id = Some(trade_id);
                Ok(AcceptOutcome::Accepted)
            }
        }
    }

    /// Items we received from the settled trade, under their new asset ids.
    pub async fn get_received_items(&self) -> Result<Vec<Item>, OfferError> {
        let Some(id) = self.id.clone() else {
            return Err(OfferError::Unsent);
        };
        if self.state != TradeOfferState::Accepted {
            return Err(OfferError::NotAccepted {
                id,
                state: self.state,
            });
        }
        let Some(trade_id) = self.trade_id.clone() else {
            return Err(OfferError::MissingTradeId { id });
        };

        let language = self.backend.config.language.clone();
        let mut params = vec![
            ("tradeid".to_string(), trade_id.clone()),
            (
                "get_descriptions".to_string(),
                (if language.is_some() { "1" } else { "0" }).to_string(),
            ),
        ];
        if let Some(language) = language {
            params.push(("language".to_string(), language));
        }

        debug!("Offer #{} fetching settlement {}", id, trade_id);
        let body = self
            .backend
            .api
            .call(HttpMethod::Get, TRADE_STATUS_ENDPOINT, 1, params)
            .await?;

        let envelope: ApiEnvelope<TradeStatusResponse> = serde_json::from_value(body)
            .map_err(|e| OfferError::MalformedResponse(e.to_string()))?;
        let Some(response) = envelope.response else {
            return Err(OfferError::MalformedResponse(
                "Missing response envelope".to_string(),
            ));
        };

        let Some(trade) = response
            .trades
            .into_iter()
            .find(|t| t.tradeid.as_deref() == Some(trade_id.as_str()))
        else {
            warn!("Offer #{} settlement {} missing from reply", id, trade_id);
            return Err(OfferError::NotFound(format!("Trade {}", trade_id)));
        };

        Ok(trade.assets_received.into_iter().map(Item::from).collect())
    }
}
