use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::common::{
    error::OfferError,
    types::{OfferFilter, SteamId},
};
use crate::config::ManagerConfig;
use crate::interface::{CommunitySession, HttpMethod, WebApi};
use crate::offer::{
    record::{ApiEnvelope, OffersResponse, SingleOfferResponse},
    GetOffersOptions, Offer, OfferAccess, OfferBackend, OfferEngine,
};

const GET_OFFER_ENDPOINT: &str = "GetTradeOffer";
const GET_OFFERS_ENDPOINT: &str = "GetTradeOffers";

pub struct TradeOfferManager {
    backend: OfferBackend,
    offer_engines: RwLock<HashMap<Uuid, OfferEngine>>,
}

impl TradeOfferManager {
    // Constructors

    pub fn new(
        api: Arc<dyn WebApi>,
        community: Arc<dyn CommunitySession>,
        config: ManagerConfig,
    ) -> Self {
        TradeOfferManager {
            backend: OfferBackend::new(api, community, config),
            offer_engines: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        self.backend.config()
    }

    // Offer Construction

    pub fn create_offer(&self, partner: SteamId) -> Offer {
        let offer = Offer::new(self.backend.clone(), partner);
        debug!(
            "Created Offer w/ LocalUUID {} for partner {}",
            offer.local_uuid(),
            partner
        );
        offer
    }

    // Offer Retrieval

    pub async fn get_offer(&self, id: &str) -> Result<Offer, OfferError> {
        debug!("Fetching Offer #{}", id);
        let body = self
            .backend
            .api
            .call(
                HttpMethod::Get,
                GET_OFFER_ENDPOINT,
                1,
                vec![("tradeofferid".to_string(), id.to_string())],
            )
            .await?;

        let envelope: ApiEnvelope<SingleOfferResponse> = Self::decode(body)?;
        let Some(response) = envelope.response else {
            return Err(Self::malformed());
        };
        let Some(record) = response.offer else {
            return Err(OfferError::NotFound(format!("Offer #{}", id)));
        };

        Offer::from_record(self.backend.clone(), record)
    }

    /// Fetches sent and received offers, in the order the remote returns them.
    pub async fn get_offers(
        &self,
        filter: OfferFilter,
        historical_cutoff: Option<DateTime<Utc>>,
    ) -> Result<(Vec<Offer>, Vec<Offer>), OfferError> {
        let options =
            GetOffersOptions::new(filter, historical_cutoff, self.config().language.clone());
        debug!(
            "Fetching Offers w/ filter {} and historical cutoff {}",
            options.filter, options.historical_cutoff
        );

        let body = self
            .backend
            .api
            .call(HttpMethod::Get, GET_OFFERS_ENDPOINT, 1, options.params())
            .await?;

        let envelope: ApiEnvelope<OffersResponse> = Self::decode(body)?;
        let Some(response) = envelope.response else {
            return Err(Self::malformed());
        };

        let sent = response
            .trade_offers_sent
            .into_iter()
            .map(|record| Offer::from_record(self.backend.clone(), record))
            .collect::<Result<Vec<Offer>, OfferError>>()?;
        let received = response
            .trade_offers_received
            .into_iter()
            .map(|record| Offer::from_record(self.backend.clone(), record))
            .collect::<Result<Vec<Offer>, OfferError>>()?;

        info!(
            "Fetched {} sent and {} received Offers",
            sent.len(),
            received.len()
        );
        Ok((sent, received))
    }

    fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, OfferError> {
        serde_json::from_value(body).map_err(|error| {
            warn!("Malformed API response - {}", error);
            OfferError::MalformedResponse(error.to_string())
        })
    }

    fn malformed() -> OfferError {
        warn!("Malformed API response - missing response envelope");
        OfferError::MalformedResponse("Missing response envelope".to_string())
    }

    // Offer Engines

    pub async fn track_offer(&self, offer: Offer) -> OfferAccess {
        let local_uuid = offer.local_uuid();
        let engine = OfferEngine::new(offer);
        let accessor = engine.new_accessor();

        let mut offer_engines = self.offer_engines.write().await;
        Self::prune_finished(&mut offer_engines);
        offer_engines.insert(local_uuid, engine);
        debug!("Tracking Offer w/ LocalUUID {}", local_uuid);

        accessor
    }

    pub async fn offer_access(&self, local_uuid: Uuid) -> Option<OfferAccess> {
        let mut offer_engines = self.offer_engines.write().await;
        Self::prune_finished(&mut offer_engines);
        offer_engines.get(&local_uuid).map(|e| e.new_accessor())
    }

    /// Stops the engine of a tracked offer and forgets it.
    pub async fn untrack_offer(&self, local_uuid: Uuid) -> Result<(), OfferError> {
        let engine = self.offer_engines.write().await.remove(&local_uuid);
        let Some(engine) = engine else {
            return Err(OfferError::NotFound(format!(
                "Offer w/ LocalUUID {}",
                local_uuid
            )));
        };
        Self::stop_engine(local_uuid, engine).await;
        debug!("Untracked Offer w/ LocalUUID {}", local_uuid);
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<(), OfferError> {
        let engines: Vec<(Uuid, OfferEngine)> =
            self.offer_engines.write().await.drain().collect();
        for (local_uuid, engine) in engines {
            Self::stop_engine(local_uuid, engine).await;
        }
        info!("TradeOfferManager shutdown complete");
        Ok(())
    }

    // Engines whose actor already exited, e.g. through OfferAccess::shutdown
    fn prune_finished(offer_engines: &mut HashMap<Uuid, OfferEngine>) {
        offer_engines.retain(|local_uuid, engine| {
            let finished = engine.task_handle.is_finished();
            if finished {
                debug!("Pruning stopped engine of Offer w/ LocalUUID {}", local_uuid);
            }
            !finished
        });
    }

    async fn stop_engine(local_uuid: Uuid, engine: OfferEngine) {
        if let Err(error) = engine.new_accessor().shutdown().await {
            debug!(
                "Offer w/ LocalUUID {} engine already stopped - {}",
                local_uuid, error
            );
        }
        if let Err(error) = engine.task_handle.await {
            warn!(
                "Offer w/ LocalUUID {} engine task failed - {}",
                local_uuid, error
            );
        }
    }
}
