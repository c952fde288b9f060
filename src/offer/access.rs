use strum_macros::{Display, IntoStaticStr};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::{AcceptOutcome, Item, Offer, OfferSnapshot, SendOutcome};
use crate::common::error::OfferError;

#[derive(Clone)]
pub struct OfferAccess {
    local_uuid: Uuid,
    tx: mpsc::Sender<OfferRequest>,
}

impl OfferAccess {
    pub(super) fn new(local_uuid: Uuid, tx: mpsc::Sender<OfferRequest>) -> Self {
        Self { local_uuid, tx }
    }

    pub fn local_uuid(&self) -> Uuid {
        self.local_uuid
    }

    pub async fn send(
        &self,
        message: Option<String>,
        token: Option<String>,
    ) -> Result<SendOutcome, OfferError> {
        let (rsp_tx, rsp_rx) = oneshot::channel::<Result<SendOutcome, OfferError>>();
        let request = OfferRequest::Send {
            message,
            token,
            rsp_tx,
        };
        self.tx.send(request).await?;
        rsp_rx.await?
    }

    pub async fn cancel(&self) -> Result<(), OfferError> {
        let (rsp_tx, rsp_rx) = oneshot::channel::<Result<(), OfferError>>();
        let request = OfferRequest::Cancel { rsp_tx };
        self.tx.send(request).await?;
        rsp_rx.await?
    }

    pub async fn decline(&self) -> Result<(), OfferError> {
        self.cancel().await
    }

    pub async fn accept(&self) -> Result<AcceptOutcome, OfferError> {
        let (rsp_tx, rsp_rx) = oneshot::channel::<Result<AcceptOutcome, OfferError>>();
        let request = OfferRequest::Accept { rsp_tx };
        self.tx.send(request).await?;
        rsp_rx.await?
    }

    pub async fn received_items(&self) -> Result<Vec<Item>, OfferError> {
        let (rsp_tx, rsp_rx) = oneshot::channel::<Result<Vec<Item>, OfferError>>();
        let request = OfferRequest::ReceivedItems { rsp_tx };
        self.tx.send(request).await?;
        rsp_rx.await?
    }

    pub async fn snapshot(&self) -> Result<OfferSnapshot, OfferError> {
        let (rsp_tx, rsp_rx) = oneshot::channel::<OfferSnapshot>();
        let request = OfferRequest::Snapshot { rsp_tx };
        self.tx.send(request).await?;
        Ok(rsp_rx.await?)
    }

    pub async fn shutdown(&self) -> Result<(), OfferError> {
        let (rsp_tx, rsp_rx) = oneshot::channel::<()>();
        let request = OfferRequest::Shutdown { rsp_tx };
        self.tx.send(request).await?;
        Ok(rsp_rx.await?)
    }
}

pub(crate) struct OfferEngine {
    local_uuid: Uuid,
    tx: mpsc::Sender<OfferRequest>,
    pub(crate) task_handle: tokio::task::JoinHandle<()>,
}

impl OfferEngine {
    const OFFER_REQUEST_CHANNEL_SIZE: usize = 10;

    pub(crate) fn new(offer: Offer) -> Self {
        let local_uuid = offer.local_uuid();
        let (tx, rx) = mpsc::channel::<OfferRequest>(Self::OFFER_REQUEST_CHANNEL_SIZE);
        let actor = OfferActor::new(rx, offer);
        let task_handle = tokio::spawn(async move { actor.run().await });
        Self {
            local_uuid,
            tx,
            task_handle,
        }
    }

    pub(crate) fn new_accessor(&self) -> OfferAccess {
        OfferAccess::new(self.local_uuid, self.tx.clone())
    }
}

#[derive(Display, IntoStaticStr)]
pub(super) enum OfferRequest {
    Send {
        message: Option<String>,
        token: Option<String>,
        rsp_tx: oneshot::Sender<Result<SendOutcome, OfferError>>,
    },
    Cancel {
        rsp_tx: oneshot::Sender<Result<(), OfferError>>,
    },
    Accept {
        rsp_tx: oneshot::Sender<Result<AcceptOutcome, OfferError>>,
    },
    ReceivedItems {
        rsp_tx: oneshot::Sender<Result<Vec<Item>, OfferError>>,
    },
    Snapshot {
        rsp_tx: oneshot::Sender<OfferSnapshot>,
    },
    Shutdown {
        rsp_tx: oneshot::Sender<()>,
    },
}

// Owns the offer and applies requests strictly one at a time, so a guard and
// the mutation that follows it can never interleave with another request.
struct OfferActor {
    rx: mpsc::Receiver<OfferRequest>,
    offer: Offer,
}

impl OfferActor {
    fn new(rx: mpsc::Receiver<OfferRequest>, offer: Offer) -> Self {
        OfferActor { rx, offer }
    }

    async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            if self.handle_request(request).await {
                break;
            }
        }
        info!(
            "Offer w/ LocalUUID {} engine terminating",
            self.offer.local_uuid()
        );
    }

    async fn handle_request(&mut self, request: OfferRequest) -> bool {
        let mut terminate = false;
        debug!(
            "Offer w/ LocalUUID {} handle_request() of type {}",
            self.offer.local_uuid(),
            request
        );

        match request {
            OfferRequest::Send {
                message,
                token,
                rsp_tx,
            } => {
                let result = self
                    .offer
                    .send(message.as_deref(), token.as_deref())
                    .await;
                self.reply(rsp_tx, result);
            }
            OfferRequest::Cancel { rsp_tx } => {
                let result = self.offer.cancel().await;
                self.reply(rsp_tx, result);
            }
            OfferRequest::Accept { rsp_tx } => {
                let result = self.offer.accept().await;
                self.reply(rsp_tx, result);
            }
            OfferRequest::ReceivedItems { rsp_tx } => {
                let result = self.offer.get_received_items().await;
                self.reply(rsp_tx, result);
            }
            OfferRequest::Snapshot { rsp_tx } => {
                let snapshot = self.offer.snapshot();
                self.reply(rsp_tx, snapshot);
            }
            OfferRequest::Shutdown { rsp_tx } => {
                self.reply(rsp_tx, ());
                terminate = true;
            }
        }
        terminate
    }

    fn reply<T>(&self, rsp_tx: oneshot::Sender<T>, value: T) {
        if rsp_tx.send(value).is_err() {
            error!(
                "Offer w/ LocalUUID {} failed to reply, requester dropped",
                self.offer.local_uuid()
            );
        }
    }
}
