use std::{error::Error, fmt};

use strum_macros::{Display, IntoStaticStr};

use super::types::TradeOfferState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
pub enum ErrorKind {
    Usage,
    Transport,
    RemoteRejected,
    ProtocolSurprise,
    Internal,
}

#[derive(Debug)]
pub enum OfferError {
    // Local precondition violations
    AlreadySent,
    Unsent,
    NotActive { id: String, state: TradeOfferState },
    CannotAcceptOwnOffer { id: String },
    NotAccepted { id: String, state: TradeOfferState },
    MissingTradeId { id: String },
    InvalidPartner(String),

    // Network
    Transport(String),
    HttpStatus(u16),

    // The service said no
    RemoteRejected(String),

    // The service said something we don't understand
    MalformedResponse(String),
    UnrecognizedResponse(String),
    NotFound(String),

    SerdesJson(serde_json::Error),
    UrlParse(url::ParseError),
    Io(std::io::Error),
    EngineGone(String),
}

impl OfferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OfferError::AlreadySent
            | OfferError::Unsent
            | OfferError::NotActive { .. }
            | OfferError::CannotAcceptOwnOffer { .. }
            | OfferError::NotAccepted { .. }
            | OfferError::MissingTradeId { .. }
            | OfferError::InvalidPartner(_) => ErrorKind::Usage,
            OfferError::Transport(_) | OfferError::HttpStatus(_) => ErrorKind::Transport,
            OfferError::RemoteRejected(_) => ErrorKind::RemoteRejected,
            OfferError::MalformedResponse(_)
            | OfferError::UnrecognizedResponse(_)
            | OfferError::NotFound(_) => ErrorKind::ProtocolSurprise,
            OfferError::SerdesJson(_)
            | OfferError::UrlParse(_)
            | OfferError::Io(_)
            | OfferError::EngineGone(_) => ErrorKind::Internal,
        }
    }

    pub fn is_usage_error(&self) -> bool {
        self.kind() == ErrorKind::Usage
    }
}

impl Error for OfferError {}

impl fmt::Display for OfferError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let error_string = match self {
            OfferError::AlreadySent => {
                "TradeOffer-Error | AlreadySent - This offer has already been sent".to_string()
            }
            OfferError::Unsent => {
                "TradeOffer-Error | Unsent - Operation not possible on an unsent offer".to_string()
            }
            OfferError::NotActive { id, state } => format!(
                "TradeOffer-Error | NotActive - Offer #{} is {}, not Active",
                id, state
            ),
            OfferError::CannotAcceptOwnOffer { id } => format!(
                "TradeOffer-Error | CannotAcceptOwnOffer - Cannot accept our own offer #{}",
                id
            ),
            OfferError::NotAccepted { id, state } => format!(
                "TradeOffer-Error | NotAccepted - Offer #{} is {}, cannot request received items",
                id, state
            ),
            OfferError::MissingTradeId { id } => format!(
                "TradeOffer-Error | MissingTradeId - Offer #{} is accepted, but does not have a trade ID",
                id
            ),
            OfferError::InvalidPartner(input) => {
                format!("TradeOffer-Error | InvalidPartner - Cannot parse {}", input)
            }
            OfferError::Transport(msg) => format!("TradeOffer-Error | Transport - {}", msg),
            OfferError::HttpStatus(status) => {
                format!("TradeOffer-Error | HttpStatus - HTTP error {}", status)
            }
            OfferError::RemoteRejected(msg) => {
                format!("TradeOffer-Error | RemoteRejected - {}", msg)
            }
            OfferError::MalformedResponse(msg) => {
                format!("TradeOffer-Error | MalformedResponse - {}", msg)
            }
            OfferError::UnrecognizedResponse(body) => {
                format!("TradeOffer-Error | UnrecognizedResponse - {}", body)
            }
            OfferError::NotFound(what) => format!("TradeOffer-Error | NotFound - {}", what),
            OfferError::SerdesJson(err) => {
                format!("TradeOffer-Error | SerdesJsonError - {}", err)
            }
            OfferError::UrlParse(err) => format!("TradeOffer-Error | UrlParseError - {}", err),
            OfferError::Io(err) => format!("TradeOffer-Error | IoError - {}", err),
            OfferError::EngineGone(msg) => format!("TradeOffer-Error | EngineGone - {}", msg),
        };
        write!(f, "{}", error_string)
    }
}

impl From<serde_json::Error> for OfferError {
    fn from(e: serde_json::Error) -> OfferError {
        OfferError::SerdesJson(e)
    }
}

impl From<url::ParseError> for OfferError {
    fn from(e: url::ParseError) -> OfferError {
        OfferError::UrlParse(e)
    }
}

impl From<std::io::Error> for OfferError {
    fn from(e: std::io::Error) -> OfferError {
        OfferError::Io(e)
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for OfferError {
    fn from(e: tokio::sync::mpsc::error::SendError<T>) -> OfferError {
        OfferError::EngineGone(e.to_string())
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for OfferError {
    fn from(e: tokio::sync::oneshot::error::RecvError) -> OfferError {
        OfferError::EngineGone(e.to_string())
    }
}
