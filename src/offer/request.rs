//! Request construction for the community form endpoints and the bulk fetch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::Item;
use crate::common::{
    error::OfferError,
    types::{OfferFilter, SteamId},
    utils,
};
use crate::interface::FormParams;

const TRADE_OFFER_VERSION: u32 = 4;
const SERVER_ID: &str = "1";

#[derive(Debug, Serialize)]
struct AssetPayload<'a> {
    appid: u32,
    contextid: &'a str,
    amount: u64,
    assetid: &'a str,
}

impl<'a> From<&'a Item> for AssetPayload<'a> {
    fn from(item: &'a Item) -> Self {
        AssetPayload {
            appid: item.appid,
            contextid: &item.contextid,
            amount: if item.amount == 0 { 1 } else { item.amount },
            assetid: &item.assetid,
        }
    }
}

#[derive(Debug, Serialize)]
struct TradeOfferSide<'a> {
    assets: Vec<AssetPayload<'a>>,
    currency: Vec<Value>,
    ready: bool,
}

impl<'a> TradeOfferSide<'a> {
    fn new(items: &'a [Item]) -> Self {
        TradeOfferSide {
            assets: items.iter().map(AssetPayload::from).collect(),
            currency: Vec::new(),
            ready: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct TradeOfferPayload<'a> {
    newversion: bool,
    version: u32,
    me: TradeOfferSide<'a>,
    them: TradeOfferSide<'a>,
}

#[derive(Debug, Default, Serialize)]
struct TradeOfferCreateParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    trade_offer_access_token: Option<&'a str>,
}

pub(crate) struct SendOfferRequest<'a> {
    pub partner: SteamId,
    pub message: &'a str,
    pub token: Option<&'a str>,
    pub items_to_give: &'a [Item],
    pub items_to_receive: &'a [Item],
}

impl<'a> SendOfferRequest<'a> {
    pub fn referer(&self, community_base: &str) -> String {
        let mut referer = format!(
            "{}/tradeoffer/new/?partner={}",
            community_base.trim_end_matches('/'),
            self.partner.account_id()
        );
        if let Some(token) = self.token {
            referer.push_str(&format!("&token={}", token));
        }
        referer
    }

    pub fn form(&self, session_id: String) -> Result<FormParams, OfferError> {
        let payload = TradeOfferPayload {
            newversion: true,
            version: TRADE_OFFER_VERSION,
            me: TradeOfferSide::new(self.items_to_give),
            them: TradeOfferSide::new(self.items_to_receive),
        };
        let create_params = TradeOfferCreateParams {
            trade_offer_access_token: self.token,
        };

        Ok(vec![
            ("sessionid".to_string(), session_id),
            ("serverid".to_string(), SERVER_ID.to_string()),
            ("partner".to_string(), self.partner.to_string()),
            ("tradeoffermessage".to_string(), self.message.to_string()),
            ("json_tradeoffer".to_string(), serde_json::to_string(&payload)?),
            ("captcha".to_string(), String::new()),
            (
                "trade_offer_create_params".to_string(),
                serde_json::to_string(&create_params)?,
            ),
        ])
    }
}

pub(crate) struct AcceptOfferRequest<'a> {
    pub id: &'a str,
    pub partner: SteamId,
}

impl<'a> AcceptOfferRequest<'a> {
    pub fn path(&self) -> String {
        format!("tradeoffer/{}/accept", self.id)
    }

    pub fn referer(&self, community_base: &str) -> String {
        format!(
            "{}/tradeoffer/{}/",
            community_base.trim_end_matches('/'),
            self.id
        )
    }

    pub fn form(&self, session_id: String) -> FormParams {
        vec![
            ("sessionid".to_string(), session_id),
            ("serverid".to_string(), SERVER_ID.to_string()),
            ("tradeofferid".to_string(), self.id.to_string()),
            ("partner".to_string(), self.partner.to_string()),
            ("captcha".to_string(), String::new()),
        ]
    }
}

/// Options for the bulk `GetTradeOffers` fetch.
#[derive(Clone, Debug)]
pub struct GetOffersOptions {
    pub filter: OfferFilter,
    pub historical_cutoff: DateTime<Utc>,
    pub language: Option<String>,
}

impl GetOffersOptions {
    /// Without a cutoff, historical offers are effectively unbounded.
    pub fn new(
        filter: OfferFilter,
        historical_cutoff: Option<DateTime<Utc>>,
        language: Option<String>,
    ) -> Self {
        Self {
            filter,
            historical_cutoff: historical_cutoff.unwrap_or_else(utils::default_historical_cutoff),
            language,
        }
    }

    pub fn params(&self) -> FormParams {
        let flag = |on: bool| (if on { "1" } else { "0" }).to_string();

        let mut params = vec![
            ("get_sent_offers".to_string(), flag(true)),
            ("get_received_offers".to_string(), flag(true)),
            (
                "get_descriptions".to_string(),
                flag(self.language.is_some()),
            ),
        ];
        if let Some(language) = &self.language {
            params.push(("language".to_string(), language.clone()));
        }
        params.push((
            "active_only".to_string(),
            flag(self.filter == OfferFilter::ActiveOnly),
        ));
        params.push((
            "historical_only".to_string(),
            flag(self.filter == OfferFilter::HistoricalOnly),
        ));
        params.push((
            "time_historical_cutoff".to_string(),
            self.historical_cutoff.timestamp().to_string(),
        ));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(form: &'a FormParams, key: &str) -> &'a str {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_send_form_fields() {
        let give = vec![Item::new(440, "2", "100"), Item::new(730, "2", "200").with_amount(0)];
        let request = SendOfferRequest {
            partner: SteamId::from_account_id(46143802),
            message: "hello",
            token: Some("abcd"),
            items_to_give: &give,
            items_to_receive: &[],
        };

        let form = request.form("session".to_string()).unwrap();
        assert_eq!(field(&form, "sessionid"), "session");
        assert_eq!(field(&form, "serverid"), "1");
        assert_eq!(field(&form, "partner"), "76561198006409530");
        assert_eq!(field(&form, "tradeoffermessage"), "hello");
        assert_eq!(field(&form, "captcha"), "");
        assert_eq!(
            field(&form, "trade_offer_create_params"),
            r#"{"trade_offer_access_token":"abcd"}"#
        );

        let payload: Value = serde_json::from_str(field(&form, "json_tradeoffer")).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({
                "newversion": true,
                "version": 4,
                "me": {
                    "assets": [
                        {"appid": 440, "contextid": "2", "amount": 1, "assetid": "100"},
                        {"appid": 730, "contextid": "2", "amount": 1, "assetid": "200"}
                    ],
                    "currency": [],
                    "ready": false
                },
                "them": {"assets": [], "currency": [], "ready": false}
            })
        );

        assert_eq!(
            request.referer("https://steamcommunity.com/"),
            "https://steamcommunity.com/tradeoffer/new/?partner=46143802&token=abcd"
        );
    }

    #[test]
    fn test_send_form_without_token() {
        let request = SendOfferRequest {
            partner: SteamId::from_account_id(1),
            message: "",
            token: None,
            items_to_give: &[],
            items_to_receive: &[],
        };
        let form = request.form("s".to_string()).unwrap();
        assert_eq!(field(&form, "trade_offer_create_params"), "{}");
        assert_eq!(
            request.referer("https://steamcommunity.com"),
            "https://steamcommunity.com/tradeoffer/new/?partner=1"
        );
    }

    #[test]
    fn test_accept_form_fields() {
        let request = AcceptOfferRequest {
            id: "555",
            partner: SteamId::from_account_id(7),
        };
        let form = request.form("sess".to_string());
        assert_eq!(field(&form, "tradeofferid"), "555");
        assert_eq!(field(&form, "partner"), "76561197960265735");
        assert_eq!(request.path(), "tradeoffer/555/accept");
        assert_eq!(
            request.referer("https://steamcommunity.com"),
            "https://steamcommunity.com/tradeoffer/555/"
        );
    }

    #[test]
    fn test_get_offers_params() {
        let cutoff = DateTime::<Utc>::from_timestamp(1_600_000_000, 0).unwrap();
        let options = GetOffersOptions::new(
            OfferFilter::HistoricalOnly,
            Some(cutoff),
            Some("english".to_string()),
        );
        let params = options.params();
        assert_eq!(field(&params, "get_sent_offers"), "1");
        assert_eq!(field(&params, "get_received_offers"), "1");
        assert_eq!(field(&params, "get_descriptions"), "1");
        assert_eq!(field(&params, "language"), "english");
        assert_eq!(field(&params, "active_only"), "0");
        assert_eq!(field(&params, "historical_only"), "1");
        assert_eq!(field(&params, "time_historical_cutoff"), "1600000000");
    }

    #[test]
    fn test_get_offers_default_cutoff() {
        let options = GetOffersOptions::new(OfferFilter::ActiveOnly, None, None);
        let expected = Utc::now() + chrono::Duration::milliseconds(31_536_000_000);
        assert!((options.historical_cutoff - expected).num_seconds().abs() <= 2);

        let params = options.params();
        assert_eq!(field(&params, "get_descriptions"), "0");
        assert_eq!(field(&params, "active_only"), "1");
        assert!(params.iter().all(|(k, _)| k != "language"));
    }
}
