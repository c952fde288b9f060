use std::sync::Arc;

use serde_json::{json, Value};

use super::{StubCommunity, StubWebApi};
use crate::common::types::SteamId;
use crate::config::ManagerConfig;
use crate::manager::TradeOfferManager;
use crate::offer::Item;

pub struct SomeTestOfferParams {}

impl SomeTestOfferParams {
    pub fn session_id() -> String {
        "0123456789abcdef01234567".to_string()
    }

    pub fn partner_account_id() -> u32 {
        46143802
    }

    pub fn partner() -> SteamId {
        SteamId::from_account_id(Self::partner_account_id())
    }

    pub fn items_to_give() -> Vec<Item> {
        vec![
            Item::new(440, "2", "8812345"),
            Item::new(753, "6", "2200").with_amount(3),
        ]
    }

    pub fn items_to_receive() -> Vec<Item> {
        vec![Item::new(730, "2", "15550001")]
    }

    pub fn time_created() -> i64 {
        1_690_000_000
    }

    pub fn time_updated() -> i64 {
        1_690_000_500
    }

    pub fn expiration_time() -> i64 {
        1_691_209_600
    }

    /// A remote offer record as the web API returns it.
    pub fn offer_record(id: &str, state: i64, is_our_offer: bool) -> Value {
        let mut record = json!({
            "tradeofferid": id,
            "accountid_other": Self::partner_account_id(),
            "message": "test offer",
            "expiration_time": Self::expiration_time(),
            "trade_offer_state": state,
            "items_to_give": [
                {"appid": 440, "contextid": "2", "assetid": "8812345", "classid": "101", "instanceid": "0", "amount": "1", "missing": false},
                {"appid": 753, "contextid": "6", "assetid": "2200", "classid": "55", "instanceid": "0", "amount": "3", "missing": false}
            ],
            "items_to_receive": [
                {"appid": 730, "contextid": "2", "assetid": "15550001", "classid": "77", "instanceid": "0", "amount": "1", "missing": false}
            ],
            "is_our_offer": is_our_offer,
            "time_created": Self::time_created(),
            "time_updated": Self::time_updated(),
            "from_real_time_trade": false,
            "escrow_end_date": 0,
            "confirmation_method": 0
        });
        if state == 3 {
            record["tradeid"] = json!("3150000000000000001");
        }
        record
    }

    pub fn single_response(record: Value) -> Value {
        json!({ "response": { "offer": record } })
    }

    pub fn bulk_response(sent: Vec<Value>, received: Vec<Value>) -> Value {
        json!({
            "response": {
                "trade_offers_sent": sent,
                "trade_offers_received": received,
                "next_cursor": 0
            }
        })
    }

    pub fn manager(api: Arc<StubWebApi>, community: Arc<StubCommunity>) -> TradeOfferManager {
        TradeOfferManager::new(api, community, ManagerConfig::default())
    }
}
