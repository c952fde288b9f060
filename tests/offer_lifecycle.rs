mod common;

#[cfg(test)]
mod lifecycle_tests {
    use std::sync::Arc;

    use serde_json::json;

    use tradeoffer_core::interface::{HttpMethod, WebResponse};
    use tradeoffer_core::offer::{AcceptOutcome, SendOutcome};
    use tradeoffer_core::testing::*;
    use tradeoffer_core::{ErrorKind, OfferError, OfferFilter, TradeOfferState};

    use super::common::logger;

    fn stubs() -> (Arc<StubWebApi>, Arc<StubCommunity>) {
        (
            Arc::new(StubWebApi::new()),
            Arc::new(StubCommunity::new(SomeTestOfferParams::session_id())),
        )
    }

    #[tokio::test]
    async fn test_create_and_send_offer() {
        logger::setup();
        let (api, community) = stubs();
        community.push_reply(Ok(WebResponse::ok(json!({"tradeofferid": "123"}))));
        let manager = SomeTestOfferParams::manager(api.clone(), community.clone());

        let mut offer = manager.create_offer(SomeTestOfferParams::partner());
        assert!(offer.items_to_give().is_empty());
        assert_eq!(offer.state(), TradeOfferState::Invalid);
        assert_eq!(offer.id(), None);
        assert!(offer.is_our_offer());
        assert!(!offer.from_real_time_trade());

        offer
            .add_my_items(SomeTestOfferParams::items_to_give())
            .unwrap();
        offer
            .add_their_items(SomeTestOfferParams::items_to_receive())
            .unwrap();

        let outcome = offer.send(Some("hi"), Some("tok3n")).await.unwrap();
        assert_eq!(outcome, SendOutcome::Sent);
        assert_eq!(offer.state(), TradeOfferState::Active);
        assert_eq!(offer.id(), Some("123"));
        assert_eq!(offer.message(), Some("hi"));

        let posts = community.posts();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(
            post.url.as_str(),
            "https://steamcommunity.com/tradeoffer/new/send"
        );
        assert_eq!(
            post.header("referer"),
            Some("https://steamcommunity.com/tradeoffer/new/?partner=46143802&token=tok3n")
        );
        assert_eq!(post.field("sessionid"), Some("0123456789abcdef01234567"));
        assert_eq!(post.field("partner"), Some("76561198006409530"));
        assert_eq!(
            post.field("trade_offer_create_params"),
            Some(r#"{"trade_offer_access_token":"tok3n"}"#)
        );

        let payload: serde_json::Value =
            serde_json::from_str(post.field("json_tradeoffer").unwrap()).unwrap();
        assert_eq!(payload["me"]["assets"].as_array().unwrap().len(), 2);
        assert_eq!(payload["me"]["assets"][1]["amount"], json!(3));
        assert_eq!(payload["them"]["assets"][0]["assetid"], json!("15550001"));

        // Nothing may change once sent
        let result = offer.add_their_item(tradeoffer_core::offer::Item::new(440, "2", "1"));
        assert!(matches!(result, Err(OfferError::AlreadySent)));
        assert!(matches!(
            offer.set_message("edited"),
            Err(OfferError::AlreadySent)
        ));
        assert!(matches!(
            offer.send(None, None).await,
            Err(OfferError::AlreadySent)
        ));
        assert_eq!(community.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_send_uses_preset_message() {
        logger::setup();
        let (api, community) = stubs();
        community.push_reply(Ok(WebResponse::ok(json!({"tradeofferid": 456}))));
        let manager = SomeTestOfferParams::manager(api, community.clone());

        let mut offer = manager.create_offer(SomeTestOfferParams::partner());
        offer.set_message("from setter").unwrap();
        offer.send(None, None).await.unwrap();

        assert_eq!(offer.id(), Some("456"));
        assert_eq!(offer.message(), Some("from setter"));
        assert_eq!(
            community.posts()[0].field("tradeoffermessage"),
            Some("from setter")
        );
        assert_eq!(
            community.posts()[0].field("trade_offer_create_params"),
            Some("{}")
        );
    }

    #[tokio::test]
    async fn test_send_needs_email_confirmation() {
        logger::setup();
        let (api, community) = stubs();
        community.push_reply(Ok(WebResponse::ok(
            json!({"needs_email_confirmation": true}),
        )));
        let manager = SomeTestOfferParams::manager(api, community.clone());

        let mut offer = manager.create_offer(SomeTestOfferParams::partner());
        let outcome = offer.send(Some("hi"), None).await.unwrap();

        assert_eq!(outcome, SendOutcome::Pending);
        assert_eq!(outcome.to_string(), "pending");
        assert_eq!(offer.state(), TradeOfferState::EmailPending);
        assert_eq!(offer.id(), None);

        // A pending offer was already submitted, so it must not go out twice
        assert!(matches!(
            offer.send(Some("hi"), None).await,
            Err(OfferError::AlreadySent)
        ));
        assert_eq!(community.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_send_failures_are_classified() {
        logger::setup();
        let (api, community) = stubs();
        community.push_reply(Err(OfferError::Transport("connection reset".to_string())));
        community.push_reply(Ok(WebResponse {
            status: 429,
            body: serde_json::Value::Null,
        }));
        community.push_reply(Ok(WebResponse::ok(
            json!({"strError": "There was an error sending your trade offer. (26)"}),
        )));
        community.push_reply(Ok(WebResponse::ok(json!({"success": false}))));
        let manager = SomeTestOfferParams::manager(api, community.clone());

        let mut offer = manager.create_offer(SomeTestOfferParams::partner());

        let error = offer.send(Some("hi"), None).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Transport);

        let error = offer.send(Some("hi"), None).await.unwrap_err();
        assert!(matches!(error, OfferError::HttpStatus(429)));
        assert_eq!(error.kind(), ErrorKind::Transport);

        let error = offer.send(Some("hi"), None).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RemoteRejected);
        assert!(error.to_string().contains("(26)"));

        let error = offer.send(Some("hi"), None).await.unwrap_err();
        assert!(matches!(error, OfferError::UnrecognizedResponse(_)));
        assert_eq!(error.kind(), ErrorKind::ProtocolSurprise);

        // None of the failures moved the offer forward
        assert_eq!(offer.state(), TradeOfferState::Invalid);
        assert_eq!(offer.id(), None);
        assert_eq!(offer.message(), None);
        assert_eq!(community.posts().len(), 4);
    }

    #[tokio::test]
    async fn test_accept_received_offer() {
        logger::setup();
        let (api, community) = stubs();
        api.push_reply(Ok(SomeTestOfferParams::single_response(
            SomeTestOfferParams::offer_record("4001", 2, false),
        )));
        community.push_reply(Ok(WebResponse::ok(json!({"tradeid": "999"}))));
        let manager = SomeTestOfferParams::manager(api, community.clone());

        let mut offer = manager.get_offer("4001").await.unwrap();
        assert_eq!(offer.state(), TradeOfferState::Active);
        assert!(!offer.is_our_offer());

        let outcome = offer.accept().await.unwrap();
        assert_eq!(outcome, AcceptOutcome::Accepted);
        assert_eq!(offer.state(), TradeOfferState::Accepted);
        assert_eq!(offer.trade_id(), Some("999"));

        let post = &community.posts()[0];
        assert_eq!(
            post.url.as_str(),
            "https://steamcommunity.com/tradeoffer/4001/accept"
        );
        assert_eq!(post.field("tradeofferid"), Some("4001"));
        assert_eq!(post.field("serverid"), Some("1"));
        assert_eq!(post.field("captcha"), Some(""));

        // Accepted now, so neither accept nor cancel is legal
        assert!(matches!(
            offer.accept().await,
            Err(OfferError::NotActive { .. })
        ));
        assert!(matches!(
            offer.cancel().await,
            Err(OfferError::NotActive { .. })
        ));
        assert_eq!(community.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_accept_own_offer_rejected_in_any_state() {
        logger::setup();
        let (api, community) = stubs();
        let manager = SomeTestOfferParams::manager(api.clone(), community.clone());

        for state in [2, 3, 5, 7, 9] {
            api.push_reply(Ok(SomeTestOfferParams::single_response(
                SomeTestOfferParams::offer_record("5000", state, true),
            )));
            let mut offer = manager.get_offer("5000").await.unwrap();
            let error = offer.accept().await.unwrap_err();
            assert!(
                matches!(error, OfferError::CannotAcceptOwnOffer { .. }),
                "state {} gave {:?}",
                state,
                error
            );
        }

        let mut unsent = manager.create_offer(SomeTestOfferParams::partner());
        assert!(unsent.accept().await.unwrap_err().is_usage_error());
        assert!(community.posts().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_then_received_items() {
        logger::setup();
        let (api, community) = stubs();
        api.push_reply(Ok(SomeTestOfferParams::bulk_response(
            vec![SomeTestOfferParams::offer_record("6001", 2, true)],
            vec![SomeTestOfferParams::offer_record("6002", 3, false)],
        )));
        api.push_reply(Ok(json!({"response": {}})));
        api.push_reply(Ok(json!({"response": {"trades": [{
            "tradeid": "3150000000000000001",
            "status": 3,
            "assets_received": [
                {"appid": 440, "contextid": "2", "assetid": "8812345", "amount": "1", "new_assetid": "9912345", "new_contextid": "2"}
            ]
        }]}})));
        let manager = SomeTestOfferParams::manager(api.clone(), community);

        let (sent, received) = manager.get_offers(OfferFilter::All, None).await.unwrap();
        sent[0].cancel().await.unwrap();

        let items = received[0].get_received_items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].assetid, "9912345");

        let calls = api.calls();
        assert_eq!(calls[1].method, HttpMethod::Post);
        assert_eq!(calls[1].endpoint, "CancelTradeOffer");
        assert_eq!(calls[1].param("tradeofferid"), Some("6001"));
        assert_eq!(calls[2].endpoint, "GetTradeStatus");
        assert_eq!(calls[2].param("tradeid"), Some("3150000000000000001"));
    }

    #[tokio::test]
    async fn test_cancel_and_decline_surface_api_errors() {
        logger::setup();
        let (api, community) = stubs();
        api.push_reply(Ok(SomeTestOfferParams::bulk_response(
            vec![SomeTestOfferParams::offer_record("6101", 2, true)],
            vec![SomeTestOfferParams::offer_record("6102", 2, false)],
        )));
        api.push_reply(Err(OfferError::Transport("connection reset".to_string())));
        api.push_reply(Err(OfferError::HttpStatus(500)));
        let manager = SomeTestOfferParams::manager(api.clone(), community);

        let (sent, received) = manager.get_offers(OfferFilter::ActiveOnly, None).await.unwrap();

        let error = sent[0].cancel().await.unwrap_err();
        assert!(matches!(error, OfferError::Transport(_)));
        assert_eq!(error.kind(), ErrorKind::Transport);

        let error = received[0].decline().await.unwrap_err();
        assert!(matches!(error, OfferError::HttpStatus(500)));
        assert_eq!(received[0].state(), TradeOfferState::Active);

        let calls = api.calls();
        assert_eq!(calls[1].endpoint, "CancelTradeOffer");
        assert_eq!(calls[2].endpoint, "DeclineTradeOffer");
        assert_eq!(calls[2].param("tradeofferid"), Some("6102"));
    }
}
