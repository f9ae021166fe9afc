//! Property-based tests for chat id derivation and document decoding.
//!
//! Uses proptest to verify:
//! 1. `ChatId::between` is symmetric and puts the smaller id first.
//! 2. Arbitrary text never makes `decode_batch` panic.
//! 3. Any integer timestamp inside the supported range decodes unchanged.

use chatline_proto::chat_id::ChatId;
use chatline_proto::document::{MAX_TIMESTAMP_MILLIS, decode_batch, decode_message};
use chatline_proto::message::{Timestamp, UserId};
use proptest::prelude::*;

/// Strategy for generating arbitrary `UserId` values.
fn arb_user_id() -> impl Strategy<Value = UserId> {
    "[A-Za-z0-9_]{1,24}".prop_map(UserId::new)
}

#[test]
fn known_pair() {
    let id = ChatId::between(&UserId::new("userB"), &UserId::new("userA"));
    assert_eq!(id.as_str(), "userA-userB");
}

proptest! {
    #[test]
    fn chat_id_is_symmetric(a in arb_user_id(), b in arb_user_id()) {
        prop_assert_eq!(ChatId::between(&a, &b), ChatId::between(&b, &a));
    }

    #[test]
    fn chat_id_puts_smaller_id_first(a in arb_user_id(), b in arb_user_id()) {
        let (lo, hi) = if a <= b { (&a, &b) } else { (&b, &a) };
        let expected = format!("{}-{}", lo.as_str(), hi.as_str());
        let actual = ChatId::between(&a, &b);
        prop_assert_eq!(actual.as_str(), expected.as_str());
    }

    #[test]
    fn decode_batch_never_panics(input in ".{0,256}") {
        let _ = decode_batch(&input);
    }

    #[test]
    fn in_range_timestamps_survive_decoding(ms in 0..=MAX_TIMESTAMP_MILLIS) {
        let doc = serde_json::json!({ "messageId": "m", "timestamp": ms });
        let message = decode_message(&doc).unwrap();
        prop_assert_eq!(message.timestamp, Timestamp::from_millis(ms));
    }
}
