use proptest::prelude::*;

use quorum_types::{ProposalId, Timestamp, TokenAmount};

proptest! {
    /// Timestamp has_expired agrees with manual arithmetic.
    #[test]
    fn timestamp_has_expired_correct(
        start in 0u64..500_000,
        duration in 0u64..500_000,
        offset in 0u64..1_000_000,
    ) {
        let t = Timestamp::new(start);
        let now = Timestamp::new(start + offset);
        prop_assert_eq!(t.has_expired(duration, now), offset >= duration);
    }

    /// has_expired never overflows near the end of time.
    #[test]
    fn timestamp_has_expired_saturates(start in u64::MAX - 1_000..u64::MAX, duration in 1_001u64..u64::MAX) {
        let t = Timestamp::new(start);
        prop_assert!(!t.has_expired(duration, Timestamp::new(start)));
    }

    /// ceil_percent matches the exact ceiling computed in wider arithmetic.
    #[test]
    fn ceil_percent_matches_exact_ceiling(supply in 0u128..(u64::MAX as u128), percent in 1u8..=100) {
        let expected = (supply * percent as u128).div_ceil(100);
        prop_assert_eq!(
            TokenAmount::new(supply).ceil_percent(percent),
            Some(TokenAmount::new(expected))
        );
    }

    /// ceil_percent never exceeds the supply for percentages up to 100.
    #[test]
    fn ceil_percent_bounded_by_supply(supply in 0u128..u128::MAX, percent in 1u8..=100) {
        let required = TokenAmount::new(supply).ceil_percent(percent).unwrap();
        prop_assert!(required <= TokenAmount::new(supply));
    }

    /// checked_sub returns None exactly when b > a.
    #[test]
    fn token_amount_checked_sub_underflow(a in 0u128..1_000_000, b in 0u128..1_000_000) {
        let result = TokenAmount::new(a).checked_sub(TokenAmount::new(b));
        if b > a {
            prop_assert!(result.is_none());
        } else {
            prop_assert_eq!(result, Some(TokenAmount::new(a - b)));
        }
    }

    /// Proposal ids map to dense zero-based indices.
    #[test]
    fn proposal_id_index_is_dense(raw in 1u64..1_000_000) {
        let id = ProposalId::new(raw);
        prop_assert_eq!(id.index(), Some((raw - 1) as usize));
        prop_assert_eq!(id.next().and_then(|n| n.index()), Some(raw as usize));
    }
}

#[test]
fn proposal_id_zero_has_no_index() {
    assert_eq!(ProposalId::new(0).index(), None);
}

#[test]
fn proposal_action_bincode_roundtrip() {
    let action = quorum_types::ProposalAction {
        recipient: "token".into(),
        call_data: vec![1, 2, 3],
    };
    let bytes = bincode::serialize(&action).unwrap();
    let decoded: quorum_types::ProposalAction = bincode::deserialize(&bytes).unwrap();
    assert_eq!(decoded, action);
}
