//! Integration property tests for access-core.
//!
//! These tests validate cross-module invariants using property-based
//! testing.

use std::collections::HashSet;
use std::sync::Arc;

use access_core::{
    AccessDecisionManager, AffirmativeBased, Authentication, ConfigAttribute, ConsensusBased,
    DefaultSidRetrievalStrategy, RoleHierarchy, RoleHierarchyImpl, RoleVoter, SecurityContextHolder, Sid,
    SidRetrievalStrategy, UnanimousBased,
};
use proptest::prelude::*;

// Strategy: Generate distinct authority names
fn arb_authorities() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::string::string_regex("ROLE_[A-Z]{1,6}").unwrap(), 0..8).prop_map(|mut roles| {
        let mut seen = HashSet::new();
        roles.retain(|r| seen.insert(r.clone()));
        roles
    })
}

fn arb_principal() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{2,10}").unwrap()
}

proptest! {
    /// Property: principal SID first, then one SID per authority in order
    #[test]
    fn proptest_sid_ordering(principal in arb_principal(), authorities in arb_authorities()) {
        let auth = Authentication::new(principal.clone(), "pw", authorities.clone());
        let sids = DefaultSidRetrievalStrategy::new().get_sids(&auth);

        prop_assert_eq!(sids.len(), authorities.len() + 1);
        prop_assert_eq!(&sids[0], &Sid::Principal(principal));
        for (sid, authority) in sids[1..].iter().zip(&authorities) {
            prop_assert_eq!(sid, &Sid::GrantedAuthority(authority.clone()));
        }
    }

    /// Property: authenticated exactly when at least one authority is granted
    #[test]
    fn proptest_authenticated_flag(principal in arb_principal(), authorities in arb_authorities()) {
        let auth = Authentication::new(principal, "pw", authorities.clone());
        prop_assert_eq!(auth.is_authenticated(), !authorities.is_empty());
    }

    /// Property: clearing is idempotent and always leaves the store empty
    #[test]
    fn proptest_clear_is_idempotent(principal in arb_principal(), clears in 1usize..4) {
        SecurityContextHolder::set_authentication(Authentication::new(principal, "pw", ["ROLE_USER"]));
        for _ in 0..clears {
            SecurityContextHolder::clear_context();
            prop_assert!(SecurityContextHolder::get_context().is_none());
        }
    }

    /// Property: hierarchy expansion keeps granted roles first and never duplicates
    #[test]
    fn proptest_hierarchy_expansion(authorities in arb_authorities()) {
        let hierarchy = RoleHierarchyImpl::from_hierarchy("ROLE_A > ROLE_B\nROLE_B > ROLE_C").unwrap();
        let granted: Vec<_> = authorities.iter().map(access_core::GrantedAuthority::new).collect();
        let reachable = hierarchy.reachable_authorities(&granted);

        prop_assert_eq!(&reachable[..granted.len()], &granted[..]);
        let unique: HashSet<_> = reachable.iter().collect();
        prop_assert_eq!(unique.len(), reachable.len());
        if authorities.iter().any(|a| a == "ROLE_A") {
            prop_assert!(reachable.iter().any(|a| a.authority() == "ROLE_C"));
        }
    }

    /// Property: with a single role voter every strategy agrees
    #[test]
    fn proptest_single_voter_strategies_agree(authorities in arb_authorities(), required in "ROLE_[A-Z]{1,6}") {
        let auth = Authentication::new("user", "pw", authorities.clone());
        let attrs = vec![ConfigAttribute::new(required.clone())];
        let affirmative = AffirmativeBased::<str>::new(vec![Arc::new(RoleVoter::new())]).unwrap();
        let consensus = ConsensusBased::<str>::new(vec![Arc::new(RoleVoter::new())]).unwrap();
        let unanimous = UnanimousBased::<str>::new(vec![Arc::new(RoleVoter::new())]).unwrap();

        let expected = authorities.contains(&required);
        prop_assert_eq!(affirmative.decide(&auth, "/", &attrs).is_ok(), expected);
        prop_assert_eq!(consensus.decide(&auth, "/", &attrs).is_ok(), expected);
        prop_assert_eq!(unanimous.decide(&auth, "/", &attrs).is_ok(), expected);
    }
}
