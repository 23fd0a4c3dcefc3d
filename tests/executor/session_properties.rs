//! Property tests for session iteration.

use crate::common::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn identity_returns_input(native in arb_native()) {
        let out = run_native(".", &native).unwrap();
        prop_assert_eq!(out, vec![native]);
    }

    #[test]
    fn iterate_yields_every_element_in_order(items in prop::collection::vec(arb_native(), 0..12)) {
        let out = run_native(".[]", &items).unwrap();
        prop_assert_eq!(out, items);
    }

    #[test]
    fn text_and_native_inputs_agree(native in arb_native()) {
        let text = to_value(&native).unwrap().dump();
        let via_text = run_json(".", &text).unwrap();
        prop_assert_eq!(via_text, vec![text]);
    }

    #[test]
    fn exhaustion_is_sticky(n in 0i64..20, extra in 1usize..5) {
        let mut session = Session::new("range(.)").unwrap();
        session.accept_input(&n).unwrap();
        let mut count = 0;
        while session.step().unwrap() {
            count += 1;
        }
        prop_assert_eq!(count, n);
        for _ in 0..extra {
            prop_assert!(!session.step().unwrap());
        }
        prop_assert_eq!(session.state(), SessionState::Drained);
    }

    #[test]
    fn restarting_discards_partial_cycles(first in 1i64..10, taken in 0i64..10, second in 0i64..10) {
        let mut session = Session::new("range(.)").unwrap();
        session.accept_input(&first).unwrap();
        for _ in 0..taken.min(first) {
            prop_assert!(session.step().unwrap());
        }
        session.accept_input(&second).unwrap();
        let rest: Vec<Value> = session.outputs().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(rest.len() as i64, second);
    }
}
