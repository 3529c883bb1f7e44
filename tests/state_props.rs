use nxql_core::state::apply::apply_diff;
use nxql_core::state::copy::copy;
use nxql_core::state::diff::diff;
use nxql_core::state::equality::{state_equals_loose, state_equals_strict};
use nxql_core::state::state::State;
use nxql_core::state::value::StateValue;
use proptest::prelude::*;

const KEYS: [&str; 5] = ["title", "size", "tags", "meta", "files"];

fn scalar() -> impl Strategy<Value = StateValue> {
    prop_oneof![
        any::<i64>().prop_map(StateValue::Long),
        "[a-z]{0,6}".prop_map(StateValue::String),
        any::<bool>().prop_map(StateValue::Boolean),
    ]
}

fn flat_state() -> impl Strategy<Value = State> {
    prop::collection::vec((prop::sample::select(KEYS.to_vec()), scalar()), 0..4)
        .prop_map(|entries| entries.into_iter().collect())
}

fn value() -> impl Strategy<Value = StateValue> {
    prop_oneof![
        3 => scalar(),
        1 => prop::collection::vec(any::<i64>().prop_map(StateValue::Long), 0..5).prop_map(StateValue::Array),
        1 => flat_state().prop_map(StateValue::State),
        1 => prop::collection::vec(flat_state(), 0..4).prop_map(StateValue::List),
    ]
}

fn document() -> impl Strategy<Value = State> {
    prop::collection::vec((prop::sample::select(KEYS.to_vec()), value()), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn copy_is_strictly_equal(doc in document()) {
        let copied = copy(&doc).unwrap();
        prop_assert!(state_equals_strict(&copied, &doc));
    }

    #[test]
    fn diff_then_apply_reaches_target(before in document(), after in document()) {
        let d = diff(&before, &after).unwrap();
        let mut patched = copy(&before).unwrap();
        apply_diff(&mut patched, &d).unwrap();
        prop_assert!(state_equals_loose(&patched, &after), "before={} after={} diff={} got={}", before, after, d, patched);
    }

    #[test]
    fn self_diff_is_empty(doc in document()) {
        prop_assert!(diff(&doc, &doc).unwrap().is_empty());
    }
}
