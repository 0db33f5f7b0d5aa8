#![no_main]
use gridfeed::actions::Action;
use gridfeed::orchestrator::needs_refetch;
use gridfeed::store::AppState;
use gridfeed::types::{FeatureSet, FeedKind, HistoryEntry, TimeAggregate};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    // Decoding into entries directly and through the reducer must agree
    let direct = serde_json::from_value::<Vec<HistoryEntry>>(payload.clone()).ok();

    let logger = gridfeed::logging::get_logger("fuzz");
    let mut state = AppState::default();
    state.apply(
        &Action::succeeded(FeedKind::ZoneHistory, Some("XX".to_string()), payload),
        &logger,
    );

    assert_eq!(state.zone_history("XX"), direct.as_deref());

    let features: FeatureSet = ["history"].into_iter().collect();
    for aggregate in [TimeAggregate::Hourly, TimeAggregate::Yearly] {
        let cached = needs_refetch(state.zone_history("XX"), &features, aggregate);
        let decoded = needs_refetch(direct.as_deref(), &features, aggregate);
        assert_eq!(cached, decoded);
    }
});
