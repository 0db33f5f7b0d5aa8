use chrono::{TimeZone, Utc};
use gridfeed::actions::{self, Action};
use gridfeed::context::{Capabilities, FetchContext};
use gridfeed::orchestrator::GridDataPoller;
use gridfeed::types::{FeedKind, TimeAggregate};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

const INTERVAL: Duration = Duration::from_secs(300);

fn drain(rx: &mut UnboundedReceiver<Action>) -> Vec<Action> {
    let mut out = Vec::new();
    while let Ok(action) = rx.try_recv() {
        out.push(action);
    }
    out
}

fn grid_requests(actions: &[Action]) -> usize {
    actions
        .iter()
        .filter(|a| a.is_fetch_request_for(FeedKind::GridData))
        .count()
}

fn live_ctx() -> FetchContext {
    FetchContext {
        capabilities: Capabilities {
            features: ["history"].into_iter().collect(),
            ..Default::default()
        },
        selected_time_aggregate: TimeAggregate::Daily,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn one_interval_yields_initial_plus_one_tick() {
    let (dispatcher, mut rx) = actions::channel();
    let mut poller = GridDataPoller::new(INTERVAL);

    assert!(poller.evaluate(&live_ctx(), &dispatcher));
    assert!(poller.is_polling());

    tokio::time::sleep(INTERVAL + Duration::from_millis(10)).await;
    let actions = drain(&mut rx);
    assert_eq!(grid_requests(&actions), 2);

    // Tick repeats the initial request verbatim
    assert_eq!(actions[0], actions[1]);
    let request = actions[0].request().unwrap();
    assert_eq!(request.datetime, None);
    assert_eq!(request.selected_time_aggregate, Some(TimeAggregate::Daily));
    assert!(request.features.as_ref().unwrap().contains("history"));
}

#[tokio::test(start_paused = true)]
async fn pinned_datetime_fetches_once_without_timer() {
    let (dispatcher, mut rx) = actions::channel();
    let mut poller = GridDataPoller::new(INTERVAL);
    let pinned = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
    let ctx = FetchContext {
        custom_datetime: Some(pinned),
        ..live_ctx()
    };

    poller.evaluate(&ctx, &dispatcher);
    assert!(!poller.is_polling());

    tokio::time::sleep(INTERVAL * 3).await;
    let actions = drain(&mut rx);
    assert_eq!(grid_requests(&actions), 1);
    assert_eq!(actions[0].request().unwrap().datetime, Some(pinned));
}

#[tokio::test(start_paused = true)]
async fn dependency_change_restarts_timer() {
    let (dispatcher, mut rx) = actions::channel();
    let mut poller = GridDataPoller::new(INTERVAL);
    poller.evaluate(&live_ctx(), &dispatcher);

    tokio::time::sleep(INTERVAL / 2).await;
    let ctx = FetchContext {
        selected_time_aggregate: TimeAggregate::Monthly,
        ..live_ctx()
    };
    poller.evaluate(&ctx, &dispatcher);
    assert_eq!(grid_requests(&drain(&mut rx)), 2);

    // The first timer would have fired here; it was replaced
    tokio::time::sleep(INTERVAL / 2 + Duration::from_millis(10)).await;
    assert_eq!(grid_requests(&drain(&mut rx)), 0);

    tokio::time::sleep(INTERVAL / 2).await;
    let ticks = drain(&mut rx);
    assert_eq!(grid_requests(&ticks), 1);
    assert_eq!(
        ticks[0].request().unwrap().selected_time_aggregate,
        Some(TimeAggregate::Monthly)
    );
    assert_eq!(poller.session().started_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn unchanged_inputs_do_not_redispatch() {
    let (dispatcher, mut rx) = actions::channel();
    let mut poller = GridDataPoller::new(INTERVAL);
    assert!(poller.evaluate(&live_ctx(), &dispatcher));
    assert!(!poller.evaluate(&live_ctx(), &dispatcher));

    // Zone changes are not a grid dependency
    let ctx = FetchContext {
        zone_id: Some("FR".to_string()),
        ..live_ctx()
    };
    assert!(!poller.evaluate(&ctx, &dispatcher));
    assert_eq!(grid_requests(&drain(&mut rx)), 1);
    assert_eq!(poller.session().started_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn override_while_live_stops_polling() {
    let (dispatcher, mut rx) = actions::channel();
    let mut poller = GridDataPoller::new(INTERVAL);
    poller.evaluate(&live_ctx(), &dispatcher);
    drain(&mut rx);

    let ctx = FetchContext {
        custom_datetime: Some(Utc::now()),
        ..live_ctx()
    };
    poller.evaluate(&ctx, &dispatcher);
    assert!(!poller.is_polling());

    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(grid_requests(&drain(&mut rx)), 1);
}

#[tokio::test(start_paused = true)]
async fn teardown_is_silent() {
    let (dispatcher, mut rx) = actions::channel();
    let mut poller = GridDataPoller::new(INTERVAL);
    poller.evaluate(&live_ctx(), &dispatcher);
    drain(&mut rx);

    poller.teardown();
    assert!(!poller.is_polling());
    tokio::time::sleep(INTERVAL * 2).await;
    assert!(drain(&mut rx).is_empty());
}
