mod common;

use std::time::Duration;

use common::{FakeFetcher, Op, Recorder, RecordingStage, drain};
use photo_carousel::carousel::engine::EngineHandle;
use photo_carousel::config::CarouselOptions;
use photo_carousel::events::CarouselCommand;
use photo_carousel::photos::Variant;
use photo_carousel::preload::Preloader;
use photo_carousel::stage::{LoadingHint, Motion, Offset};
use tokio_util::sync::CancellationToken;

async fn mount(variant: Variant, photos: usize) -> (EngineHandle, Recorder, FakeFetcher) {
    mount_with(variant, photos, FakeFetcher::default()).await
}

async fn mount_with(
    variant: Variant,
    photos: usize,
    fetcher: FakeFetcher,
) -> (EngineHandle, Recorder, FakeFetcher) {
    let (stage, recorder) = RecordingStage::new(variant, 300.0);
    let handle = EngineHandle::spawn(
        variant,
        &common::photos(photos),
        stage,
        Preloader::new(fetcher.clone()),
        CarouselOptions::default(),
        CancellationToken::new(),
    )
    .expect("engine should mount");
    drain().await;
    (handle, recorder, fetcher)
}

async fn step(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    drain().await;
}

async fn send(handle: &EngineHandle, command: CarouselCommand) {
    assert!(handle.send(command), "engine rejected {command:?}");
    drain().await;
}

fn animated(recorder: &Recorder) -> Vec<Offset> {
    recorder
        .offsets()
        .into_iter()
        .filter(|(_, m)| *m == Motion::Animated)
        .map(|(o, _)| o)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn mount_builds_strip_and_positions_without_animation() {
    let (_handle, recorder, _) = mount(Variant::Desktop, 7).await;
    let ops = recorder.ops();
    assert_eq!(ops[0], Op::Clear);

    let appended = recorder.appended();
    assert_eq!(appended.len(), 5);
    let clones: Vec<Option<usize>> = appended.iter().map(|a| a.1).collect();
    assert_eq!(clones, vec![Some(2), None, None, None, Some(0)]);
    let hints: Vec<LoadingHint> = appended.iter().map(|a| a.2).collect();
    assert_eq!(
        hints,
        vec![
            LoadingHint::Lazy,
            LoadingHint::Eager,
            LoadingHint::Lazy,
            LoadingHint::Lazy,
            LoadingHint::Lazy
        ]
    );

    assert_eq!(
        recorder.offsets(),
        vec![(Offset::Percent(-100.0), Motion::Instant)]
    );
    for position in 0..=2 {
        assert!(ops.contains(&Op::Loading(position, LoadingHint::Eager)));
    }
    assert!(!ops.contains(&Op::Loading(3, LoadingHint::Eager)));
}

#[tokio::test(start_paused = true)]
async fn next_onto_trailing_clone_snaps_after_one_transition() {
    let (handle, recorder, _) = mount(Variant::Desktop, 6).await;
    recorder.take();

    send(&handle, CarouselCommand::Next).await;
    send(&handle, CarouselCommand::Next).await;
    assert_eq!(
        recorder.offsets(),
        vec![
            (Offset::Percent(-200.0), Motion::Animated),
            (Offset::Percent(-300.0), Motion::Animated),
        ]
    );

    recorder.take();
    step(499).await;
    assert!(recorder.offsets().is_empty(), "snap fired early");
    step(1).await;
    assert_eq!(
        recorder.offsets(),
        vec![(Offset::Percent(-100.0), Motion::Instant)]
    );
}

#[tokio::test(start_paused = true)]
async fn prev_from_first_snaps_to_last_real_group() {
    let (handle, recorder, _) = mount(Variant::Desktop, 9).await;
    recorder.take();

    send(&handle, CarouselCommand::Prev).await;
    assert_eq!(animated(&recorder), vec![Offset::Percent(0.0)]);
    step(500).await;
    assert_eq!(
        recorder.offsets().last(),
        Some(&(Offset::Percent(-300.0), Motion::Instant))
    );
}

#[tokio::test(start_paused = true)]
async fn rapid_next_on_clone_jumps_instead_of_overshooting() {
    let (handle, recorder, _) = mount(Variant::Desktop, 3).await;
    recorder.take();

    // One real group: 1 -> 2 (clone), then again before the snap.
    send(&handle, CarouselCommand::Next).await;
    step(200).await;
    send(&handle, CarouselCommand::Next).await;
    assert_eq!(
        recorder.offsets(),
        vec![
            (Offset::Percent(-200.0), Motion::Animated),
            (Offset::Percent(-100.0), Motion::Instant),
            (Offset::Percent(-200.0), Motion::Animated),
        ]
    );

    // Only the latest move's snap fires, one transition after it.
    recorder.take();
    step(400).await;
    assert!(recorder.offsets().is_empty());
    step(100).await;
    assert_eq!(
        recorder.offsets(),
        vec![(Offset::Percent(-100.0), Motion::Instant)]
    );
}

#[tokio::test(start_paused = true)]
async fn auto_scroll_advances_every_interval() {
    let (_handle, recorder, _) = mount(Variant::Desktop, 9).await;
    recorder.take();

    step(4_999).await;
    assert!(animated(&recorder).is_empty());
    step(1).await;
    assert_eq!(animated(&recorder), vec![Offset::Percent(-200.0)]);
    step(5_000).await;
    assert_eq!(
        animated(&recorder),
        vec![Offset::Percent(-200.0), Offset::Percent(-300.0)]
    );
}

#[tokio::test(start_paused = true)]
async fn manual_navigation_pauses_auto_scroll_until_resume_delay() {
    let (handle, recorder, _) = mount(Variant::Desktop, 9).await;
    send(&handle, CarouselCommand::Next).await;
    recorder.take();

    // Resume after 10s, first tick one interval later.
    step(10_000).await;
    step(4_999).await;
    assert!(animated(&recorder).is_empty());
    step(1).await;
    assert_eq!(animated(&recorder), vec![Offset::Percent(-300.0)]);
}

#[tokio::test(start_paused = true)]
async fn repeated_interaction_restarts_the_resume_delay() {
    let (handle, recorder, _) = mount(Variant::Desktop, 9).await;
    send(&handle, CarouselCommand::Next).await;
    step(3_000).await;
    send(&handle, CarouselCommand::Prev).await;
    recorder.take();

    step(10_000).await;
    step(4_999).await;
    assert!(
        animated(&recorder).is_empty(),
        "an earlier resume must not survive a later interaction"
    );
    step(1).await;
    assert_eq!(animated(&recorder).len(), 1);
    step(4_999).await;
    assert_eq!(animated(&recorder).len(), 1, "only one interval may run");
}

#[tokio::test(start_paused = true)]
async fn swipe_needs_threshold_and_ignores_links() {
    let (handle, recorder, _) = mount(Variant::Desktop, 9).await;
    recorder.take();

    send(&handle, CarouselCommand::TouchStart { x: 200.0, y: 0.0 }).await;
    send(
        &handle,
        CarouselCommand::TouchEnd {
            x: 170.0,
            y: 0.0,
            on_link: false,
        },
    )
    .await;
    assert!(animated(&recorder).is_empty());

    send(&handle, CarouselCommand::TouchStart { x: 200.0, y: 0.0 }).await;
    send(
        &handle,
        CarouselCommand::TouchEnd {
            x: 20.0,
            y: 0.0,
            on_link: true,
        },
    )
    .await;
    assert!(animated(&recorder).is_empty());

    send(&handle, CarouselCommand::TouchStart { x: 200.0, y: 0.0 }).await;
    send(
        &handle,
        CarouselCommand::TouchEnd {
            x: 150.0,
            y: 0.0,
            on_link: false,
        },
    )
    .await;
    assert_eq!(animated(&recorder), vec![Offset::Percent(-200.0)]);
}

#[tokio::test(start_paused = true)]
async fn mobile_uses_pixels_indicators_and_wraps() {
    let (handle, recorder, _) = mount(Variant::Mobile, 5).await;
    let ops = recorder.ops();
    assert_eq!(recorder.appended().len(), 5);
    assert!(recorder.appended().iter().all(|a| a.1.is_none()));
    assert!(ops.contains(&Op::Indicators(5)));
    assert!(ops.contains(&Op::ActiveIndicator(0)));
    assert_eq!(
        recorder.offsets(),
        vec![(Offset::Pixels(0.0), Motion::Instant)]
    );
    recorder.take();

    send(&handle, CarouselCommand::GoTo(3)).await;
    send(&handle, CarouselCommand::Next).await;
    send(&handle, CarouselCommand::Next).await;
    assert_eq!(
        animated(&recorder),
        vec![
            Offset::Pixels(-960.0),
            Offset::Pixels(-1280.0),
            Offset::Pixels(0.0)
        ]
    );
    let active: Vec<usize> = recorder
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            Op::ActiveIndicator(i) => Some(i),
            _ => None,
        })
        .collect();
    assert_eq!(active, vec![3, 4, 0]);

    // No clone snap on mobile.
    recorder.take();
    step(1_000).await;
    assert!(recorder.offsets().is_empty());
}

#[tokio::test(start_paused = true)]
async fn mobile_drag_claims_scroll_then_swipes() {
    let (handle, recorder, _) = mount(Variant::Mobile, 5).await;
    recorder.take();

    send(&handle, CarouselCommand::TouchStart { x: 200.0, y: 100.0 }).await;
    send(&handle, CarouselCommand::TouchMove { x: 196.0, y: 100.0 }).await;
    assert!(!recorder.ops().contains(&Op::SuppressScroll));
    send(&handle, CarouselCommand::TouchMove { x: 180.0, y: 101.0 }).await;
    assert!(recorder.ops().contains(&Op::SuppressScroll));
    send(
        &handle,
        CarouselCommand::TouchEnd {
            x: 120.0,
            y: 101.0,
            on_link: false,
        },
    )
    .await;
    assert_eq!(animated(&recorder), vec![Offset::Pixels(-320.0)]);
}

#[tokio::test(start_paused = true)]
async fn relayout_repositions_without_animation() {
    let (handle, recorder, _) = mount(Variant::Mobile, 3).await;
    send(&handle, CarouselCommand::Next).await;
    recorder.take();
    send(&handle, CarouselCommand::Relayout).await;
    assert_eq!(
        recorder.offsets(),
        vec![(Offset::Pixels(-320.0), Motion::Instant)]
    );
}

#[tokio::test(start_paused = true)]
async fn preloads_neighbours_then_the_rest_once() {
    let (handle, _recorder, fetcher) = mount(Variant::Desktop, 9).await;
    // Slides 0..=2: clone of group 3, group 1, group 2.
    assert_eq!(fetcher.fetched().len(), 9);

    step(1_000).await;
    assert_eq!(fetcher.fetched().len(), 15, "lazy pass covers the remaining slides");

    send(&handle, CarouselCommand::Next).await;
    step(2_000).await;
    assert_eq!(fetcher.fetched().len(), 15, "preloaded slots are never fetched twice");
}

#[tokio::test(start_paused = true)]
async fn failed_preload_is_retried_by_the_lazy_pass() {
    let fetcher = FakeFetcher::default();
    fetcher.fail("/static/photos/00.jpg");
    let (_handle, _recorder, fetcher) = mount_with(Variant::Desktop, 9, fetcher).await;
    let count = |f: &FakeFetcher| {
        f.fetched()
            .iter()
            .filter(|s| s.as_str() == "/static/photos/00.jpg")
            .count()
    };
    assert_eq!(count(&fetcher), 1);
    step(1_000).await;
    assert_eq!(count(&fetcher), 3);
}

#[tokio::test(start_paused = true)]
async fn shutdown_clears_stage_and_stops_timers() {
    let (handle, recorder, _) = mount(Variant::Desktop, 9).await;
    send(&handle, CarouselCommand::Next).await;
    handle.shutdown().await;
    assert_eq!(recorder.ops().last(), Some(&Op::Clear));

    recorder.take();
    step(60_000).await;
    assert!(recorder.ops().is_empty());
}
