//! End-to-end engine scenarios driven by [`ReplaySource`].

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::time::Duration;

use biologist_core::config::EngineConfig;
use biologist_core::{Biologist, EngineError, QueryError, Registry, ReplaySource, WorkerExit};
use biologist_types::{ChangeKind, Coordinate, CycleInfo, Generation, Status};

fn cells(points: &[(i64, i64)]) -> Vec<Coordinate> {
    points.iter().copied().map(Coordinate::from).collect()
}

fn vertical() -> Vec<Coordinate> {
    cells(&[(1, 0), (1, 1), (1, 2)])
}

fn horizontal() -> Vec<Coordinate> {
    cells(&[(0, 1), (1, 1), (2, 1)])
}

async fn run(seed: Vec<Coordinate>, rest: Vec<Vec<Coordinate>>) -> Biologist {
    let generations = (1_u64..).zip(rest).map(|(n, living)| Generation::new(n, living));
    let engine = Biologist::initialize(
        Generation::seed(seed),
        Box::new(ReplaySource::new(generations.collect::<Vec<_>>())),
        &EngineConfig::default(),
    )
    .await
    .unwrap();
    engine.start().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), engine.finished())
        .await
        .unwrap();
    engine
}

#[tokio::test]
async fn blinker_on_three_by_three() {
    let engine = run(
        vertical(),
        vec![horizontal(), vertical(), horizontal(), vertical()],
    )
    .await;

    assert_eq!(engine.exit(), Some(WorkerExit::Settled(Status::Stable)));
    assert_eq!(engine.analysis_count().await.unwrap(), 2);
    assert_eq!(engine.cycle(), CycleInfo::between(0, 2));

    let fifth = engine.analysis(5).await.unwrap();
    let first = engine.analysis(1).await.unwrap();
    assert_eq!(fifth.living, first.living);
    assert_eq!(fifth.status, Status::Stable);
    assert_eq!(first.status, Status::Active);

    let fourth = engine.analysis(4).await.unwrap();
    assert_eq!(fourth.living, vertical());
    assert_eq!(fourth.status, Status::Stable);
}

#[tokio::test]
async fn single_cell_dies() {
    let engine = run(cells(&[(1, 1)]), vec![Vec::new(), Vec::new()]).await;

    assert_eq!(engine.exit(), Some(WorkerExit::Settled(Status::Dead)));
    assert_eq!(engine.analysis_count().await.unwrap(), 2);

    let dead = engine.analysis(1).await.unwrap();
    assert_eq!(dead.status, Status::Dead);
    assert!(dead.living.is_empty());
    assert_eq!(dead.changes.len(), 1);
    assert_eq!(dead.changes[0].kind, ChangeKind::Died);

    assert!(matches!(
        engine.analysis(2).await,
        Err(QueryError::NotAvailable { generation: 2, analyzed: 2 })
    ));
}

#[tokio::test]
async fn transient_then_cycle() {
    let a = cells(&[(0, 0)]);
    let b = cells(&[(4, 4)]);
    let c = cells(&[(1, 0), (1, 1)]);
    let d = cells(&[(1, 0), (1, 2)]);
    let engine = run(a, vec![b, c.clone(), d.clone(), c.clone()]).await;

    assert_eq!(engine.cycle(), CycleInfo::between(2, 4));
    assert_eq!(engine.analysis_count().await.unwrap(), 4);

    for n in 4..20_i64 {
        let expected = if n % 2 == 0 { &c } else { &d };
        let analysis = engine.analysis(n).await.unwrap();
        assert_eq!(&analysis.living, expected, "generation {n}");
        assert_eq!(analysis.status, Status::Stable);
    }
    assert_eq!(engine.analysis(3).await.unwrap().status, Status::Active);
}

#[tokio::test]
async fn still_board_is_stable_forever() {
    let engine = Biologist::initialize(
        Generation::seed(cells(&[(3, 3)])),
        Box::new(ReplaySource::new([
            Generation::new(1, cells(&[(3, 3)])),
        ])),
        &EngineConfig::default(),
    )
    .await
    .unwrap();
    engine.start().await.unwrap();
    engine.finished().await;

    assert_eq!(engine.exit(), Some(WorkerExit::Settled(Status::Stable)));
    assert_eq!(engine.cycle(), CycleInfo::between(0, 1));
    assert_eq!(engine.analysis(9).await.unwrap().status, Status::Stable);
}

#[tokio::test]
async fn sequence_gap_fails_the_worker() {
    let engine = Biologist::initialize(
        Generation::seed(vertical()),
        Box::new(ReplaySource::new([
            Generation::new(1, horizontal()),
            Generation::new(3, vertical()),
        ])),
        &EngineConfig::default(),
    )
    .await
    .unwrap();
    engine.start().await.unwrap();
    engine.finished().await;

    assert_eq!(
        engine.exit(),
        Some(WorkerExit::Failed(EngineError::SequenceGap {
            expected: 2,
            received: 3
        }))
    );
    assert_eq!(engine.analysis_count().await.unwrap(), 2);
    assert!(engine.cycle().is_none());
}

#[tokio::test]
async fn query_zero_lists_every_seed_cell_as_born() {
    let seed = cells(&[(0, 0), (2, 0), (1, 1)]);
    let engine = Biologist::initialize(
        Generation::seed(seed.clone()),
        Box::new(ReplaySource::default()),
        &EngineConfig::default(),
    )
    .await
    .unwrap();

    let zero = engine.analysis(0).await.unwrap();
    assert_eq!(zero.status, Status::Active);
    assert_eq!(zero.living, seed);
    assert_eq!(zero.changes.len(), seed.len());
    assert!(zero.changes.iter().all(|change| change.kind == ChangeKind::Born));
}

#[tokio::test]
async fn stop_is_idempotent_and_freezes_the_store() {
    let generations = (1..=5_000_i64).map(|n| Generation::new(n.unsigned_abs(), cells(&[(n, n)])));
    let source = ReplaySource::new(generations).with_delay(Duration::from_millis(1));
    let engine = Biologist::initialize(
        Generation::seed(cells(&[(0, 0)])),
        Box::new(source),
        &EngineConfig::default(),
    )
    .await
    .unwrap();
    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(15)).await;

    engine.stop().await;
    let count = engine.analysis_count().await.unwrap();
    engine.stop().await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(engine.analysis_count().await.unwrap(), count);
    assert_eq!(engine.exit(), Some(WorkerExit::Stopped));
    assert_eq!(engine.start().await.unwrap_err(), EngineError::Stopped);
}

#[tokio::test]
async fn range_poll_stops_at_the_first_gap() {
    let engine = run(cells(&[(1, 1)]), vec![Vec::new()]).await;

    let all = engine.analyses(0, 10).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].status, Status::Dead);

    assert!(engine.analyses(2, 10).await.unwrap().is_empty());
    assert_eq!(engine.analyses(0, 1).await.unwrap().len(), 1);
    assert_eq!(
        engine.analyses(-3, 2).await.unwrap_err(),
        QueryError::Negative { generation: -3 }
    );
}

#[tokio::test]
async fn range_poll_extends_through_the_cycle() {
    let engine = run(vertical(), vec![horizontal(), vertical()]).await;
    let window = engine.analyses(1, 6).await.unwrap();
    assert_eq!(window.len(), 6);
    for (offset, analysis) in window.iter().enumerate() {
        let expected = if offset % 2 == 0 { horizontal() } else { vertical() };
        assert_eq!(analysis.living, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queries_run_alongside_the_worker() {
    let generations = (1..=300_i64).map(|n| Generation::new(n.unsigned_abs(), cells(&[(n, 0)])));
    let engine = std::sync::Arc::new(
        Biologist::initialize(
            Generation::seed(cells(&[(0, 0)])),
            Box::new(ReplaySource::new(generations.collect::<Vec<_>>())),
            &EngineConfig::default(),
        )
        .await
        .unwrap(),
    );
    engine.start().await.unwrap();

    let reader = {
        let engine = std::sync::Arc::clone(&engine);
        tokio::spawn(async move {
            while !engine.is_finished() {
                let count = engine.analysis_count().await.unwrap();
                let last = i64::try_from(count).unwrap() - 1;
                let analysis = engine.analysis(last).await.unwrap();
                assert_eq!(analysis.living, cells(&[(last, 0)]));
                tokio::task::yield_now().await;
            }
        })
    };

    engine.finished().await;
    reader.await.unwrap();
    assert_eq!(engine.exit(), Some(WorkerExit::SourceClosed));
    assert_eq!(engine.analysis_count().await.unwrap(), 301);
}

#[tokio::test]
async fn registry_serves_engines_by_id() {
    let registry = Registry::new();
    let engine = registry
        .add(
            Biologist::initialize(
                Generation::seed(vertical()),
                Box::new(ReplaySource::new([
                    Generation::new(1, horizontal()),
                    Generation::new(2, vertical()),
                ])),
                &EngineConfig::default(),
            )
            .await
            .unwrap(),
        )
        .await;

    let id = engine.id();
    registry.get(id).await.unwrap().start().await.unwrap();
    engine.finished().await;

    let served = registry.get(id).await.unwrap();
    assert_eq!(served.analysis(7).await.unwrap().living, horizontal());
    assert_eq!(registry.ids().await, vec![id]);

    registry.stop_all().await;
    assert_eq!(served.exit(), Some(WorkerExit::Settled(Status::Stable)));
}
