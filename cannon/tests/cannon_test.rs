use std::net::SocketAddr;

use cannon::{
    Coordinator, Error, Grid, Matrix, MatrixSource, NeighborSet, Outcome, Position, ProcessorGrid,
    RandomOperands, RunConfig, Worker, demo_operands, naive_multiply, run_participant, simulate,
};
use tokio::net::TcpListener;
use torus_comm::torus::{Body, InitialElements, PartialResult, ShiftElements, Tag};
use torus_comm::{LocalTransport, TcpTransport, Transport};

fn matrix(rows: Vec<Vec<i64>>) -> Matrix {
    Grid::from_rows(rows).unwrap()
}

#[tokio::test]
async fn test_demo_product() {
    let (a, b) = demo_operands().operands(3).unwrap();

    let product = simulate(&RunConfig::new(3), &a, &b).await.unwrap();

    assert_eq!(
        product,
        matrix(vec![vec![40, 60, 44], vec![68, 66, 82], vec![53, 54, 39]])
    );
}

#[tokio::test]
async fn test_single_worker() {
    let a = matrix(vec![vec![-6]]);
    let b = matrix(vec![vec![7]]);

    let product = simulate(&RunConfig::new(1), &a, &b).await.unwrap();

    assert_eq!(product, matrix(vec![vec![-42]]));
}

#[tokio::test]
async fn test_random_products_match_naive() {
    for n in 1..=5 {
        for seed in 0..3 {
            let (a, b) = RandomOperands::new(seed * 31 + n as u64)
                .with_range(-50..=50)
                .operands(n)
                .unwrap();

            let product = simulate(&RunConfig::new(n), &a, &b).await.unwrap();

            assert_eq!(product, naive_multiply(&a, &b), "n = {n}, seed = {seed}");
        }
    }
}

#[tokio::test]
async fn test_identity_is_neutral() {
    let n = 4;
    let identity: Matrix = Grid::from_fn(n, |p| i64::from(p.x == p.y));
    let (a, _) = RandomOperands::new(9).operands(n).unwrap();

    assert_eq!(simulate(&RunConfig::new(n), &a, &identity).await.unwrap(), a);
    assert_eq!(simulate(&RunConfig::new(n), &identity, &a).await.unwrap(), a);
}

#[tokio::test]
async fn test_wrong_participant_count_sends_nothing() {
    let config = RunConfig::new(3);
    let mut group = LocalTransport::group(5);

    let err = run_participant(&config, &mut group[0], &demo_operands())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    let err = run_participant(&config, &mut group[2], &demo_operands())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    for endpoint in group.iter_mut() {
        assert_eq!(endpoint.pending(), 0);
    }
}

#[tokio::test]
async fn test_operands_of_wrong_size_are_rejected() {
    let a = matrix(vec![vec![1, 2], vec![3, 4]]);
    let b = matrix(vec![vec![1]]);

    let err = simulate(&RunConfig::new(2), &a, &b).await.unwrap_err();

    assert!(matches!(err, Error::DimensionMismatch { expected: 2, .. }));
}

#[tokio::test]
async fn test_gather_accepts_any_arrival_order() {
    let config = RunConfig::new(2);
    let coordinator = Coordinator::new(&config).unwrap();
    let mut group = LocalTransport::group(config.participants().unwrap());

    for rank in [3u32, 1, 4, 2] {
        let body = Body::PartialResult(PartialResult {
            total: rank as i64 * 100,
            origin_id: rank,
        });
        group[rank as usize].send(0, Tag::Result, body).await.unwrap();
    }

    let product = coordinator.gather(&mut group[0]).await.unwrap();

    assert_eq!(product, matrix(vec![vec![100, 200], vec![300, 400]]));
    assert_eq!(group[0].pending(), 0);
}

#[tokio::test]
async fn test_gather_rejects_duplicate_cells() {
    let config = RunConfig::new(1);
    let coordinator = Coordinator::new(&config).unwrap();
    let mut group = LocalTransport::group(config.participants().unwrap());

    for _ in 0..2 {
        let body = Body::PartialResult(PartialResult {
            total: 1,
            origin_id: 1,
        });
        group[1].send(0, Tag::Result, body).await.unwrap();
    }

    // one cell, one receive: the duplicate stays queued
    assert!(coordinator.gather(&mut group[0]).await.is_ok());

    let config = RunConfig::new(2);
    let coordinator = Coordinator::new(&config).unwrap();
    let mut group = LocalTransport::group(config.participants().unwrap());
    for _ in 0..2 {
        let body = Body::PartialResult(PartialResult {
            total: 1,
            origin_id: 1,
        });
        group[1].send(0, Tag::Result, body).await.unwrap();
    }

    let err = coordinator.gather(&mut group[0]).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateResult(1)));
}

#[tokio::test]
async fn test_gather_rejects_forged_origin() {
    let config = RunConfig::new(2);
    let coordinator = Coordinator::new(&config).unwrap();
    let mut group = LocalTransport::group(config.participants().unwrap());

    let body = Body::PartialResult(PartialResult {
        total: 1,
        origin_id: 4,
    });
    group[2].send(0, Tag::Result, body).await.unwrap();

    let err = coordinator.gather(&mut group[0]).await.unwrap_err();
    assert!(matches!(
        err,
        Error::OriginMismatch {
            claimed: 4,
            sender: 2
        }
    ));
}

#[tokio::test]
async fn test_worker_rejects_wrong_message_shape() {
    let grid = ProcessorGrid::build(2).unwrap();
    let worker = Worker::new(&grid, 1).unwrap();
    let mut group = LocalTransport::group(5);

    let body = Body::ShiftElements(ShiftElements {
        element_a: 1,
        element_b: 2,
    });
    let coordinator = &mut group[0];
    coordinator.send(1, Tag::InitialElements, body).await.unwrap();

    let err = worker.run(&mut group[1]).await.unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedMessage {
            origin: 0,
            expected: "InitialElements",
            ..
        }
    ));
}

#[tokio::test]
async fn test_coordinator_is_not_a_worker() {
    let grid = ProcessorGrid::build(3).unwrap();
    assert!(matches!(Worker::new(&grid, 0), Err(Error::Topology(0))));
    assert!(matches!(Worker::new(&grid, 10), Err(Error::Topology(10))));

    let centre = Worker::new(&grid, 5).unwrap();
    assert_eq!(centre.position(), Position { x: 1, y: 1 });
    assert_eq!(
        centre.neighbors(),
        NeighborSet {
            left: 4,
            right: 6,
            above: 2,
            below: 8,
        }
    );

    let corner = Worker::new(&grid, 1).unwrap();
    assert_eq!(
        corner.neighbors(),
        NeighborSet {
            left: 3,
            right: 2,
            above: 7,
            below: 4,
        }
    );
}

#[tokio::test]
async fn test_unreachable_coordinator_is_a_communication_error() {
    // nothing listens on the address the worker reports to
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);

    let coordinator_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let worker_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let peers = vec![closed_addr, worker_listener.local_addr().unwrap()];

    let mut coordinator =
        TcpTransport::with_listener(0, peers.clone(), coordinator_listener).unwrap();
    let mut endpoint = TcpTransport::with_listener(1, peers, worker_listener)
        .unwrap()
        .with_connect_attempts(1);

    let body = Body::InitialElements(InitialElements {
        element_a: 3,
        element_b: 4,
    });
    coordinator
        .send(1, Tag::InitialElements, body)
        .await
        .unwrap();

    let worker = Worker::new(&ProcessorGrid::build(1).unwrap(), 1).unwrap();
    let err = worker.run(&mut endpoint).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Communication(torus_comm::Error::ConnectFailed { rank: 0, .. })
    ));
}

#[tokio::test]
async fn test_cluster_over_tcp() {
    let n = 2;
    let config = RunConfig::new(n);

    let mut listeners = Vec::new();
    for _ in 0..config.participants().unwrap() {
        listeners.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
    }
    let peers: Vec<SocketAddr> = listeners
        .iter()
        .map(|l| l.local_addr().unwrap())
        .collect();

    let source = RandomOperands::new(11);
    let (a, b) = source.operands(n).unwrap();

    let mut handles = Vec::new();
    for (rank, listener) in listeners.into_iter().enumerate() {
        let mut transport =
            TcpTransport::with_listener(rank as u32, peers.clone(), listener).unwrap();
        let config = config.clone();
        let source = source.clone();
        handles.push(tokio::spawn(async move {
            run_participant(&config, &mut transport, &source).await
        }));
    }

    let mut product = None;
    let mut partials = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            Outcome::Product(m) => product = Some(m),
            Outcome::Partial(_) => partials += 1,
        }
    }

    assert_eq!(partials, n * n);
    assert_eq!(product.unwrap(), naive_multiply(&a, &b));
}
