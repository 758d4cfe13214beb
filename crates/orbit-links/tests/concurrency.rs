//! Concurrent access to protocol instances from many schedulers.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use orbit_links::{Constellation, IslLink, Link, LinkProtocol, Node, ProtocolConfig, Vector};

fn ring(count: usize, radius: f64) -> Constellation {
    let mut mesh = Constellation::new(ProtocolConfig::default().with_max_distance(4.0 * radius));
    for i in 0..count {
        let angle = i as f64 * std::f64::consts::TAU / count as f64;
        mesh.add_satellite(
            format!("sat-{i}"),
            Vector::new(radius * angle.cos(), radius * angle.sin(), 0.0),
        );
    }
    mesh.link_within_range(f64::INFINITY).unwrap();
    mesh
}

#[test]
fn neighbours_recomputing_together_finish() {
    let mesh = ring(16, 100.0);

    thread::scope(|scope| {
        for satellite in mesh.satellites() {
            scope.spawn(move || {
                for step in 0..50 {
                    let p = satellite.position();
                    satellite.set_position(Vector::new(p.x, p.y, step as f64));
                    let tree = satellite.protocol().update_links().unwrap();
                    assert_eq!(tree.len(), 15);
                }
            });
        }
    });

    for satellite in mesh.satellites() {
        assert_eq!(satellite.protocol().recompute_count(), 50);
    }
}

#[test]
fn add_link_is_never_lost_under_contention() {
    let mesh = ring(4, 10.0);
    let sats: Vec<_> = mesh.satellites().cloned().collect();
    let base = sats[0].protocol().links().len();

    thread::scope(|scope| {
        for writer in 0..4 {
            let (a, b) = (&sats[0], &sats[1 + writer % 3]);
            scope.spawn(move || {
                for _ in 0..100 {
                    let link = IslLink::new(a, b).unwrap();
                    assert!(a.protocol().add_link(link));
                }
            });
        }
        scope.spawn(|| {
            for step in 0..100 {
                sats[0].set_position(Vector::new(10.0, 0.0, step as f64 * 0.01));
                sats[0].protocol().update_links().unwrap();
                let _ = sats[0].protocol().established();
                let _ = sats[0].protocol().links();
            }
        });
    });

    assert_eq!(sats[0].protocol().links().len(), base + 400);
}

#[test]
fn connect_and_disconnect_from_many_threads_balance_out() {
    let mesh = ring(3, 10.0);
    let sats: Vec<_> = mesh.satellites().cloned().collect();
    let protocol = sats[0].protocol();
    let before = protocol.update_links().unwrap().len();
    let forced: Arc<dyn Link> = IslLink::new(&sats[1], &sats[2]).unwrap();

    thread::scope(|scope| {
        for _ in 0..8 {
            let forced = forced.clone();
            scope.spawn(move || {
                for _ in 0..200 {
                    assert!(protocol.connect_link(forced.clone()));
                    assert!(protocol.disconnect_link(&forced));
                }
            });
        }
    });

    assert_eq!(protocol.established().len(), before);
}

#[test]
fn waiter_observes_recomputation() {
    let mesh = ring(5, 10.0);
    let satellite = mesh.satellites().next().unwrap().clone();

    let waiter = {
        let satellite = satellite.clone();
        thread::spawn(move || satellite.protocol().ready().wait_timeout(Duration::from_secs(5)))
    };

    thread::sleep(Duration::from_millis(20));
    assert_eq!(satellite.protocol().update_links().unwrap().len(), 4);

    assert!(waiter.join().unwrap());
    assert_eq!(satellite.protocol().ready().generation(), 1);
}
