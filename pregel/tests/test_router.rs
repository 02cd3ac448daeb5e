/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

mod common;

use pregel::halt::HaltController;
use pregel::router::MessageRouter;

#[test]
fn test_messages_visible_after_swap() {
    let mut router = MessageRouter::new(3);
    router.send(1, "a");
    router.send(1, "b");
    router.send(2, "c");
    assert_eq!(router.pending(), 3);
    assert_eq!(router.in_flight(), 0);
    // Nothing is readable before the barrier.
    assert!(!router.has_messages(1));
    assert!(router.messages_for(1).is_empty());

    assert_eq!(router.barrier_swap(), 3);
    assert_eq!(router.in_flight(), 3);
    assert_eq!(router.pending(), 0);
    assert_eq!(router.messages_for(1), &["a", "b"]);
    assert_eq!(router.messages_for(2), &["c"]);
    assert!(!router.has_messages(0));

    // Messages are consumed at the next barrier.
    router.send(0, "d");
    assert_eq!(router.barrier_swap(), 1);
    assert!(router.messages_for(1).is_empty());
    assert_eq!(router.messages_for(0), &["d"]);

    assert_eq!(router.barrier_swap(), 0);
    assert!(!router.has_messages(0));
}

#[test]
fn test_send_to_unknown_vertex() {
    common::init_logger();
    let graph = common::test_graph(|_| ());
    let mut router = MessageRouter::new(graph.num_vertices());
    assert!(router.send_to(&graph, &3, 1.0));
    assert!(!router.send_to(&graph, &42, 1.0));
    assert_eq!(router.dropped(), 1);
    assert_eq!(router.pending(), 1);
    router.barrier_swap();
    let index = graph.index_of(&3).unwrap();
    assert_eq!(router.messages_for(index), &[1.0]);
    assert_eq!(router.messages_to(&graph, &3).unwrap(), &[1.0]);
    assert!(router.messages_to(&graph, &4).unwrap().is_empty());
    assert!(matches!(
        router.messages_to(&graph, &42),
        Err(pregel::Error::UnknownVertex(_))
    ));
}

#[test]
fn test_halt_controller() -> anyhow::Result<()> {
    let mut graph = common::test_graph(|_| ());
    let mut router = MessageRouter::<()>::new(graph.num_vertices());
    let mut halt = HaltController::new();
    halt.observe(&graph, &router);
    assert_eq!(halt.active(), 8);
    assert!(!halt.is_terminated());

    for id in 0..8 {
        graph.set_halted(&id, true)?;
    }
    router.send(0, ());
    router.barrier_swap();
    halt.observe(&graph, &router);
    assert_eq!(halt.active(), 0);
    assert_eq!(halt.in_flight(), 1);
    assert!(!halt.is_terminated());

    router.barrier_swap();
    halt.observe(&graph, &router);
    assert!(halt.is_terminated());
    Ok(())
}
