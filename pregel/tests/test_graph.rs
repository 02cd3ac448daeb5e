/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

mod common;

use dsi_progress_logger::no_logging;
use pregel::Error;
use pregel::graph::{GraphBuilder, GraphStore};
use pregel::ingest::{ArcsFormat, load_graph, read_arcs};

#[test]
fn test_store_basics() -> anyhow::Result<()> {
    let graph = common::test_graph(|&id| id * 10);
    assert_eq!(graph.num_vertices(), 8);
    assert_eq!(graph.num_edges(), 11);
    assert_eq!(graph.num_halted(), 0);

    assert_eq!(graph.out_degree(&1)?, 3);
    assert_eq!(graph.out_degree(&7)?, 0);
    let targets = graph
        .edges_of(&1)?
        .iter()
        .map(|edge| *edge.target())
        .collect::<Vec<_>>();
    assert_eq!(targets, vec![3, 4, 5]);
    assert_eq!(*graph.value_of(&5)?, 50);

    // Index order is the order of first appearance.
    let ids = graph.all_vertices().copied().collect::<Vec<_>>();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    Ok(())
}

#[test]
fn test_unknown_vertex() {
    let mut graph = common::test_graph(|_| 0.0);
    assert!(!graph.contains(&8));
    assert!(matches!(graph.edges_of(&8), Err(Error::UnknownVertex(_))));
    assert!(matches!(graph.value_of(&8), Err(Error::UnknownVertex(_))));
    assert!(matches!(graph.set_value(&8, 1.0), Err(Error::UnknownVertex(_))));
    assert!(matches!(graph.is_halted(&8), Err(Error::UnknownVertex(_))));
    assert!(matches!(graph.set_halted(&8, true), Err(Error::UnknownVertex(_))));
    assert!(matches!(graph.out_degree(&8), Err(Error::UnknownVertex(_))));
}

#[test]
fn test_set_value_and_halted() -> anyhow::Result<()> {
    let mut graph = common::test_graph(|_| 0_u32);
    graph.set_value(&3, 7)?;
    assert_eq!(*graph.value_of(&3)?, 7);

    graph.set_halted(&3, true)?;
    graph.set_halted(&3, true)?;
    graph.set_halted(&4, true)?;
    assert_eq!(graph.num_halted(), 2);
    graph.set_halted(&3, false)?;
    assert_eq!(graph.num_halted(), 1);
    assert!(graph.is_halted(&4)?);
    assert!(!graph.is_halted(&3)?);
    Ok(())
}

#[test]
fn test_builder_multigraph() -> anyhow::Result<()> {
    let mut builder = GraphBuilder::new();
    builder.add_edge("a", "b", 1).add_edge("a", "b", 2);
    builder.add_vertex("isolated");
    assert_eq!(builder.num_vertices(), 3);
    assert_eq!(builder.num_edges(), 2);
    let graph = builder.build(|_| ());
    let values = graph
        .edges_of(&"a")?
        .iter()
        .map(|edge| *edge.value())
        .collect::<Vec<_>>();
    assert_eq!(values, vec![1, 2]);
    assert_eq!(graph.out_degree(&"isolated")?, 0);
    Ok(())
}

#[test]
fn test_parse_lines() {
    let format = ArcsFormat {
        comment: Some('#'),
        ..ArcsFormat::default()
    };
    assert!(format.parse_line(1, "").is_none());
    assert!(format.parse_line(1, "   ").is_none());
    assert!(format.parse_line(1, "# comment").is_none());
    assert_eq!(
        format.parse_line(1, "A\tB\textra").map(Result::ok),
        Some(Some(("A".to_string(), "B".to_string())))
    );
    assert_eq!(
        format.parse_line(1, "A\tB\r").map(Result::ok),
        Some(Some(("A".to_string(), "B".to_string())))
    );
    assert!(matches!(
        format.parse_line(4, "lonely"),
        Some(Err(Error::MalformedInput { line: 4, .. }))
    ));
    assert!(matches!(
        format.parse_line(5, "A\t"),
        Some(Err(Error::MalformedInput { line: 5, .. }))
    ));
}

#[test]
fn test_custom_format() {
    let format = ArcsFormat {
        separator: ',',
        comment: Some('%'),
        source_column: 1,
        target_column: 0,
    };
    let arcs = read_arcs("% header\nx,y\nz,x\n".as_bytes(), &format)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(
        arcs,
        vec![
            ("y".to_string(), "x".to_string(), ()),
            ("x".to_string(), "z".to_string(), ())
        ]
    );
}

#[test]
fn test_load_graph() -> anyhow::Result<()> {
    common::init_logger();
    let input = "A\tB\nA\tC\n\nB\tC\nC\tA\nA\tB\n";
    let graph = load_graph(input.as_bytes(), &ArcsFormat::default(), |_| 1.0, no_logging![])?;
    assert_eq!(graph.num_vertices(), 3);
    assert_eq!(graph.num_edges(), 5);
    // Duplicate arcs are kept.
    assert_eq!(graph.out_degree(&"A".to_string())?, 3);
    assert_eq!(graph.out_degree(&"C".to_string())?, 1);
    Ok(())
}

#[test]
fn test_labels_starting_with_hash() -> anyhow::Result<()> {
    let input = "#MeToo\tA\nA\t#MeToo\n";
    let graph = load_graph(input.as_bytes(), &ArcsFormat::default(), |_| 1.0, no_logging![])?;
    assert_eq!(graph.num_vertices(), 2);
    assert_eq!(graph.num_edges(), 2);
    assert_eq!(graph.out_degree(&"#MeToo".to_string())?, 1);
    assert_eq!(graph.out_degree(&"A".to_string())?, 1);

    // Without a comment symbol, a header line is just a malformed arc.
    assert!(matches!(
        load_graph("# header\nA\tB\n".as_bytes(), &ArcsFormat::default(), |_| 1.0, no_logging![]),
        Err(Error::MalformedInput { line: 1, .. })
    ));
    Ok(())
}

#[test]
fn test_load_graph_malformed() {
    let format = ArcsFormat {
        comment: Some('#'),
        ..ArcsFormat::default()
    };
    let input = "A\tB\n# fine\nB C\nC\tA\n";
    match load_graph(input.as_bytes(), &format, |_| 1.0, no_logging![]) {
        Err(Error::MalformedInput { line, content }) => {
            assert_eq!(line, 3);
            assert_eq!(content, "B C");
        }
        other => panic!("Unexpected result {:?}", other.map(|g| g.num_vertices())),
    }
}

#[test]
fn test_try_from_edges_stops_at_first_error() {
    let records = vec![
        Ok((1, 2, ())),
        Err(Error::UnknownVertex("3".to_string())),
        Ok((2, 3, ())),
    ];
    let result: pregel::Result<GraphStore<i32, ()>> = GraphStore::try_from_edges(records, |_| ());
    assert!(matches!(result, Err(Error::UnknownVertex(_))));
}
