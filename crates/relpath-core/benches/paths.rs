use criterion::{Criterion, criterion_group, criterion_main};
use relpath_core::align::align;
use relpath_core::graph::{DepGraph, Link};
use relpath_core::node_id::{is_terminal, terminal_id, terminal_position};
use relpath_core::render::PathRenderer;
use std::hint::black_box;

/// A passage of `scenes` scenes under one root, four tokens per scene, with a
/// remote edge from every scene's first token to the previous scene.
fn build_links(scenes: usize) -> Vec<Link> {
    let mut links = Vec::new();
    for s in 0..scenes {
        let scene = format!("1.{}", s + 1);
        links.push(Link::new(scene.clone(), "1.0", "H"));
        for t in 0..4 {
            let token = terminal_id(s * 4 + t + 1);
            links.push(Link::new(token, scene.clone(), if t == 1 { "P" } else { "A" }));
        }
        if s > 0 {
            links.push(Link::new(terminal_id(s * 4 + 1), format!("1.{s}"), "A"));
        }
    }
    links
}

fn bench_build_graph(c: &mut Criterion) {
    let links = build_links(50);

    c.bench_function("build_graph_200_tokens", |b| {
        b.iter(|| DepGraph::new(black_box(links.clone())))
    });
}

fn bench_undirected_steps(c: &mut Criterion) {
    let graph = DepGraph::new(build_links(50));
    let (first, last) = (terminal_id(1), terminal_id(200));

    c.bench_function("undirected_steps_200_tokens", |b| {
        b.iter(|| graph.undirected_steps(black_box(&first), black_box(&last)))
    });
}

fn bench_lca_subgraph(c: &mut Criterion) {
    let graph = DepGraph::new(build_links(50));
    let (first, last) = (terminal_id(2), terminal_id(199));

    c.bench_function("lca_subgraph_links_200_tokens", |b| {
        b.iter(|| graph.lca_subgraph_links(black_box(&first), black_box(&last), terminal_position))
    });
}

fn bench_minimal_subgraph(c: &mut Criterion) {
    let graph = DepGraph::new(build_links(20));
    let (first, last) = (terminal_id(5), terminal_id(9));

    c.bench_function("minimal_subgraph_80_tokens", |b| {
        b.iter(|| {
            graph.minimal_subgraph(
                black_box(&first),
                black_box(&last),
                is_terminal,
                |terminals, _, _| terminals.len(),
            )
        })
    });
}

fn bench_variants(c: &mut Criterion) {
    let graph = DepGraph::new(build_links(50));
    let steps = graph
        .undirected_steps(&terminal_id(3), &terminal_id(150))
        .unwrap_or_default();
    let renderer = PathRenderer::default();

    c.bench_function("render_variants", |b| {
        b.iter(|| renderer.variants(black_box(&steps), &graph))
    });
}

fn bench_align(c: &mut Criterion) {
    let tokens: Vec<String> = (0..500)
        .map(|i| if i % 7 == 0 { format!("w{i}-x") } else { format!("w{i}") })
        .collect();
    let parse_tokens: Vec<String> = tokens
        .iter()
        .flat_map(|t| match t.split_once('-') {
            Some((head, tail)) => vec![head.to_string(), "-".to_string(), tail.to_string()],
            None => vec![t.clone()],
        })
        .collect();

    c.bench_function("align_500_tokens", |b| {
        b.iter(|| align(black_box(tokens.as_slice()), black_box(parse_tokens.as_slice())))
    });
}

criterion_group!(
    benches,
    bench_build_graph,
    bench_undirected_steps,
    bench_lca_subgraph,
    bench_minimal_subgraph,
    bench_variants,
    bench_align,
);
criterion_main!(benches);
