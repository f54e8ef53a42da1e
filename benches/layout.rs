use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use family_tree_layout::config::{LayoutConfig, RenderConfig};
use family_tree_layout::ir::{FamilyGraph, Gender, Person};
use family_tree_layout::layout::compute_family_layout;
use family_tree_layout::render::render_svg;
use family_tree_layout::theme::Theme;
use std::hint::black_box;

/// Full tree: every couple has `children` kids, each of whom marries in
/// until `generations` levels exist.
fn generated_tree(generations: usize, children: usize) -> FamilyGraph {
    let mut graph = FamilyGraph::new();
    graph
        .add_person(Person::new("g0-0", Gender::Male))
        .add_person(Person::new("g0-0s", Gender::Female));
    graph.add_spouse("g0-0", "g0-0s", Some(1));

    let mut couples = vec![("g0-0".to_string(), "g0-0s".to_string())];
    for generation in 1..generations {
        let mut next = Vec::new();
        for (couple, (father, mother)) in couples.iter().enumerate() {
            for order in 0..children {
                let id = format!("g{generation}-{}", couple * children + order);
                let spouse = format!("{id}s");
                let mut person = Person::new(&id, Gender::Male);
                person.name = Some(format!("Person {id}"));
                graph
                    .add_person(person)
                    .add_person(Person::new(&spouse, Gender::Female));
                graph
                    .add_parent(&id, father, Some(order as i32 + 1))
                    .add_parent(&id, mother, Some(order as i32 + 1))
                    .add_spouse(&id, &spouse, Some(1));
                next.push((id, spouse));
            }
        }
        couples = next;
    }
    graph
}

/// One person with many marriages, each producing children.
fn serial_marriages(marriages: usize) -> FamilyGraph {
    let mut graph = FamilyGraph::new();
    graph.add_person(Person::new("hub", Gender::Male));
    for marriage in 0..marriages {
        let spouse = format!("w{marriage}");
        graph.add_person(Person::new(&spouse, Gender::Female));
        graph.add_spouse("hub", &spouse, Some(marriage as i32 + 1));
        for child in 0..3 {
            let id = format!("c{marriage}-{child}");
            graph.add_person(Person::new(&id, Gender::Unknown));
            graph
                .add_parent(&id, "hub", Some(child + 1))
                .add_parent(&id, &spouse, Some(child + 1));
        }
    }
    graph
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    for (name, graph) in [
        ("tree_4x2", generated_tree(4, 2)),
        ("tree_5x3", generated_tree(5, 3)),
        ("tree_7x2", generated_tree(7, 2)),
        ("serial_marriages_12", serial_marriages(12)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                let layout = compute_family_layout(black_box(graph), &config);
                black_box(layout.node_positions.len());
            });
        });
    }
    group.finish();
}

fn bench_precise_text(c: &mut Criterion) {
    let graph = generated_tree(4, 3);
    let config = LayoutConfig {
        fast_text_metrics: false,
        ..Default::default()
    };
    c.bench_function("layout/precise_text_tree_4x3", |b| {
        b.iter(|| {
            let layout = compute_family_layout(black_box(&graph), &config);
            black_box(layout.width);
        });
    });
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let theme = Theme::modern();
    let config = LayoutConfig::default();
    let render = RenderConfig::default();
    for (name, graph) in [("tree_4x2", generated_tree(4, 2)), ("tree_5x3", generated_tree(5, 3))] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                let layout = compute_family_layout(black_box(graph), &config);
                let svg = render_svg(&layout, graph, &theme, &render);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_precise_text, bench_end_to_end
);
criterion_main!(benches);
