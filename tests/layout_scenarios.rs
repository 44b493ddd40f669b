//! End-to-end layout scenarios.

use rand::Rng;
use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use u_nodelayout::ga::{
    Individual, OptimizerConfig, OptimizerState, Replacement, RoundRobinTournament,
    SteadyStateOptimizer, TournamentSelection, WholeArithmetic,
};
use u_nodelayout::geometry::Vec2;
use u_nodelayout::heap::HeapSlot;
use u_nodelayout::layout::{
    layout_optimizer, load_prototype, parse_prototype, GraphPrototype, LayoutFitness,
    LayoutIndividual, LayoutProblem, Link, NodePrototype, RandomGraphConfig,
};
use u_nodelayout::random::create_rng;

fn two_boxes() -> GraphPrototype {
    let mut g = GraphPrototype::new(Vec2::new(600.0, 600.0)).expect("canvas");
    let p = g
        .add_prototype(NodePrototype::new("box", Vec2::new(100.0, 100.0), 1, 1))
        .expect("proto");
    g.add_node(p, "a").expect("node");
    g.add_node(p, "b").expect("node");
    g.add_link(Link::new(0, 0, 1, 0)).expect("link");
    g
}

#[test]
fn two_nodes_separate_after_ten_thousand_steps() {
    let graph = two_boxes();
    let problem = LayoutProblem::new(graph, LayoutFitness::default().with_heuristic_routing(false));
    let mutation = problem.mutation(0.1);
    let mut opt = SteadyStateOptimizer::new(
        problem,
        TournamentSelection::new(5, 2),
        WholeArithmetic,
        mutation,
        RoundRobinTournament::new(10, 2),
        OptimizerConfig::default()
            .with_seed(2024)
            .with_stop_on_convergence(false),
    );
    opt.initialize_population(50);
    for _ in 0..10_000 {
        opt.step();
    }
    assert_eq!(opt.iteration(), 10_000);

    let best = opt.best();
    let view = best.view(opt.problem().graph());
    let d = (view.node_box(0).center() - view.node_box(1).center()).abs();
    if d.x >= 100.0 && d.y >= 100.0 {
        assert_eq!(best.components().overlap, 0.0);
    }
    // a single overlap costs more than any layout of two linked nodes
    assert_eq!(best.components().overlap, 0.0);
    assert!(best.fitness() > -1000.0);
}

#[test]
fn round_robin_returns_fewest_wins() {
    let mut rng = create_rng(77);
    let population: Vec<LayoutIndividual> = (0..100)
        .map(|_| {
            let mut ind = LayoutIndividual::new(Vec::new());
            ind.set_fitness(-rng.random_range(0.0..5000.0));
            ind
        })
        .collect();
    let fitness: Vec<f64> = population.iter().map(Individual::fitness).collect();
    let strategy = RoundRobinTournament::new(10, 2);

    for seed in 0..10 {
        let mut shared = create_rng(seed);
        let base: u64 = shared.random();
        let wins = strategy.win_counts(&fitness, base);

        let mut shared = create_rng(seed);
        let targets = strategy.select_targets(&population, &mut shared);
        let chosen: HashSet<usize> = targets.iter().copied().collect();
        assert_eq!(chosen.len(), 2);

        let worst_chosen = targets.iter().map(|&t| wins[t]).max().expect("two targets");
        for (i, &w) in wins.iter().enumerate() {
            if !chosen.contains(&i) {
                assert!(worst_chosen <= w);
            }
        }
    }
}

#[test]
fn loaded_graph_optimizes() {
    let path = std::env::temp_dir().join(format!("u-nodelayout-{}.ng", std::process::id()));
    std::fs::write(
        &path,
        "# pipeline\ncanvas 900 600\nproto 0 \"Stage\" 120 60 1 1\n\
         node 0 0 \"load\"\nnode 1 0 \"filter\"\nnode 2 0 \"store\"\n\
         link 0 0 1 0\nlink 1 0 2 0\n",
    )
    .expect("write graph file");
    let graph = load_prototype(&path);
    let _ = std::fs::remove_file(&path);
    let graph = graph.expect("valid graph file");
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.canvas(), Vec2::new(900.0, 600.0));

    let problem = LayoutProblem::new(graph, LayoutFitness::default());
    let mut opt = layout_optimizer(
        problem,
        OptimizerConfig::fast().with_seed(1).with_max_iterations(5_000),
    );
    opt.initialize_population(40);
    let initial = opt.best_fitness();
    let result = opt.run();
    assert!(result.steps <= 5_000);
    assert!(result.best_fitness >= initial);
    assert_eq!(opt.best().curves().len(), 2);
}

#[test]
fn dragging_a_node_updates_the_elite() {
    let graph = parse_prototype(
        "canvas 600 600\nproto 0 p 100 100 1 1\nnode 0 0 a\nnode 1 0 b\nlink 0 0 1 0",
    )
    .expect("valid");
    let mut opt = layout_optimizer(
        LayoutProblem::new(graph, LayoutFitness::default()),
        OptimizerConfig::default().with_seed(9),
    );
    opt.initialize_population(20);

    // place the worst individual in an ideal layout
    let worst = (0..20)
        .min_by(|&a, &b| {
            opt.population()[a]
                .fitness()
                .total_cmp(&opt.population()[b].fitness())
        })
        .expect("non-empty");
    opt.genotype_mut(worst)
        .copy_from_slice(&[50.0, 250.0, 300.0, 250.0]);
    opt.reevaluate(worst);

    // zero is the best possible score
    assert_eq!(opt.population()[worst].fitness(), 0.0);
    assert_eq!(opt.best_fitness(), 0.0);
    assert!(opt.population()[worst].crossings().is_empty());
    let slot = opt.population()[worst].heap_slot().expect("tracked");
    assert_eq!(opt.elite_handles()[slot], worst);
}

#[test]
fn cancelled_run_keeps_best_so_far() {
    let graph = RandomGraphConfig::default()
        .with_node_count(8)
        .with_connection_rate(0.2)
        .generate(&mut create_rng(3))
        .expect("valid");
    let mut opt = layout_optimizer(
        LayoutProblem::new(graph, LayoutFitness::default()),
        OptimizerConfig::default().with_seed(3),
    );
    opt.initialize_population(30);
    for _ in 0..100 {
        opt.step();
    }
    let before = opt.best_fitness();

    let result = opt.run_with_cancel(Some(Arc::new(AtomicBool::new(true))));
    assert!(result.cancelled);
    assert_eq!(result.best_fitness, before);
    assert_eq!(opt.state(), OptimizerState::Stepping);
}

#[test]
fn reinitialization_is_reproducible() {
    let make = || {
        let graph = RandomGraphConfig::default()
            .with_node_count(6)
            .generate(&mut create_rng(11))
            .expect("valid");
        let mut opt = layout_optimizer(
            LayoutProblem::new(graph, LayoutFitness::default()),
            OptimizerConfig::default().with_seed(11),
        );
        opt.initialize_population(25);
        for _ in 0..500 {
            opt.step();
        }
        opt.best_fitness()
    };
    assert_eq!(make(), make());
}
