use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use clue_core::board::{Board, BoardLayout, Position};
use clue_core::eval::{EvalLimits, evaluate_guesses};
use clue_core::knowledge::{Belief, KnowledgeTable};
use clue_core::model::category::Category;
use clue_core::model::registry::{GameSetup, Registry};
use clue_core::solution::SolutionSpace;

fn classic_state(known: &[(&str, &str)]) -> (Registry, KnowledgeTable) {
    let registry = Registry::new(&GameSetup::classic(
        &["Me", "Alice", "Bob", "Cy"],
        "Me",
        &["Rope", "Hall", "Mrs. White"],
    ))
    .expect("classic setup");
    let mut table = KnowledgeTable::new(&registry);
    for (player, card) in known {
        let player = registry.find_player(player).expect("player");
        let card = registry.find_card(card).expect("card");
        table.set_belief(player, card, Belief::Has);
    }
    (registry, table)
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_guesses");
    let cases: &[(&str, &[(&str, &str)])] = &[
        ("opening", &[]),
        ("midgame", &[("Alice", "Dagger"), ("Bob", "Kitchen"), ("Cy", "Mr. Green")]),
    ];

    for (label, known) in cases.iter().copied() {
        let (registry, table) = classic_state(known);
        let space = SolutionSpace::derive(&registry, &table);
        let asked: Vec<_> = registry.player_ids().filter(|p| *p != registry.user()).collect();
        let rooms = registry.cards_in(Category::Room).to_vec();
        group.bench_function(format!("all_rooms_{label}"), |b| {
            b.iter(|| {
                black_box(evaluate_guesses(
                    &registry,
                    &table,
                    &space,
                    &asked,
                    &rooms,
                    &EvalLimits::default(),
                ))
            })
        });
    }

    group.finish();
}

fn bench_reachability(c: &mut Criterion) {
    let mut group = c.benchmark_group("accessible_rooms");
    for budget in [2u32, 6, 12] {
        group.bench_function(format!("hall_budget_{budget}"), |b| {
            b.iter_batched(
                || Board::new(BoardLayout::classic()).expect("classic board"),
                |board| black_box(board.accessible_rooms(budget, &Position::Room("Hall".into()))),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_reachability);
criterion_main!(benches);
