use std::cell::Cell;
use std::rc::Rc;

use vax_radial::layout::{
    InteractionController, LayoutConfig, NodeKind, RunState, TooltipDirective, hierarchy_graph,
    layout, replace, retire,
};
use vax_radial::vaccinations::{
    HierarchyRoot, QuarterNode, VaccinationTable, VaccineLeaf, YearNode, location_hierarchy,
    parse_records, read_raw_records,
};

const COLLISION_TOLERANCE: f32 = 1.0;

fn busy_root() -> HierarchyRoot {
    let vaccines = ["Pfizer/BioNTech", "Moderna", "Oxford/AstraZeneca"];
    let years = ["2021", "2022"]
        .iter()
        .enumerate()
        .map(|(year_index, label)| YearNode {
            label: (*label).to_owned(),
            quarters: (1..=4)
                .map(|quarter| QuarterNode {
                    label: format!("Q{quarter}"),
                    leaves: vaccines
                        .iter()
                        .enumerate()
                        .map(|(vaccine_index, vaccine)| VaccineLeaf {
                            vaccine: (*vaccine).to_owned(),
                            doses: 1_000
                                * (1 + year_index as u64 * 4 + quarter)
                                * (1 + vaccine_index as u64 * 7),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    HierarchyRoot {
        location: "Japan".into(),
        years,
    }
}

#[test]
fn settled_layout_has_no_overlapping_circles() {
    let mut handle = layout(&busy_root(), LayoutConfig::default()).unwrap();
    assert_eq!(handle.nodes().len(), 1 + 2 + 8 + 24);

    handle.run_until_settled(400);
    assert!(handle.is_settled());

    let nodes = handle.nodes();
    for (i, a) in nodes.iter().enumerate() {
        assert!(a.position.x.is_finite() && a.position.y.is_finite());
        for b in &nodes[i + 1..] {
            let distance = (a.position - b.position).length();
            let required = a.radius + b.radius - COLLISION_TOLERANCE;
            assert!(
                distance >= required,
                "{} and {} overlap: {distance} < {required}",
                a.id,
                b.id
            );
        }
    }
}

#[test]
fn settled_layout_stays_near_the_viewport_center() {
    let config = LayoutConfig::default().with_viewport(800.0, 600.0);
    let mut handle = layout(&busy_root(), config).unwrap();
    handle.run_until_settled(400);

    let count = handle.nodes().len() as f32;
    let centroid = handle
        .nodes()
        .iter()
        .fold(eframe::egui::Vec2::ZERO, |sum, node| sum + node.position)
        / count;
    let offset = centroid - config.viewport.center();
    assert!(offset.length() < 100.0, "centroid drifted by {offset:?}");
}

#[test]
fn leaf_radii_follow_dose_order() {
    let config = LayoutConfig::default();
    let graph = hierarchy_graph(&busy_root(), &config);
    let mut leaves = graph
        .nodes
        .iter()
        .filter(|node| node.kind == NodeKind::Leaf)
        .map(|node| (node.value.unwrap(), node.radius))
        .collect::<Vec<_>>();
    leaves.sort_by_key(|(value, _)| *value);

    for pair in leaves.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }
}

#[test]
fn empty_location_lays_out_nothing() {
    let csv = "location,date,vaccine,total_vaccinations\nX,2021-01-05,V,100\n";
    let table = VaccinationTable::new(parse_records(read_raw_records(csv.as_bytes()).unwrap()).unwrap());
    let root = location_hierarchy(&table, "Nowhere").unwrap();
    assert!(root.is_empty());

    let mut handle = layout(&root, LayoutConfig::default()).unwrap();
    assert!(handle.is_settled());
    assert_eq!(handle.run_until_settled(300), 0);
    assert_eq!(handle.positions().count(), 0);
}

#[test]
fn replacing_a_layout_stops_the_previous_run() {
    let mut slot = None;
    assert!(replace(&mut slot, &busy_root(), LayoutConfig::default()).unwrap().is_none());

    let tick_count = Rc::new(Cell::new(0u32));
    let first = slot.as_mut().unwrap();
    let ticks_seen = Rc::clone(&tick_count);
    first.on_tick(move |_, _| ticks_seen.set(ticks_seen.get() + 1));
    first.step();
    assert_eq!(tick_count.get(), 1);
    assert_eq!(Rc::strong_count(&tick_count), 2);

    let previous = replace(&mut slot, &busy_root(), LayoutConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(previous.state(), RunState::Stopped);
    assert_eq!(previous.ticks(), 1);
    assert_eq!(Rc::strong_count(&tick_count), 1);

    let next = slot.as_mut().unwrap();
    assert_eq!(next.state(), RunState::Running);
    assert_eq!(next.ticks(), 0);
    next.step();
    assert_eq!(tick_count.get(), 1);
}

#[test]
fn retiring_an_empty_slot_is_a_no_op() {
    let mut slot = None;
    assert!(retire(&mut slot).is_none());

    replace(&mut slot, &busy_root(), LayoutConfig::default()).unwrap();
    let retired = retire(&mut slot).unwrap();
    assert!(slot.is_none());
    assert_eq!(retired.state(), RunState::Stopped);
}

#[test]
fn dragging_keeps_neighbours_moving() {
    let mut handle = layout(&busy_root(), LayoutConfig::default()).unwrap();
    handle.run_until_settled(400);
    let mut controller = InteractionController::new();

    let target = "Japan/2021/Q1";
    let start = handle.position(target).unwrap();
    let parent_before = handle.position("Japan/2021").unwrap();

    assert_eq!(
        controller.drag_start(&mut handle, target, start),
        TooltipDirective::Hide
    );
    let pointer = start + eframe::egui::vec2(250.0, 0.0);
    for _ in 0..60 {
        assert_eq!(controller.drag_move(&mut handle, pointer), TooltipDirective::Hide);
        handle.step();
    }
    assert_eq!(handle.position(target), Some(pointer));
    assert!(handle.alpha() > handle.config().alpha_min);
    assert!((handle.position("Japan/2021").unwrap() - parent_before).length() > 1.0);

    assert_eq!(controller.drag_end(&mut handle), TooltipDirective::Hide);
    handle.run_until_settled(2_000);
    assert!(handle.is_settled());
    assert!(!handle.node(target).unwrap().is_pinned());
}
