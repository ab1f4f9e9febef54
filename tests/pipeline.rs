//! End-to-end runs of the whole stack: a YAML config drives a pair list
//! over a small ring of atoms, the matrix accumulates, and the views and
//! collective variables read back known closed-form answers.

#[macro_use]
extern crate cvkit_math;

use ::cvkit::{Settings, YamlRead};
use ::cvkit::adjmat::{
    accumulate, accumulate_range, ContactMatrix, GatedDistance, MatrixKind, MatrixShape,
    PairTasks, Switch, SwitchContact, TriangleTasks,
};
use ::cvkit::colvars::{Gyration, GyrationKind, Noe};
use ::cvkit::config::Element;
use ::cvkit::math::V3;
use ::cvkit::system::{Cell, System};

use ::std::f64::consts::PI;

const RING_CONFIG: &str = "\
cell: open
matrix:
  rows: 12
  cols: 12
  symmetric: true
  element:
    contact:
      smooth-step: { begin: 1.1, end: 1.8 }
pair-list:
  cutoff: 2.5
  stride: 5
";

/// A planar ring with unit spacing between neighbors.
fn ring(n: usize, cell: Cell) -> System {
    let radius = 0.5 / (PI / n as f64).sin();
    let positions = (0..n)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / n as f64;
            V3([radius * theta.cos(), radius * theta.sin(), 0.0])
        })
        .collect();
    System::new(positions, cell)
}

#[test]
fn contact_pipeline_from_config() {
    let settings = Settings::from_reader(RING_CONFIG.as_bytes()).unwrap();
    settings.validate().unwrap();

    let space = settings.matrix.pair_space().unwrap();
    let system = ring(space.atom_count(), settings.cell);
    let mut matrix = settings.matrix.build().unwrap();
    let kernel = match &settings.matrix.element {
        &Element::Contact(switch) => SwitchContact::new(switch),
        other => panic!("unexpected element: {:?}", other),
    };

    let mut list = settings.pair_list.as_ref().unwrap().build(space).unwrap();
    list.update(&system).unwrap();
    // the cutoff keeps nearest (1.0) and next-nearest (~1.93) pairs
    assert_eq!(list.len(), 24);

    accumulate(&mut matrix, &list, &kernel, &system).unwrap();

    // only nearest neighbors fall inside the switch
    assert_eq!(matrix.active_count(), 12);

    let map = matrix.dense_view();
    assert_close!(map.values[(0, 1)], 1.0);
    assert_eq!(map.values[(0, 1)], map.values[(1, 0)]);
    assert_eq!(map.values[(0, 2)], 0.0);
    assert_eq!(map.active.len(), 12);

    let adj = matrix.adjacency_lists(4).unwrap();
    for node in 0..12 {
        assert_eq!(adj.degree(node), 2, "node {}", node);
    }
    assert!(adj.neighbors(0).contains(&1));
    assert!(adj.neighbors(0).contains(&11));

    assert_eq!(matrix.edge_list().unwrap().len(), 12);
    let graph = matrix.to_graph().unwrap();
    assert_eq!((graph.node_count(), graph.edge_count()), (12, 12));

    // neighbors sit on the switch plateau, so the adapted gradient of
    // their element is identically zero
    let idx = matrix.storage_index(0, 1);
    assert!(matrix.is_active(idx));
    assert_close!(matrix.normalized(idx), 1.0);
    for (_, row) in matrix.normalized_gradient(idx).unwrap().iter() {
        assert_close!(abs=1e-12, row, 0.0);
    }
}

#[test]
fn repeated_passes_are_idempotent() {
    // with this switch the ring bonds land mid-ramp, so the pass
    // produces nontrivial values and gradients
    let kernel = SwitchContact::new(Switch::SmoothStep { begin: 0.9, end: 1.2 });
    let system = ring(12, Cell::Open);
    let tasks = TriangleTasks { nodes: 12 };
    let mut matrix =
        ContactMatrix::new(MatrixShape::new(12, 12, MatrixKind::Symmetric).unwrap());

    accumulate(&mut matrix, &tasks, &kernel, &system).unwrap();

    let (s, _) = kernel.switch.eval(1.0);
    let idx = matrix.storage_index(5, 6);
    let (w, v) = matrix.stored_pair(idx);
    assert_close!(w, s);
    assert_close!(v, s * s);
    assert_close!(matrix.normalized(idx), s);

    let first_map = matrix.dense_view();
    let first_pairs: Vec<_> = matrix.active_slots().map(|i| (i, matrix.stored_pair(i))).collect();

    accumulate(&mut matrix, &tasks, &kernel, &system).unwrap();

    assert_eq!(matrix.dense_view(), first_map);
    let second_pairs: Vec<_> =
        matrix.active_slots().map(|i| (i, matrix.stored_pair(i))).collect();
    assert_eq!(second_pairs, first_pairs);
}

#[test]
fn split_ranges_merge_to_the_full_result() {
    let kernel = SwitchContact::new(Switch::SmoothStep { begin: 0.9, end: 1.2 });
    let system = ring(10, Cell::Open);
    let tasks = TriangleTasks { nodes: 10 };
    let shape = MatrixShape::new(10, 10, MatrixKind::Symmetric).unwrap();

    let mut full = ContactMatrix::new(shape);
    accumulate(&mut full, &tasks, &kernel, &system).unwrap();

    let mut left = ContactMatrix::new(shape);
    let mut right = ContactMatrix::new(shape);
    let split = tasks.len() / 2;
    accumulate_range(&mut left, &tasks, &kernel, &system, 0..split).unwrap();
    accumulate_range(&mut right, &tasks, &kernel, &system, split..tasks.len()).unwrap();
    left.merge_from(&right).unwrap();

    assert_eq!(
        left.active_slots().collect::<Vec<_>>(),
        full.active_slots().collect::<Vec<_>>(),
    );
    for idx in full.active_slots() {
        assert_eq!(left.stored_pair(idx), full.stored_pair(idx));
        assert_eq!(
            left.normalized_gradient(idx).unwrap(),
            full.normalized_gradient(idx).unwrap(),
        );
    }
}

#[test]
fn weighted_distance_elements_recover_distances() {
    let yaml = "\
matrix:
  rows: 8
  cols: 8
  symmetric: true
  element:
    weighted-distance:
      smooth-step: { begin: 1.6, end: 2.1 }
";
    let settings = Settings::from_reader(yaml.as_bytes()).unwrap();
    settings.validate().unwrap();

    let system = ring(8, settings.cell);
    let mut matrix = settings.matrix.build().unwrap();
    let kernel = match &settings.matrix.element {
        &Element::WeightedDistance(switch) => GatedDistance::new(switch),
        other => panic!("unexpected element: {:?}", other),
    };

    accumulate(&mut matrix, &TriangleTasks { nodes: 8 }, &kernel, &system).unwrap();

    // nearest (1.0) and next-nearest (~1.85) pairs are both in reach here
    assert_eq!(matrix.active_count(), 16);
    for idx in matrix.active_slots() {
        let (i, j) = matrix.shape().coordinates(idx);
        assert_close!(matrix.normalized(idx), system.distance(i, j));
    }
}

#[test]
fn conflicting_flags_fail_validation() {
    let yaml = "\
matrix:
  rows: 4
  cols: 4
  symmetric: true
  directed-bonds: true
  element:
    contact:
      smooth-step: { begin: 1.1, end: 1.8 }
";
    let settings = Settings::from_reader(yaml.as_bytes()).unwrap();
    assert!(settings.validate().is_err());
}

#[test]
fn colvar_closed_forms_on_the_ring() {
    let n = 12;
    let system = ring(n, Cell::Open);
    let radius = 0.5 / (PI / n as f64).sin();

    // every atom sits at the ring radius from the center of mass
    let gyration = Gyration::new(GyrationKind::Radius).compute(&system).unwrap();
    assert_close!(gyration.value, radius);

    // every bond has unit length, so the r^-6 average is exactly one
    let pairs = (0..n).map(|i| (i, (i + 1) % n)).collect();
    let noe = Noe::single(pairs).unwrap().compute_one(0, &system).unwrap();
    assert_close!(noe.value, 1.0);
}
