/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Builds a contact matrix for a ring of atoms and walks everything
//! downstream of it: the dense and graph views, the derivative adapter,
//! and a couple of collective variables.
//!
//! With no arguments this uses a built-in config; otherwise the first
//! argument names a YAML file with the same schema.

use ::cvkit::{FailResult, Settings, YamlRead};
use ::cvkit::adjmat::{
    accumulate, ContactKernel, ContactMatrix, GatedDistance, GridTasks, MatrixKind,
    OffDiagonalTasks, SwitchContact, TriangleTasks,
};
use ::cvkit::colvars::{Gyration, GyrationKind, Noe};
use ::cvkit::config::Element;
use ::cvkit::logging::GlobalLogger;
use ::cvkit::math::V3;
use ::cvkit::system::{Cell, PairSpace, System};

use ::log::{error, info};
use ::std::f64::consts::PI;
use ::std::ffi::OsStr;

const DEFAULT_CONFIG: &str = "\
# A 12-atom ring with unit spacing. Under this switch every atom is in
# full contact with its two ring neighbors and nothing else.
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

fn main() {
    wrap_result_main(run);
}

fn wrap_result_main<F>(main: F)
where F: FnOnce() -> FailResult<()>,
{
    main().unwrap_or_else(|e| {
        for cause in e.iter_chain() {
            error!("{}", cause);
        }
        if ::std::env::var_os("RUST_BACKTRACE") == Some(OsStr::new("1").to_owned()) {
            error!("{}", e.backtrace());
        } else {
            error!("(try again with RUST_BACKTRACE=1 for a backtrace)");
        }
        ::std::process::exit(1);
    });
}

fn run() -> FailResult<()> {
    GlobalLogger::default().apply()?;

    let settings = match ::std::env::args().nth(1) {
        Some(path) => {
            info!("reading config from {}", path);
            Settings::from_reader(::std::fs::File::open(&path)?)?
        }
        None => Settings::from_reader(DEFAULT_CONFIG.as_bytes())?,
    };
    settings.validate()?;

    let space = settings.matrix.pair_space()?;
    let system = ring(space.atom_count(), settings.cell);
    info!("built a ring of {} atoms with unit spacing", system.len());

    let mut matrix = settings.matrix.build()?;
    match &settings.matrix.element {
        &Element::Contact(switch) => {
            fill(&mut matrix, &SwitchContact::new(switch), &settings, space, &system)?;
        }
        &Element::WeightedDistance(switch) => {
            fill(&mut matrix, &GatedDistance::new(switch), &settings, space, &system)?;
        }
    }
    info!(
        "{} of {} stored pairs are active",
        matrix.active_count(), matrix.stored_len(),
    );

    let map = matrix.dense_view();
    info!("active cells: {:?}", map.active);

    if matrix.undirected_graph() {
        let adj = matrix.adjacency_lists(8)?;
        info!("atom 0 touches {:?}", adj.neighbors(0));
        let graph = matrix.to_graph()?;
        info!(
            "graph export: {} nodes, {} weighted edges",
            graph.node_count(), graph.edge_count(),
        );
    }

    if let Some(idx) = matrix.active_slots().next() {
        let (i, j) = matrix.shape().coordinates(idx);
        let (w, v) = matrix.stored_pair(idx);
        let grad = matrix.normalized_gradient(idx)?;
        info!(
            "cell ({}, {}): stored (W, V) = ({:.6}, {:.6}), normalized {:.6}, \
             {} sparse gradient rows",
            i, j, w, v, matrix.normalized(idx), grad.len(),
        );
    }

    let out = Gyration::new(GyrationKind::Radius).compute(&system)?;
    info!("radius of gyration: {:.6}", out.value);

    if system.len() >= 3 {
        // the ring bonds, read as one equivalent group of NMR restraints
        let pairs = (0..system.len()).map(|i| (i, (i + 1) % system.len())).collect();
        let out = Noe::single(pairs)?.compute_one(0, &system)?;
        info!("r^-6 average over the ring bonds: {:.6}", out.value);
    }

    Ok(())
}

/// A planar ring with unit spacing between neighbors.
fn ring(n: usize, cell: Cell) -> System {
    let positions = match n {
        1 => vec![V3::zero()],
        _ => {
            let radius = 0.5 / (PI / n as f64).sin();
            (0..n)
                .map(|i| {
                    let theta = 2.0 * PI * i as f64 / n as f64;
                    V3([radius * theta.cos(), radius * theta.sin(), 0.0])
                })
                .collect()
        }
    };
    System::new(positions, cell)
}

fn fill(
    matrix: &mut ContactMatrix,
    kernel: &impl ContactKernel,
    settings: &Settings,
    space: PairSpace,
    system: &System,
) -> FailResult<()> {
    match settings.pair_list {
        Some(ref pair_list) => {
            let mut list = pair_list.build(space)?;
            list.update(system)?;
            info!("pair list keeps {} of {} candidate pairs", list.len(), space.len());
            accumulate(matrix, &list, kernel, system)
        }
        None => {
            let shape = matrix.shape();
            match shape.kind() {
                MatrixKind::Symmetric => {
                    accumulate(matrix, &TriangleTasks { nodes: shape.nodes() }, kernel, system)
                }
                MatrixKind::DirectedBonds => {
                    accumulate(matrix, &OffDiagonalTasks { nodes: shape.nodes() }, kernel, system)
                }
                MatrixKind::General => {
                    let tasks = GridTasks { rows: shape.rows(), cols: shape.cols() };
                    accumulate(matrix, &tasks, kernel, system)
                }
            }
        }
    }
}
