//! Plan quality metrics (KPIs).
//!
//! Summarizes a solved plan for reporting.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Planned trucks | Trucks with both timeslot and dock |
//! | Unplanned trucks | Trucks missing either |
//! | Occupied cells | Distinct (timeslot, dock) cells holding a truck |
//! | Cell utilization | Occupied cells / total cells |
//! | Utilization per dock | Occupied cells of the dock / timeslots |
//! | Load factor per dock | Planned capacity / (dock capacity × timeslots) |

use std::collections::{HashMap, HashSet};

use crate::models::DockYardSolution;

/// Dock-yard plan indicators.
#[derive(Debug, Clone)]
pub struct SolutionKpi {
    /// Trucks with both timeslot and dock assigned.
    pub planned_trucks: usize,
    /// Trucks missing a timeslot or a dock.
    pub unplanned_trucks: usize,
    /// Ids of the unplanned trucks, in input order.
    pub unplanned_ids: Vec<u64>,
    /// Distinct (timeslot, dock) cells holding at least one truck.
    pub occupied_cells: usize,
    /// Fraction of all cells occupied (0.0..1.0).
    pub cell_utilization: f64,
    /// Per-dock fraction of timeslots occupied, keyed by dock name.
    pub utilization_by_dock: HashMap<String, f64>,
    /// Per-dock planned capacity over capacity across all timeslots.
    ///
    /// Above 1.0 when the dock is overloaded. Zero-capacity docks report 0.0.
    pub load_factor_by_dock: HashMap<String, f64>,
}

impl SolutionKpi {
    /// Computes KPIs from a (typically solved) plan.
    pub fn calculate(solution: &DockYardSolution) -> Self {
        let slots = solution.timeslots().len();
        let docks = solution.docks();

        let mut occupied: HashSet<(usize, usize)> = HashSet::new();
        let mut cells_per_dock = vec![0usize; docks.len()];
        let mut load_per_dock = vec![0i64; docks.len()];
        let mut unplanned_ids = Vec::new();

        for truck in solution.trucks() {
            match truck.placement().cell() {
                Some((slot, dock)) => {
                    if occupied.insert((slot, dock)) {
                        cells_per_dock[dock] += 1;
                    }
                    load_per_dock[dock] += truck.capacity;
                }
                None => unplanned_ids.push(truck.id),
            }
        }

        let cells = solution.cell_count();
        let cell_utilization = if cells == 0 {
            0.0
        } else {
            occupied.len() as f64 / cells as f64
        };

        let mut utilization_by_dock = HashMap::new();
        let mut load_factor_by_dock = HashMap::new();
        for (k, dock) in docks.iter().enumerate() {
            let utilization = if slots == 0 {
                0.0
            } else {
                cells_per_dock[k] as f64 / slots as f64
            };
            let available = dock.capacity * slots as i64;
            let load = if available <= 0 {
                0.0
            } else {
                load_per_dock[k] as f64 / available as f64
            };
            utilization_by_dock.insert(dock.name.clone(), utilization);
            load_factor_by_dock.insert(dock.name.clone(), load);
        }

        Self {
            planned_trucks: solution.trucks().len() - unplanned_ids.len(),
            unplanned_trucks: unplanned_ids.len(),
            unplanned_ids,
            occupied_cells: occupied.len(),
            cell_utilization,
            utilization_by_dock,
            load_factor_by_dock,
        }
    }

    /// Whether every truck is planned.
    pub fn all_planned(&self) -> bool {
        self.unplanned_trucks == 0
    }
}
