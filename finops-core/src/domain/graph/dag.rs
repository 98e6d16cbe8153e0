// finops-core/src/domain/graph/dag.rs

use crate::domain::error::DomainError;
use crate::domain::resource::ResourceDescriptor;
use std::collections::{BTreeMap, VecDeque};

pub struct GraphSolver;

impl GraphSolver {
    /// Calculates the creation order of resources (Topological Sort with Layers).
    /// Layer N depends only on layers 0..N-1. Names inside a layer are sorted so
    /// rendered plans are stable between runs.
    pub fn plan_creation(resources: &[ResourceDescriptor]) -> Result<Vec<Vec<String>>, DomainError> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut adj_list: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        // 1. Initialization
        for resource in resources {
            in_degree.insert(resource.logical_id.as_str(), 0);
            adj_list.insert(resource.logical_id.as_str(), Vec::new());
        }

        // 2. Graph Construction (Dependency Inversion)
        for resource in resources {
            for dep in resource.references() {
                let Some(dep_name) = in_degree.get_key_value(dep.as_str()).map(|(k, _)| *k) else {
                    return Err(DomainError::DanglingReference {
                        from: resource.logical_id.clone(),
                        to: dep,
                    });
                };
                adj_list
                    .entry(dep_name)
                    .or_default()
                    .push(resource.logical_id.as_str());
                *in_degree.entry(resource.logical_id.as_str()).or_insert(0) += 1;
            }
        }

        // 3. Kahn's Algorithm (Layered)
        let mut layers: Vec<Vec<String>> = Vec::new();
        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut total_resolved = 0;

        while !queue.is_empty() {
            let layer_size = queue.len();
            let mut current_layer = Vec::with_capacity(layer_size);
            let mut next = Vec::new();

            for _ in 0..layer_size {
                if let Some(current) = queue.pop_front() {
                    current_layer.push(current.to_string());
                    total_resolved += 1;

                    if let Some(neighbors) = adj_list.get(current) {
                        for neighbor in neighbors {
                            if let Some(degree) = in_degree.get_mut(neighbor) {
                                *degree -= 1;
                                if *degree == 0 {
                                    next.push(*neighbor);
                                }
                            }
                        }
                    }
                }
            }

            next.sort_unstable();
            queue.extend(next);
            current_layer.sort();
            layers.push(current_layer);
        }

        // 4. Cycle Detection
        if total_resolved != resources.len() {
            let stuck: Vec<&str> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(name, _)| *name)
                .collect();
            return Err(DomainError::CircularDependency(stuck.join(", ")));
        }

        Ok(layers)
    }
}
