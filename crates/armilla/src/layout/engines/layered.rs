//! Layered (rank-based) placement for directed graphs.
//!
//! Rank assignment and in-rank ordering come from the `rust-sugiyama`
//! implementation of the Sugiyama algorithm, wrapped in `catch_unwind`
//! because its internals panic on some degenerate inputs. The raw
//! coordinates it returns are unit-spaced and ignorant of item sizes, so
//! only the rank structure is kept; size-aware positioning below guarantees
//! the spacing contract regardless of which path produced the ranks.
//!
//! Scopes with no edges, and any `rust-sugiyama` failure, use a
//! breadth-first ranking instead.

use std::collections::VecDeque;

use armilla_core::geometry::Point;
use log::debug;

use super::{Item, Placement, PlacementOptions};

pub struct Layered;

impl Placement for Layered {
    fn place(
        &self,
        items: &[Item],
        edges: &[(usize, usize)],
        opts: &PlacementOptions,
    ) -> Vec<Point> {
        let ranks = sugiyama_ranks(items.len(), edges)
            .unwrap_or_else(|| bfs_ranks(items.len(), edges));
        position_ranks(items, &ranks, opts)
    }
}

/// Rank structure from `rust-sugiyama`: one `Vec` per rank, top to bottom,
/// members ordered by the algorithm's crossing minimization.
fn sugiyama_ranks(item_count: usize, edges: &[(usize, usize)]) -> Option<Vec<Vec<usize>>> {
    let edge_list: Vec<(u32, u32)> = edges
        .iter()
        .filter(|(source, target)| source != target)
        .map(|&(source, target)| (source as u32, target as u32))
        .collect();
    if edge_list.is_empty() {
        return None;
    }

    let results = std::panic::catch_unwind(move || {
        let config = rust_sugiyama::configure::Config {
            minimum_length: 1,
            vertex_spacing: 1.0,
            ..Default::default()
        };
        rust_sugiyama::from_edges(&edge_list, &config)
    })
    .ok()?;

    if results.is_empty() {
        debug!("rust-sugiyama returned no layouts; using BFS ranking");
        return None;
    }

    // Each result is one weakly-connected component. Components share rank
    // indices starting at zero, which stacks them side by side later.
    let mut ranks: Vec<Vec<(f32, usize)>> = Vec::new();
    let mut seen = vec![false; item_count];

    for (coords, _width, _height) in &results {
        // Group this component's members by their y coordinate.
        let mut members: Vec<(usize, f32, f32)> = Vec::new();
        for &(id, (x, y)) in coords {
            if id >= item_count {
                debug!(id = id; "rust-sugiyama produced an out-of-range id; using BFS ranking");
                return None;
            }
            members.push((id, x as f32, y as f32));
        }

        let mut levels: Vec<f32> = members.iter().map(|&(_, _, y)| y).collect();
        levels.sort_by(|a, b| a.partial_cmp(b).expect("rank levels are finite"));
        levels.dedup_by(|a, b| (*a - *b).abs() < 0.25);

        for (id, x, y) in members {
            let Some(rank) = levels.iter().position(|&level| (level - y).abs() < 0.25) else {
                debug!("rust-sugiyama rank levels drifted; using BFS ranking");
                return None;
            };
            while ranks.len() <= rank {
                ranks.push(Vec::new());
            }
            ranks[rank].push((x, id));
            seen[id] = true;
        }
    }

    // Isolated items never reach rust-sugiyama; they join the end of the
    // first rank, in index order.
    let mut isolated_order = 0.0f32;
    for (id, was_seen) in seen.iter().enumerate() {
        if !was_seen {
            if ranks.is_empty() {
                ranks.push(Vec::new());
            }
            // Keys far above any coordinate keep them after ranked members.
            ranks[0].push((1.0e9 + isolated_order, id));
            isolated_order += 1.0;
        }
    }

    Some(
        ranks
            .into_iter()
            .map(|mut rank| {
                rank.sort_by(|a, b| {
                    a.0.partial_cmp(&b.0)
                        .expect("rank x coordinates are finite")
                        .then(a.1.cmp(&b.1))
                });
                rank.into_iter().map(|(_, id)| id).collect()
            })
            .filter(|rank: &Vec<usize>| !rank.is_empty())
            .collect(),
    )
}

/// Breadth-first ranking: sources first, each successor one rank below its
/// discoverer. Cycle members unreachable from any source start fresh from
/// the lowest-index unvisited item.
fn bfs_ranks(item_count: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    if item_count == 0 {
        return Vec::new();
    }

    let mut in_degree = vec![0usize; item_count];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); item_count];
    for &(source, target) in edges {
        if source != target {
            successors[source].push(target);
            in_degree[target] += 1;
        }
    }

    let mut ranks: Vec<Vec<usize>> = Vec::new();
    let mut visited = vec![false; item_count];
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    for (item, &degree) in in_degree.iter().enumerate() {
        if degree == 0 {
            queue.push_back((item, 0));
        }
    }

    loop {
        while let Some((item, rank)) = queue.pop_front() {
            if visited[item] {
                continue;
            }
            visited[item] = true;
            while ranks.len() <= rank {
                ranks.push(Vec::new());
            }
            ranks[rank].push(item);

            for &next in &successors[item] {
                if !visited[next] {
                    queue.push_back((next, rank + 1));
                }
            }
        }

        // Restart inside an unreached cycle, if any.
        match visited.iter().position(|&v| !v) {
            Some(item) => queue.push_back((item, 0)),
            None => break,
        }
    }

    ranks
}

/// Size-aware rank positioning: each rank is a centered row, rows separated
/// by `layer_spacing` between the tallest extents of adjacent ranks.
fn position_ranks(items: &[Item], ranks: &[Vec<usize>], opts: &PlacementOptions) -> Vec<Point> {
    let mut positions = vec![Point::default(); items.len()];
    let mut y_cursor = 0.0;

    for (index, rank) in ranks.iter().enumerate() {
        let row_height = rank
            .iter()
            .map(|&item| items[item].size.height())
            .fold(0.0, f32::max);
        if index > 0 {
            y_cursor += opts.layer_spacing;
        }

        let total_width: f32 = rank
            .iter()
            .map(|&item| items[item].size.width())
            .sum::<f32>()
            + opts.node_spacing * rank.len().saturating_sub(1) as f32;

        let mut x_cursor = -total_width / 2.0;
        for &item in rank {
            let width = items[item].size.width();
            positions[item] = Point::new(x_cursor + width / 2.0, y_cursor + row_height / 2.0);
            x_cursor += width + opts.node_spacing;
        }

        y_cursor += row_height;
    }

    positions
}
