//! Tree placement: parents centered over their subtrees.
//!
//! Edges are interpreted as a forest (first discovery wins); each subtree
//! reserves a horizontal span wide enough for all its leaves, and every
//! parent centers over its children. Depth rows are sized like layered
//! ranks.

use armilla_core::geometry::Point;

use super::{Item, Placement, PlacementOptions};

pub struct Mrtree;

impl Placement for Mrtree {
    fn place(
        &self,
        items: &[Item],
        edges: &[(usize, usize)],
        opts: &PlacementOptions,
    ) -> Vec<Point> {
        let count = items.len();
        if count == 0 {
            return Vec::new();
        }

        let forest = Forest::build(count, edges);

        // Row geometry per depth.
        let mut row_heights: Vec<f32> = Vec::new();
        for item in 0..count {
            let depth = forest.depth[item];
            while row_heights.len() <= depth {
                row_heights.push(0.0);
            }
            row_heights[depth] = row_heights[depth].max(items[item].size.height());
        }
        let mut row_tops = Vec::with_capacity(row_heights.len());
        let mut y_cursor = 0.0;
        for height in &row_heights {
            row_tops.push(y_cursor);
            y_cursor += height + opts.layer_spacing;
        }

        let mut positions = vec![Point::default(); count];
        let mut x_cursor = 0.0;
        for &root in &forest.roots {
            let span = forest.subtree_span(root, items, opts);
            place_subtree(
                root,
                x_cursor + span / 2.0,
                &forest,
                items,
                opts,
                &row_tops,
                &row_heights,
                &mut positions,
            );
            x_cursor += span + opts.node_spacing;
        }

        positions
    }
}

struct Forest {
    children: Vec<Vec<usize>>,
    depth: Vec<usize>,
    roots: Vec<usize>,
}

impl Forest {
    /// Derives a forest from the edge list: an item's parent is the first
    /// item that discovers it; items nobody discovers become roots.
    fn build(count: usize, edges: &[(usize, usize)]) -> Self {
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut has_parent = vec![false; count];
        for &(source, target) in edges {
            if source != target && source < count && target < count {
                successors[source].push(target);
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut depth = vec![0usize; count];
        let mut visited = vec![false; count];
        let mut roots = Vec::new();

        let mut candidates: Vec<usize> = (0..count)
            .filter(|&item| !edges.iter().any(|&(_, target)| target == item))
            .collect();
        if candidates.is_empty() {
            candidates.push(0);
        }

        let mut stack: Vec<(usize, usize)> = Vec::new();
        loop {
            for &root in &candidates {
                if !visited[root] {
                    visited[root] = true;
                    roots.push(root);
                    depth[root] = 0;
                    stack.push((root, 0));
                }
            }

            while let Some((item, item_depth)) = stack.pop() {
                for &next in successors[item].iter() {
                    if !visited[next] && !has_parent[next] {
                        visited[next] = true;
                        has_parent[next] = true;
                        children[item].push(next);
                        depth[next] = item_depth + 1;
                        stack.push((next, item_depth + 1));
                    }
                }
            }

            match visited.iter().position(|&v| !v) {
                Some(item) => candidates = vec![item],
                None => break,
            }
        }

        Self {
            children,
            depth,
            roots,
        }
    }

    /// Width reserved by a subtree: its own width or the sum of its
    /// children's spans, whichever is larger.
    fn subtree_span(&self, item: usize, items: &[Item], opts: &PlacementOptions) -> f32 {
        let own = items[item].size.width();
        if self.children[item].is_empty() {
            return own;
        }
        let children_span: f32 = self.children[item]
            .iter()
            .map(|&child| self.subtree_span(child, items, opts))
            .sum::<f32>()
            + opts.node_spacing * (self.children[item].len() - 1) as f32;
        own.max(children_span)
    }
}

#[allow(clippy::too_many_arguments)]
fn place_subtree(
    item: usize,
    center_x: f32,
    forest: &Forest,
    items: &[Item],
    opts: &PlacementOptions,
    row_tops: &[f32],
    row_heights: &[f32],
    positions: &mut [Point],
) {
    let depth = forest.depth[item];
    positions[item] = Point::new(center_x, row_tops[depth] + row_heights[depth] / 2.0);

    let children = &forest.children[item];
    if children.is_empty() {
        return;
    }

    let total_span: f32 = children
        .iter()
        .map(|&child| forest.subtree_span(child, items, opts))
        .sum::<f32>()
        + opts.node_spacing * (children.len() - 1) as f32;

    let mut x_cursor = center_x - total_span / 2.0;
    for &child in children {
        let span = forest.subtree_span(child, items, opts);
        place_subtree(
            child,
            x_cursor + span / 2.0,
            forest,
            items,
            opts,
            row_tops,
            row_heights,
            positions,
        );
        x_cursor += span + opts.node_spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::super::items_of_size;
    use super::*;

    fn options() -> PlacementOptions {
        PlacementOptions {
            node_spacing: 40.0,
            layer_spacing: 60.0,
            max_iterations: 1,
        }
    }

    #[test]
    fn parent_centers_over_children() {
        let items = items_of_size(3, 40.0, 30.0);
        let positions = Mrtree.place(&items, &[(0, 1), (0, 2)], &options());

        let children_center = (positions[1].x() + positions[2].x()) / 2.0;
        assert!((positions[0].x() - children_center).abs() < 0.01);
        assert!(positions[1].y() > positions[0].y());
    }

    #[test]
    fn sibling_subtrees_do_not_overlap() {
        let items = items_of_size(7, 40.0, 30.0);
        // Two subtrees of three under one root.
        let edges = [(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (2, 6)];
        let positions = Mrtree.place(&items, &edges, &options());

        let left_max = positions[3].x().max(positions[4].x());
        let right_min = positions[5].x().min(positions[6].x());
        assert!(right_min - left_max >= 40.0, "subtrees overlap");
    }

    #[test]
    fn depth_rows_separate_by_layer_spacing() {
        let items = items_of_size(2, 40.0, 30.0);
        let positions = Mrtree.place(&items, &[(0, 1)], &options());
        assert!(positions[1].y() - positions[0].y() >= 30.0 + 60.0 - 0.01);
    }

    #[test]
    fn disconnected_items_become_roots() {
        let items = items_of_size(3, 40.0, 30.0);
        let positions = Mrtree.place(&items, &[(0, 1)], &options());
        assert_eq!(positions.len(), 3);
        // Item 2 is its own root at depth zero.
        assert!((positions[2].y() - positions[0].y()).abs() < 0.01);
    }
}
