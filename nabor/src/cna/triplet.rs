use std::collections::VecDeque;
use std::fmt;

use nalgebra::DMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// CNA indices of one neighbor within a local adjacency matrix: the number of
/// shared neighbors, the number of bonds among them, and the longest shortest
/// path of the graph they induce.
pub struct CnaTriplet {
    nr_neighbors: u32,
    nr_neighbor_edges: u32,
    longest_path: u32,
}

impl CnaTriplet {
    /// Compute the triplet of vertex `index` in `adjacency`.
    ///
    /// The induced subgraph may be disconnected; unreachable vertex pairs
    /// contribute 0 to the longest path.
    pub fn new(adjacency: &DMatrix<bool>, index: usize) -> Self {
        let members: Vec<usize> = (0..adjacency.nrows())
            .filter(|&i| adjacency[(i, index)])
            .collect();
        let order = members.len();

        let mut nr_neighbor_edges = 0;
        for i in 0..order {
            for j in (i + 1)..order {
                if adjacency[(members[i], members[j])] {
                    nr_neighbor_edges += 1;
                }
            }
        }

        let mut longest_path = 0;
        for start in 0..order {
            longest_path = longest_path.max(Self::eccentricity(adjacency, &members, start));
        }

        Self {
            nr_neighbors: order as u32,
            nr_neighbor_edges,
            longest_path,
        }
    }

    /// Largest breadth-first distance reachable from `start` within the
    /// subgraph induced by `members`
    fn eccentricity(adjacency: &DMatrix<bool>, members: &[usize], start: usize) -> u32 {
        let mut distances = vec![0u32; members.len()];
        let mut visited = vec![false; members.len()];
        visited[start] = true;

        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            for v in 0..members.len() {
                if !visited[v] && adjacency[(members[u], members[v])] {
                    visited[v] = true;
                    distances[v] = distances[u] + 1;
                    queue.push_back(v);
                }
            }
        }

        distances.into_iter().max().unwrap_or(0)
    }

    /// The triplet as the `(n, e, p)` index array
    pub fn indices(&self) -> [u32; 3] {
        [self.nr_neighbors, self.nr_neighbor_edges, self.longest_path]
    }
}

impl fmt::Display for CnaTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{})",
            self.nr_neighbors, self.nr_neighbor_edges, self.longest_path
        )
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;

    use super::CnaTriplet;

    fn adjacency_from_edges(order: usize, edges: &[(usize, usize)]) -> DMatrix<bool> {
        let mut matrix = DMatrix::from_element(order, order, false);
        for &(i, j) in edges {
            matrix[(i, j)] = true;
            matrix[(j, i)] = true;
        }
        matrix
    }

    #[test]
    fn test_isolated_vertex() {
        let adjacency = adjacency_from_edges(3, &[(0, 1)]);
        let triplet = CnaTriplet::new(&adjacency, 2);
        assert_eq!(triplet.indices(), [0, 0, 0]);
    }

    #[test]
    fn test_triangle() {
        // every vertex of a triangle sees the opposite edge
        let adjacency = adjacency_from_edges(3, &[(0, 1), (1, 2), (0, 2)]);
        for index in 0..3 {
            let triplet = CnaTriplet::new(&adjacency, index);
            assert_eq!(triplet.indices(), [2, 1, 1]);
        }
    }

    #[test]
    fn test_path_subgraph() {
        // vertex 0 is bonded to 1, 2, 3; among those, 1-2 and 2-3 form a path
        let adjacency = adjacency_from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (2, 3)]);
        let triplet = CnaTriplet::new(&adjacency, 0);
        assert_eq!(triplet.indices(), [3, 2, 2]);
    }

    #[test]
    fn test_disconnected_pairs_contribute_zero() {
        // vertex 0 sees {1, 2, 3, 4}; only 1-2 are bonded, 3 and 4 are
        // isolated within the subgraph
        let adjacency = adjacency_from_edges(5, &[(0, 1), (0, 2), (0, 3), (0, 4), (1, 2)]);
        let triplet = CnaTriplet::new(&adjacency, 0);
        assert_eq!(triplet.indices(), [4, 1, 1]);
    }

    #[test]
    fn test_display() {
        let adjacency = adjacency_from_edges(3, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(CnaTriplet::new(&adjacency, 0).to_string(), "(2,1,1)");
    }
}
