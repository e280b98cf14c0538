//! Disjoint-set forest over trajectory indices.

pub(crate) struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub(crate) fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge the sets containing `x` and `y`, returning the surviving root.
    pub(crate) fn union(&mut self, x: usize, y: usize) -> usize {
        let px = self.find(x);
        let py = self.find(y);
        if px == py {
            return px;
        }
        if self.rank[px] < self.rank[py] {
            self.parent[px] = py;
            py
        } else if self.rank[px] > self.rank[py] {
            self.parent[py] = px;
            px
        } else {
            self.parent[py] = px;
            self.rank[px] += 1;
            px
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_find_components() {
        let mut uf = UnionFind::new(6);
        uf.union(0, 1);
        uf.union(2, 3);
        uf.union(1, 3);

        assert_eq!(uf.find(0), uf.find(2));
        assert_ne!(uf.find(0), uf.find(4));
        assert_ne!(uf.find(4), uf.find(5));
        assert_eq!(uf.union(5, 5), uf.find(5));
    }
}
