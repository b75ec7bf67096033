//! R-tree index over census tract bounding boxes
//!
//! Tract polygons are complex; their bounding boxes are not. Candidate
//! lookup goes through the boxes, exact clipping happens afterwards in the
//! allocator.

use crate::layers::tracts::Tract;
use geo::BoundingRect;
use geo_types::Rect;
use rstar::{RTree, RTreeObject, AABB};

struct IndexEntry {
    tract_idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over a set of tracts
pub struct TractIndex {
    tracts: Vec<Tract>,
    tree: RTree<IndexEntry>,
}

impl TractIndex {
    /// Build the index from extracted tracts
    pub fn build(tracts: Vec<Tract>) -> Self {
        let entries = tracts
            .iter()
            .enumerate()
            .filter_map(|(tract_idx, tract)| {
                let rect = tract.polygons.bounding_rect()?;
                Some(IndexEntry {
                    tract_idx,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();
        Self {
            tracts,
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracts.is_empty()
    }

    pub fn get(&self, tract_idx: usize) -> &Tract {
        &self.tracts[tract_idx]
    }

    /// All tracts, in extraction order
    pub fn tracts(&self) -> &[Tract] {
        &self.tracts
    }

    /// Indices of tracts whose bounding box intersects the query rect,
    /// sorted for deterministic downstream behavior
    pub fn candidates(&self, rect: Rect<f64>) -> Vec<usize> {
        let query = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );
        let mut indices: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.tract_idx)
            .collect();
        indices.sort_unstable();
        indices
    }
}
