//! Keyed collection of points.

use crate::point::{Point, PointId};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// A mapping from [`PointId`] to [`Point`].
///
/// Keys are unique by construction. Two sets are equal when they hold the
/// same ids mapped to equal records; iteration is ordered by id only so that
/// persisted and wire output is deterministic.
///
/// On the wire a set is a JSON array of points. Building a set from a
/// sequence that repeats an id keeps the last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Point>", into = "Vec<Point>")]
pub struct PointSet {
    points: BTreeMap<PointId, Point>,
}

impl PointSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns true if a point with this id is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.points.contains_key(id)
    }

    /// Returns the point stored under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Point> {
        self.points.get(id)
    }

    /// Inserts a point, replacing and returning any record with the same id.
    pub fn insert(&mut self, point: Point) -> Option<Point> {
        self.points.insert(point.id.clone(), point)
    }

    /// Removes and returns the point stored under `id`.
    pub fn remove(&mut self, id: &str) -> Option<Point> {
        self.points.remove(id)
    }

    /// Iterates over the ids in the set.
    pub fn ids(&self) -> impl Iterator<Item = &PointId> {
        self.points.keys()
    }

    /// Iterates over the points in the set.
    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.values()
    }

    /// Returns the points as a vector, ordered by id.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Point> {
        self.points.values().cloned().collect()
    }

    /// Unions `incoming` into this set by id; incoming records replace
    /// existing ones on collision.
    pub fn union_incoming(&mut self, incoming: PointSet) {
        self.points.extend(incoming.points);
    }
}

impl From<Vec<Point>> for PointSet {
    fn from(points: Vec<Point>) -> Self {
        points.into_iter().collect()
    }
}

impl From<PointSet> for Vec<Point> {
    fn from(set: PointSet) -> Self {
        set.points.into_values().collect()
    }
}

impl FromIterator<Point> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Point> for PointSet {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, iter: I) {
        for point in iter {
            self.insert(point);
        }
    }
}

impl IntoIterator for PointSet {
    type Item = Point;
    type IntoIter = btree_map::IntoValues<PointId, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_values()
    }
}
