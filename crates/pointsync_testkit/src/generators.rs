//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random points and point sets that
//! satisfy the construction rules (non-empty id, coordinates in range).

use pointsync_protocol::{Point, PointId, PointSet, MAX_LATITUDE, MAX_LONGITUDE};
use proptest::prelude::*;

/// Strategy for generating point ids.
///
/// Ids are drawn from a small alphabet so that independently generated
/// sets overlap often.
pub fn point_id_strategy() -> impl Strategy<Value = PointId> {
    "[a-h][0-9]?".prop_map(PointId::from)
}

/// Strategy for generating point names.
pub fn point_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 '-]{0,23}"
}

/// Strategy for generating valid points.
pub fn point_strategy() -> impl Strategy<Value = Point> {
    (
        point_id_strategy(),
        point_name_strategy(),
        -MAX_LATITUDE..=MAX_LATITUDE,
        -MAX_LONGITUDE..=MAX_LONGITUDE,
    )
        .prop_map(|(id, name, lat, lng)| Point {
            id,
            name,
            lat,
            lng,
        })
}

/// Strategy for generating point sets of up to `max_len` points.
pub fn point_set_strategy(max_len: usize) -> impl Strategy<Value = PointSet> {
    prop::collection::vec(point_strategy(), 0..=max_len).prop_map(PointSet::from)
}

/// Strategy for generating a point set whose ids all start with `prefix`,
/// so sets built with different prefixes are disjoint.
pub fn prefixed_point_set_strategy(
    prefix: &'static str,
    max_len: usize,
) -> impl Strategy<Value = PointSet> {
    point_set_strategy(max_len).prop_map(move |set| {
        set.into_iter()
            .map(|point| Point {
                id: PointId::from(format!("{prefix}-{}", point.id)),
                ..point
            })
            .collect()
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_points_are_valid(point in point_strategy()) {
            let rebuilt = Point::with_id(point.id.clone(), point.name.clone(), point.lat, point.lng);
            prop_assert_eq!(rebuilt, Ok(point));
        }

        #[test]
        fn generated_sets_respect_max_len(set in point_set_strategy(5)) {
            prop_assert!(set.len() <= 5);
        }

        #[test]
        fn prefixed_sets_are_disjoint(
            a in prefixed_point_set_strategy("a", 8),
            b in prefixed_point_set_strategy("b", 8),
        ) {
            for id in a.ids() {
                prop_assert!(!b.contains(id.as_str()));
            }
        }
    }
}
