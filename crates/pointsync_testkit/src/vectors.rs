//! Wire-format test vectors.
//!
//! These vectors pin the JSON shapes exchanged between clients and the
//! server so that other client implementations can be checked against them.

use pointsync_protocol::{decode_points, encode_points};
use serde::{Deserialize, Serialize};

/// A test vector that can be shared across implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Input body.
    pub input: String,
    /// Canonical re-encoding of the input, if it decodes.
    pub expected: Option<String>,
}

/// Vectors for the point array body of `GET /points` and `POST /points`.
pub fn point_array_vectors() -> Vec<TestVector> {
    vec![
        TestVector {
            id: "empty_array".into(),
            description: "No points".into(),
            input: "[]".into(),
            expected: Some("[]".into()),
        },
        TestVector {
            id: "single_point".into(),
            description: "Integer coordinates re-encode as floats".into(),
            input: r#"[{"id":"A","name":"X","lat":1,"lng":2}]"#.into(),
            expected: Some(r#"[{"id":"A","name":"X","lat":1.0,"lng":2.0}]"#.into()),
        },
        TestVector {
            id: "ordered_by_id".into(),
            description: "Output is ordered by id".into(),
            input: r#"[{"id":"b","name":"B","lat":0.5,"lng":0.5},{"id":"a","name":"A","lat":0.5,"lng":0.5}]"#.into(),
            expected: Some(
                r#"[{"id":"a","name":"A","lat":0.5,"lng":0.5},{"id":"b","name":"B","lat":0.5,"lng":0.5}]"#.into(),
            ),
        },
        TestVector {
            id: "duplicate_id_last_wins".into(),
            description: "A repeated id keeps the last occurrence".into(),
            input: r#"[{"id":"A","name":"old","lat":0.0,"lng":0.0},{"id":"A","name":"new","lat":0.0,"lng":0.0}]"#.into(),
            expected: Some(r#"[{"id":"A","name":"new","lat":0.0,"lng":0.0}]"#.into()),
        },
        TestVector {
            id: "object_not_array".into(),
            description: "A single object is rejected".into(),
            input: r#"{"id":"A","name":"X","lat":1,"lng":2}"#.into(),
            expected: None,
        },
        TestVector {
            id: "missing_field".into(),
            description: "A point without coordinates is rejected".into(),
            input: r#"[{"id":"A","name":"X"}]"#.into(),
            expected: None,
        },
        TestVector {
            id: "not_json".into(),
            description: "Garbage is rejected".into(),
            input: "not json".into(),
            expected: None,
        },
    ]
}

/// Decodes and re-encodes `vector.input`, returning the canonical body or
/// the decode error message.
pub fn run_point_array_vector(vector: &TestVector) -> Result<String, String> {
    let points = decode_points(vector.input.as_bytes()).map_err(|e| e.to_string())?;
    let bytes = encode_points(&points).map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_array_vectors_hold() {
        for vector in point_array_vectors() {
            let actual = run_point_array_vector(&vector).ok();
            assert_eq!(actual, vector.expected, "vector {}", vector.id);
        }
    }

    #[test]
    fn vectors_serialize_for_sharing() {
        let json = serde_json::to_string(&point_array_vectors()).unwrap();
        let parsed: Vec<TestVector> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), point_array_vectors().len());
    }
}
