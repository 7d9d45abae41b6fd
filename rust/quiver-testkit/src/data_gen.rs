//! Data generation utilities for testing.

use quiver_array::{ColumnArray, DataType, Field, Fields, Record, RecordBatch};

/// The archers struct type: `struct<archer: string, location: string, year: int16>`.
pub fn archer_fields() -> Fields {
    Fields::from(vec![
        Field::new("archer", DataType::Utf8, true),
        Field::new("location", DataType::Utf8, true),
        Field::new("year", DataType::Int16, true),
    ])
}

/// Five well-known archers, in the order the scenarios expect.
pub fn archer_records() -> Vec<Record> {
    [
        ("Legolas", "Murkwood", 1954),
        ("Oliver", "Star City", 1941),
        ("Merida", "Scotland", 2012),
        ("Lara", "London", 1996),
        ("Artemis", "Greece", -600),
    ]
    .into_iter()
    .map(|(archer, location, year)| {
        Record::new()
            .with("archer", archer)
            .with("location", location)
            .with("year", year as i64)
    })
    .collect()
}

/// Generates `cols` Float64 columns named `c0`, `c1`, ... of `rows`
/// standard-normal values each.
///
/// The same `seed` always yields the same batch.
pub fn random_batch(rows: usize, cols: usize, seed: u64) -> anyhow::Result<RecordBatch> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let columns = (0..cols)
        .map(|_| {
            let values = (0..rows).map(|_| standard_normal(&mut rng)).collect::<Vec<_>>();
            ColumnArray::from_values(&values)
        })
        .collect::<Vec<_>>();
    let names = (0..cols).map(|i| format!("c{i}")).collect::<Vec<_>>();
    Ok(RecordBatch::from_arrays(columns, &names)?)
}

/// Samples the standard normal distribution (Box-Muller transform).
fn standard_normal(rng: &mut fastrand::Rng) -> f64 {
    // `1 - u` keeps the logarithm's argument in (0, 1].
    let u1 = 1.0 - rng.f64();
    let u2 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_batch_shape() {
        let batch = random_batch(100, 4, 7).unwrap();
        assert_eq!(batch.num_rows(), 100);
        assert_eq!(batch.num_columns(), 4);
        assert_eq!(batch.schema().field(3).unwrap().name(), "c3");
        assert_eq!(
            batch.schema().field(0).unwrap().data_type(),
            &DataType::Float64
        );
    }

    #[test]
    fn test_random_batch_is_seeded() {
        let a = random_batch(16, 2, 42).unwrap();
        let b = random_batch(16, 2, 42).unwrap();
        let c = random_batch(16, 2, 43).unwrap();
        let values = |batch: &RecordBatch| {
            batch.column(1).unwrap().values::<f64>().unwrap().to_vec()
        };
        assert_eq!(values(&a), values(&b));
        assert_ne!(values(&a), values(&c));
    }

    #[test]
    fn test_random_values_look_normal() {
        let batch = random_batch(8192, 1, 1).unwrap();
        let values = batch.column(0).unwrap().values::<f64>().unwrap();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var - 1.0).abs() < 0.1, "variance {var}");
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_archer_records() {
        let records = archer_records();
        assert_eq!(records.len(), 5);
        assert_eq!(
            records[0].get("archer").and_then(|v| v.as_str()),
            Some("Legolas")
        );
        assert_eq!(records[4].get("year").and_then(|v| v.as_i64()), Some(-600));
        assert_eq!(archer_fields().len(), 3);
    }
}
