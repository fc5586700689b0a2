//! Scaling arbiter — maps the peak load sample to target capacities.

use capstan_core::{MetricSample, Recommendation, ScaleError, ScaleResult};

/// Recommend capacities for both resources from the peak sample.
///
/// `fleet_capacity = ceil(sample / users_per_instance)`, and the task count
/// follows the fleet at `tasks_per_instance` replicas per instance. Pure —
/// bounds are enforced separately by the policy clamp.
pub fn recommend(
    sample: MetricSample,
    users_per_instance: u32,
    tasks_per_instance: u32,
) -> ScaleResult<Recommendation> {
    if users_per_instance == 0 {
        return Err(ScaleError::InvalidArgument(
            "users_per_instance must be positive".to_string(),
        ));
    }

    let fleet_capacity = (sample.value() / users_per_instance as f64).ceil() as u32;
    Ok(Recommendation {
        fleet_capacity,
        task_count: fleet_capacity * tasks_per_instance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(v: f64) -> MetricSample {
        MetricSample::peak_of(&[v]).unwrap()
    }

    #[test]
    fn rounds_fleet_capacity_up() {
        let rec = recommend(sample(101.0), 20, 2).unwrap();
        assert_eq!(rec.fleet_capacity, 6);
        assert_eq!(rec.task_count, 12);
    }

    #[test]
    fn exact_multiple_does_not_round() {
        let rec = recommend(sample(100.0), 20, 2).unwrap();
        assert_eq!(rec.fleet_capacity, 5);
        assert_eq!(rec.task_count, 10);
    }

    #[test]
    fn is_pure() {
        let a = recommend(sample(73.0), 10, 3).unwrap();
        let b = recommend(sample(73.0), 10, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_users_per_instance_is_rejected() {
        assert!(matches!(
            recommend(sample(101.0), 0, 2),
            Err(ScaleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn small_load_still_needs_one_instance() {
        let rec = recommend(sample(1.0), 20, 2).unwrap();
        assert_eq!(rec.fleet_capacity, 1);
        assert_eq!(rec.task_count, 2);
    }
}
