use crate::core::distance::haversine_km;
use crate::domain::model::{Coordinate, Facility, SelectionResult};

/// Picks the nearest facility with capacity left.
///
/// Facilities are scanned in directory order and only a strictly smaller
/// distance replaces the current best, so an exact tie keeps the earlier
/// entry. An empty or fully booked directory yields
/// [`SelectionResult::NoEligibleFacility`].
pub fn select_nearest<'a, I>(query: Coordinate, directory: I) -> SelectionResult<'a>
where
    I: IntoIterator<Item = &'a Facility>,
{
    let mut best: Option<&'a Facility> = None;
    let mut best_distance = f64::INFINITY;

    for facility in directory {
        if !facility.is_eligible() {
            continue;
        }

        let distance = haversine_km(query, facility.location);
        if distance < best_distance {
            best = Some(facility);
            best_distance = distance;
        }
    }

    match best {
        Some(facility) => SelectionResult::Selected {
            facility,
            distance_km: best_distance,
        },
        None => SelectionResult::NoEligibleFacility,
    }
}

/// 所有可收治的院所，依距離排序（同距離保留目錄順序）
pub fn rank_eligible<'a, I>(query: Coordinate, directory: I) -> Vec<(&'a Facility, f64)>
where
    I: IntoIterator<Item = &'a Facility>,
{
    let mut ranked: Vec<(&'a Facility, f64)> = directory
        .into_iter()
        .filter(|f| f.is_eligible())
        .map(|f| (f, haversine_km(query, f.location)))
        .collect();

    // sort_by 是穩定排序
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facility(name: &str, lat: f64, lon: f64, capacity: u32) -> Facility {
        Facility {
            name: name.to_string(),
            location: Coordinate::new(lat, lon),
            available_capacity: capacity,
            submission_endpoint: format!("https://forms.example.com/{}", name),
        }
    }

    fn ghana_directory() -> Vec<Facility> {
        vec![
            facility("A", 5.5381, -0.2272, 2),
            facility("B", 6.698, -1.629, 2),
            facility("C", 9.393, -0.824, 15),
        ]
    }

    #[test]
    fn test_selects_nearest_with_capacity() {
        let directory = ghana_directory();
        let result = select_nearest(Coordinate::new(5.6, -0.3), &directory);
        assert_eq!(result.facility().map(|f| f.name.as_str()), Some("A"));
        assert!(result.distance_km().unwrap() < 15.0);
    }

    #[test]
    fn test_skips_full_facility() {
        let mut directory = ghana_directory();
        directory[0].available_capacity = 0;
        let result = select_nearest(Coordinate::new(5.6, -0.3), &directory);
        assert_eq!(result.facility().map(|f| f.name.as_str()), Some("B"));
    }

    #[test]
    fn test_all_full_yields_no_facility() {
        let mut directory = ghana_directory();
        for f in directory.iter_mut() {
            f.available_capacity = 0;
        }
        for query in [
            Coordinate::new(5.6, -0.3),
            Coordinate::new(9.393, -0.824),
            Coordinate::new(-45.0, 170.0),
        ] {
            assert_eq!(select_nearest(query, &directory), SelectionResult::NoEligibleFacility);
        }
    }

    #[test]
    fn test_empty_directory_yields_no_facility() {
        let directory: Vec<Facility> = Vec::new();
        assert_eq!(
            select_nearest(Coordinate::new(0.0, 0.0), &directory),
            SelectionResult::NoEligibleFacility
        );
    }

    #[test]
    fn test_single_eligible_facility_wins_regardless_of_distance() {
        let directory = vec![
            facility("Near", 5.6, -0.3, 0),
            facility("Far", -33.86, 151.21, 1),
        ];
        let result = select_nearest(Coordinate::new(5.6, -0.3), &directory);
        assert_eq!(result.facility().map(|f| f.name.as_str()), Some("Far"));
    }

    #[test]
    fn test_exact_tie_keeps_first_in_directory() {
        // 與查詢點經度對稱，距離完全相同
        let directory = vec![
            facility("East", 0.0, 1.0, 3),
            facility("West", 0.0, -1.0, 3),
        ];
        let result = select_nearest(Coordinate::new(0.0, 0.0), &directory);
        assert_eq!(result.facility().map(|f| f.name.as_str()), Some("East"));

        let reversed: Vec<Facility> = directory.into_iter().rev().collect();
        let result = select_nearest(Coordinate::new(0.0, 0.0), &reversed);
        assert_eq!(result.facility().map(|f| f.name.as_str()), Some("West"));
    }

    #[test]
    fn test_rank_eligible_agrees_with_select() {
        let directory = ghana_directory();
        let query = Coordinate::new(7.0, -1.0);
        let ranked = rank_eligible(query, &directory);

        let names: Vec<&str> = ranked.iter().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(
            select_nearest(query, &directory).facility().map(|f| f.name.as_str()),
            Some(names[0])
        );
    }

    #[test]
    fn test_rank_eligible_excludes_full_and_keeps_tie_order() {
        let directory = vec![
            facility("Full", 0.0, 0.5, 0),
            facility("East", 0.0, 1.0, 3),
            facility("West", 0.0, -1.0, 3),
        ];
        let ranked = rank_eligible(Coordinate::new(0.0, 0.0), &directory);
        let names: Vec<&str> = ranked.iter().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(names, vec!["East", "West"]);
    }
}
