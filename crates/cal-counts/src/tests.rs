//! Unit tests for cal-counts.

use std::io::Cursor;

use cal_core::{StopId, TimeBin};

use crate::{CountsError, ObservedCounts, load_counts_reader};

fn load(csv: &str) -> Result<ObservedCounts, CountsError> {
    load_counts_reader(Cursor::new(csv))
}

#[cfg(test)]
mod loader {
    use super::*;

    #[test]
    fn hours_map_to_zero_based_bins() {
        let counts = load("stop_id,hour,count\n1,1,10\n1,2,20\n2,1,5.5\n").unwrap();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.get(StopId(1), TimeBin(0)), Some(10.0));
        assert_eq!(counts.get(StopId(1), TimeBin(1)), Some(20.0));
        assert_eq!(counts.get(StopId(2), TimeBin(0)), Some(5.5));
    }

    #[test]
    fn whitespace_is_trimmed() {
        let counts = load("stop_id, hour, count\n 7 , 3 , 42 \n").unwrap();
        assert_eq!(counts.get(StopId(7), TimeBin(2)), Some(42.0));
    }

    #[test]
    fn header_only_is_empty() {
        let counts = load("stop_id,hour,count\n").unwrap();
        assert!(counts.is_empty());
    }

    #[test]
    fn malformed_number_is_parse_error() {
        let err = load("stop_id,hour,count\n1,1,lots\n").unwrap_err();
        assert!(matches!(err, CountsError::Parse(_)));
    }

    #[test]
    fn hour_zero_is_parse_error() {
        assert!(matches!(load("stop_id,hour,count\n1,0,3\n"), Err(CountsError::Parse(_))));
    }

    #[test]
    fn negative_count_is_parse_error() {
        assert!(matches!(load("stop_id,hour,count\n1,1,-3\n"), Err(CountsError::Parse(_))));
    }

    #[test]
    fn duplicate_key_is_parse_error() {
        assert!(matches!(
            load("stop_id,hour,count\n1,1,3\n1,1,4\n"),
            Err(CountsError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = crate::load_counts_csv(std::path::Path::new("/nonexistent/counts.csv")).unwrap_err();
        assert!(matches!(err, CountsError::Io(_)));
    }
}

#[cfg(test)]
mod store {
    use super::*;

    #[test]
    fn lookup_miss_is_absent() {
        let counts = load("stop_id,hour,count\n1,1,10\n").unwrap();
        assert_eq!(counts.get(StopId(1), TimeBin(5)), None);
        assert_eq!(counts.get(StopId(99), TimeBin(0)), None);
    }

    #[test]
    fn stops_sorted_and_distinct() {
        let counts = load("stop_id,hour,count\n9,1,1\n2,1,1\n9,2,1\n").unwrap();
        assert_eq!(counts.stops(), vec![StopId(2), StopId(9)]);
    }

    #[test]
    fn series_and_total() {
        let counts = load("stop_id,hour,count\n4,3,30\n4,1,10\n5,1,99\n").unwrap();
        let series: Vec<_> = counts.series(StopId(4)).into_iter().collect();
        assert_eq!(series, vec![(TimeBin(0), 10.0), (TimeBin(2), 30.0)]);
        assert_eq!(counts.total(StopId(4)), 40.0);
        assert_eq!(counts.total(StopId(8)), 0.0);
    }
}
