#[cfg(test)]
mod tests {
    use crate::cleaning::DEFAULT_FORMAT;
    use crate::python::rotation_bindings::*;

    #[test]
    fn test_seconds_binding_matches_library() {
        assert_eq!(
            seconds_to_nearest_midnight("2000-01-01 12:47:02", DEFAULT_FORMAT).unwrap(),
            40378.0
        );
        assert_eq!(
            seconds_to_nearest_midnight("2000-01-01", "%Y-%m-%d").unwrap(),
            0.0
        );
    }

    #[test]
    fn test_diff_rot_binding_defaults() {
        let shift = diff_rot(40378.0, 443.92976, "howard", "sidereal").unwrap();
        assert!((shift - 4.87918286).abs() < 1e-6);
    }

    #[test]
    fn test_longitude_binding_uses_named_model() {
        let rigid = longitude_at_nearest_midnight(
            "2000-01-01 12:00:00",
            45.0,
            DEFAULT_FORMAT,
            "rigid",
            "sidereal",
        )
        .unwrap();
        assert!((rigid - 14.1844 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_input_is_an_error() {
        assert!(diff_rot(1.0, 0.0, "carrington", "sidereal").is_err());
        assert!(diff_rot(1.0, 0.0, "howard", "lunar").is_err());
        assert!(seconds_to_nearest_midnight("yesterday", DEFAULT_FORMAT).is_err());
    }
}
