//! Global utility functions — these are publicly re-exported in `prelude.rs`.

use crate::settings::*;

pub mod atomic_ops;
pub mod general;

pub use atomic_ops::AtomicOps;
pub use general::*;

#[cfg(test)]
pub(crate) use event_count::count_events;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amplitude_conversion() {
        let level = 0.5;
        let db = level_to_db(level);
        assert!(within_tolerance(db, -6.020_599_913_279_624, 1e-12));
        assert!(within_tolerance(db_to_level(db), level, 1e-12));
    }

    #[test]
    fn silence_floors_to_minus_infinity() {
        assert_eq!(level_to_db(0.0), MINUS_INFINITY_DB);
        assert_eq!(level_to_db(9.9e-7), MINUS_INFINITY_DB);
        assert_eq!(level_to_db(f64::MIN_POSITIVE), MINUS_INFINITY_DB);
        assert!(level_to_db(MINUS_INFINITY_GAIN).is_finite());
    }

    #[test]
    fn ln_nine_constant() {
        assert!(epsilon_eq(TIME_CONSTANT_LOG, 9.0f64.ln()));
    }

    #[test]
    fn denormals_are_flushed() {
        assert_eq!(flush_denormal(1e-300), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(-0.5), -0.5);
        assert_eq!(ms_to_secs(250.0), 0.25);
    }
}
