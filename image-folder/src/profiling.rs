//! Per-stage timing of image loading that compiles to a no-op without the
//! `profiling` feature.
//!
//! Reports can be restricted with the `IMAGE_FOLDER_PROFILING_WHITELIST`
//! environment variable, a comma separated list of timing names.

#[cfg(feature = "profiling")]
mod enabled {
    use crate::common::*;
    use dashmap::DashSet;
    use lazy_static::lazy_static;
    use std::collections::HashSet;

    lazy_static! {
        pub(super) static ref PROFILING_CONFIG: ProfilingConfig = {
            match envy::prefixed("IMAGE_FOLDER_").from_env() {
                Ok(config) => config,
                Err(err) => {
                    warn!(
                        "failed to load profiling environment variables, fallback to default values: {:?}",
                        err
                    );
                    Default::default()
                }
            }
        };
        pub(super) static ref REGISTERED_TIMINGS: DashSet<&'static str> = DashSet::new();
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
    pub(super) struct ProfilingConfig {
        pub profiling_whitelist: Option<HashSet<String>>,
    }

    impl ProfilingConfig {
        pub fn can_report(&self, name: &str) -> bool {
            self.profiling_whitelist
                .as_ref()
                .map(|whitelist| whitelist.contains(name))
                .unwrap_or(true)
        }
    }
}

use crate::common::*;
#[cfg(feature = "profiling")]
use std::time::Instant;

/// Records the elapsed time between consecutive checkpoints.
#[cfg(feature = "profiling")]
#[derive(Debug)]
pub struct Timing {
    name: &'static str,
    instant: Instant,
    elapsed: Vec<(&'static str, Duration)>,
}

#[cfg(not(feature = "profiling"))]
#[derive(Debug)]
pub struct Timing;

impl Timing {
    pub fn new(name: &'static str) -> Self {
        #[cfg(feature = "profiling")]
        {
            if enabled::REGISTERED_TIMINGS.insert(name) {
                info!("registered timing profile '{}'", name);
            }

            Self {
                name,
                instant: Instant::now(),
                elapsed: vec![],
            }
        }

        #[cfg(not(feature = "profiling"))]
        {
            let _ = name;
            Self
        }
    }

    pub fn set_record(&mut self, name: &'static str) {
        #[cfg(feature = "profiling")]
        {
            self.elapsed.push((name, self.instant.elapsed()));
            self.instant = Instant::now();
        }

        #[cfg(not(feature = "profiling"))]
        let _ = name;
    }

    pub fn report(&self) {
        #[cfg(feature = "profiling")]
        {
            if enabled::PROFILING_CONFIG.can_report(self.name) {
                info!("profiling report for '{}'", self.name);
                self.elapsed.iter().for_each(|(name, elapsed)| {
                    info!("- {}\t{:?}", name, elapsed);
                });
            }
        }
    }

    /// The recorded checkpoints, empty without the `profiling` feature.
    pub fn records(&self) -> &[(&'static str, Duration)] {
        #[cfg(feature = "profiling")]
        {
            &self.elapsed
        }

        #[cfg(not(feature = "profiling"))]
        {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_follow_checkpoints() {
        let mut timing = Timing::new("test_timing");
        timing.set_record("first");
        timing.set_record("second");
        timing.report();

        let names: Vec<_> = timing.records().iter().map(|(name, _)| *name).collect();
        if cfg!(feature = "profiling") {
            assert_eq!(names, ["first", "second"]);
        } else {
            assert!(names.is_empty());
        }
    }
}
