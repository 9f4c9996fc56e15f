use getset::{CopyGetters, Setters};
use serde::{Deserialize, Serialize};

use crate::metrics::MetricRecord;
use crate::plot::metric_value::MetricType;

/// How tile numbers encode their position on the flowcell.
///
/// Under four-digit naming, tile 2311 sits on surface 2, swath 3, tile 11;
/// five-digit naming adds a second swath digit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileNaming {
    #[default]
    FourDigit,
    FiveDigit,
}

impl TileNaming {
    /// Surface a tile number sits on.
    pub fn surface_of(&self, tile: u32) -> u16 {
        let surface = match self {
            TileNaming::FourDigit => tile / 1000,
            TileNaming::FiveDigit => tile / 10000,
        };
        surface as u16
    }
}

/// Multi-dimensional record selector shared by both plot engines.
///
/// A `None` dimension is permissive. The engines only ever call
/// [`FilterOptions::valid_tile`] and the description helpers; the selector
/// internals stay here.
#[derive(Debug, Clone, Copy, Default, CopyGetters, Setters, Serialize, Deserialize)]
pub struct FilterOptions {
    #[getset(get_copy = "pub", set = "pub")]
    naming: TileNaming,
    #[getset(get_copy = "pub", set = "pub")]
    lane: Option<u16>,
    #[getset(get_copy = "pub", set = "pub")]
    surface: Option<u16>,
    #[getset(get_copy = "pub", set = "pub")]
    read: Option<u16>,
}

impl FilterOptions {
    /// A fully permissive selector under the given naming convention.
    pub fn new(naming: TileNaming) -> Self {
        FilterOptions {
            naming,
            ..Default::default()
        }
    }

    pub fn with_attrs(
        naming: TileNaming,
        lane: Option<u16>,
        surface: Option<u16>,
        read: Option<u16>,
    ) -> Self {
        FilterOptions {
            naming,
            lane,
            surface,
            read,
        }
    }

    /// True iff the record matches every active selector dimension.
    pub fn valid_tile<M: MetricRecord>(&self, record: &M) -> bool {
        if let Some(lane) = self.lane {
            if record.lane() != lane {
                return false;
            }
        }
        if let Some(surface) = self.surface {
            if self.naming.surface_of(record.tile()) != surface {
                return false;
            }
        }
        true
    }

    pub fn is_specific_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// A metric is plotted per read only when it varies by read and a read
    /// was selected.
    pub fn is_specific_read(&self, metric_type: MetricType) -> bool {
        metric_type.is_read_specific() && self.read.is_some()
    }

    pub fn read_description(&self) -> String {
        match self.read {
            Some(read) => format!("Read {}", read),
            None => "All Reads".to_string(),
        }
    }

    pub fn surface_description(&self) -> String {
        match self.surface {
            Some(surface) => format!("Surface {}", surface),
            None => "All Surfaces".to_string(),
        }
    }

    pub fn lane_description(&self) -> String {
        match self.lane {
            Some(lane) => format!("Lane {}", lane),
            None => "All Lanes".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TileMetric;

    #[test]
    fn test_surface_of() {
        assert_eq!(TileNaming::FourDigit.surface_of(1101), 1);
        assert_eq!(TileNaming::FourDigit.surface_of(2311), 2);
        assert_eq!(TileNaming::FiveDigit.surface_of(21205), 2);
    }

    #[test]
    fn test_permissive_filter_accepts_everything() {
        let options = FilterOptions::new(TileNaming::FourDigit);
        assert!(options.valid_tile(&TileMetric::new(1, 1101)));
        assert!(options.valid_tile(&TileMetric::new(8, 2319)));
        assert!(!options.is_specific_surface());
    }

    #[test]
    fn test_lane_and_surface_filter() {
        let options =
            FilterOptions::with_attrs(TileNaming::FourDigit, Some(2), Some(1), None);
        assert!(options.valid_tile(&TileMetric::new(2, 1101)));
        assert!(!options.valid_tile(&TileMetric::new(1, 1101)));
        assert!(!options.valid_tile(&TileMetric::new(2, 2101)));
        assert!(options.is_specific_surface());
    }

    #[test]
    fn test_read_specificity_depends_on_metric() {
        let mut options = FilterOptions::new(TileNaming::FourDigit);
        options.set_read(Some(1));
        assert!(options.is_specific_read(MetricType::PercentPhasing));
        assert!(!options.is_specific_read(MetricType::Density));
        options.set_read(None);
        assert!(!options.is_specific_read(MetricType::PercentPhasing));
    }

    #[test]
    fn test_descriptions() {
        let options =
            FilterOptions::with_attrs(TileNaming::FourDigit, Some(3), None, Some(2));
        assert_eq!(options.lane_description(), "Lane 3");
        assert_eq!(options.surface_description(), "All Surfaces");
        assert_eq!(options.read_description(), "Read 2");
    }
}
