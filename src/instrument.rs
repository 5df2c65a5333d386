/*! Contains all the information about the instruments that detect fires. */

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/** The satellite instruments found in the FIRMS active fire archives. */
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum Instrument {
    /// Moderate Resolution Imaging Spectroradiometer on the Terra and Aqua satellites.
    MODIS,
    /// Visible Infrared Imaging Radiometer Suite on Suomi-NPP and the NOAA-20/21 satellites.
    VIIRS,
}

impl Instrument {
    /// Get a string representing the name of the instrument.
    pub fn name(&self) -> &'static str {
        (*self).into()
    }

    /// The nominal size of a pixel at nadir in kilometers.
    ///
    /// This is informational only, the distance between detections is always measured between
    /// the pixel centers.
    pub fn pixel_size_km(&self) -> f64 {
        use Instrument::*;

        match self {
            MODIS => 1.0,
            VIIRS => 0.375,
        }
    }

    /// Scan the string for the occurence of an instrument name.
    pub fn string_contains_instrument(string: &str) -> Option<Instrument> {
        use strum::IntoEnumIterator;

        let upper = string.to_uppercase();
        Instrument::iter().find(|inst| upper.contains(inst.name()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_names_round_trip() {
        assert_eq!(Instrument::from_str("MODIS").unwrap(), Instrument::MODIS);
        assert_eq!(Instrument::from_str("VIIRS").unwrap(), Instrument::VIIRS);
        assert!(Instrument::from_str("GOES").is_err());

        assert_eq!(Instrument::MODIS.to_string(), "MODIS");
        assert_eq!(Instrument::VIIRS.name(), "VIIRS");
    }

    #[test]
    fn test_pixel_sizes() {
        assert_eq!(Instrument::MODIS.pixel_size_km(), 1.0);
        assert_eq!(Instrument::VIIRS.pixel_size_km(), 0.375);
    }

    #[test]
    fn test_string_contains_instrument() {
        assert_eq!(
            Instrument::string_contains_instrument("DL_FIRE_M6_112233.zip"),
            None
        );
        assert_eq!(
            Instrument::string_contains_instrument("fire_archive_viirs_2019.csv"),
            Some(Instrument::VIIRS)
        );
        assert_eq!(
            Instrument::string_contains_instrument("MODIS_nrt"),
            Some(Instrument::MODIS)
        );
    }
}
